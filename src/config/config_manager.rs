// src/config/config_manager.rs

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 未配置 endpoint 时使用的上游地址
pub const DEFAULT_ENDPOINT: &str = "https://mocktioneer.edgecompute.app/openrtb2/auction";

/// 单次上游调用的默认超时（毫秒），请求未携带 tmax 时生效
pub const DEFAULT_TIMEOUT_MS: u64 = 250;

/// 适配器配置
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AdapterConfig {
    /// 上游 endpoint 模板，可包含 `{{.Macro}}` 占位符
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl AdapterConfig {
    /// 空 endpoint 回退到内置默认地址
    pub fn endpoint_or_default(&self) -> &str {
        if self.endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            &self.endpoint
        }
    }
}

#[derive(Clone, Debug)]
pub struct ConfigManager {
    pub adapter: AdapterConfig,
}

impl ConfigManager {
    pub fn new(adapter: AdapterConfig) -> Self {
        ConfigManager { adapter }
    }

    /// 从 JSON 文件读取配置；文件不存在或无法解析时使用默认值
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let adapter = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("invalid adapter config {}: {}, using defaults", path.display(), e);
                AdapterConfig::default()
            }),
            Err(_) => {
                info!("adapter config {} not found, using defaults", path.display());
                AdapterConfig::default()
            }
        };
        ConfigManager::new(adapter)
    }

    /// 命令行参数覆盖文件中的配置
    pub fn with_overrides(mut self, endpoint: Option<String>, timeout_ms: Option<u64>) -> Self {
        if let Some(endpoint) = endpoint {
            self.adapter.endpoint = endpoint;
        }
        if let Some(timeout_ms) = timeout_ms {
            self.adapter.timeout_ms = timeout_ms;
        }
        self
    }
}
