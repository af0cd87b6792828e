// src/bidding/transport.rs

use std::time::Instant;

use futures::future::join_all;
use reqwest::Client;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::error::AdapterError;
use crate::model::adapters::{RequestData, ResponseData};

/// 执行 RequestData 的 HTTP 客户端
///
/// 生产环境中这一层由宿主提供，这里用于 demo 服务和集成测试。
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    client: Client,
    default_timeout_ms: u64,
}

impl UpstreamClient {
    pub fn new(default_timeout_ms: u64) -> Self {
        Self {
            client: Client::new(),
            default_timeout_ms,
        }
    }

    /// 发送单个请求，`tmax` 优先于默认超时
    pub async fn execute(&self, request: &RequestData, tmax: Option<u64>) -> Result<ResponseData, AdapterError> {
        let timeout_ms = tmax.unwrap_or(self.default_timeout_ms);
        let start = Instant::now();

        let call = async {
            let resp = self
                .client
                .request(request.method.clone(), &request.uri)
                .headers(request.headers.clone())
                .body(request.body.clone())
                .send()
                .await?;
            let status_code = resp.status().as_u16();
            let headers = resp.headers().clone();
            let body = resp.bytes().await?.to_vec();
            Ok::<_, AdapterError>(ResponseData { status_code, body, headers })
        };

        let response = timeout(Duration::from_millis(timeout_ms), call)
            .await
            .map_err(|_| AdapterError::Timeout(timeout_ms))??;
        debug!(
            uri = %request.uri,
            status = response.status_code,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "upstream call finished"
        );
        Ok(response)
    }

    /// 并发执行多个请求，结果顺序与输入一致
    pub async fn execute_all(
        &self,
        requests: &[RequestData],
        tmax: Option<u64>,
    ) -> Vec<Result<ResponseData, AdapterError>> {
        join_all(requests.iter().map(|request| self.execute(request, tmax))).await
    }
}
