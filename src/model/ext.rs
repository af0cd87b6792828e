// src/model/ext.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AdapterError;
use crate::openrtb::request::Imp;

/// 本适配器在 imp.ext 中使用的命名空间
pub const BIDDER_NAME: &str = "mocktioneer";

/// 通用的 `{ "bidder": {...} }` 包装层，bidder 内容只由对应适配器解释
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ExtImpBidder {
    pub bidder: Value,
}

/// imp.ext.bidder 中本适配器识别的参数，全部可选
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExtMocktioneer {
    /// 按请求覆盖上游 endpoint
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    /// 透传给上游的测试出价（CPM），上游会原样回显为 price
    #[serde(default)]
    pub bid: f64,
}

/// 发往上游的 imp.ext：`{ "mocktioneer": { "bid": n } }`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UpstreamExt {
    pub mocktioneer: UpstreamExtMock,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UpstreamExtMock {
    pub bid: f64,
}

impl UpstreamExt {
    pub fn passthrough(bid: f64) -> Self {
        Self { mocktioneer: UpstreamExtMock { bid } }
    }
}

/// 解析 imp.ext.bidder；JSON 不合法或缺少 bidder 键时返回 BadInput
pub fn parse_imp_ext(imp: &Imp) -> Result<ExtMocktioneer, AdapterError> {
    let not_provided = || AdapterError::BadInput("ext.bidder not provided".to_string());
    let raw = imp.ext.as_ref().ok_or_else(not_provided)?;
    let wrapper: ExtImpBidder =
        serde_json::from_value(raw.clone()).map_err(|_| not_provided())?;
    serde_json::from_value(wrapper.bidder).map_err(|_| not_provided())
}

/// 返回所有 imp 的 id，保持原有顺序
pub fn imp_ids(imps: &[Imp]) -> Vec<String> {
    imps.iter().map(|imp| imp.id.clone()).collect()
}
