// src/model/adapters.rs

use std::fmt;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::openrtb::request::BidRequest;
use crate::openrtb::response::Bid;

/// 默认结算币种
pub const DEFAULT_CURRENCY: &str = "USD";

/// 发往上游的一次 HTTP 调用，构造后不再修改
#[derive(Debug, Clone)]
pub struct RequestData {
    pub method: Method,
    pub uri: String,
    pub body: Vec<u8>,
    /// HeaderMap 允许同名头重复出现（X-Forwarded-For）
    pub headers: HeaderMap,
    pub imp_ids: Vec<String>,
}

/// 上游返回的状态码与原始响应体
#[derive(Debug, Clone, Default)]
pub struct ResponseData {
    pub status_code: u16,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

impl ResponseData {
    pub fn new(status_code: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status_code, body: body.into(), headers: HeaderMap::new() }
    }
}

/// 出价的媒体类型
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BidType {
    Banner,
    Video,
    Native,
}

impl BidType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidType::Banner => "banner",
            BidType::Video => "video",
            BidType::Native => "native",
        }
    }
}

impl fmt::Display for BidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 带媒体类型的出价
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TypedBid {
    pub bid: Bid,
    pub bid_type: BidType,
}

/// 适配器对一次竞价的贡献：币种 + 出价列表
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BidderResponse {
    pub currency: String,
    pub bids: Vec<TypedBid>,
}

impl BidderResponse {
    pub fn with_bids_capacity(capacity: usize) -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            bids: Vec::with_capacity(capacity),
        }
    }
}

/// 宿主竞价编排器调用的适配器接口
///
/// 两个方法都是同步纯函数，真正的网络调用由外部 transport 完成。
pub trait Bidder: Send + Sync {
    /// 构造上游请求；出错时本次竞价不产生任何请求
    fn make_requests(&self, request: &BidRequest) -> Result<Vec<RequestData>, AdapterError>;

    /// 将上游响应映射为出价；`Ok(None)` 表示合法的无出价（204）
    fn make_bids(
        &self,
        request: &BidRequest,
        request_data: &RequestData,
        response: &ResponseData,
    ) -> Result<Option<BidderResponse>, AdapterError>;
}
