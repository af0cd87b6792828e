// src/bidding/adapter.rs

use tracing::debug;

use crate::bidding::bids::map_response;
use crate::bidding::builder::build_request_data;
use crate::bidding::endpoint::{resolve_endpoint, EndpointTemplate};
use crate::config::AdapterConfig;
use crate::error::AdapterError;
use crate::model::adapters::{Bidder, BidderResponse, RequestData, ResponseData};
use crate::openrtb::request::BidRequest;

/// Mocktioneer 适配器，只持有编译好的 endpoint 模板，每次调用互不影响
#[derive(Debug, Clone)]
pub struct MocktioneerAdapter {
    endpoint: EndpointTemplate,
}

impl MocktioneerAdapter {
    /// endpoint 为空时使用内置默认地址；模板无法解析时适配器构建失败
    pub fn new(config: &AdapterConfig) -> Result<Self, AdapterError> {
        let endpoint = EndpointTemplate::parse(config.endpoint_or_default())?;
        Ok(Self { endpoint })
    }

    pub fn endpoint_template(&self) -> &str {
        self.endpoint.as_str()
    }
}

impl Bidder for MocktioneerAdapter {
    fn make_requests(&self, request: &BidRequest) -> Result<Vec<RequestData>, AdapterError> {
        let endpoint = resolve_endpoint(&self.endpoint, request)?;
        let request_data = build_request_data(endpoint, request)?;
        debug!(
            request_id = %request.id,
            uri = %request_data.uri,
            imps = request_data.imp_ids.len(),
            "built upstream request"
        );
        Ok(vec![request_data])
    }

    fn make_bids(
        &self,
        request: &BidRequest,
        _request_data: &RequestData,
        response: &ResponseData,
    ) -> Result<Option<BidderResponse>, AdapterError> {
        map_response(request, response)
    }
}
