// src/bidding/engine.rs

use std::time::Instant;

use serde_json::json;
use tracing::{info, warn};

use crate::bidding::transport::UpstreamClient;
use crate::error::AdapterError;
use crate::model::adapters::{Bidder, BidderResponse, DEFAULT_CURRENCY};
use crate::openrtb::request::BidRequest;

/// 单个适配器的 build → send → map 流程
///
/// 任一步出错即返回错误，本轮不贡献任何出价；所有上游都 204 时返回 `Ok(None)`。
pub async fn run_auction<B: Bidder + ?Sized>(
    bidder: &B,
    client: &UpstreamClient,
    bid_request: &BidRequest,
) -> Result<Option<BidderResponse>, AdapterError> {
    let start = Instant::now();
    let requests = bidder.make_requests(bid_request)?;
    let responses = client.execute_all(&requests, bid_request.tmax).await;

    let mut merged: Option<BidderResponse> = None;
    let mut call_details = Vec::with_capacity(requests.len());

    for (request_data, response) in requests.iter().zip(responses) {
        let response = response.inspect_err(|e| {
            warn!(request_id = %bid_request.id, uri = %request_data.uri, error = %e, "upstream call failed");
        })?;
        let status = response.status_code;
        let mapped = bidder.make_bids(bid_request, request_data, &response)?;
        call_details.push(json!({
            "uri": request_data.uri,
            "status": status,
            "bids": mapped.as_ref().map_or(0, |r| r.bids.len()),
        }));

        if let Some(mapped) = mapped {
            let target = merged.get_or_insert_with(|| BidderResponse {
                currency: DEFAULT_CURRENCY.to_string(),
                bids: Vec::new(),
            });
            target.currency = mapped.currency;
            target.bids.extend(mapped.bids);
        }
    }

    info!(
        request_id = %bid_request.id,
        bids = merged.as_ref().map_or(0, |r| r.bids.len()),
        elapsed_ms = start.elapsed().as_millis() as u64,
        calls = %json!(call_details),
        "auction finished"
    );
    Ok(merged)
}
