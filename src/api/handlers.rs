use axum::{extract::State, http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::bidding::engine::run_auction;
use crate::openrtb::request::BidRequest;
use crate::AppState;

/// **处理 OpenRTB 竞价请求**
///
/// 200 返回适配器的出价，204 表示无出价，502 表示上游或适配器出错。
pub async fn handle_openrtb_request(
    State(state): State<Arc<AppState>>,
    Json(bid_request): Json<BidRequest>,
) -> Response {
    match run_auction(state.adapter.as_ref(), &state.client, &bid_request).await {
        Ok(Some(bidder_response)) if !bidder_response.bids.is_empty() => {
            info!(request_id = %bid_request.id, bids = bidder_response.bids.len(), "adapter_inquiry_success");
            (StatusCode::OK, Json(bidder_response)).into_response()
        }
        Ok(_) => {
            info!(request_id = %bid_request.id, "adapter_inquiry_no_bid");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(request_id = %bid_request.id, error = %e, "adapter_inquiry_failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "request_id": bid_request.id, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
