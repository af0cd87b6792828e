// src/bidding/bids.rs

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::AdapterError;
use crate::model::adapters::{BidType, BidderResponse, ResponseData, TypedBid};
use crate::openrtb::request::{BidRequest, Imp};
use crate::openrtb::response::BidResponse;

const STATUS_OK: u16 = 200;
const STATUS_NO_CONTENT: u16 = 204;

/// 使用 simd-json 解析响应体
fn decode_bid_response(body: &[u8]) -> Result<BidResponse, AdapterError> {
    let mut buf = body.to_vec();
    simd_json::serde::from_slice::<BidResponse>(&mut buf).map_err(|e| {
        debug!(error = %e, "failed to decode upstream bid response");
        AdapterError::bad_server_response("invalid JSON")
    })
}

/// 按 video > native > banner 的优先级推断媒体类型，找不到 imp 时为 banner
pub fn media_type_for_imp(imp: Option<&Imp>) -> BidType {
    match imp {
        Some(imp) if imp.is_video() => BidType::Video,
        Some(imp) if imp.is_native() => BidType::Native,
        _ => BidType::Banner,
    }
}

/// 将上游响应映射为带类型的出价
///
/// - 204：合法的无出价，返回 `Ok(None)`
/// - 非 200：`unexpected status: <code>`
/// - 响应体无法解析：`invalid JSON`
/// - seatbid 为空：`empty seatbid`
///
/// 只取第一个 seat，出价顺序与上游一致。
pub fn map_response(request: &BidRequest, response: &ResponseData) -> Result<Option<BidderResponse>, AdapterError> {
    match response.status_code {
        STATUS_NO_CONTENT => return Ok(None),
        STATUS_OK => {}
        status => {
            warn!(request_id = %request.id, status, "unexpected upstream status");
            return Err(AdapterError::bad_server_response(format!("unexpected status: {}", status)));
        }
    }

    let bid_response = decode_bid_response(&response.body)?;
    let Some(seat) = bid_response.seatbid.into_iter().next() else {
        warn!(request_id = %request.id, "upstream returned empty seatbid");
        return Err(AdapterError::bad_server_response("empty seatbid"));
    };

    let imps_by_id: HashMap<&str, &Imp> = request
        .imp
        .iter()
        .rev()
        .map(|imp| (imp.id.as_str(), imp))
        .collect();

    let mut bidder_response = BidderResponse::with_bids_capacity(seat.bid.len());
    if let Some(cur) = bid_response.cur.filter(|cur| !cur.is_empty()) {
        bidder_response.currency = cur;
    }
    for bid in seat.bid {
        let bid_type = media_type_for_imp(imps_by_id.get(bid.impid.as_str()).copied());
        bidder_response.bids.push(TypedBid { bid, bid_type });
    }
    Ok(Some(bidder_response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openrtb::request::{Native, Video};
    use serde_json::json;

    fn request() -> BidRequest {
        BidRequest {
            id: "req-1".to_string(),
            imp: vec![
                Imp { id: "banner".to_string(), ..Default::default() },
                Imp { id: "video".to_string(), video: Some(Video::default()), ..Default::default() },
                Imp {
                    id: "native".to_string(),
                    native: Some(Native { request: "{}".to_string(), ..Default::default() }),
                    ..Default::default()
                },
                Imp {
                    id: "both".to_string(),
                    video: Some(Video::default()),
                    native: Some(Native::default()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    fn ok(body: serde_json::Value) -> ResponseData {
        ResponseData::new(200, serde_json::to_vec(&body).unwrap())
    }

    #[test]
    fn no_content_is_not_an_error() {
        let result = map_response(&request(), &ResponseData::new(204, Vec::new())).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn unexpected_status_is_reported() {
        let err = map_response(&request(), &ResponseData::new(500, "oops")).unwrap_err();
        assert!(err.is_server_response());
        assert_eq!(err.to_string(), "unexpected status: 500");
    }

    #[test]
    fn malformed_body_is_invalid_json() {
        let err = map_response(&request(), &ResponseData::new(200, "{not json")).unwrap_err();
        assert_eq!(err.to_string(), "invalid JSON");
        let err = map_response(&request(), &ResponseData::new(200, "")).unwrap_err();
        assert_eq!(err.to_string(), "invalid JSON");
    }

    #[test]
    fn empty_seatbid_is_an_error() {
        let err = map_response(&request(), &ok(json!({"id": "req-1", "seatbid": []}))).unwrap_err();
        assert_eq!(err.to_string(), "empty seatbid");
        let err = map_response(&request(), &ok(json!({"id": "req-1"}))).unwrap_err();
        assert_eq!(err.to_string(), "empty seatbid");
    }

    #[test]
    fn media_type_comes_from_request_imp() {
        let body = json!({
            "id": "req-1",
            "seatbid": [{"bid": [
                {"id": "b1", "impid": "video", "price": 2.0},
                {"id": "b2", "impid": "banner", "price": 1},
                {"id": "b3", "impid": "native", "price": 0.5},
                {"id": "b4", "impid": "both", "price": 0.5},
                {"id": "b5", "impid": "unknown", "price": 0.1}
            ]}]
        });
        let response = map_response(&request(), &ok(body)).unwrap().unwrap();
        let types: Vec<_> = response.bids.iter().map(|b| (b.bid.id.as_str(), b.bid_type)).collect();
        assert_eq!(
            types,
            vec![
                ("b1", BidType::Video),
                ("b2", BidType::Banner),
                ("b3", BidType::Native),
                ("b4", BidType::Video),
                ("b5", BidType::Banner),
            ]
        );
        assert_eq!(response.bids[1].bid.price, 1.0);
    }

    #[test]
    fn currency_override_and_default() {
        let body = json!({"seatbid": [{"bid": [{"id": "b", "impid": "banner", "price": 1.0}]}], "cur": "EUR"});
        assert_eq!(map_response(&request(), &ok(body)).unwrap().unwrap().currency, "EUR");

        let body = json!({"seatbid": [{"bid": [{"id": "b", "impid": "banner", "price": 1.0}]}], "cur": ""});
        assert_eq!(map_response(&request(), &ok(body)).unwrap().unwrap().currency, "USD");
    }

    #[test]
    fn only_first_seat_is_mapped() {
        let body = json!({
            "seatbid": [
                {"seat": "a", "bid": [{"id": "first", "impid": "banner", "price": 1.0}]},
                {"seat": "b", "bid": [{"id": "second", "impid": "banner", "price": 9.0}]}
            ]
        });
        let response = map_response(&request(), &ok(body)).unwrap().unwrap();
        assert_eq!(response.bids.len(), 1);
        assert_eq!(response.bids[0].bid.id, "first");
    }

    #[test]
    fn first_seat_without_bids_yields_empty_result() {
        let body = json!({"seatbid": [{"bid": []}]});
        let response = map_response(&request(), &ok(body)).unwrap().unwrap();
        assert!(response.bids.is_empty());
    }

    #[test]
    fn bid_fields_survive_decoding() {
        let body = json!({
            "seatbid": [{"bid": [{
                "id": "b", "impid": "banner", "price": 5.5,
                "adm": "<div>ad</div>", "crid": "cr-1", "adomain": ["example.com"],
                "w": 300, "h": 250, "ext": {"mocktioneer": {"echo": true}},
                "burl": "https://bill.test", "lurl": "https://loss.test", "mtype": 1, "exp": 300
            }]}]
        });
        let response = map_response(&request(), &ok(body)).unwrap().unwrap();
        let bid = &response.bids[0].bid;
        assert_eq!(bid.adm.as_deref(), Some("<div>ad</div>"));
        assert_eq!(bid.crid.as_deref(), Some("cr-1"));
        assert_eq!(bid.adomain, Some(vec!["example.com".to_string()]));
        assert_eq!((bid.w, bid.h), (Some(300), Some(250)));
        assert_eq!(bid.ext, Some(json!({"mocktioneer": {"echo": true}})));

        let encoded = serde_json::to_value(bid).unwrap();
        assert_eq!(encoded["burl"], "https://bill.test");
        assert_eq!(encoded["lurl"], "https://loss.test");
        assert_eq!(encoded["mtype"], 1);
        assert_eq!(encoded["exp"], 300);
    }

    #[test]
    fn null_seatbid_is_empty_seatbid() {
        let err = map_response(&request(), &ok(json!({"id": "req-1", "seatbid": null}))).unwrap_err();
        assert_eq!(err.to_string(), "empty seatbid");
    }

    #[test]
    fn null_bid_list_yields_no_bids() {
        let body = json!({"seatbid": [{"seat": "a", "bid": null}]});
        let response = map_response(&request(), &ok(body)).unwrap().unwrap();
        assert!(response.bids.is_empty());
    }

    #[test]
    fn bid_missing_price_or_impid_decodes_with_zero_values() {
        let body = json!({"seatbid": [{"bid": [
            {"id": "no-price", "impid": "video"},
            {"id": "no-impid", "price": 1.5}
        ]}]});
        let response = map_response(&request(), &ok(body)).unwrap().unwrap();
        assert_eq!(response.bids.len(), 2);
        assert_eq!(response.bids[0].bid.price, 0.0);
        assert_eq!(response.bids[0].bid_type, BidType::Video);
        assert_eq!(response.bids[1].bid.impid, "");
        assert_eq!(response.bids[1].bid_type, BidType::Banner);
    }
}
