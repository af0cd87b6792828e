// src/bidding/builder.rs

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AdapterError;
use crate::model::adapters::RequestData;
use crate::model::ext::{imp_ids, parse_imp_ext, UpstreamExt};
use crate::openrtb::request::{BidRequest, Device, Imp};

pub const X_OPENRTB_VERSION: HeaderName = HeaderName::from_static("x-openrtb-version");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// 生成上游可见的 imp.ext
///
/// bid 非零时只保留 `{ "mocktioneer": { "bid": n } }`，其它情况一律清空，
/// 上游永远看不到原始的 bidder 参数。
fn upstream_imp_ext(imp: &Imp) -> Option<Value> {
    let ext = match parse_imp_ext(imp) {
        Ok(ext) => ext,
        Err(e) => {
            debug!(imp_id = %imp.id, error = %e, "ignoring imp ext");
            return None;
        }
    };
    if ext.bid == 0.0 {
        return None;
    }
    match serde_json::to_value(UpstreamExt::passthrough(ext.bid)) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(imp_id = %imp.id, error = %e, "dropping unencodable bid passthrough");
            None
        }
    }
}

/// 返回改写过 ext 的 imp 副本，顺序与 id 保持不变
pub fn rewrite_imps(imps: &[Imp]) -> Vec<Imp> {
    imps.iter()
        .map(|imp| Imp {
            ext: upstream_imp_ext(imp),
            ..imp.clone()
        })
        .collect()
}

/// 固定请求头 + 从 device 派生的 User-Agent / X-Forwarded-For
pub fn make_headers(device: Option<&Device>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json;charset=utf-8"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(X_OPENRTB_VERSION, HeaderValue::from_static("2.5"));

    let Some(device) = device else {
        return headers;
    };
    if let Some(ua) = device.ua.as_deref().filter(|ua| !ua.is_empty()) {
        match HeaderValue::from_str(ua) {
            Ok(value) => {
                headers.insert(USER_AGENT, value);
            }
            Err(_) => warn!("skipping device.ua: not a valid header value"),
        }
    }
    // ipv6 在前、ipv4 在后，两者都存在时同名头出现两次
    for ip in [device.ipv6.as_deref(), device.ip.as_deref()].into_iter().flatten() {
        if ip.is_empty() {
            continue;
        }
        match HeaderValue::from_str(ip) {
            Ok(value) => {
                headers.append(X_FORWARDED_FOR, value);
            }
            Err(_) => warn!(ip, "skipping device ip: not a valid header value"),
        }
    }
    headers
}

/// 序列化改写后的请求，打包成一次 POST
pub fn build_request_data(endpoint: String, request: &BidRequest) -> Result<RequestData, AdapterError> {
    let upstream_request = BidRequest {
        imp: rewrite_imps(&request.imp),
        ..request.clone()
    };
    let body = serde_json::to_vec(&upstream_request)?;

    Ok(RequestData {
        method: Method::POST,
        uri: endpoint,
        body,
        headers: make_headers(upstream_request.device.as_ref()),
        imp_ids: imp_ids(&upstream_request.imp),
    })
}
