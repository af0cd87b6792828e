// src/mock_upstream.rs

use axum::{http::StatusCode, routing::post, serve, Json, Router};
use rand::Rng;
use tokio::net::TcpListener;
use tracing::info;
use uuid::Uuid;

use crate::model::ext::{UpstreamExt, BIDDER_NAME};
use crate::openrtb::request::{BidRequest, Imp};
use crate::openrtb::response::{Bid, BidResponse, SeatBid};

/// 上游竞价接口路径
pub const AUCTION_PATH: &str = "/openrtb2/auction";

/// imp.ext.mocktioneer.bid 存在时原样作为出价，否则随机生成
fn price_for_imp(imp: &Imp) -> f64 {
    imp.ext
        .as_ref()
        .and_then(|ext| serde_json::from_value::<UpstreamExt>(ext.clone()).ok())
        .map(|ext| ext.mocktioneer.bid)
        .unwrap_or_else(|| rand::thread_rng().gen_range(0.5..2.5))
}

/// 根据 imp 类型生成创意：video 返回 VAST，native 返回 JSON，其余返回 HTML
fn creative_for_imp(imp: &Imp, bid_id: &str) -> String {
    if imp.video.is_some() {
        format!(
            r#"<VAST version="3.0">
  <Ad id="{bid_id}">
    <InLine>
      <AdSystem>Mocktioneer</AdSystem>
      <AdTitle>Mocktioneer Video Ad</AdTitle>
      <Impression><![CDATA[https://mocktioneer.test/pixel?bid={bid_id}]]></Impression>
      <Creatives>
        <Creative>
          <Linear>
            <Duration>00:00:30</Duration>
            <MediaFiles>
              <MediaFile delivery="progressive" type="video/mp4" width="640" height="360">
                https://mocktioneer.test/video.mp4
              </MediaFile>
            </MediaFiles>
          </Linear>
        </Creative>
      </Creatives>
    </InLine>
  </Ad>
</VAST>"#,
            bid_id = bid_id
        )
    } else if imp.native.is_some() {
        format!(
            r#"{{"native":{{"assets":[{{"title":{{"text":"Mocktioneer Native Ad"}}}},{{"img":{{"url":"https://mocktioneer.test/native.jpg"}}}}],"imptrackers":["https://mocktioneer.test/pixel?bid={bid_id}"]}}}}"#,
            bid_id = bid_id
        )
    } else {
        let (w, h) = banner_size(imp);
        format!(
            "<html><body><div style=\"width:{w}px;height:{h}px\">Mocktioneer {w}x{h}</div><img src=\"https://mocktioneer.test/pixel?bid={bid_id}\" style=\"display:none;\" /></body></html>",
            w = w,
            h = h,
            bid_id = bid_id
        )
    }
}

fn banner_size(imp: &Imp) -> (i32, i32) {
    let Some(banner) = &imp.banner else {
        return (300, 250);
    };
    if let (Some(w), Some(h)) = (banner.w, banner.h) {
        return (w, h);
    }
    banner
        .format
        .as_ref()
        .and_then(|formats| formats.first())
        .map(|f| (f.w, f.h))
        .unwrap_or((300, 250))
}

/// 模拟上游竞价：每个 imp 一个出价，没有 imp 时返回 204
async fn handle_auction(Json(request): Json<BidRequest>) -> Result<Json<BidResponse>, StatusCode> {
    info!(
        "Mocktioneer received BidRequest: id={}, imp_count={}",
        request.id,
        request.imp.len()
    );
    if request.imp.is_empty() {
        return Err(StatusCode::NO_CONTENT);
    }

    let bids = request
        .imp
        .iter()
        .map(|imp| {
            let bid_id = Uuid::new_v4().to_string();
            let (w, h) = if imp.video.is_some() || imp.native.is_some() {
                (None, None)
            } else {
                let (w, h) = banner_size(imp);
                (Some(w), Some(h))
            };
            Bid {
                adm: Some(creative_for_imp(imp, &bid_id)),
                id: bid_id,
                impid: imp.id.clone(),
                price: price_for_imp(imp),
                crid: Some(format!("{}-{}", BIDDER_NAME, imp.id)),
                adomain: Some(vec!["mocktioneer.test".to_string()]),
                w,
                h,
                ..Default::default()
            }
        })
        .collect();

    Ok(Json(BidResponse {
        id: request.id.clone(),
        seatbid: vec![SeatBid {
            bid: bids,
            seat: Some(BIDDER_NAME.to_string()),
            group: Some(0),
            ..Default::default()
        }],
        cur: Some("USD".to_string()),
        ..Default::default()
    }))
}

pub fn router() -> Router {
    Router::new().route(AUCTION_PATH, post(handle_auction))
}

/// 在给定 listener 上启动 mock 上游服务
pub async fn serve_mock_upstream(listener: TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Mocktioneer mock upstream running at http://{}{}", addr, AUCTION_PATH);
    }
    serve(listener, router()).await
}
