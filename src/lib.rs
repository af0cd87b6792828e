//! Mocktioneer 竞价适配器
//!
//! 把通用的 OpenRTB 竞价请求转换成 Mocktioneer 上游的请求格式，
//! 并把上游响应映射回带媒体类型的出价。
//!
//! - [`bidding::endpoint`]: endpoint 模板与解析顺序
//! - [`bidding::builder`]: imp.ext 改写、请求头、请求体
//! - [`bidding::bids`]: 状态码判定与出价映射
//! - [`bidding::adapter`]: 实现 [`model::adapters::Bidder`] 的适配器
//! - [`mock_upstream`]: 本地 mock 上游，用于 demo 和集成测试

use std::sync::Arc;

pub mod api;
pub mod bidding;
pub mod config;
pub mod error;
pub mod logging;
pub mod mock_upstream;
pub mod model;
pub mod openrtb;

use bidding::transport::UpstreamClient;
use model::adapters::Bidder;

pub use bidding::adapter::MocktioneerAdapter;
pub use error::AdapterError;

/// demo 服务共享状态
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<dyn Bidder>,
    pub client: UpstreamClient,
}
