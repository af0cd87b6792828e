pub mod adapter;
pub mod bids;
pub mod builder;
pub mod endpoint;
pub mod engine;
pub mod transport;
