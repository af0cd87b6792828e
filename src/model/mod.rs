pub mod adapters;
pub mod ext;
