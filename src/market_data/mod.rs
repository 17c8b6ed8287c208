pub mod fetcher;
pub mod refresher;
pub mod types;
