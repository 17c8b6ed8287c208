pub mod currency;
pub mod server;
