pub mod market_cache;
