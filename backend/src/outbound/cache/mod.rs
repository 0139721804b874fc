//! Cache adapters.

mod redis_stock_cache;

pub use redis_stock_cache::RedisStockCache;
