pub mod rate_limit_store;
