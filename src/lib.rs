pub mod concurrency;
pub mod config;
pub mod handlers;
pub mod http;
