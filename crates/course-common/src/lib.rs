pub mod api;
pub mod catalog;
pub mod error;
pub mod model;
pub mod redis;
pub mod retry;
