//! Request-scoped caching
//!
//! The only cache this crate carries is the per-request memoizer. It is
//! created at the start of request handling and dropped at the end, so
//! nothing cached here can leak between requests.

pub mod request;

pub use request::RequestMemo;
