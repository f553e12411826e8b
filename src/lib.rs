//! Karibu - content and booking-analytics backend for tour marketing sites
//!
//! This library provides the read-model layer of the Karibu platform:
//! filtered, paginated content queries and concurrent dashboard aggregation.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
