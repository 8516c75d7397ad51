//! analytics-ingest - Mobile app analytics ingestion service
//!
//! Accepts sessions, event batches and error reports from mobile clients,
//! validates them, enriches sessions with IP geolocation and persists them
//! to a relational store.
//!
//! # Architecture
//! - `api`: HTTP routing, middleware and handlers
//! - `services`: payload validation and geolocation
//! - `storage`: the `AnalyticsStore` trait and its SeaORM backend
//! - `config`: configuration management
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
