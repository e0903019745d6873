//! visitrack - Visitor geolocation tracker
//!
//! This library resolves a visitor's location through an ordered chain of
//! public IP lookup APIs, merges it with visitor context and reports the
//! result to a logging sink. It also ships the sink itself: a small HTTP
//! server that appends records to a CSV sheet.
//!
//! # Features
//! - **server**: logging sink HTTP server (default)
//! - **cli**: Command-line interface (default)
//!
//! # Architecture
//! - `services::geoip`: provider chain, response parsers, HTTP transport
//! - `analytics`: visitor records, reporter and sinks
//! - `storage`: CSV visitor sheet and statistics
//! - `api`: HTTP handlers of the sink server
//! - `interfaces`: CLI commands
//! - `config`: Configuration management
//! - `runtime`: execution modes
//! - `system`: logging

pub mod analytics;
#[cfg(feature = "server")]
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
