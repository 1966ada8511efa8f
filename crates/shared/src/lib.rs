//! Shared types and configuration for Rentledger.
//!
//! This crate provides common types used across all other crates:
//! - Fixed-point money and quantity types (integer cents, 5-decimal scale)
//! - Typed IDs for type-safe entity references
//! - Bearer token claims and validation
//! - Environment-driven configuration

pub mod auth;
pub mod config;
pub mod jwt;
pub mod types;

pub use config::AppConfig;
