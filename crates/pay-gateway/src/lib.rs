//! # pay-gateway
//!
//! HTTP implementation of `pay_core::PaymentGateway` for the church
//! payment REST API.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_gateway::HttpGateway;
//! use pay_core::PaymentGateway;
//!
//! // Create gateway from environment
//! let gateway = HttpGateway::from_env()?;
//!
//! // Send a built intent
//! let redirect = gateway.initiate(&intent).await?;
//!
//! // Navigate the payer to redirect.checkout_url
//! ```
//!
//! ## Wire format
//!
//! Every endpoint answers `{ "status": bool, "data": {...}, "message": "..." }`.
//! Initiation returns `data.checkoutUrl`; status lookups return
//! `data.status`.

pub mod client;
pub mod config;

// Re-exports
pub use client::HttpGateway;
pub use config::GatewayConfig;
