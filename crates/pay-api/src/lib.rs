//! # pay-api
//!
//! HTTP layer for sanctuary-pay.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Server-rendered payments page with return-marker reconciliation
//! - JSON endpoints for initiation and status lookup
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/payments` | Payment form, consumes `?payment=` |
//! | POST | `/payments` | Form submit |
//! | POST | `/api/v1/payments` | Initiate payment |
//! | GET | `/api/v1/payments/{reference}` | Transaction status |

pub mod handlers;
pub mod pages;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, LogFormat, PaymentSettings};
