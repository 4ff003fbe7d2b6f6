//! # Gateway Server
//!
//! HTTP surface of the LLM provider gateway.
//!
//! This crate provides:
//! - The envelope endpoint (`POST /v1/chat/completions`)
//! - Tool catalog and model listing endpoints
//! - Health and Prometheus metrics endpoints
//! - Request-id propagation, request logging and CORS
//! - Graceful shutdown on SIGINT/SIGTERM

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

pub use error::{ApiError, ServerError};
pub use routes::create_router;
pub use server::{serve, Server};
pub use shutdown::shutdown_signal;
pub use state::AppState;
