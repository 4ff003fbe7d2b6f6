//! # Gateway Routing
//!
//! Request routing for the LLM Provider Gateway.
//!
//! This crate provides:
//! - Chat mode: a canonical SSE stream from any provider
//! - Tool-call mode: one structured decision with translated tool schemas
//! - The single-attempt upstream HTTP call driven by the retry executor

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod router;
pub mod upstream;

// Re-export main types
pub use router::{
    translate_tools, ChatOutcome, RequestRouter, RouteOutcome, RouterSettings, ToolOutcome,
    DEFAULT_IDLE_TIMEOUT,
};
pub use upstream::UpstreamAuth;
