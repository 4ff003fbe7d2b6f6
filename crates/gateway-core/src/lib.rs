//! # Gateway Core
//!
//! Core types and error handling for the LLM Provider Gateway.
//!
//! This crate provides the foundational types used throughout the gateway:
//! - The request envelope and chat messages
//! - Provider descriptions and wire families
//! - Canonical and native tool declarations
//! - The canonical streaming dialect
//! - Error types and handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod provider;
pub mod request;
pub mod streaming;
pub mod tools;

// Re-export commonly used types
pub use error::{truncate_chars, GatewayError, GatewayResult};
pub use provider::{ProviderConfig, WireFamily};
pub use request::{
    ChatMessage, ContentPart, GatewayRequest, ImageUrl, MessageContent, MessageRole, RequestMode,
};
pub use streaming::{
    sse_data, CanonicalStream, ChatChunk, ChunkChoice, ChunkDelta, StreamEvent, DONE_SENTINEL,
};
pub use tools::{
    FunctionDeclaration, NativeFunctionDeclaration, NativeToolSet, ToolCallResult,
    ToolDeclaration, ToolsField,
};
