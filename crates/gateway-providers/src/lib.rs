//! # Gateway Providers
//!
//! Everything that knows about upstream providers:
//! - The immutable provider registry and per-request credential lookup
//! - Tool schema translation and the fixed tool catalog
//! - Request shaping for the chat-completions and generate-content families
//! - The streaming transcoder and tool-decision interpretation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod credentials;
pub mod decision;
pub mod generation;
pub mod google;
pub mod openai;
pub mod registry;
pub mod tool_schema;
pub mod transcoder;

// Re-export main types
pub use catalog::{native_tool_catalog, tool_catalog};
pub use credentials::{require_credential, CredentialSource, EnvCredentials, StaticCredentials};
pub use decision::interpret_decision;
pub use generation::GenerationSettings;
pub use registry::ProviderRegistry;
pub use tool_schema::{to_native_tool_set, to_provider_schema, ProviderTools};
pub use transcoder::{passthrough, transcode_generate_content, TranscodeSkip};
