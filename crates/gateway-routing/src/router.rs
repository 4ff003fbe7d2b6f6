//! Request router.
//!
//! Resolves the provider, shapes the request for its wire family, invokes it
//! through the retry executor and returns either a canonical stream (chat
//! mode) or the raw structured decision (tool-call mode). Every caller-side
//! check happens before the first network call.

use crate::upstream::{send_once, UpstreamAuth};
use gateway_core::{
    CanonicalStream, GatewayError, GatewayRequest, GatewayResult, ProviderConfig, RequestMode,
    ToolCallResult, ToolsField, WireFamily,
};
use gateway_providers::{
    google, interpret_decision, openai, passthrough, require_credential, to_provider_schema,
    transcode_generate_content, CredentialSource, GenerationSettings, ProviderRegistry,
    ProviderTools,
};
use gateway_resilience::{AttemptError, RetryPolicy};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default idle limit between upstream stream chunks
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Router tuning
#[derive(Debug, Clone, PartialEq)]
pub struct RouterSettings {
    /// Request shaping parameters
    pub generation: GenerationSettings,
    /// Idle limit between stream chunks; `None` waits forever
    pub idle_timeout: Option<Duration>,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
        }
    }
}

/// Result of a chat-mode request
pub struct ChatOutcome {
    /// Provider that served the request
    pub provider: Arc<ProviderConfig>,
    /// Canonical SSE bytes, ending with the `[DONE]` sentinel
    pub stream: CanonicalStream,
}

impl fmt::Debug for ChatOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatOutcome")
            .field("provider", &self.provider.id)
            .finish_non_exhaustive()
    }
}

/// Result of a tool-call-mode request
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    /// Provider that served the request
    pub provider: Arc<ProviderConfig>,
    /// Unmodified upstream response
    pub decision: Value,
}

impl ToolOutcome {
    /// Interpret the raw decision for logging
    #[must_use]
    pub fn interpretation(&self) -> Option<ToolCallResult> {
        interpret_decision(self.provider.wire_family, &self.decision)
    }
}

/// Outcome of [`RequestRouter::route`]
#[derive(Debug)]
pub enum RouteOutcome {
    /// Streaming answer
    Chat(ChatOutcome),
    /// Structured decision
    Tool(ToolOutcome),
}

/// Dispatches gateway requests to upstream providers
#[derive(Debug, Clone)]
pub struct RequestRouter {
    registry: Arc<ProviderRegistry>,
    credentials: Arc<dyn CredentialSource>,
    client: reqwest::Client,
    retry: RetryPolicy,
    settings: RouterSettings,
}

impl RequestRouter {
    /// Create a router with its own HTTP client
    ///
    /// # Errors
    /// Returns an internal error if the HTTP client cannot be built
    pub fn new(
        registry: Arc<ProviderRegistry>,
        credentials: Arc<dyn CredentialSource>,
        retry: RetryPolicy,
        settings: RouterSettings,
    ) -> GatewayResult<Self> {
        // No overall timeout: streams stay open as long as chunks keep coming
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| GatewayError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(registry, credentials, client, retry, settings))
    }

    /// Create a router around an existing HTTP client
    #[must_use]
    pub fn with_client(
        registry: Arc<ProviderRegistry>,
        credentials: Arc<dyn CredentialSource>,
        client: reqwest::Client,
        retry: RetryPolicy,
        settings: RouterSettings,
    ) -> Self {
        Self {
            registry,
            credentials,
            client,
            retry,
            settings,
        }
    }

    /// The provider registry
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Route a request according to its mode
    ///
    /// # Errors
    /// See [`Self::chat`] and [`Self::tool`]
    pub async fn route(&self, request: &GatewayRequest) -> GatewayResult<RouteOutcome> {
        match request.request_mode() {
            RequestMode::Chat => self.chat(request).await.map(RouteOutcome::Chat),
            RequestMode::Tool => self.tool(request).await.map(RouteOutcome::Tool),
        }
    }

    /// Chat mode: stream free text in the canonical dialect
    ///
    /// # Errors
    /// `Validation`, `UnknownProvider` and `MissingCredential` fail before any
    /// upstream call; `UpstreamExhausted` after the retry budget is spent.
    #[instrument(skip(self, request), fields(mode = "chat", model = request.requested_model()))]
    pub async fn chat(&self, request: &GatewayRequest) -> GatewayResult<ChatOutcome> {
        request.validate()?;
        let provider = self.registry.resolve(request.requested_model())?;
        let auth = self.auth_for(&provider)?;

        let (url, payload) = match provider.wire_family {
            WireFamily::GenerateContent => (
                google::stream_endpoint(&provider),
                to_payload(&google::chat_request(request, &self.settings.generation))?,
            ),
            WireFamily::ChatCompletions => (
                provider.url.clone(),
                to_payload(&openai::chat_request(&provider, request, &self.settings.generation))?,
            ),
        };

        debug!(provider = %provider.id, url = %url, "Opening upstream stream");
        let (client, url, auth, payload) = (&self.client, url.as_str(), &auth, &payload);
        let response = self
            .retry
            .execute(|| send_once(client, url, auth, payload))
            .await?;

        let upstream = response.bytes_stream();
        let idle_timeout = self.settings.idle_timeout;
        let stream = if provider.wire_family.needs_transcoding() {
            transcode_generate_content(upstream, idle_timeout)
        } else {
            passthrough(upstream, idle_timeout)
        };

        info!(provider = %provider.id, wire_family = %provider.wire_family, "Streaming response");
        Ok(ChatOutcome { provider, stream })
    }

    /// Tool-call mode: one structured decision, returned unmodified
    ///
    /// # Errors
    /// `Validation` for an absent, empty or undecodable tool list, a declaration that breaks the
    /// strict contract, or a native wrapper sent to a chat-completions
    /// provider; otherwise as [`Self::chat`].
    #[instrument(skip(self, request), fields(mode = "tool", model = request.requested_model()))]
    pub async fn tool(&self, request: &GatewayRequest) -> GatewayResult<ToolOutcome> {
        request.validate()?;
        let tools = request.tool_declarations()?;

        let provider = self.registry.resolve(request.requested_model())?;
        let provider_tools = translate_tools(&tools, provider.wire_family)?;
        let auth = self.auth_for(&provider)?;
        let generation = &self.settings.generation;

        let (url, payload) = match provider_tools {
            ProviderTools::GenerateContent(set) => (
                google::generate_endpoint(&provider),
                to_payload(&google::tool_request(request, set, generation))?,
            ),
            ProviderTools::ChatCompletions(list) => (
                provider.url.clone(),
                to_payload(&openai::tool_request(&provider, request, list, generation))?,
            ),
        };

        debug!(provider = %provider.id, tools = tools.len(), "Requesting tool decision");
        let (client, url, auth, payload) = (&self.client, url.as_str(), &auth, &payload);
        let decision = self
            .retry
            .execute(|| async move {
                let response = send_once(client, url, auth, payload).await?;
                response
                    .json::<Value>()
                    .await
                    .map_err(|e| AttemptError::Transport(format!("invalid response body: {e}")))
            })
            .await?;

        Ok(ToolOutcome { provider, decision })
    }

    fn auth_for(&self, provider: &ProviderConfig) -> GatewayResult<UpstreamAuth> {
        let key = require_credential(self.credentials.as_ref(), provider)?;
        Ok(match provider.wire_family {
            WireFamily::ChatCompletions => UpstreamAuth::Bearer(key),
            WireFamily::GenerateContent => UpstreamAuth::Header {
                name: google::API_KEY_HEADER,
                key,
            },
        })
    }
}

/// Translate the envelope's tools for a wire family
///
/// # Errors
/// Returns `Validation` if a canonical declaration breaks the strict contract
/// or a native wrapper targets a chat-completions provider
pub fn translate_tools(tools: &ToolsField, family: WireFamily) -> GatewayResult<ProviderTools> {
    match (tools, family) {
        (ToolsField::Canonical(list), _) => {
            for tool in list {
                tool.validate()?;
            }
            Ok(to_provider_schema(list, family))
        }
        (ToolsField::Native(set), WireFamily::GenerateContent) => {
            Ok(ProviderTools::GenerateContent(set.clone()))
        }
        (ToolsField::Native(_), WireFamily::ChatCompletions) => Err(GatewayError::validation(
            "native functionDeclarations wrapper is only accepted for generate-content providers",
            Some("tools"),
        )),
    }
}

fn to_payload<B: serde::Serialize>(body: &B) -> GatewayResult<Value> {
    serde_json::to_value(body)
        .map_err(|e| GatewayError::internal(format!("Failed to encode upstream request: {e}")))
}
