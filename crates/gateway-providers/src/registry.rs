//! Provider registry.
//!
//! Built once at startup and never mutated afterwards, so concurrent requests
//! read it without synchronisation.

use gateway_core::{GatewayError, GatewayResult, ProviderConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Immutable table of logical model id to provider description
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<ProviderConfig>>,
    index: HashMap<String, usize>,
    default_index: usize,
}

impl ProviderRegistry {
    /// Build a registry
    ///
    /// # Errors
    /// Returns a configuration error if the table is empty, contains a
    /// duplicate logical id, or does not contain `default_id`.
    pub fn new(providers: Vec<ProviderConfig>, default_id: &str) -> GatewayResult<Self> {
        if providers.is_empty() {
            return Err(GatewayError::configuration("provider registry is empty"));
        }

        let mut index = HashMap::with_capacity(providers.len());
        for (position, provider) in providers.iter().enumerate() {
            if provider.id.trim().is_empty() {
                return Err(GatewayError::configuration("provider id cannot be empty"));
            }
            if index.insert(provider.id.clone(), position).is_some() {
                return Err(GatewayError::configuration(format!(
                    "duplicate provider id '{}'",
                    provider.id
                )));
            }
        }

        let default_index = *index.get(default_id).ok_or_else(|| {
            GatewayError::configuration(format!(
                "default model '{default_id}' is not a registered provider"
            ))
        })?;

        Ok(Self {
            providers: providers.into_iter().map(Arc::new).collect(),
            index,
            default_index,
        })
    }

    /// Resolve a logical model identifier; `None` selects the default
    ///
    /// # Errors
    /// Returns `UnknownProvider` if a named model is not registered
    pub fn resolve(&self, model: Option<&str>) -> GatewayResult<Arc<ProviderConfig>> {
        match model {
            None => Ok(self.default_provider()),
            Some(id) => {
                let provider = self
                    .get(id)
                    .ok_or_else(|| GatewayError::unknown_provider(id))?;
                debug!(model = %id, wire_family = %provider.wire_family, "Resolved provider");
                Ok(provider)
            }
        }
    }

    /// Get a provider by logical id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<ProviderConfig>> {
        self.index
            .get(id)
            .and_then(|&position| self.providers.get(position))
            .cloned()
    }

    /// The configured default provider
    #[must_use]
    pub fn default_provider(&self) -> Arc<ProviderConfig> {
        Arc::clone(&self.providers[self.default_index])
    }

    /// Logical id of the default provider
    #[must_use]
    pub fn default_id(&self) -> &str {
        &self.providers[self.default_index].id
    }

    /// All providers in registration order
    pub fn providers(&self) -> impl Iterator<Item = &Arc<ProviderConfig>> {
        self.providers.iter()
    }

    /// Number of registered providers
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty (never true for a constructed registry)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::WireFamily;

    fn providers() -> Vec<ProviderConfig> {
        vec![
            ProviderConfig::new(
                "gemini-flash",
                "https://generativelanguage.googleapis.com/v1beta",
                WireFamily::GenerateContent,
                "gemini-2.0-flash",
                "GEMINI_API_KEY",
            ),
            ProviderConfig::new(
                "gpt-4o-mini",
                "https://api.openai.com/v1/chat/completions",
                WireFamily::ChatCompletions,
                "gpt-4o-mini",
                "OPENAI_API_KEY",
            ),
        ]
    }

    #[test]
    fn test_resolve_default_when_absent() {
        let registry = ProviderRegistry::new(providers(), "gemini-flash").expect("valid");
        let provider = registry.resolve(None).expect("default");
        assert_eq!(provider.id, "gemini-flash");
        assert_eq!(registry.default_id(), "gemini-flash");
    }

    #[test]
    fn test_resolve_named() {
        let registry = ProviderRegistry::new(providers(), "gemini-flash").expect("valid");
        let provider = registry.resolve(Some("gpt-4o-mini")).expect("named");
        assert_eq!(provider.wire_family, WireFamily::ChatCompletions);
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = ProviderRegistry::new(providers(), "gemini-flash").expect("valid");
        let err = registry.resolve(Some("claude-9")).expect_err("unknown");
        assert_eq!(err, GatewayError::unknown_provider("claude-9"));
    }

    #[test]
    fn test_default_must_exist() {
        let err = ProviderRegistry::new(providers(), "missing").expect_err("invalid default");
        assert!(matches!(err, GatewayError::Configuration { .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut table = providers();
        table.push(table[0].clone());
        assert!(ProviderRegistry::new(table, "gemini-flash").is_err());
    }

    #[test]
    fn test_empty_registry_rejected() {
        assert!(ProviderRegistry::new(Vec::new(), "gemini-flash").is_err());
    }

    #[test]
    fn test_registration_order_preserved() {
        let registry = ProviderRegistry::new(providers(), "gpt-4o-mini").expect("valid");
        let ids: Vec<_> = registry.providers().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["gemini-flash", "gpt-4o-mini"]);
        assert_eq!(registry.len(), 2);
    }
}
