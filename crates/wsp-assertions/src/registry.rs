//! The default registry: core mappings plus the reference catalogue.

use std::sync::{Arc, OnceLock};

use wsp_core::{Result, TypeMapping, TypeMappingRegistry, WspError};

use crate::{alert, compat, credentials, custom, logic, routing, threat};

static DEFAULT_REGISTRY: OnceLock<std::result::Result<TypeMappingRegistry, String>> =
    OnceLock::new();

/// Returns the process-wide registry, building it on first use.
///
/// # Errors
///
/// Returns a configuration error if the catalogue failed validation. The
/// failure is cached; later calls report the same message.
pub fn default_registry() -> Result<&'static TypeMappingRegistry> {
    DEFAULT_REGISTRY
        .get_or_init(|| build_default_registry().map_err(|err| err.to_string()))
        .as_ref()
        .map_err(|message| WspError::Configuration {
            message: message.clone(),
        })
}

/// Builds a fresh registry holding every catalogue mapping.
///
/// Callers that register extension finders of their own should build a
/// private registry rather than mutate the shared one.
pub fn build_default_registry() -> Result<TypeMappingRegistry> {
    let x509: Arc<dyn TypeMapping> = Arc::new(credentials::require_x509_mapping());
    TypeMappingRegistry::builder()
        .mappings(logic::mappings())
        .mappings(credentials::mappings(Arc::clone(&x509)))
        .mappings(routing::mappings())
        .mappings(alert::mappings())
        .mappings(threat::mappings())
        .mappings(custom::mappings()?)
        .legacy_mappings(compat::legacy_mappings(x509))
        .finder(custom::extension_finder()?)
        .build()
}

#[cfg(test)]
mod tests {
    use wsp_core::TypeMappingFinder;

    use super::*;

    #[test]
    fn test_default_registry_is_shared() {
        let first = default_registry().expect("registry");
        let second = default_registry().expect("registry");
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_catalogue_names_are_registered() {
        let registry = build_default_registry().expect("registry");
        for name in [
            "TrueAssertion",
            "WssBasic",
            "RequireWssX509Cert",
            "HttpRoutingAssertion",
            "EmailAlert",
            "SqlAttackProtection",
            "CustomAssertion",
        ] {
            assert!(
                registry.primary().by_external_name(name).is_some(),
                "missing {name}"
            );
        }
        assert!(registry.legacy().by_external_name("SecurityToken").is_some());
        assert!(
            registry
                .legacy()
                .by_external_name("RequestWssX509Cert")
                .is_some()
        );
        assert!(registry.primary().by_external_name("SecurityToken").is_none());
    }

    #[test]
    fn test_extension_payload_is_found_by_name() {
        let registry = build_default_registry().expect("registry");
        assert!(registry.primary().by_external_name("ClientIpCustomAssertion").is_none());
        assert!(
            registry
                .resolve_by_name("ClientIpCustomAssertion", &[])
                .is_some()
        );
    }
}
