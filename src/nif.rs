//! Angolan NIF (tax identifier) validation.
//!
//! Shape validation is local and never fails; the registry lookup is an
//! external call whose failure is folded into an invalid (not erroring)
//! result, so a flaky registry can never crash the signup form.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::registry::NifRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NifKind {
    Personal,
    Business,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NifCheck {
    pub is_valid: bool,
    pub kind: Option<NifKind>,
    pub message: String,
    pub entity_name: Option<String>,
}

impl NifCheck {
    fn invalid(kind: Option<NifKind>, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            kind,
            message: message.into(),
            entity_name: None,
        }
    }
}

/// Drop everything that is not an ASCII letter or digit.
pub fn strip(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Local shape check on an already-stripped identifier.
///
/// Personal: 9 digits, 2 uppercase letters, 3 digits (e.g. `005732018NE040`).
/// Business: 9 or 10 digits.
pub fn shape(cleaned: &str) -> Option<NifKind> {
    let bytes = cleaned.as_bytes();

    if bytes.len() == 14
        && bytes[..9].iter().all(u8::is_ascii_digit)
        && bytes[9..11].iter().all(u8::is_ascii_uppercase)
        && bytes[11..].iter().all(u8::is_ascii_digit)
    {
        return Some(NifKind::Personal);
    }

    if (bytes.len() == 9 || bytes.len() == 10) && bytes.iter().all(u8::is_ascii_digit) {
        return Some(NifKind::Business);
    }

    None
}

/// Validate a raw NIF: local shape check first, then registry confirmation.
/// The registry is only consulted when the shape matches.
pub async fn validate(registry: &dyn NifRegistry, raw: &str) -> NifCheck {
    let cleaned = strip(raw);

    let Some(kind) = shape(&cleaned) else {
        return NifCheck::invalid(None, "invalid format");
    };

    match registry.lookup(&cleaned).await {
        Ok(entry) if entry.valid => NifCheck {
            is_valid: true,
            kind: Some(kind),
            message: "NIF verified".to_string(),
            entity_name: entry.name,
        },
        Ok(_) => NifCheck::invalid(Some(kind), "NIF not found in registry"),
        Err(err) => {
            tracing::warn!(error = %err, "NIF registry lookup failed");
            NifCheck::invalid(Some(kind), "could not verify NIF, try again later")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::registry::RegistryEntry;

    struct FakeRegistry {
        calls: AtomicUsize,
        outcome: anyhow::Result<RegistryEntry>,
    }

    impl FakeRegistry {
        fn confirming(name: Option<&str>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Ok(RegistryEntry {
                    valid: true,
                    name: name.map(str::to_string),
                }),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Err(anyhow::anyhow!("connection refused")),
            }
        }
    }

    #[async_trait]
    impl NifRegistry for FakeRegistry {
        async fn lookup(&self, _nif: &str) -> anyhow::Result<RegistryEntry> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Ok(entry) => Ok(entry.clone()),
                Err(err) => Err(anyhow::anyhow!(err.to_string())),
            }
        }
    }

    #[test]
    fn strip_removes_separators() {
        assert_eq!(strip("005732018 NE 040"), "005732018NE040");
        assert_eq!(strip("5000-088-927"), "5000088927");
        assert_eq!(strip(""), "");
    }

    #[test]
    fn shapes() {
        assert_eq!(shape("005732018NE040"), Some(NifKind::Personal));
        assert_eq!(shape("5000088927"), Some(NifKind::Business));
        assert_eq!(shape("500008892"), Some(NifKind::Business));
        assert_eq!(shape("abc"), None);
        assert_eq!(shape("12345678"), None);
        // lowercase letters fail the personal shape
        assert_eq!(shape("005732018ne040"), None);
        // letters in a business-length string
        assert_eq!(shape("50000X8927"), None);
    }

    #[tokio::test]
    async fn business_nif_confirmed_by_registry() {
        let registry = FakeRegistry::confirming(Some("ANGOHOST LDA"));
        let result = validate(&registry, "5000088927").await;
        assert!(result.is_valid);
        assert_eq!(result.kind, Some(NifKind::Business));
        assert_eq!(result.entity_name.as_deref(), Some("ANGOHOST LDA"));
        assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn personal_nif_shape_matches() {
        let registry = FakeRegistry::confirming(None);
        let result = validate(&registry, "005732018NE040").await;
        assert!(result.is_valid);
        assert_eq!(result.kind, Some(NifKind::Personal));
    }

    #[tokio::test]
    async fn bad_shape_never_reaches_registry() {
        let registry = FakeRegistry::confirming(None);
        let result = validate(&registry, "abc").await;
        assert!(!result.is_valid);
        assert_eq!(result.kind, None);
        assert_eq!(result.message, "invalid format");
        assert_eq!(registry.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn registry_failure_is_invalid_not_error() {
        let registry = FakeRegistry::failing();
        let result = validate(&registry, "5000088927").await;
        assert!(!result.is_valid);
        // the locally matched kind survives a registry outage
        assert_eq!(result.kind, Some(NifKind::Business));
    }
}
