//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use std::fmt;

/// OAuth consumer key for the Tumblr v2 API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new API key with validation
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        let trimmed = key.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key cannot be empty".to_string(),
            });
        }

        if trimmed.chars().any(|c| !c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key must be alphanumeric".to_string(),
            });
        }

        if trimmed.len() < 20 {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key is too short".to_string(),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get the API key as a string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Redact API key in display
        write!(f, "{}...", &self.0[..6])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_validation() {
        assert!(ApiKey::new("").is_err());
        assert!(ApiKey::new("short").is_err());
        assert!(ApiKey::new("has spaces in the middle of it").is_err());

        let key = ApiKey::new("  abcdefghijklmnopqrstuvwxyz0123456789  ").unwrap();
        assert_eq!(key.as_str(), "abcdefghijklmnopqrstuvwxyz0123456789");
        assert_eq!(key.to_string(), "abcdef...");
    }
}
