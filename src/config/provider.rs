//! Billing provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Billing provider credentials and checkout redirects
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    /// Provider API key
    pub api_key: SecretString,

    /// Webhook signing secret
    pub webhook_secret: SecretString,

    /// Where customers land after a completed checkout
    pub success_url: String,

    /// Where customers land after abandoning checkout
    pub cancel_url: String,
}

impl ProviderConfig {
    /// Validate provider configuration
    ///
    /// Production deployments must redirect over HTTPS.
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("PROVIDER__API_KEY"));
        }
        if self.webhook_secret.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("PROVIDER__WEBHOOK_SECRET"));
        }
        validate_redirect("success_url", &self.success_url, production)?;
        validate_redirect("cancel_url", &self.cancel_url, production)?;
        Ok(())
    }
}

fn validate_redirect(
    name: &'static str,
    url: &str,
    production: bool,
) -> Result<(), ValidationError> {
    let is_https = url.starts_with("https://");
    if !is_https && !url.starts_with("http://") {
        return Err(ValidationError::InvalidRedirectUrl(name));
    }
    if production && !is_https {
        return Err(ValidationError::RedirectMustBeHttps(name));
    }
    Ok(())
}
