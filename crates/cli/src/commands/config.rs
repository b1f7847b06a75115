//! Configuration validation command.
//!
//! # Usage
//!
//! ```bash
//! pharma-cli config check
//! ```
//!
//! # Environment Variables
//!
//! - `PHARMA_PROJECT_ID` - Backend project identifier
//! - `PHARMA_API_KEY` - Client API key for the hosted backend
//! - `PHARMA_AUTH_DOMAIN` - Hosted sign-in domain (optional)

use pharma_direct_auth::config::{ConfigError, ProjectConfig};

/// Load and validate deployment configuration, reporting what was
/// found. Nothing is connected to; this only proves the environment
/// would satisfy a hosted-backend adapter.
///
/// # Errors
///
/// Returns [`ConfigError`] if a variable is missing, invalid, or fails
/// secret validation.
pub fn check() -> Result<(), ConfigError> {
    let config = ProjectConfig::from_env()?;

    tracing::info!("Configuration OK");
    tracing::info!("  project id:  {}", config.project_id);
    tracing::info!(
        "  auth domain: {}",
        config.auth_domain.as_deref().unwrap_or("(not set)")
    );
    tracing::info!("  api key:     [REDACTED]");
    Ok(())
}
