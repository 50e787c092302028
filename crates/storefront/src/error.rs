//! Unified error handling with Sentry integration.
//!
//! Module errors roll up into [`AppError`]. Front ends call
//! [`AppError::report`] before showing a failure so server-class errors
//! reach Sentry; user-facing text comes from [`AppError::user_message`],
//! which never exposes internal details.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::cms::CmsError;
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog read failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CmsError> for AppError {
    fn from(err: CmsError) -> Self {
        Self::Catalog(CatalogError::Cms(err))
    }
}

impl AppError {
    /// Whether this error indicates a fault on our side or upstream, rather
    /// than bad input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Catalog(err) => err.is_transient(),
            Self::Config(_) | Self::Internal(_) => true,
            Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    /// Capture server-class errors to Sentry and log them.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Client error");
        }
    }

    /// Message safe to show to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::MissingUserId) => "User ID is required".to_string(),
            Self::Catalog(_) => "External service error".to_string(),
            Self::Config(_) | Self::Internal(_) => "Internal error".to_string(),
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
        }
    }
}

/// Set the Sentry user context from a user ID.
///
/// Call this once the shopper is known so errors are associated with them.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
