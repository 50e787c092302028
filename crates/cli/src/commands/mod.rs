//! CLI command implementations.
//!
//! Commands write their output to stdout; logs go to stderr.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod search;

use std::io;

use thiserror::Error;
use tienda_storefront::error::AppError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Storefront operation failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

impl CommandError {
    /// Capture to Sentry where appropriate.
    pub fn report(&self) {
        match self {
            Self::App(e) => e.report(),
            Self::Io(e) => tracing::debug!(error = %e, "Output closed"),
        }
    }

    /// Message safe to show to a shopper.
    pub fn user_message(&self) -> String {
        match self {
            Self::App(e) => e.user_message(),
            Self::Io(e) => e.to_string(),
        }
    }
}

impl From<tienda_storefront::cms::CmsError> for CommandError {
    fn from(err: tienda_storefront::cms::CmsError) -> Self {
        Self::App(err.into())
    }
}

impl From<tienda_storefront::catalog::CatalogError> for CommandError {
    fn from(err: tienda_storefront::catalog::CatalogError) -> Self {
        Self::App(err.into())
    }
}
