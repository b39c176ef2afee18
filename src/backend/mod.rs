//! Submission backends: the two interchangeable strategies for delivering
//! credentials to the portal. Neither backend judges success from what the
//! portal sends back; the resolver re-probes connectivity after each submit.

pub mod browser;
pub mod http;

use crate::config::{Credentials, FieldPair};

/// Which submission strategy to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendKind {
    /// Direct form-encoded POSTs against the portal URL and its variants
    Http,
    /// WebDriver-driven browser session filling the real login form
    Browser,
}

/// Errors a submission backend can surface. These are all transient from the
/// resolver's point of view: a failed submit moves on to the next catalog
/// entry, never up to the caller.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("portal request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("browser action failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),
    #[error("{0}")]
    Other(String),
}

/// A strategy for submitting one guessed field-name pair to the portal.
#[allow(async_fn_in_trait)]
pub trait SubmitBackend {
    /// Called once before an attempt sequence. The HTTP backend uses this to
    /// acquire portal session cookies; the browser backend has nothing to do.
    async fn prepare(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    /// Deliver credentials under the given field names. `Ok` means the
    /// submission was handed to the portal, not that login worked.
    async fn submit(
        &mut self,
        pair: &FieldPair,
        credentials: &Credentials,
    ) -> Result<(), BackendError>;
}
