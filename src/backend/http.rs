use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use crate::backend::{BackendError, SubmitBackend};
use crate::config::{Credentials, FieldPair, PortalEndpoint};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Direct HTTP submission: form-encoded POSTs against the login URL and its
/// derived path variants, with a cookie store for portal session cookies.
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: PortalEndpoint,
}

impl HttpBackend {
    pub fn new(endpoint: PortalEndpoint) -> Result<Self> {
        // Captive portals routinely present self-signed or mismatched
        // certificates for their gateway address, so certificate validation
        // is disabled for this client. This is a deliberate trust reduction
        // scoped to the portal backend; the connectivity probe validates
        // normally.
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

impl SubmitBackend for HttpBackend {
    /// GET the login page once per attempt sequence so the cookie store
    /// picks up any portal session cookies.
    async fn prepare(&mut self) -> Result<(), BackendError> {
        let url = self.endpoint.login_url.clone();
        match self.client.get(url.clone()).send().await {
            Ok(response) => {
                debug!("Login page {} answered {}", url, response.status());
                Ok(())
            }
            Err(e) => Err(BackendError::Http(e)),
        }
    }

    /// POST the pair to each URL variant in order, stopping at the first
    /// variant that accepts the request. The response body is never
    /// inspected; the resolver's follow-up probe decides success.
    async fn submit(
        &mut self,
        pair: &FieldPair,
        credentials: &Credentials,
    ) -> Result<(), BackendError> {
        let form = [
            (pair.username_key.as_str(), credentials.username.as_str()),
            (pair.password_key.as_str(), credentials.password.as_str()),
        ];

        let mut last_error: Option<BackendError> = None;
        let mut delivered = false;
        for url in self.endpoint.url_variants() {
            match self.client.post(url.clone()).form(&form).send().await {
                Ok(response) => {
                    debug!("POST {} with fields {} answered {}", url, pair, response.status());
                    if response.status().is_success() {
                        return Ok(());
                    }
                    delivered = true;
                }
                Err(e) => {
                    warn!("POST {} failed: {}", url, e);
                    last_error = Some(BackendError::Http(e));
                }
            }
        }

        if delivered {
            // The portal answered, just not with 2xx anywhere. Still counts
            // as delivered; some firmwares reject the POST yet log you in.
            return Ok(());
        }
        match last_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
