use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};
use url::Url;

/// Default portal login page. Sophos/Cyberoam-style gateways serve the login
/// form from a non-standard HTTPS port on the gateway address.
pub const DEFAULT_LOGIN_URL: &str = "https://172.16.16.16:8090/httpclient.html";

/// Probe target for general internet reachability. Success means status 200;
/// a portal intercept typically answers with a redirect or an error.
pub const DEFAULT_PROBE_URL: &str = "http://www.google.com";

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const DEFAULT_COOLDOWN_SECS: u64 = 300;

/// Portal credentials, loaded once at startup and immutable for the process
/// lifetime.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// True when no username was configured; submission would be a no-op.
    pub fn is_empty(&self) -> bool {
        self.username.is_empty()
    }
}

// Credentials must never reach the log output in plaintext.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One guessed (username, password) form field-name pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPair {
    pub username_key: String,
    pub password_key: String,
}

impl FieldPair {
    pub fn new(username_key: &str, password_key: &str) -> Self {
        Self {
            username_key: username_key.to_string(),
            password_key: password_key.to_string(),
        }
    }
}

impl fmt::Display for FieldPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.username_key, self.password_key)
    }
}

/// The compiled-in field-name catalog, in preference order. The true form
/// schema is unknown a priori, so a small hand-curated guess list stands in
/// for live form introspection (see the `analyze` command for the manual
/// diagnostic that does introspect).
pub fn default_field_catalog() -> Vec<FieldPair> {
    vec![
        FieldPair::new("username", "password"),
        FieldPair::new("user", "pass"),
        FieldPair::new("login", "password"),
        FieldPair::new("roll", "pwd"),
        FieldPair::new("id", "passwd"),
        FieldPair::new("email", "password"),
    ]
}

/// The portal's login endpoint plus the field-name catalog tried against it.
#[derive(Debug, Clone)]
pub struct PortalEndpoint {
    pub login_url: Url,
    pub field_catalog: Vec<FieldPair>,
}

impl PortalEndpoint {
    pub fn new(login_url: Url) -> Self {
        Self {
            login_url,
            field_catalog: default_field_catalog(),
        }
    }

    /// The configured login URL plus same-host alternate paths some portal
    /// firmwares accept for the login POST. Order is attempt order.
    pub fn url_variants(&self) -> Vec<Url> {
        let mut variants = vec![self.login_url.clone()];
        for path in ["/login.html", "/", "/login"] {
            let mut alt = self.login_url.clone();
            alt.set_path(path);
            if !variants.contains(&alt) {
                variants.push(alt);
            }
        }
        variants
    }
}

/// Runtime settings assembled from the env file and process environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    /// SSID to act on; `None` means act on any associated network.
    pub target_ssid: Option<String>,
    pub portal: PortalEndpoint,
    pub probe_url: Url,
    pub probe_timeout: Duration,
    pub poll_interval: Duration,
    pub cooldown: Duration,
}

impl Settings {
    /// Load the env file (if any) into the process environment, then read
    /// settings from it. A missing env file is not an error; absent keys
    /// fall back to defaults and empty credentials, which only turn into a
    /// functional no-op later.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        match env_file {
            Some(path) => {
                dotenvy::from_path(path)
                    .with_context(|| format!("Failed to read env file {}", path.display()))?;
                debug!("Loaded env file {}", path.display());
            }
            None => {
                if dotenvy::dotenv().is_ok() {
                    debug!("Loaded .env from working directory");
                }
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from a key lookup. Split out from `load` so tests can
    /// supply a map instead of mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let credentials = Credentials {
            username: lookup("WIFI_USERNAME").unwrap_or_default(),
            password: lookup("WIFI_PASSWORD").unwrap_or_default(),
        };
        if credentials.is_empty() {
            warn!("WIFI_USERNAME is not set; login attempts will submit empty credentials");
        }

        let target_ssid = lookup("TARGET_SSID").filter(|s| !s.is_empty());

        let login_url = parse_url_or_default(lookup("PORTAL_LOGIN_URL"), DEFAULT_LOGIN_URL)?;
        let probe_url = parse_url_or_default(lookup("PROBE_URL"), DEFAULT_PROBE_URL)?;

        let poll_interval = secs_or_default(
            lookup("POLL_INTERVAL_SECS"),
            "POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        );
        let cooldown = secs_or_default(
            lookup("LOGIN_COOLDOWN_SECS"),
            "LOGIN_COOLDOWN_SECS",
            DEFAULT_COOLDOWN_SECS,
        );

        Ok(Self {
            credentials,
            target_ssid,
            portal: PortalEndpoint::new(login_url),
            probe_url,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            poll_interval,
            cooldown,
        })
    }
}

fn parse_url_or_default(value: Option<String>, default: &str) -> Result<Url> {
    match value.filter(|v| !v.is_empty()) {
        Some(raw) => Url::parse(&raw).with_context(|| format!("Invalid URL: {}", raw)),
        None => Ok(Url::parse(default).expect("default URL is valid")),
    }
}

fn secs_or_default(value: Option<String>, key: &str, default: u64) -> Duration {
    let secs = match value {
        Some(raw) => match raw.parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                warn!("Ignoring unparseable {}={:?}", key, raw);
                default
            }
        },
        None => default,
    };
    Duration::from_secs(secs)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
