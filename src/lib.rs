//! # portalwatch
//!
//! Automatic captive-portal WiFi login.
//!
//! Some networks (hostels, campuses, hotels) gate internet access behind a
//! web login form served by the gateway. portalwatch detects the condition
//! (associated with the network, but an external probe does not answer 200),
//! then tries a small ordered catalog of guessed form field names against
//! the portal, either with direct form-encoded HTTP POSTs or by driving a
//! real browser over WebDriver, until connectivity comes back or the
//! catalog runs out.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Keep watching and log in whenever the portal reappears
//! portalwatch watch --env-file ~/.wifi.env
//!
//! # One shot, for network-change hooks; exit 0 means online
//! portalwatch login
//!
//! # Use a real browser instead of raw POSTs
//! portalwatch login --backend browser --browser chrome
//!
//! # What would it do right now?
//! portalwatch status
//!
//! # Read the real field names off the live portal page
//! portalwatch analyze --no-headless
//!
//! # Install the OS hook that runs `login` on network changes
//! portalwatch install
//! ```
//!
//! Credentials come from an env file (`WIFI_USERNAME`, `WIFI_PASSWORD`,
//! optional `TARGET_SSID`); they are never logged.
//!
//! ## Library Usage
//!
//! ```no_run
//! use portalwatch::backend::http::HttpBackend;
//! use portalwatch::config::Settings;
//! use portalwatch::connectivity::HttpProbe;
//! use portalwatch::resolver::LoginResolver;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::load(None)?;
//! let probe = HttpProbe::new(settings.probe_url.clone(), settings.probe_timeout)?;
//! let mut backend = HttpBackend::new(settings.portal.clone())?;
//! let mut resolver = LoginResolver::new(settings.portal.field_catalog.clone(), Duration::ZERO);
//! let outcome = resolver
//!     .resolve(&mut backend, &probe, &settings.credentials)
//!     .await;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::uninlined_format_args)]

/// Submission backends (direct HTTP and WebDriver browser)
pub mod backend;

/// Credentials, portal endpoint, and the field-name catalog
pub mod config;

/// Internet reachability probe and per-OS SSID lookup
pub mod connectivity;

/// Crate error type with process exit codes
pub mod errors;

/// The poll loop
pub mod monitor;

/// Catalog iteration with the login cooldown
pub mod resolver;

/// Automatic WebDriver process management
pub mod webdriver_manager;

pub use config::{Credentials, FieldPair, PortalEndpoint, Settings};
pub use connectivity::{ConnectivityProbe, HttpProbe, SsidProvider};
pub use monitor::{Monitor, TickReport};
pub use resolver::{LoginResolver, ResolveOutcome};
