use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::backend::browser::{BrowserBackend, BrowserType};
use crate::backend::http::HttpBackend;
use crate::backend::{BackendKind, SubmitBackend};
use crate::config::Settings;
use crate::connectivity::{is_target_network, platform_provider, ConnectivityProbe, HttpProbe};
use crate::errors::PortalError;
use crate::resolver::{LoginResolver, ResolveOutcome};

/// One-shot login, meant to be invoked from OS network-change hooks.
/// Exit code contract: 0 on confirmed login or already-connected, 1 on any
/// failure path.
pub async fn handle_login(
    env_file: Option<PathBuf>,
    backend_kind: BackendKind,
    browser: String,
    no_headless: bool,
) -> Result<()> {
    let settings = Settings::load(env_file.as_deref())?;

    // The interrupt must surface as an ordinary failure exit, not the
    // default signal status; any in-flight request is abandoned and the
    // driver manager's Drop reaps a spawned WebDriver.
    tokio::select! {
        result = attempt_login(settings, backend_kind, browser, no_headless) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, abandoning login attempt");
            Err(PortalError::Interrupted.into())
        }
    }
}

async fn attempt_login(
    settings: Settings,
    backend_kind: BackendKind,
    browser: String,
    no_headless: bool,
) -> Result<()> {
    let ssid_provider = platform_provider();
    let current = ssid_provider.current_network_name();
    if !is_target_network(current.as_deref(), settings.target_ssid.as_deref()) {
        return Err(PortalError::NotAssociated { current }.into());
    }
    info!(
        "Connected to WiFi: {}",
        current.as_deref().unwrap_or("<unknown>")
    );

    let probe = HttpProbe::new(settings.probe_url.clone(), settings.probe_timeout)?;
    if probe.is_internet_reachable().await {
        info!("Already logged in, no action needed");
        return Ok(());
    }

    info!("Internet not accessible, attempting portal login");
    // A fresh process gets a fresh attempt; the cooldown only matters for the
    // long-running watch loop.
    let mut resolver = LoginResolver::new(settings.portal.field_catalog.clone(), Duration::ZERO);

    let outcome = match backend_kind {
        BackendKind::Http => {
            let mut backend = HttpBackend::new(settings.portal.clone())?;
            resolver
                .resolve(&mut backend, &probe, &settings.credentials)
                .await
        }
        BackendKind::Browser => {
            let browser_type: BrowserType = browser.parse()?;
            let mut backend = BrowserBackend::connect(
                browser_type,
                settings.portal.login_url.clone(),
                !no_headless,
            )
            .await?;
            let outcome = resolver
                .resolve(&mut backend, &probe, &settings.credentials)
                .await;
            backend.close().await?;
            outcome
        }
    };

    match outcome {
        ResolveOutcome::Succeeded { attempts } => {
            info!("Portal login succeeded after {} attempts", attempts);
            Ok(())
        }
        ResolveOutcome::Exhausted { attempts } => {
            Err(PortalError::LoginFailed { attempts }.into())
        }
        // Unreachable with a zero cooldown, but don't claim success for it.
        ResolveOutcome::SkippedCooldown { .. } => {
            Err(PortalError::Other(anyhow::anyhow!("login attempt was suppressed")).into())
        }
    }
}
