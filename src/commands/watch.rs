use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::backend::browser::{BrowserBackend, BrowserType};
use crate::backend::http::HttpBackend;
use crate::backend::BackendKind;
use crate::config::Settings;
use crate::connectivity::{platform_provider, HttpProbe};
use crate::monitor::Monitor;

/// Run the poll loop until interrupted.
pub async fn handle_watch(
    env_file: Option<PathBuf>,
    backend_kind: BackendKind,
    browser: String,
    no_headless: bool,
    interval_secs: Option<u64>,
    cooldown_secs: Option<u64>,
) -> Result<()> {
    let mut settings = Settings::load(env_file.as_deref())?;
    if let Some(secs) = interval_secs {
        settings.poll_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = cooldown_secs {
        settings.cooldown = Duration::from_secs(secs);
    }

    let probe = HttpProbe::new(settings.probe_url.clone(), settings.probe_timeout)?;

    match backend_kind {
        BackendKind::Http => {
            let mut backend = HttpBackend::new(settings.portal.clone())?;
            let mut monitor = Monitor::new(settings, platform_provider(), probe);
            monitor.run(&mut backend).await;
        }
        BackendKind::Browser => {
            let browser_type: BrowserType = browser.parse()?;
            let mut backend = BrowserBackend::connect(
                browser_type,
                settings.portal.login_url.clone(),
                !no_headless,
            )
            .await?;
            let mut monitor = Monitor::new(settings, platform_provider(), probe);
            monitor.run(&mut backend).await;
            // Orderly release on the shutdown path; the driver manager's Drop
            // takes care of any driver process we spawned.
            backend.close().await?;
        }
    }

    Ok(())
}
