use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;

use crate::config::Settings;
use crate::connectivity::{is_target_network, platform_provider, ConnectivityProbe, HttpProbe};

/// Print the current connection state as JSON: SSID, target match, and
/// internet reachability.
pub async fn handle_status(env_file: Option<PathBuf>) -> Result<()> {
    let settings = Settings::load(env_file.as_deref())?;

    let current = platform_provider().current_network_name();
    let on_target = is_target_network(current.as_deref(), settings.target_ssid.as_deref());

    let probe = HttpProbe::new(settings.probe_url.clone(), settings.probe_timeout)?;
    let reachable = probe.is_internet_reachable().await;

    let status = json!({
        "ssid": current,
        "target_ssid": settings.target_ssid,
        "on_target_network": on_target,
        "internet_reachable": reachable,
        "login_needed": on_target && !reachable,
        "checked_at": chrono::Utc::now().to_rfc3339(),
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
