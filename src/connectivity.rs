use std::process::Command;
use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;
use tracing::{debug, trace};
use url::Url;

/// Answers "does this host currently have general internet access?"
///
/// Implementations must never error: any failure mode maps to `false`.
#[allow(async_fn_in_trait)]
pub trait ConnectivityProbe {
    async fn is_internet_reachable(&self) -> bool;
}

/// Reachability probe against a fixed external URL.
pub struct HttpProbe {
    client: reqwest::Client,
    target: Url,
}

impl HttpProbe {
    pub fn new(target: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, target })
    }
}

impl ConnectivityProbe for HttpProbe {
    /// True iff the probe target answers 200. A portal intercept answers
    /// with a redirect or error page instead; timeouts, DNS failures and
    /// TLS errors all count as "not reachable" and are never propagated.
    async fn is_internet_reachable(&self) -> bool {
        match self.client.get(self.target.clone()).send().await {
            Ok(response) => {
                trace!("Probe {} answered {}", self.target, response.status());
                response.status() == StatusCode::OK
            }
            Err(e) => {
                trace!("Probe {} failed: {}", self.target, e);
                false
            }
        }
    }
}

/// Capability to read the SSID of the currently associated wireless network.
///
/// One implementation per OS family; selected once at startup by
/// `platform_provider`, never by per-call platform string branching.
/// Every failure is swallowed and mapped to `None` ("unknown network").
pub trait SsidProvider: Send {
    fn current_network_name(&self) -> Option<String>;
}

/// macOS: `airport -I`, falling back to `system_profiler SPAirPortDataType`.
pub struct AirportSsid;

const AIRPORT_PATH: &str =
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";

impl SsidProvider for AirportSsid {
    fn current_network_name(&self) -> Option<String> {
        if let Some(ssid) = run_and_parse(AIRPORT_PATH, &["-I"], parse_airport_output) {
            return Some(ssid);
        }
        run_and_parse(
            "system_profiler",
            &["SPAirPortDataType"],
            parse_system_profiler_output,
        )
    }
}

/// Windows: `netsh wlan show interfaces`.
pub struct NetshSsid;

impl SsidProvider for NetshSsid {
    fn current_network_name(&self) -> Option<String> {
        run_and_parse("netsh", &["wlan", "show", "interfaces"], parse_netsh_output)
    }
}

/// Linux: `iwgetid -r`, falling back to `nmcli -t -f ACTIVE,SSID dev wifi`.
pub struct IwgetidSsid;

impl SsidProvider for IwgetidSsid {
    fn current_network_name(&self) -> Option<String> {
        if let Some(ssid) = run_and_parse("iwgetid", &["-r"], parse_iwgetid_output) {
            return Some(ssid);
        }
        run_and_parse(
            "nmcli",
            &["-t", "-f", "ACTIVE,SSID", "dev", "wifi"],
            parse_nmcli_output,
        )
    }
}

/// Select the SSID provider for the host OS. Called once at startup.
pub fn platform_provider() -> Box<dyn SsidProvider> {
    if cfg!(target_os = "macos") {
        Box::new(AirportSsid)
    } else if cfg!(target_os = "windows") {
        Box::new(NetshSsid)
    } else {
        Box::new(IwgetidSsid)
    }
}

/// True when the host counts as associated with the network we act on:
/// an SSID was read, and either no target is configured or it matches.
pub fn is_target_network(current: Option<&str>, target: Option<&str>) -> bool {
    match current {
        Some(ssid) => match target {
            Some(t) if !t.is_empty() => ssid == t,
            _ => true,
        },
        None => false,
    }
}

fn run_and_parse(
    program: &str,
    args: &[&str],
    parse: fn(&str) -> Option<String>,
) -> Option<String> {
    match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => {
            parse(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(output) => {
            debug!("{} exited with {}", program, output.status);
            None
        }
        Err(e) => {
            debug!("Failed to run {}: {}", program, e);
            None
        }
    }
}

/// `airport -I` prints one `   SSID: <name>` line; the leading space keeps
/// the `BSSID:` line from matching.
fn parse_airport_output(stdout: &str) -> Option<String> {
    for line in stdout.lines() {
        if let Some((_, rest)) = line.split_once(" SSID: ") {
            let ssid = rest.trim();
            if !ssid.is_empty() {
                return Some(ssid.to_string());
            }
        }
    }
    None
}

/// `system_profiler SPAirPortDataType` lists the associated network as the
/// first indented `<name>:` entry under "Current Network Information:".
fn parse_system_profiler_output(stdout: &str) -> Option<String> {
    let mut in_current = false;
    for line in stdout.lines() {
        if line.trim() == "Current Network Information:" {
            in_current = true;
            continue;
        }
        if in_current {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let ssid = trimmed.strip_suffix(':')?;
            if ssid.is_empty() {
                return None;
            }
            return Some(ssid.to_string());
        }
    }
    None
}

/// `netsh wlan show interfaces` prints `    SSID       : <name>`; the BSSID
/// line must be skipped.
fn parse_netsh_output(stdout: &str) -> Option<String> {
    for line in stdout.lines() {
        if line.contains("SSID") && !line.contains("BSSID") {
            if let Some((_, rest)) = line.split_once(':') {
                let ssid = rest.trim();
                if !ssid.is_empty() {
                    return Some(ssid.to_string());
                }
            }
        }
    }
    None
}

/// `iwgetid -r` prints the bare SSID, or nothing when not associated.
fn parse_iwgetid_output(stdout: &str) -> Option<String> {
    let ssid = stdout.trim();
    if ssid.is_empty() {
        None
    } else {
        Some(ssid.to_string())
    }
}

/// `nmcli -t -f ACTIVE,SSID dev wifi` prints `yes:<name>` for the active
/// network and `no:<name>` for the rest.
fn parse_nmcli_output(stdout: &str) -> Option<String> {
    for line in stdout.lines() {
        if let Some(ssid) = line.strip_prefix("yes:") {
            let ssid = ssid.trim();
            if !ssid.is_empty() {
                return Some(ssid.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "connectivity_test.rs"]
mod connectivity_test;
