use tracing::{error, info};

use crate::backend::SubmitBackend;
use crate::config::Settings;
use crate::connectivity::{is_target_network, ConnectivityProbe, SsidProvider};
use crate::resolver::{LoginResolver, ResolveOutcome};

/// What one poll tick decided and did.
#[derive(Debug)]
pub enum TickReport {
    /// Not associated with the target network; resolver skipped.
    NotAssociated { current: Option<String> },
    /// Internet reachable; no login needed.
    Online,
    /// Portal suspected; the resolver ran (or was gated by the cooldown).
    LoginAttempted(ResolveOutcome),
}

/// The poll loop: probe association and reachability each tick, invoke the
/// login resolver when a captive portal is suspected, sleep, repeat until
/// the operator interrupts.
pub struct Monitor<P> {
    settings: Settings,
    ssid: Box<dyn SsidProvider>,
    probe: P,
    resolver: LoginResolver,
}

impl<P: ConnectivityProbe> Monitor<P> {
    pub fn new(settings: Settings, ssid: Box<dyn SsidProvider>, probe: P) -> Self {
        let resolver = LoginResolver::new(
            settings.portal.field_catalog.clone(),
            settings.cooldown,
        );
        Self {
            settings,
            ssid,
            probe,
            resolver,
        }
    }

    /// One tick. Login attempts are gated on the reachability pre-check:
    /// the resolver only runs when we are on the target network AND the
    /// internet probe fails. Nothing in a tick is fatal.
    pub async fn tick<B: SubmitBackend>(&mut self, backend: &mut B) -> TickReport {
        let current = self.ssid.current_network_name();

        if !is_target_network(current.as_deref(), self.settings.target_ssid.as_deref()) {
            match &current {
                Some(ssid) => info!("Not on the target network (current: {})", ssid),
                None => info!("Not associated with any wireless network"),
            }
            return TickReport::NotAssociated { current };
        }

        info!(
            "Connected to WiFi: {}",
            current.as_deref().unwrap_or("<unknown>")
        );

        if self.probe.is_internet_reachable().await {
            info!("Internet is accessible, no login needed");
            return TickReport::Online;
        }

        info!("Internet not accessible, captive portal may be active");
        let outcome = self
            .resolver
            .resolve(backend, &self.probe, &self.settings.credentials)
            .await;
        TickReport::LoginAttempted(outcome)
    }

    /// Run until Ctrl-C. The interrupt is observed between ticks: an
    /// in-flight attempt runs to completion or its own timeout first, and
    /// the caller releases the backend afterwards.
    pub async fn run<B: SubmitBackend>(&mut self, backend: &mut B) {
        info!(
            "Starting portal watch (interval {}s, cooldown {}s)",
            self.settings.poll_interval.as_secs(),
            self.settings.cooldown.as_secs()
        );

        loop {
            let report = self.tick(backend).await;
            if let TickReport::LoginAttempted(ResolveOutcome::Exhausted { attempts }) = &report {
                error!(
                    "Login failed after {} attempts; will retry after cooldown",
                    attempts
                );
            }

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received, shutting down");
                    break;
                }
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "monitor_test.rs"]
mod monitor_test;
