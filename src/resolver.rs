use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::backend::SubmitBackend;
use crate::config::{Credentials, FieldPair};
use crate::connectivity::ConnectivityProbe;

/// Minimum elapsed time between two full login-attempt sequences, to avoid
/// hammering the portal across poll ticks.
#[derive(Debug)]
pub struct Cooldown {
    min_interval: Duration,
    last_sequence: Option<Instant>,
}

impl Cooldown {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_sequence: None,
        }
    }

    /// Time left until the next sequence may start; `None` when ready.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let last = self.last_sequence?;
        let elapsed = now.duration_since(last);
        if elapsed >= self.min_interval {
            None
        } else {
            Some(self.min_interval - elapsed)
        }
    }

    /// Record that a sequence started.
    pub fn mark(&mut self, now: Instant) {
        self.last_sequence = Some(now);
    }
}

/// Result of one resolver invocation.
#[derive(Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Connectivity restored after this many submission attempts.
    Succeeded { attempts: usize },
    /// The whole catalog was tried without restoring connectivity.
    Exhausted { attempts: usize },
    /// The cooldown gate suppressed the sequence; no submissions were made.
    SkippedCooldown { remaining: Duration },
}

/// Iterates the field-name catalog in preference order until one submission
/// restores connectivity or the catalog runs out.
///
/// Two states: probing the catalog, then done (succeeded or exhausted). No
/// scoring and no learning across runs; the same order is retried on every
/// invocation the cooldown lets through.
pub struct LoginResolver {
    catalog: Vec<FieldPair>,
    cooldown: Cooldown,
}

impl LoginResolver {
    pub fn new(catalog: Vec<FieldPair>, cooldown_interval: Duration) -> Self {
        Self {
            catalog,
            cooldown: Cooldown::new(cooldown_interval),
        }
    }

    /// Run one attempt sequence, subject to the cooldown gate.
    ///
    /// The cooldown is stamped when a sequence starts, not when it succeeds,
    /// so a failing portal is retried at the cooldown rate rather than every
    /// poll tick. Submission errors are transient by policy: logged, counted
    /// as a failed attempt, and the next catalog entry is tried.
    pub async fn resolve<B, P>(
        &mut self,
        backend: &mut B,
        probe: &P,
        credentials: &Credentials,
    ) -> ResolveOutcome
    where
        B: SubmitBackend,
        P: ConnectivityProbe,
    {
        let now = Instant::now();
        if let Some(remaining) = self.cooldown.remaining(now) {
            info!(
                "Login cooldown active, {}s remaining",
                remaining.as_secs()
            );
            return ResolveOutcome::SkippedCooldown { remaining };
        }
        self.cooldown.mark(now);

        if let Err(e) = backend.prepare().await {
            // Cookie priming is best-effort; the POSTs may still land.
            warn!("Backend preparation failed: {}", e);
        }

        for (index, pair) in self.catalog.iter().enumerate() {
            let attempt = index + 1;
            info!(
                "Login attempt {}/{} with fields {}",
                attempt,
                self.catalog.len(),
                pair
            );

            if let Err(e) = backend.submit(pair, credentials).await {
                warn!("Attempt {} failed to submit: {}", attempt, e);
            }

            if probe.is_internet_reachable().await {
                info!("Connectivity restored after {} attempts", attempt);
                return ResolveOutcome::Succeeded { attempts: attempt };
            }
        }

        warn!(
            "Field-name catalog exhausted after {} attempts",
            self.catalog.len()
        );
        ResolveOutcome::Exhausted {
            attempts: self.catalog.len(),
        }
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_test;
