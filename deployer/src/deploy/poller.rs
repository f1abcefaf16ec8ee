//! Convergence poller
//!
//! Waits for the engine to report READY on a target version. The loop is a
//! plain attempt counter: attempt `i` queries the status once and, when the
//! engine has not converged, sleeps `i` backoff units before the next attempt.
//! A failed status query ends the loop at once; only an explicit mismatch is
//! retried.

use std::future::Future;
use std::pin::Pin;

use engine_api::EngineStatus;
use uuid::Uuid;

use crate::deploy::events::{DeployEvent, DeployEventSink};
use crate::errors::TransportError;
use crate::http::engine::EngineClient;
use crate::utils::{calc_linear_backoff, BackoffOptions, SleepFn};

/// Future that resolves when the caller wants polling to stop
pub type ShutdownSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// How a polling run ended
#[derive(Debug)]
pub enum Convergence {
    /// Engine is READY on the target version
    Converged { attempts: u32 },

    /// Attempts exhausted; `last_seen` is the final status observed
    TimedOut {
        attempts: u32,
        last_seen: Option<EngineStatus>,
    },

    /// Status query failed on `attempt`; no further attempts were made
    Unreachable { attempt: u32, error: TransportError },

    /// Shutdown signal fired while backing off
    Cancelled { attempts: u32 },
}

/// Bounded status poller
pub struct ConvergencePoller<'a> {
    engine: &'a dyn EngineClient,
    backoff: &'a BackoffOptions,
    sleep_fn: &'a SleepFn,
    sink: &'a dyn DeployEventSink,
}

impl<'a> ConvergencePoller<'a> {
    pub fn new(
        engine: &'a dyn EngineClient,
        backoff: &'a BackoffOptions,
        sleep_fn: &'a SleepFn,
        sink: &'a dyn DeployEventSink,
    ) -> Self {
        Self {
            engine,
            backoff,
            sleep_fn,
            sink,
        }
    }

    /// Poll until the engine serves `target_version`, attempts run out, a
    /// status query fails, or `shutdown` resolves
    pub async fn await_convergence(
        &self,
        deploy_id: Uuid,
        target_version: &str,
        shutdown: &mut ShutdownSignal,
    ) -> Convergence {
        let mut last_seen = None;

        for attempt in 1..=self.backoff.max_attempts {
            let status = match self.engine.get_status().await {
                Ok(status) => status,
                Err(error) => {
                    self.sink.on_event(DeployEvent::PollFailed {
                        deploy_id,
                        attempt,
                        error: error.to_string(),
                    });
                    return Convergence::Unreachable { attempt, error };
                }
            };

            self.sink.on_event(DeployEvent::PollAttempt {
                deploy_id,
                attempt,
                system_status: status.system_status,
                remote_version: status.version.clone(),
            });

            if status.has_converged_on(target_version) {
                return Convergence::Converged { attempts: attempt };
            }
            last_seen = Some(status);

            let delay = calc_linear_backoff(self.backoff, attempt);
            self.sink.on_event(DeployEvent::Backoff {
                deploy_id,
                attempt,
                delay,
            });

            tokio::select! {
                _ = shutdown.as_mut() => {
                    return Convergence::Cancelled { attempts: attempt };
                }
                _ = (self.sleep_fn.as_ref())(delay) => {}
            }
        }

        Convergence::TimedOut {
            attempts: self.backoff.max_attempts,
            last_seen,
        }
    }
}
