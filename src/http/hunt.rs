//! Port hunting for bind attempts.
//!
//! The retry logic lives in an explicit state machine ([`HuntState`])
//! driven by a single control loop ([`hunt`]) that is generic over the
//! bind function, so conflict-then-retry and exhausted-ceiling transitions
//! are testable with canned outcomes and no live network stack.

use std::future::Future;
use std::io;

use super::server::ServerError;

/// Retry state for one bootstrap attempt: the port currently under attempt
/// and the highest port worth trying.
///
/// Owned exclusively by the in-flight attempt and discarded once a terminal
/// outcome is reached. Each bootstrap invocation starts a fresh state.
#[derive(Debug)]
pub(crate) struct HuntState {
    port: u16,
    ceiling: u16,
}

impl HuntState {
    pub(crate) fn new(start: u16, ceiling: u16) -> Self {
        Self {
            port: start,
            ceiling,
        }
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    /// Advances to the next candidate port, or returns `None` when the
    /// ceiling is exhausted. A ceiling at or below the current port never
    /// advances, and a ceiling of 65535 cannot overflow the step.
    pub(crate) fn advance(&mut self) -> Option<u16> {
        let next = self.port.checked_add(1).filter(|next| *next <= self.ceiling)?;
        self.port = next;
        Some(next)
    }
}

/// Attempts `bind` on successive ports, starting at `start` and retrying on
/// address-in-use conflicts while headroom remains below `ceiling`.
///
/// Attempts are strictly serialized: the next bind is only issued after the
/// previous one has failed. Any error other than a conflict, or a conflict
/// with the ceiling exhausted, is fatal and carries the last attempted port
/// and the underlying I/O error. `host` is used for logging and error
/// reporting only; the bind function decides what to connect it to.
pub(crate) async fn hunt<T, F, Fut>(
    host: &str,
    start: u16,
    ceiling: u16,
    mut bind: F,
) -> Result<T, ServerError>
where
    F: FnMut(u16) -> Fut,
    Fut: Future<Output = io::Result<T>>,
{
    let mut state = HuntState::new(start, ceiling);
    loop {
        let port = state.port();
        tracing::info!(host, port, "Attempting to listen");

        match bind(port).await {
            Ok(bound) => return Ok(bound),
            Err(error) if error.kind() == io::ErrorKind::AddrInUse => {
                tracing::info!(host, port, "Server address already in use");
                if state.advance().is_none() {
                    tracing::error!(error = %error, host, port, "No free port up to the configured maximum");
                    return Err(ServerError::Bind {
                        host: host.to_string(),
                        port,
                        source: error,
                    });
                }
            }
            Err(error) => {
                tracing::error!(error = %error, host, port, "Failed to bind");
                return Err(ServerError::Bind {
                    host: host.to_string(),
                    port,
                    source: error,
                });
            }
        }
    }
}
