//! Event-to-process dispatch loop.
//!
//! [`Dispatcher`] pulls URL events from an [`EventSource`], runs the
//! companion once per event, and decides when the handler process should
//! exit. It never calls `std::process::exit` itself: [`Dispatcher::run`]
//! returns a [`Termination`] and the binary acts on it.

mod state;

use std::thread;
use std::time::{Duration, Instant};

use strum::Display;
use tracing::{debug, error, info, warn};

pub use state::DispatchState;

use crate::config::{URL_SCHEME, dispatch};
use crate::error::{Error, Result};
use crate::event::{EventPoll, EventSource, IncomingEvent, extract_payload, uses_scheme};
use crate::locator::CompanionLocator;
use crate::spawner::{DispatchRequest, ExitSummary, Spawner};

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The companion ran to completion.
    Completed(ExitSummary),
    /// The companion could not be started; the attempt was abandoned.
    SpawnFailed,
    /// The event had no usable payload; nothing was started.
    NoPayload,
}

/// Why the dispatcher stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ExitReason {
    /// The grace period after the last dispatch elapsed.
    GraceElapsed,
    /// The event source closed before delivering any event.
    SourceClosed,
    /// The installation root could not be determined.
    BrokenInstallation,
    /// The OS refused the URL handler registration.
    RegistrationFailed,
}

/// Final state handed back to the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    pub reason: ExitReason,
    /// Events received, including those without a payload.
    pub events: usize,
    /// Companion runs attempted.
    pub dispatches: usize,
}

impl Termination {
    /// Process exit code. Only configuration failures are non-zero; the
    /// companion's own result never leaks into it.
    pub fn exit_code(&self) -> i32 {
        match self.reason {
            ExitReason::GraceElapsed | ExitReason::SourceClosed => 0,
            ExitReason::BrokenInstallation | ExitReason::RegistrationFailed => 1,
        }
    }
}

/// Bridges URL events to the companion executable.
pub struct Dispatcher<S, L, P> {
    source: S,
    locator: L,
    spawner: P,
    grace_period: Duration,
    state: DispatchState,
    registered: bool,
    events: usize,
    dispatches: usize,
    termination: Option<Termination>,
}

impl<S, L, P> Dispatcher<S, L, P>
where
    S: EventSource,
    L: CompanionLocator,
    P: Spawner,
{
    pub fn new(source: S, locator: L, spawner: P) -> Self {
        Self {
            source,
            locator,
            spawner,
            grace_period: dispatch::GRACE_PERIOD,
            state: DispatchState::Idle,
            registered: false,
            events: 0,
            dispatches: 0,
            termination: None,
        }
    }

    /// Override the delay between dispatch and termination.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn spawner(&self) -> &P {
        &self.spawner
    }

    /// Register with the event source. Only the first call reaches the
    /// source.
    pub fn register(&mut self) -> Result<()> {
        if self.registered {
            return Ok(());
        }
        self.source.register_url_handler()?;
        self.registered = true;
        Ok(())
    }

    /// Handle events until the process should exit.
    pub fn run(&mut self) -> Termination {
        if let Some(termination) = self.termination {
            return termination;
        }

        if let Err(e) = self.register() {
            error!("{}", e);
            return self.terminate(ExitReason::RegistrationFailed);
        }

        loop {
            let deadline = match self.state {
                DispatchState::Idle | DispatchState::Dispatching => None,
                DispatchState::Draining { deadline } => Some(deadline),
                DispatchState::Terminated => match self.termination {
                    Some(termination) => return termination,
                    None => return self.terminate(ExitReason::GraceElapsed),
                },
            };

            match self.source.next_event(deadline) {
                EventPoll::Event(event) => {
                    if let Err(e) = self.handle_event(&event) {
                        error!("Cannot dispatch: {}", e);
                        return self.terminate(ExitReason::BrokenInstallation);
                    }
                }
                EventPoll::Timeout => {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        return self.terminate(ExitReason::GraceElapsed);
                    }
                }
                EventPoll::Closed => {
                    return match deadline {
                        Some(deadline) => {
                            thread::sleep(deadline.saturating_duration_since(Instant::now()));
                            self.terminate(ExitReason::GraceElapsed)
                        }
                        None => self.terminate(ExitReason::SourceClosed),
                    };
                }
            }
        }
    }

    /// Handle a single event and schedule termination.
    ///
    /// Only a locator failure is returned as an error; everything else is
    /// reported through [`DispatchOutcome`].
    ///
    /// An event handled while already [`DispatchState::Draining`] gets no
    /// grace period of its own: the first deadline stands, so when that
    /// dispatch outlasts it the handler exits as soon as the companion does.
    pub fn handle_event(&mut self, event: &IncomingEvent) -> Result<DispatchOutcome> {
        self.events += 1;
        let pending_deadline = self.state.deadline();

        let outcome = match extract_payload(event) {
            Some(url) => {
                if !uses_scheme(url) {
                    debug!("Payload {:?} is not an {}: URL, forwarding as is", url, URL_SCHEME);
                }
                let program = self.locator.locate()?;
                self.dispatch(DispatchRequest::new(program, url))
            }
            None => {
                debug!("Dropping event without a URL payload");
                DispatchOutcome::NoPayload
            }
        };

        // A deadline, once scheduled, is neither extended nor cancelled.
        let deadline = pending_deadline.unwrap_or_else(|| Instant::now() + self.grace_period);
        self.transition(DispatchState::Draining { deadline });

        Ok(outcome)
    }

    fn dispatch(&mut self, request: DispatchRequest) -> DispatchOutcome {
        self.transition(DispatchState::Dispatching);
        self.dispatches += 1;

        info!(
            "Dispatching {} to {}",
            request.args().join(" "),
            request.program().display()
        );

        match self.spawner.run(&request) {
            Ok(summary) => {
                if summary.success {
                    debug!("Companion exited successfully");
                } else {
                    debug!("Companion exited with {:?}", summary.code);
                }
                DispatchOutcome::Completed(summary)
            }
            Err(e @ Error::SpawnFailed { .. }) => {
                warn!("{}", e);
                DispatchOutcome::SpawnFailed
            }
            Err(e) => {
                // The child was started; only waiting on it failed.
                warn!("{}", e);
                DispatchOutcome::Completed(ExitSummary {
                    code: None,
                    success: false,
                })
            }
        }
    }

    fn transition(&mut self, next: DispatchState) {
        debug!("{} -> {}", self.state, next);
        self.state = next;
    }

    fn terminate(&mut self, reason: ExitReason) -> Termination {
        self.transition(DispatchState::Terminated);
        let termination = Termination {
            reason,
            events: self.events,
            dispatches: self.dispatches,
        };
        self.termination = Some(termination);
        info!(
            "Terminating ({}, {} events, {} dispatches)",
            reason, termination.events, termination.dispatches
        );
        termination
    }
}
