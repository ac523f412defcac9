//! URL event delivery.
//!
//! The OS hands URL-open events to the handler through a platform-specific
//! mechanism (Apple Events on macOS, the command line elsewhere). This module
//! hides that behind [`EventSource`] so the dispatcher can be driven by an
//! in-memory source in tests.

mod argv;
#[cfg(target_os = "macos")]
mod apple;
mod channel;

use std::ffi::OsString;
use std::time::Instant;

pub use argv::ArgvEventSource;
#[cfg(target_os = "macos")]
pub use apple::AppleEventSource;
pub use channel::{ChannelEventSource, EventSender, channel};

use crate::config::URL_SCHEME;
use crate::error::Result;

/// An OS-delivered URL-open notification.
///
/// The direct object is `None` when the event carried no parameter or the
/// parameter could not be converted to a string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncomingEvent {
    direct_object: Option<String>,
}

impl IncomingEvent {
    /// Event whose direct object is the given URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            direct_object: Some(url.into()),
        }
    }

    /// Event without a direct object.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_direct_object(direct_object: Option<String>) -> Self {
        Self { direct_object }
    }

    /// Build an event from a raw OS string. Non-UTF-8 values are treated as
    /// not string-convertible.
    pub fn from_os_string(value: Option<OsString>) -> Self {
        Self {
            direct_object: value.and_then(|v| v.into_string().ok()),
        }
    }

    pub fn direct_object(&self) -> Option<&str> {
        self.direct_object.as_deref()
    }
}

/// Extract the URL payload from an event.
///
/// Returns `None` for missing, non-string, or empty payloads; callers treat
/// that as "nothing to dispatch".
pub fn extract_payload(event: &IncomingEvent) -> Option<&str> {
    event.direct_object().filter(|url| !url.is_empty())
}

/// Whether `url` starts with the `ope:` scheme (ASCII case-insensitive).
///
/// Informational only: payloads are forwarded verbatim either way.
pub fn uses_scheme(url: &str) -> bool {
    url.split_once(':')
        .is_some_and(|(scheme, _)| scheme.eq_ignore_ascii_case(URL_SCHEME))
}

/// Result of waiting on an [`EventSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPoll {
    /// An event was delivered.
    Event(IncomingEvent),
    /// The deadline passed without an event.
    Timeout,
    /// The source will never deliver another event.
    Closed,
}

/// Capability for receiving URL-open events from the OS.
pub trait EventSource {
    /// Register this process as the receiver of URL-open events.
    ///
    /// Must be idempotent. The dispatcher calls it once, before the first
    /// call to [`EventSource::next_event`].
    fn register_url_handler(&mut self) -> Result<()>;

    /// Block until an event arrives, the source closes, or `deadline` passes.
    ///
    /// `None` waits without a deadline.
    fn next_event(&mut self, deadline: Option<Instant>) -> EventPoll;
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn register_url_handler(&mut self) -> Result<()> {
        (**self).register_url_handler()
    }

    fn next_event(&mut self, deadline: Option<Instant>) -> EventPoll {
        (**self).next_event(deadline)
    }
}

/// Pick the event source for this platform.
///
/// A URL on the command line always wins. Without one, macOS waits for an
/// Apple Event; other platforms see a single event with no payload.
pub fn platform_event_source(url_arg: Option<OsString>) -> Box<dyn EventSource> {
    #[cfg(target_os = "macos")]
    if url_arg.is_none() {
        return Box::new(AppleEventSource::new());
    }

    Box::new(ArgvEventSource::new(url_arg))
}
