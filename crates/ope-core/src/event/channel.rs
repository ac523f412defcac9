//! In-memory event source.
//!
//! Lets tests and embedders inject URL events without an OS event loop.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Instant;

use super::{EventPoll, EventSource, IncomingEvent};
use crate::error::Result;

/// Create a connected sender / source pair.
pub fn channel() -> (EventSender, ChannelEventSource) {
    let (tx, rx) = mpsc::channel();
    (
        EventSender { tx },
        ChannelEventSource {
            rx,
            registrations: 0,
        },
    )
}

/// Sending half of [`channel`]. Dropping every sender closes the source.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<IncomingEvent>,
}

impl EventSender {
    /// Queue an event. Returns `false` if the source has been dropped.
    pub fn send(&self, event: IncomingEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn send_url(&self, url: impl Into<String>) -> bool {
        self.send(IncomingEvent::with_url(url))
    }
}

/// Receiving half of [`channel`].
#[derive(Debug)]
pub struct ChannelEventSource {
    rx: Receiver<IncomingEvent>,
    registrations: usize,
}

impl ChannelEventSource {
    /// Number of times `register_url_handler` has been called.
    pub fn registrations(&self) -> usize {
        self.registrations
    }
}

impl EventSource for ChannelEventSource {
    fn register_url_handler(&mut self) -> Result<()> {
        self.registrations += 1;
        Ok(())
    }

    fn next_event(&mut self, deadline: Option<Instant>) -> EventPoll {
        match deadline {
            None => match self.rx.recv() {
                Ok(event) => EventPoll::Event(event),
                Err(_) => EventPoll::Closed,
            },
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match self.rx.recv_timeout(timeout) {
                    Ok(event) => EventPoll::Event(event),
                    Err(RecvTimeoutError::Timeout) => EventPoll::Timeout,
                    Err(RecvTimeoutError::Disconnected) => EventPoll::Closed,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_delivers_in_send_order() {
        let (tx, mut source) = channel();
        assert!(tx.send_url("ope:///a"));
        assert!(tx.send_url("ope:///b"));

        assert_eq!(
            source.next_event(None),
            EventPoll::Event(IncomingEvent::with_url("ope:///a"))
        );
        assert_eq!(
            source.next_event(None),
            EventPoll::Event(IncomingEvent::with_url("ope:///b"))
        );
    }

    #[test]
    fn test_times_out_at_deadline() {
        let (_tx, mut source) = channel();
        let deadline = Instant::now() + Duration::from_millis(10);
        assert_eq!(source.next_event(Some(deadline)), EventPoll::Timeout);
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn test_past_deadline_still_drains_queued_event() {
        let (tx, mut source) = channel();
        tx.send_url("ope:///late");
        let deadline = Instant::now() - Duration::from_millis(1);
        assert_eq!(
            source.next_event(Some(deadline)),
            EventPoll::Event(IncomingEvent::with_url("ope:///late"))
        );
    }

    #[test]
    fn test_closes_when_senders_dropped() {
        let (tx, mut source) = channel();
        drop(tx);
        assert_eq!(source.next_event(None), EventPoll::Closed);
    }

    #[test]
    fn test_counts_registrations() {
        let (_tx, mut source) = channel();
        assert_eq!(source.registrations(), 0);
        source.register_url_handler().unwrap();
        assert_eq!(source.registrations(), 1);
    }
}
