use std::ffi::OsString;
use std::time::Instant;

use tracing::debug;

use super::{EventPoll, EventSource, IncomingEvent};
use crate::error::Result;

/// Event source for platforms that pass the URL on the command line.
///
/// Linux desktop entries (`Exec=… %u`) and the Windows registry
/// (`"…" "%1"`) start a fresh process per URL, so the source yields exactly
/// one event and then closes.
#[derive(Debug)]
pub struct ArgvEventSource {
    pending: Option<IncomingEvent>,
}

impl ArgvEventSource {
    pub fn new(url_arg: Option<OsString>) -> Self {
        Self {
            pending: Some(IncomingEvent::from_os_string(url_arg)),
        }
    }
}

impl EventSource for ArgvEventSource {
    fn register_url_handler(&mut self) -> Result<()> {
        // The scheme association lives in the desktop entry / registry
        // written by `ope install`; nothing to do at runtime.
        debug!("argv event source: registration is static");
        Ok(())
    }

    fn next_event(&mut self, _deadline: Option<Instant>) -> EventPoll {
        match self.pending.take() {
            Some(event) => EventPoll::Event(event),
            None => EventPoll::Closed,
        }
    }
}
