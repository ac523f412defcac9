pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod locator;
pub mod spawner;

pub use config::HandlerConfig;
pub use dispatcher::{DispatchOutcome, DispatchState, Dispatcher, ExitReason, Termination};
pub use error::{Error, Result};
pub use event::{
    ArgvEventSource, ChannelEventSource, EventPoll, EventSender, EventSource, IncomingEvent,
    extract_payload, platform_event_source, uses_scheme,
};
pub use locator::{BundleLocator, CompanionLocator, LocateReport};
pub use spawner::{DispatchRequest, ExitSummary, ProcessSpawner, Spawner};
