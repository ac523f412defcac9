//! Default mode: hand one URL event to the companion and exit.

use std::ffi::OsString;

use ope_core::{BundleLocator, Dispatcher, HandlerConfig, ProcessSpawner, platform_event_source};
use tracing::debug;

/// Run the dispatcher and return the process exit code.
pub fn run(config: &HandlerConfig, url: Option<OsString>) -> i32 {
    let source = platform_event_source(url);
    let locator = BundleLocator::current().with_override(config.companion_override.clone());

    debug!("Grace period: {:?}", config.grace_period);

    let mut dispatcher = Dispatcher::new(source, locator, ProcessSpawner::new())
        .with_grace_period(config.grace_period);
    let termination = dispatcher.run();

    termination.exit_code()
}
