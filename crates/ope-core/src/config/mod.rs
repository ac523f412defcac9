//! Configuration defaults for the URL handler.
//!
//! This module contains:
//! - `HandlerConfig` - runtime values resolved from CLI arguments and environment
//! - Dispatch timing, companion naming, and bundle layout constants

mod handler;

pub use handler::*;

/// URL scheme the handler is registered for.
pub const URL_SCHEME: &str = "ope";

/// Dispatch timing configuration.
pub mod dispatch {
    use std::time::Duration;

    /// Delay between the end of a dispatch and process exit.
    ///
    /// Gives the OS time to close the event-delivery transaction before the
    /// handler disappears.
    pub const GRACE_PERIOD: Duration = Duration::from_millis(500);

    /// Same value in milliseconds, for CLI defaults.
    pub const GRACE_PERIOD_MS: u64 = 500;

    /// Upper bound for an overridden grace period, in milliseconds.
    pub const MAX_GRACE_PERIOD_MS: u64 = 10_000;

    /// Environment variable that overrides the grace period (milliseconds).
    pub const GRACE_ENV: &str = "OPE_GRACE_MS";
}

/// Companion executable naming.
pub mod companion {
    /// File stem of the companion executable.
    pub const NAME: &str = "ope";

    /// Environment variable that overrides companion resolution.
    pub const OVERRIDE_ENV: &str = "OPE_COMPANION";

    /// Companion file name for the current platform (`ope`, `ope.exe`).
    pub fn file_name() -> String {
        format!("{}{}", NAME, std::env::consts::EXE_SUFFIX)
    }
}

/// macOS application bundle layout.
///
/// The handler lives in `Ope.app/Contents/MacOS/` and the companion is
/// shipped in `Ope.app/Contents/Resources/`.
pub mod bundle {
    pub const CONTENTS_DIR: &str = "Contents";
    pub const EXECUTABLE_DIR: &str = "MacOS";
    pub const RESOURCES_DIR: &str = "Resources";
}
