//! CLI argument definitions for ope-handler.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ope_core::config::{companion, dispatch};

#[derive(Parser, Debug)]
#[command(name = "ope-handler")]
#[command(about = "Hands ope:// URLs from the OS to the ope companion", version)]
pub struct Args {
    /// ope:// URL delivered by the OS
    #[arg(value_name = "URL")]
    pub url: Option<OsString>,

    /// Companion executable (absolute, or relative to the install directory)
    #[arg(long, env = companion::OVERRIDE_ENV, value_name = "PATH", global = true)]
    pub companion: Option<PathBuf>,

    /// Delay between dispatch and exit, in milliseconds
    #[arg(
        long,
        env = dispatch::GRACE_ENV,
        default_value_t = dispatch::GRACE_PERIOD_MS,
        value_parser = clap::value_parser!(u64).range(0..=dispatch::MAX_GRACE_PERIOD_MS)
    )]
    pub grace_ms: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show where the companion executable is expected
    Locate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Args {
    /// Parse the process arguments.
    pub fn parse_from_env() -> Self {
        Self::parse_from(strip_process_serial(std::env::args_os()))
    }
}

/// Drop the `-psn_<n>_<m>` argument older macOS releases add when
/// LaunchServices starts a bundle.
fn strip_process_serial<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .filter(|arg| !arg.to_str().is_some_and(|s| s.starts_with("-psn_")))
        .collect()
}
