// Browsers start the handler without a console; avoid flashing one on Windows.
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod cli;
mod commands;
mod console;

use anyhow::Result;
use cli::{Args, Command};
use ope_core::HandlerConfig;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    console::attach_parent_console();

    let args = Args::parse_from_env();

    // Initialize logging (warn unless RUST_LOG says otherwise)
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ope_handler=warn,ope_core=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = HandlerConfig::new()
        .with_grace_millis(args.grace_ms)
        .with_companion_override(args.companion);

    match args.command {
        Some(Command::Locate { json }) => commands::locate::run(&config, json),
        None => {
            let code = commands::handle::run(&config, args.url);
            std::process::exit(code);
        }
    }
}
