//! Locate command: report where the companion is expected.

use anyhow::Result;
use ope_core::{BundleLocator, HandlerConfig};

pub fn run(config: &HandlerConfig, json: bool) -> Result<()> {
    let locator = BundleLocator::current().with_override(config.companion_override.clone());
    let report = locator.report()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Install root: {}", report.install_root.display());
        println!(
            "Companion:    {}{}",
            report.companion.display(),
            if report.overridden { " (override)" } else { "" }
        );
        println!(
            "Status:       {}",
            if report.exists { "✓ found" } else { "✗ missing" }
        );
    }

    if !report.exists {
        anyhow::bail!("companion not found at {}", report.companion.display());
    }
    Ok(())
}
