//! Init command implementation.

use anyhow::{bail, Context, Result};
use layer_lint_core::DEFAULT_POLICY;
use std::path::Path;

/// File written by `init`, in the current directory.
const POLICY_FILE: &str = "layer-lint.toml";

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let path = Path::new(POLICY_FILE);

    if path.exists() && !force {
        bail!(
            "Policy file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    std::fs::write(path, DEFAULT_POLICY)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Created {POLICY_FILE}");
    println!("\nNext steps:");
    println!("  1. Adjust [[layers]] and [aliases] to your source tree");
    println!("  2. Run: layer-lint check");

    Ok(())
}
