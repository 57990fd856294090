use std::path::Path;

use anyhow::Context;

use serverinfo_core::RemoveOutcome;

pub fn run(config: Option<&Path>, url_or_index: &str) -> anyhow::Result<()> {
    let mut registry = super::open_registry(config)?;
    let outcome = registry
        .remove(url_or_index)
        .with_context(|| format!("cannot save {}", registry.path().display()))?;

    match outcome {
        RemoveOutcome::Removed(url) => println!("Server removed: {url}"),
        RemoveOutcome::NotFound => println!("Server not found."),
    }
    Ok(())
}
