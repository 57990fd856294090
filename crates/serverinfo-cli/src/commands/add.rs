use std::path::Path;

use anyhow::Context;

use serverinfo_core::AddOutcome;

pub fn run(config: Option<&Path>, url: &str) -> anyhow::Result<()> {
    let mut registry = super::open_registry(config)?;
    let outcome = registry
        .add(url)
        .with_context(|| format!("cannot save {}", registry.path().display()))?;

    match outcome {
        AddOutcome::Added(url) => println!("Server added: {url}"),
        AddOutcome::AlreadyPresent(url) => println!("Server {url} already exists."),
    }
    Ok(())
}
