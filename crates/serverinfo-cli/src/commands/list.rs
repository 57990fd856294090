use std::path::Path;

pub fn run(config: Option<&Path>) -> anyhow::Result<()> {
    let registry = super::open_registry(config)?;

    if registry.is_empty() {
        println!("No servers saved.");
        println!("Usage: serverinfo-client add <url>");
        if !registry.is_persisted() {
            println!("(monitor falls back to {})", serverinfo_core::DEFAULT_TARGET);
        }
        return Ok(());
    }

    for line in registry.list() {
        println!("{line}");
    }
    Ok(())
}
