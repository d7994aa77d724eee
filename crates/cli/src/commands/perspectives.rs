use mpic_core::perspective::PerspectiveRegistry;
use std::path::Path;

use super::utils::{load_config, print_info, CliError, CliResult};

/// Prints every registry perspective and whether each configured code resolves.
pub fn list_perspectives(config_file: &Path) -> CliResult<()> {
    let config = load_config(config_file)?;
    let registry = PerspectiveRegistry::from_file(&config.registry.path)
        .map_err(|e| CliError::Config(e.to_string()))?;

    print_info(&format!("Registry {} ({} perspectives)", config.registry.path, registry.len()));
    println!("{:<20} {:<8} {:<30} TOO CLOSE", "CODE", "RIR", "NAME");
    for perspective in registry.all_perspectives() {
        println!(
            "{:<20} {:<8} {:<30} {}",
            perspective.code,
            perspective.rir,
            perspective.name.as_deref().unwrap_or("-"),
            perspective.too_close_codes.join(",")
        );
    }

    let codes = config.target_perspective_codes();
    let unknown = registry.unknown_codes(&codes);
    println!();
    println!("Configured targets: {} resolved, {} dropped", codes.len() - unknown.len(), unknown.len());
    for code in &codes {
        let status = if unknown.contains(code) { "dropped (not in registry)" } else { "ok" };
        println!("  {code}: {status}");
    }

    Ok(())
}
