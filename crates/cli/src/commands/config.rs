use clap::Subcommand;
use std::path::Path;

use super::utils::{load_config, print_info, print_success, CliError, CliResult};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the configuration file
    Validate,

    /// Show the effective configuration
    Show {
        /// Show endpoint headers and the hash secret
        #[arg(long)]
        show_sensitive: bool,
    },
}

pub fn handle_config_command(command: ConfigCommands, file: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Validate => validate_config(file),
        ConfigCommands::Show { show_sensitive } => show_config(file, show_sensitive),
    }
}

fn validate_config(file: &Path) -> CliResult<()> {
    print_info(&format!("Loading configuration from {}...", file.display()));
    let config = load_config(file)?;

    print_info("Validating configuration...");
    config.validate().map_err(CliError::Config)?;

    print_success("Configuration is valid!");

    let orchestration = &config.orchestration;
    println!("Configuration Summary:");
    println!("  Perspectives: {} configured", config.perspectives.len());
    println!(
        "  Perspective count: default {}, minimum {}",
        orchestration.default_perspective_count, orchestration.min_perspective_count
    );
    println!("  Max attempts: {}", orchestration.global_max_attempts);
    println!("  Per-call timeout: {}ms", orchestration.per_call_timeout_ms);
    println!("  Registry: {}", config.registry.path);

    Ok(())
}

fn show_config(file: &Path, show_sensitive: bool) -> CliResult<()> {
    let config = load_config(file)?;

    println!("Configuration from {}:", file.display());

    let orchestration = &config.orchestration;
    println!("\n[Orchestration]");
    println!("  Default Perspective Count: {}", orchestration.default_perspective_count);
    println!("  Min Perspective Count: {}", orchestration.min_perspective_count);
    println!("  Global Max Attempts: {}", orchestration.global_max_attempts);
    println!("  Per-Call Timeout: {}ms", orchestration.per_call_timeout_ms);
    println!("  Min Passing RIRs: {}", orchestration.min_passing_rirs);
    println!("  Strict Perspective Codes: {}", orchestration.strict_perspective_codes);
    if show_sensitive {
        println!("  Hash Secret: {}", orchestration.hash_secret);
    } else {
        println!("  Hash Secret: [hidden - use --show-sensitive to reveal]");
    }

    println!("\n[Perspectives] ({} configured)", config.perspectives.len());
    for (code, endpoints) in &config.perspectives {
        println!("  {code}");
        for (check, endpoint) in
            [("caa", &endpoints.caa_endpoint_info), ("dcv", &endpoints.dcv_endpoint_info)]
        {
            println!("    {check}: {}", endpoint.url);
            if show_sensitive {
                for (name, value) in &endpoint.headers {
                    println!("      {name}: {value}");
                }
            } else if !endpoint.headers.is_empty() {
                println!("      [{} headers hidden]", endpoint.headers.len());
            }
        }
    }

    println!("\n[Registry]");
    println!("  Path: {}", config.registry.path);

    let http = &config.http_client;
    println!("\n[HTTP Client]");
    println!("  Max Concurrent Requests: {}", http.max_concurrent_requests);
    println!("  Pool Idle Timeout: {}s", http.pool_idle_timeout_seconds);
    println!("  Pool Max Idle Per Host: {}", http.pool_max_idle_per_host);
    println!("  Connect Timeout: {}ms", http.connect_timeout_ms);

    println!("\n[Logging]");
    println!("  Level: {}", config.logging.level);
    println!("  Format: {}", config.logging.format);

    Ok(())
}
