use mpic_core::{
    coordinator::{CoordinatorBuilder, CoordinatorError},
    types::{AggregateResult, MpicRequest},
};
use serde_json::Value;
use std::{path::Path, process::ExitCode};
use tracing::{debug, info};

use super::{
    logging::init_logging,
    utils::{load_config, CliError, CliResult},
};

/// Exit status for a request rejected by validation.
const EXIT_VALIDATION: u8 = 2;

/// Runs one coordination and prints the aggregate result (or validation issues) as JSON.
pub async fn run_coordination(config_file: &Path, request_file: &Path, pretty: bool) -> CliResult<ExitCode> {
    let config = load_config(config_file)?;
    init_logging(&config.logging);

    let raw = std::fs::read_to_string(request_file)?;
    let request: MpicRequest = serde_json::from_str(&raw)
        .map_err(|e| CliError::General(format!("invalid request {}: {e}", request_file.display())))?;

    let coordinator = CoordinatorBuilder::new(config).build()?;
    debug!(coordinator = ?coordinator, "coordinator ready");

    let outcome = coordinator.coordinate(request).await;
    coordinator.shutdown();

    let (rendered, status) = render_outcome(outcome, pretty)?;
    info!(exit_status = status, "coordination finished");
    println!("{rendered}");
    Ok(ExitCode::from(status))
}

/// Maps a coordination outcome to the JSON printed on stdout and the process exit status.
///
/// A completed coordination exits `0` whether or not quorum was reached; a request rejected
/// by validation exits [`EXIT_VALIDATION`]. Internal faults surface as errors.
fn render_outcome(
    outcome: Result<AggregateResult, CoordinatorError>,
    pretty: bool,
) -> CliResult<(String, u8)> {
    match outcome {
        Ok(result) => Ok((to_json(&serde_json::to_value(&result)?, pretty)?, 0)),
        Err(CoordinatorError::Validation(issues)) => {
            Ok((to_json(&serde_json::to_value(&issues)?, pretty)?, EXIT_VALIDATION))
        }
        Err(e @ CoordinatorError::Internal(_)) => Err(CliError::General(e.to_string())),
    }
}

fn to_json(value: &Value, pretty: bool) -> CliResult<String> {
    Ok(if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? })
}
