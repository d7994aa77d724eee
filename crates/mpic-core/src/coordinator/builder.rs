//! Builder pattern for constructing a [`Coordinator`] from application configuration.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::engine::Coordinator;
use crate::{
    config::AppConfig,
    dispatch::Dispatcher,
    perspective::{EndpointTable, PerspectiveRegistry, RegistryError},
    remote::{HttpClient, HttpPerspectiveCaller, PerspectiveCaller, RemoteCallError},
};

/// Errors that can occur during coordinator construction.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Only raised when `strict_perspective_codes` is enabled.
    #[error("configured perspective codes missing from registry: {}", .0.join(", "))]
    UnknownPerspectives(Vec<String>),

    #[error("none of the configured perspectives is present in the registry")]
    NoTargetPerspectives,

    #[error("failed to initialize HTTP client: {0}")]
    HttpClientInit(#[from] RemoteCallError),
}

/// Builder for constructing a [`Coordinator`].
///
/// The registry is read from `registry.path` unless one is supplied, and the HTTP caller is
/// built from `http_client` unless one is supplied.
///
/// # Examples
///
/// ```no_run
/// # use mpic_core::{config::AppConfig, coordinator::CoordinatorBuilder};
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AppConfig::load()?;
/// let coordinator = CoordinatorBuilder::new(config).build()?;
/// # Ok(())
/// # }
/// ```
pub struct CoordinatorBuilder {
    config: AppConfig,
    registry: Option<PerspectiveRegistry>,
    caller: Option<Arc<dyn PerspectiveCaller>>,
}

impl CoordinatorBuilder {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config, registry: None, caller: None }
    }

    #[must_use]
    pub fn registry(mut self, registry: PerspectiveRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replaces the HTTP caller, e.g. with an in-process fake.
    #[must_use]
    pub fn caller(mut self, caller: Arc<dyn PerspectiveCaller>) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Validates the configuration, resolves target perspectives and wires the coordinator.
    ///
    /// Configured codes missing from the registry are dropped with a warning, or rejected
    /// when `orchestration.strict_perspective_codes` is set.
    pub fn build(self) -> Result<Coordinator, BuildError> {
        self.config.validate().map_err(BuildError::Config)?;

        let registry = match self.registry {
            Some(registry) => registry,
            None => PerspectiveRegistry::from_file(&self.config.registry.path)?,
        };

        let codes = self.config.target_perspective_codes();
        let unknown = registry.unknown_codes(&codes);
        if !unknown.is_empty() && self.config.orchestration.strict_perspective_codes {
            return Err(BuildError::UnknownPerspectives(
                unknown.into_iter().map(str::to_string).collect(),
            ));
        }

        let targets = registry.resolve(&codes);
        if targets.is_empty() {
            return Err(BuildError::NoTargetPerspectives);
        }
        if !unknown.is_empty() {
            warn!(
                dropped = ?unknown,
                resolved = targets.len(),
                "configured perspectives missing from registry were excluded"
            );
        }

        let endpoints = Arc::new(EndpointTable::from_config(&self.config.perspectives));
        let caller = match self.caller {
            Some(caller) => caller,
            None => {
                let client = HttpClient::with_config(&self.config.http_client)?;
                Arc::new(HttpPerspectiveCaller::new(Arc::new(client))) as Arc<dyn PerspectiveCaller>
            }
        };

        info!(
            target_perspectives = targets.len(),
            registry_size = registry.len(),
            global_max_attempts = self.config.orchestration.global_max_attempts,
            "coordinator built"
        );

        Ok(Coordinator::new(
            Dispatcher::new(caller, endpoints),
            targets,
            self.config.orchestration,
        ))
    }
}
