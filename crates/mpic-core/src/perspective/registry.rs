//! Static registry of known perspectives.

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::Arc,
};
use thiserror::Error;
use tracing::{debug, warn};

use super::normalize_code;

/// Errors raised while loading the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to load perspective registry: {0}")]
    Load(#[from] ConfigError),

    #[error("duplicate perspective code in registry: {0}")]
    DuplicateCode(String),

    #[error("perspective registry is empty")]
    Empty,
}

/// One independently operated network vantage point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Perspective {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Regional Internet Registry the perspective's address space belongs to.
    pub rir: String,
    /// Perspectives that should not be selected together with this one.
    #[serde(default)]
    pub too_close_codes: Vec<String>,
}

impl Perspective {
    #[must_use]
    pub fn new(code: impl Into<String>, rir: impl Into<String>) -> Self {
        Self { code: code.into(), name: None, rir: rir.into(), too_close_codes: Vec::new() }
    }

    #[must_use]
    pub fn with_too_close(mut self, codes: &[&str]) -> Self {
        self.too_close_codes = codes.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Proximity is treated as symmetric: either side listing the other is enough.
    #[must_use]
    pub fn is_too_close_to(&self, other: &Perspective) -> bool {
        self.too_close_codes.iter().any(|c| c == &other.code) ||
            other.too_close_codes.iter().any(|c| c == &self.code)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    available_perspectives: Vec<Perspective>,
}

/// Read-only registry owning the canonical [`Perspective`] records.
#[derive(Debug, Clone)]
pub struct PerspectiveRegistry {
    perspectives: Vec<Arc<Perspective>>,
    by_code: HashMap<String, Arc<Perspective>>,
}

impl PerspectiveRegistry {
    /// Builds a registry from an in-memory list. Codes, including too-close codes, are
    /// stored lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Empty`] for an empty list and
    /// [`RegistryError::DuplicateCode`] if a code appears twice.
    pub fn new(perspectives: Vec<Perspective>) -> Result<Self, RegistryError> {
        if perspectives.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut by_code = HashMap::with_capacity(perspectives.len());
        let mut ordered = Vec::with_capacity(perspectives.len());
        for mut perspective in perspectives {
            perspective.code = normalize_code(&perspective.code);
            for close in &mut perspective.too_close_codes {
                *close = normalize_code(close);
            }
            let perspective = Arc::new(perspective);
            if by_code.insert(perspective.code.clone(), Arc::clone(&perspective)).is_some() {
                return Err(RegistryError::DuplicateCode(perspective.code.clone()));
            }
            ordered.push(perspective);
        }

        let known: HashSet<&str> = by_code.keys().map(String::as_str).collect();
        for perspective in &ordered {
            for close in &perspective.too_close_codes {
                if !known.contains(close.as_str()) {
                    debug!(
                        perspective = %perspective.code,
                        too_close = %close,
                        "too-close code refers to a perspective outside the registry"
                    );
                }
            }
        }

        Ok(Self { perspectives: ordered, by_code })
    }

    /// Loads the registry from a TOML file with an `[[available_perspectives]]` array.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let file: RegistryFile = Config::builder()
            .add_source(File::new(&path.as_ref().to_string_lossy(), FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Self::new(file.available_perspectives)
    }

    /// Every known perspective, in registry order.
    #[must_use]
    pub fn all_perspectives(&self) -> &[Arc<Perspective>] {
        &self.perspectives
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Arc<Perspective>> {
        self.by_code.get(&normalize_code(code))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.perspectives.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.perspectives.is_empty()
    }

    /// Resolves codes to perspectives, preserving input order.
    ///
    /// Unknown codes are dropped with a warning. Use [`Self::unknown_codes`] beforehand when
    /// a misconfiguration should fail instead.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, codes: &[S]) -> Vec<Arc<Perspective>> {
        codes
            .iter()
            .filter_map(|code| {
                let code = code.as_ref();
                let found = self.get(code).cloned();
                if found.is_none() {
                    warn!(perspective = %code, "configured perspective code not in registry, dropping");
                }
                found
            })
            .collect()
    }

    /// Codes from `codes` that the registry does not know.
    #[must_use]
    pub fn unknown_codes<'a, S: AsRef<str>>(&self, codes: &'a [S]) -> Vec<&'a str> {
        codes.iter().map(AsRef::as_ref).filter(|c| self.get(c).is_none()).collect()
    }
}
