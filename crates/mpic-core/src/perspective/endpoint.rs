//! Per-perspective, per-check-type endpoint configuration.

use super::normalize_code;
use crate::types::CheckType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Network location of one perspective for one check type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerspectiveEndpoint {
    pub url: String,
    /// Static headers sent with every call (for example an API gateway key).
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl PerspectiveEndpoint {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), headers: HashMap::new() }
    }
}

/// Both endpoints of a configured perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerspectiveEndpoints {
    pub caa_endpoint_info: PerspectiveEndpoint,
    pub dcv_endpoint_info: PerspectiveEndpoint,
}

/// Lookup table keyed by `(check_type, perspective_code)`, with codes lowercased.
#[derive(Debug, Clone, Default)]
pub struct EndpointTable {
    caa: HashMap<String, PerspectiveEndpoint>,
    dcv: HashMap<String, PerspectiveEndpoint>,
}

impl EndpointTable {
    #[must_use]
    pub fn from_config(perspectives: &BTreeMap<String, PerspectiveEndpoints>) -> Self {
        let mut table = Self::default();
        for (code, endpoints) in perspectives {
            table.insert(CheckType::Caa, code, endpoints.caa_endpoint_info.clone());
            table.insert(CheckType::Dcv, code, endpoints.dcv_endpoint_info.clone());
        }
        table
    }

    pub fn insert(&mut self, check_type: CheckType, code: &str, endpoint: PerspectiveEndpoint) {
        self.by_type_mut(check_type).insert(normalize_code(code), endpoint);
    }

    #[must_use]
    pub fn get(&self, check_type: CheckType, code: &str) -> Option<&PerspectiveEndpoint> {
        let code = normalize_code(code);
        match check_type {
            CheckType::Caa => self.caa.get(&code),
            CheckType::Dcv => self.dcv.get(&code),
        }
    }

    fn by_type_mut(&mut self, check_type: CheckType) -> &mut HashMap<String, PerspectiveEndpoint> {
        match check_type {
            CheckType::Caa => &mut self.caa,
            CheckType::Dcv => &mut self.dcv,
        }
    }
}
