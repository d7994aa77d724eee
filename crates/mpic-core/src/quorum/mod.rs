//! Quorum determination and the re-attempt rule.
//!
//! All functions are stateless and operate on the responses of a single attempt.
//!
//! # Key Functions
//!
//! - [`decide`]: pass/fail against a quorum count
//! - [`QuorumEvaluator::evaluate`]: [`decide`] plus the optional RIR diversity rule
//! - [`next_step`]: whether the coordinator should dispatch another attempt

use std::{collections::HashSet, sync::Arc};

use crate::{perspective::Perspective, types::CheckResponse};

/// Returns `true` when at least `quorum_count` responses passed.
///
/// Assumes `quorum_count <= responses.len()` was enforced during validation.
#[must_use]
pub fn decide(responses: &[CheckResponse], quorum_count: usize) -> bool {
    count_passed(responses) >= quorum_count
}

#[must_use]
pub fn count_passed(responses: &[CheckResponse]) -> usize {
    responses.iter().filter(|r| r.check_passed()).count()
}

/// Number of distinct RIRs among the perspectives whose response passed.
///
/// `perspectives` and `responses` are parallel slices in dispatch order.
#[must_use]
pub fn passing_rirs(perspectives: &[Arc<Perspective>], responses: &[CheckResponse]) -> usize {
    perspectives
        .iter()
        .zip(responses)
        .filter(|(_, r)| r.check_passed())
        .map(|(p, _)| p.rir.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Outcome of evaluating one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumVerdict {
    pub is_valid: bool,
    pub passed_count: usize,
    pub passing_rirs: usize,
}

/// Applies the quorum rule and, when configured, a minimum number of distinct passing RIRs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumEvaluator {
    min_passing_rirs: usize,
}

impl Default for QuorumEvaluator {
    fn default() -> Self {
        Self { min_passing_rirs: 1 }
    }
}

impl QuorumEvaluator {
    /// `min_passing_rirs <= 1` disables the diversity rule.
    #[must_use]
    pub fn new(min_passing_rirs: usize) -> Self {
        Self { min_passing_rirs }
    }

    #[must_use]
    pub fn min_passing_rirs(&self) -> usize {
        self.min_passing_rirs
    }

    #[must_use]
    pub fn evaluate(
        &self,
        perspectives: &[Arc<Perspective>],
        responses: &[CheckResponse],
        quorum_count: usize,
    ) -> QuorumVerdict {
        let passed_count = count_passed(responses);
        let passing_rirs = passing_rirs(perspectives, responses);
        let quorum_met = decide(responses, quorum_count);
        let rirs_met = self.min_passing_rirs <= 1 || passing_rirs >= self.min_passing_rirs;

        QuorumVerdict { is_valid: quorum_met && rirs_met, passed_count, passing_rirs }
    }
}

/// What the coordinator does after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Quorum met; stop with a valid result.
    Done,
    /// Dispatch the next cohort.
    Retry,
    /// Attempt budget spent without quorum.
    AttemptsExhausted,
}

impl NextStep {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Retry)
    }
}

/// Decides whether another attempt is warranted.
///
/// `attempt` is the 1-based number of the attempt just evaluated.
#[must_use]
pub fn next_step(verdict: &QuorumVerdict, attempt: u32, max_attempts: u32) -> NextStep {
    if verdict.is_valid {
        NextStep::Done
    } else if attempt >= max_attempts {
        NextStep::AttemptsExhausted
    } else {
        NextStep::Retry
    }
}
