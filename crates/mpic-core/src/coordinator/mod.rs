//! Request orchestration: validation, cohort selection, the bounded attempt loop and
//! construction from configuration.
//!
//! A request moves through `Validating → Dispatching → Evaluating → (Dispatching | Done)`.
//! Validation failures end the request before any perspective is called. Each attempt
//! dispatches one cohort; once every disjoint cohort has been tried the loop starts again from
//! the first. The loop ends when quorum is met or the attempt budget is spent.

pub mod builder;
pub mod engine;
pub mod selection;
pub mod validation;

pub use builder::{BuildError, CoordinatorBuilder};
pub use engine::{Coordinator, CoordinatorError};
pub use selection::{Cohort, CohortSelector};
pub use validation::{
    required_quorum, validate_request, ResolvedParameters, ValidationIssue, ValidationIssueKind,
    ValidationIssues,
};
