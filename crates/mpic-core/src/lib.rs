//! # MPIC Core
//!
//! Remote-perspective dispatch and quorum aggregation for multi-perspective issuance
//! corroboration (MPIC).
//!
//! A validation request is fanned out to independent network perspectives, each of which
//! performs a CAA or DCV check. Their answers are aggregated, and the request is valid when
//! enough perspectives agree.
//!
//! - **[`perspective`]**: registry of known perspectives and their endpoints.
//!
//! - **[`remote`]**: pooled HTTP client and the [`remote::PerspectiveCaller`] seam; every call
//!   outcome becomes a [`types::CheckResponse`].
//!
//! - **[`dispatch`]**: concurrent fan-out with per-call timeouts and order-preserving joins.
//!
//! - **[`quorum`]**: pass/fail against a quorum and the re-attempt rule.
//!
//! - **[`coordinator`]**: validation, cohort selection and the bounded attempt loop; the only
//!   entry point callers need.
//!
//! - **[`config`]**: layered configuration loading.
//!
//! ## Request Flow
//!
//! ```text
//! MpicRequest
//!       │
//!       ▼
//! ┌─────────────┐
//! │  Validation │ ─── Invalid ──► ValidationIssues (no calls made)
//! └──────┬──────┘
//!        │ Valid
//!        ▼
//! ┌──────────────────┐
//! │ Cohort selection │  SHA-256 ranking per target, too-close / RIR aware
//! └────────┬─────────┘
//!          │ cohort n
//!          ▼
//! ┌─────────────┐       ┌──────────────────────────┐
//! │ Dispatcher  │ ────► │ PerspectiveCaller × N    │
//! │ (join_all)  │ ◄──── │ (per-call timeout)       │
//! └──────┬──────┘       └──────────────────────────┘
//!        │
//!        ▼
//! ┌─────────────────┐
//! │ QuorumEvaluator │ ─── not met, budget left ──► cohort n+1
//! └────────┬────────┘
//!          │ met / exhausted
//!          ▼
//!   AggregateResult
//! ```

pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod perspective;
pub mod quorum;
pub mod remote;
pub mod types;
