//! Outbound calls to remote perspectives.
//!
//! - [`http_client`]: the single pooled HTTP client shared by every request in the process,
//!   with a semaphore bounding concurrent connections
//! - [`caller`]: the [`PerspectiveCaller`] seam and its HTTP implementation, which turns every
//!   call outcome into a [`CheckResponse`](crate::types::CheckResponse)
//! - [`errors`]: classification of call failures
//!
//! Nothing here retries. Retry policy lives in the coordinator's attempt loop.

pub mod caller;
pub mod errors;
pub mod http_client;

pub use caller::{HttpPerspectiveCaller, PerspectiveCaller};
pub use errors::RemoteCallError;
pub use http_client::{HttpClient, HttpClientConfig};
