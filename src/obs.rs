//! Optional observability helpers for gatekeeper flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `portal_guard.flow` with the `flow`
//!   (operation) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `portal_guard_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Gatekeeper operations observed by this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthFlow {
	/// Per-navigation route authorization.
	Authorize,
	/// Session hydration from the persisted credential.
	Bootstrap,
	/// Interactive login/register exchanges.
	Login,
	/// Background identity refresh and credential renewal.
	Refresh,
}
impl AuthFlow {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthFlow::Authorize => "authorize",
			AuthFlow::Bootstrap => "bootstrap",
			AuthFlow::Login => "login",
			AuthFlow::Refresh => "refresh",
		}
	}
}
impl Display for AuthFlow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a gatekeeper operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
