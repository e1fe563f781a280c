//! Background identity refresh with singleflight coalescing and stale-result discard.
//!
//! [`Session::refresh_in_background`] re-validates the provisional identity against the
//! backend without ever degrading it on transient failure. Concurrent callers (rapid
//! navigation, focus events) coalesce onto one in-flight exchange: each caller captures
//! the flight serial on entry, queues on the per-session guard, and skips its own dial
//! when an overlapping flight completed in the meantime. Responses that resolve after the
//! session moved (logout, re-login, re-bootstrap) are discarded, never merged.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::CredentialSecret,
	error::CredentialError,
	http::IdentityClient,
	obs::{self, AuthFlow, FlowOutcome, FlowSpan},
	session::{Identity, Session, SessionState, SignOutReason},
};

/// Result of one [`Session::refresh_in_background`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshOutcome {
	/// The backend confirmed (and possibly replaced) the identity.
	Refreshed,
	/// An overlapping flight already re-validated this session; no backend call was made.
	Coalesced,
	/// The session moved while the flight was in the air; the response was dropped.
	Discarded,
	/// The backend reported the account has no access to this portal; signed out.
	SignedOut,
	/// Transient backend/transport failure; identity left untouched.
	Unavailable,
	/// No authenticated session to refresh.
	Idle,
}

/// Result of one [`Session::renew_credential`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenewOutcome {
	/// A fresh credential was persisted.
	Rotated {
		/// The replacement credential, for cookie re-issuance.
		credential: CredentialSecret,
	},
	/// The session moved while the renewal was in the air; nothing was persisted.
	Discarded,
}

impl<C> Session<C>
where
	C: ?Sized + IdentityClient,
{
	/// Re-validates the current identity against the backend, eventually consistent.
	///
	/// Callers must not await this on their critical path; schedule it after
	/// [`bootstrap`](Session::bootstrap) resolves. Failure never mutates a populated
	/// identity.
	pub async fn refresh_in_background(&self) -> RefreshOutcome {
		let span = FlowSpan::new(AuthFlow::Refresh, "refresh_in_background");

		obs::record_flow_outcome(AuthFlow::Refresh, FlowOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let outcome = span
			.instrument(async move {
				if !self.is_authenticated() {
					return RefreshOutcome::Idle;
				}

				let entered_epoch = self.current_epoch();
				let entered_serial = self.refresh_serial();
				let _singleflight = self.refresh_guard.lock().await;

				// A flight that completed while this caller queued already re-validated
				// the very state this caller observed; re-dialing would be redundant.
				if self.refresh_serial() != entered_serial {
					return RefreshOutcome::Coalesced;
				}

				let credential = match self.store.load().await {
					Ok(Some(credential)) => credential,
					Ok(None) => return RefreshOutcome::Idle,
					Err(_) => return RefreshOutcome::Unavailable,
				};
				let exchange = self.http_client.me(&credential).await;

				self.note_refresh_flight();

				let profile = match exchange {
					Ok(profile) => profile,
					// A transient hiccup must never sign the user out; keep whatever
					// identity is populated and try again on the next schedule.
					Err(_) => return RefreshOutcome::Unavailable,
				};

				if self.current_epoch() != entered_epoch {
					return RefreshOutcome::Discarded;
				}
				if !self.policy.role_allows(profile.role)
					|| !self.policy.allows_portal(&profile.portal_access)
				{
					let _ = self.store.clear().await;

					self.transition(SessionState::SignedOut {
						reason: SignOutReason::AccessDenied,
					});

					return RefreshOutcome::SignedOut;
				}
				if self.commit_refreshed(entered_epoch, Identity::from(profile)) {
					RefreshOutcome::Refreshed
				} else {
					RefreshOutcome::Discarded
				}
			})
			.await;

		match outcome {
			RefreshOutcome::Unavailable => {
				self.refresh_metrics.record_failure();
				obs::record_flow_outcome(AuthFlow::Refresh, FlowOutcome::Failure);
			},
			_ => {
				self.refresh_metrics.record_success();
				obs::record_flow_outcome(AuthFlow::Refresh, FlowOutcome::Success);
			},
		}

		outcome
	}

	/// Rotates the persisted credential via the renewal collaborator.
	///
	/// Shares the refresh singleflight guard so a rotation never races an identity
	/// refresh over the same credential. Unlike the background refresh this is
	/// caller-driven, so failures propagate.
	pub async fn renew_credential(&self) -> Result<RenewOutcome> {
		let span = FlowSpan::new(AuthFlow::Refresh, "renew_credential");

		obs::record_flow_outcome(AuthFlow::Refresh, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let entered = self.current_epoch();
				let _singleflight = self.refresh_guard.lock().await;
				let credential = self
					.store
					.load()
					.await?
					.ok_or(Error::Credential(CredentialError::Missing))?;
				let renewed = self.http_client.renew(&credential).await?;

				if self.current_epoch() != entered || !self.is_authenticated() {
					return Ok(RenewOutcome::Discarded);
				}

				self.store.save(renewed.clone()).await?;

				Ok(RenewOutcome::Rotated { credential: renewed })
			})
			.await;

		obs::record_flow_outcome(
			AuthFlow::Refresh,
			if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure },
		);

		result
	}
}
