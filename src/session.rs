//! Session facade coordinating bootstrap, interactive auth, and background refresh.

pub mod identity;
pub mod refresh;

mod bootstrap;

pub use identity::*;
pub use refresh::*;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	http::IdentityClient,
	policy::PortalPolicy,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")]
use crate::http::{BackendDescriptor, ReqwestIdentityClient};

#[cfg(feature = "reqwest")]
/// Session specialized for the crate's default reqwest transport stack.
pub type ReqwestSession = Session<ReqwestIdentityClient>;

/// Coordinates the in-process identity lifecycle against one identity backend.
///
/// The session owns the credential store, portal policy, and transport reference so the
/// individual operations can focus on state semantics (hydration, coalesced refresh,
/// interactive auth). There is deliberately no ambient singleton: construct one session
/// per application shell, or several isolated ones in tests.
///
/// State writes are guarded by a monotonically increasing epoch. Every externally driven
/// transition (bootstrap, login, logout, refresh-driven sign-out) advances it; in-flight
/// refreshes capture the epoch before dialing the backend and discard their result if it
/// moved, so a stale response can never clobber a newer session.
pub struct Session<C>
where
	C: ?Sized + IdentityClient,
{
	/// Transport used for every backend exchange.
	pub http_client: Arc<C>,
	/// Credential persistence backend.
	pub store: Arc<dyn CredentialStore>,
	/// Portal-access policy enforced on backend-reported profiles.
	pub policy: PortalPolicy,
	/// Shared metrics recorder for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	state: Arc<RwLock<SessionState>>,
	epoch: Arc<AtomicU64>,
	refresh_serial: Arc<AtomicU64>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C> Session<C>
where
	C: ?Sized + IdentityClient,
{
	/// Creates a session that reuses the caller-provided identity client.
	pub fn with_identity_client(
		store: Arc<dyn CredentialStore>,
		policy: PortalPolicy,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			policy,
			refresh_metrics: Default::default(),
			state: Arc::new(RwLock::new(SessionState::Unknown)),
			epoch: Default::default(),
			refresh_serial: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Returns a snapshot of the current session state.
	pub fn state(&self) -> SessionState {
		self.state.read().clone()
	}

	/// Returns the current identity, when one is populated.
	pub fn identity(&self) -> Option<Identity> {
		self.state.read().identity().cloned()
	}

	/// Returns `true` when an identity is populated, provisional or confirmed.
	pub fn is_authenticated(&self) -> bool {
		self.state.read().is_authenticated()
	}

	pub(crate) fn current_epoch(&self) -> u64 {
		self.epoch.load(Ordering::Acquire)
	}

	pub(crate) fn refresh_serial(&self) -> u64 {
		self.refresh_serial.load(Ordering::Acquire)
	}

	/// Marks one backend exchange as completed, letting queued refreshers coalesce.
	pub(crate) fn note_refresh_flight(&self) {
		self.refresh_serial.fetch_add(1, Ordering::AcqRel);
	}

	/// Advances the epoch and replaces the state in one externally driven transition.
	pub(crate) fn transition(&self, state: SessionState) -> SessionState {
		let mut guard = self.state.write();

		self.epoch.fetch_add(1, Ordering::AcqRel);
		*guard = state.clone();

		state
	}

	/// Commits a refresh result only if the session did not move underneath the flight.
	///
	/// Returns `false` when the captured epoch is stale or the session is no longer
	/// authenticated, in which case the state is left untouched.
	pub(crate) fn commit_refreshed(&self, entered_epoch: u64, identity: Identity) -> bool {
		let mut guard = self.state.write();

		if self.current_epoch() != entered_epoch || !guard.is_authenticated() {
			return false;
		}

		*guard = SessionState::Authenticated { identity, trust: Trust::Confirmed };

		true
	}
}
#[cfg(feature = "reqwest")]
impl Session<ReqwestIdentityClient> {
	/// Creates a session backed by the crate's default reqwest transport.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		policy: PortalPolicy,
		descriptor: BackendDescriptor,
	) -> Result<Self> {
		Ok(Self::with_identity_client(store, policy, ReqwestIdentityClient::new(descriptor)?))
	}
}
impl<C> Clone for Session<C>
where
	C: ?Sized + IdentityClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			store: self.store.clone(),
			policy: self.policy.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			state: self.state.clone(),
			epoch: self.epoch.clone(),
			refresh_serial: self.refresh_serial.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<C> Debug for Session<C>
where
	C: ?Sized + IdentityClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("policy", &self.policy)
			.field("state", &*self.state.read())
			.field("epoch", &self.current_epoch())
			.finish()
	}
}
