//! Session hydration and interactive auth operations.

// self
use crate::{
	_prelude::*,
	http::{AuthPayload, IdentityClient, LoginRequest, RegisterRequest},
	jwt,
	obs::{self, AuthFlow, FlowOutcome, FlowSpan},
	session::{Identity, Session, SessionState, SignOutReason, Trust},
};

impl<C> Session<C>
where
	C: ?Sized + IdentityClient,
{
	/// Hydrates the session from the persisted credential without touching the network.
	///
	/// Resolves with a Provisional identity (or a signed-out state) immediately; callers
	/// then schedule [`refresh_in_background`](Session::refresh_in_background) on their
	/// executor. The identity read right after this resolves is the token-derived one,
	/// never blocked on the backend.
	pub async fn bootstrap(&self) -> Result<SessionState> {
		let span = FlowSpan::new(AuthFlow::Bootstrap, "bootstrap");

		obs::record_flow_outcome(AuthFlow::Bootstrap, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let Some(credential) = self.store.load().await? else {
					return Ok(self.transition(SessionState::SignedOut {
						reason: SignOutReason::MissingCredential,
					}));
				};
				let claims = match jwt::decode_unverified(credential.expose()) {
					Ok(claims) => claims,
					Err(_) => return self.purge(SignOutReason::InvalidCredential).await,
				};

				if claims.is_expired_at(OffsetDateTime::now_utc()) {
					return self.purge(SignOutReason::Expired).await;
				}
				if !self.policy.role_allows(claims.role) {
					return self.purge(SignOutReason::AccessDenied).await;
				}

				Ok(self.transition(SessionState::Authenticated {
					identity: Identity::from(&claims),
					trust: Trust::Provisional,
				}))
			})
			.await;

		obs::record_flow_outcome(
			AuthFlow::Bootstrap,
			if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure },
		);

		result
	}

	/// Exchanges credentials for a session via the login collaborator.
	///
	/// On a portal-access denial the credential is purged before the error surfaces, so
	/// no partial state survives a rejected login.
	pub async fn login(&self, request: &LoginRequest) -> Result<Identity> {
		let span = FlowSpan::new(AuthFlow::Login, "login");

		obs::record_flow_outcome(AuthFlow::Login, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let payload = self.http_client.login(request).await?;

				self.complete_interactive_auth(payload).await
			})
			.await;

		obs::record_flow_outcome(
			AuthFlow::Login,
			if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure },
		);

		result
	}

	/// Registers a new account and signs it in, mirroring the login contract.
	pub async fn register(&self, request: &RegisterRequest) -> Result<Identity> {
		let span = FlowSpan::new(AuthFlow::Login, "register");

		obs::record_flow_outcome(AuthFlow::Login, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let payload = self.http_client.register(request).await?;

				self.complete_interactive_auth(payload).await
			})
			.await;

		obs::record_flow_outcome(
			AuthFlow::Login,
			if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure },
		);

		result
	}

	/// Signs the session out locally: clears the credential and the identity state.
	///
	/// Server-side token invalidation, when a deployment has any, is a backend concern;
	/// no network call is made here.
	pub async fn logout(&self) -> Result<()> {
		self.transition(SessionState::SignedOut { reason: SignOutReason::LoggedOut });
		self.store.clear().await?;

		Ok(())
	}

	async fn complete_interactive_auth(&self, payload: AuthPayload) -> Result<Identity> {
		if !self.policy.role_allows(payload.user.role)
			|| !self.policy.allows_portal(&payload.user.portal_access)
		{
			let _ = self.store.clear().await;

			self.transition(SessionState::SignedOut { reason: SignOutReason::AccessDenied });

			return Err(Error::AccessDenied {
				reason: format!("account `{}` is not enabled for this portal", payload.user.email),
			});
		}

		self.store.save(payload.token).await?;

		let identity = Identity::from(payload.user);

		self.transition(SessionState::Authenticated {
			identity: identity.clone(),
			trust: Trust::Confirmed,
		});

		Ok(identity)
	}

	async fn purge(&self, reason: SignOutReason) -> Result<SessionState> {
		// The credential is already known to be unusable; a failing clear must not turn
		// an orderly sign-out into a bootstrap error.
		let _ = self.store.clear().await;

		Ok(self.transition(SessionState::SignedOut { reason }))
	}
}
