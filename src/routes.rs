//! Route authorization evaluated before any protected page is served.
//!
//! The [`Authorizer`] is a pure decision function over its immutable configuration: it
//! holds no mutable state, performs no I/O, and may be evaluated concurrently across
//! unrelated navigations. Credential problems never escape as errors; they degrade to
//! login redirects.

pub mod decision;
pub mod table;

pub use decision::*;
pub use table::*;

// self
use crate::{
	_prelude::*,
	auth::Claims,
	error::CredentialError,
	jwt::JwtVerifier,
	obs::{self, AuthFlow, FlowOutcome, FlowSpan},
	policy::PortalPolicy,
};

/// Evaluates navigations against the route table, portal policy, and credential verifier.
#[derive(Clone, Debug)]
pub struct Authorizer {
	/// Static routing policy.
	pub table: RouteTable,
	/// Portal-access policy (role denylist, permission bypass).
	pub policy: PortalPolicy,
	verifier: JwtVerifier,
}
impl Authorizer {
	/// Creates an authorizer from its three collaborators.
	pub fn new(table: RouteTable, policy: PortalPolicy, verifier: JwtVerifier) -> Self {
		Self { table, policy, verifier }
	}

	/// Decides whether the navigation to `path` may proceed, at the provided instant.
	///
	/// `credential` is the raw cookie value, when the browser sent one.
	pub fn authorize(
		&self,
		path: &str,
		credential: Option<&str>,
		now: OffsetDateTime,
	) -> AuthorizationDecision {
		let _guard = FlowSpan::new(AuthFlow::Authorize, "authorize").entered();

		obs::record_flow_outcome(AuthFlow::Authorize, FlowOutcome::Attempt);

		let decision = self.evaluate(path, credential, now);

		obs::record_flow_outcome(
			AuthFlow::Authorize,
			if decision.is_allowed() { FlowOutcome::Success } else { FlowOutcome::Failure },
		);

		decision
	}

	/// Convenience wrapper over [`authorize`](Self::authorize) using the current UTC instant.
	pub fn authorize_now(&self, path: &str, credential: Option<&str>) -> AuthorizationDecision {
		self.authorize(path, credential, OffsetDateTime::now_utc())
	}

	fn evaluate(
		&self,
		path: &str,
		credential: Option<&str>,
		now: OffsetDateTime,
	) -> AuthorizationDecision {
		if self.table.is_bypassed(path) {
			return AuthorizationDecision::allow_public();
		}

		let claims = match self.verified_claims(credential, now) {
			Ok(claims) => claims,
			Err(_) => return self.unauthenticated(path),
		};

		// The cookie carries no portal-access list, so the role denylist stands in for it
		// here; clearing the credential prevents a login redirect loop.
		if !self.policy.role_allows(claims.role) {
			return AuthorizationDecision::redirect_and_clear(RedirectTarget::login_with_reason(
				&self.table.login_path,
				RedirectReason::AccessDenied,
			));
		}
		if self.table.is_auth_path(path) {
			return AuthorizationDecision::redirect(RedirectTarget::to(&self.table.landing_path));
		}
		if let Some(rule) = self.table.matching_rule(path) {
			if let Some(roles) = &rule.required_roles
				&& !roles.contains(&claims.role)
			{
				return AuthorizationDecision::redirect(RedirectTarget::to(
					&self.table.unauthorized_path,
				));
			}
			if let Some(required) = &rule.required_permissions
				&& !self.policy.bypasses_permission_rules(claims.role)
				&& !claims.permissions.intersects(required)
			{
				return AuthorizationDecision::redirect(RedirectTarget::to(
					&self.table.unauthorized_path,
				));
			}
		}

		AuthorizationDecision::allow_as(ForwardedIdentity::from(&claims))
	}

	fn verified_claims(
		&self,
		credential: Option<&str>,
		now: OffsetDateTime,
	) -> Result<Claims, CredentialError> {
		let token = credential.ok_or(CredentialError::Missing)?;

		self.verifier.verify_at(token, now)
	}

	fn unauthenticated(&self, path: &str) -> AuthorizationDecision {
		if self.table.is_public(path) {
			AuthorizationDecision::allow_public()
		} else {
			AuthorizationDecision::redirect(RedirectTarget::login_with_return(
				&self.table.login_path,
				path,
			))
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::{issue_token, sample_claims, test_verifier};
	use crate::auth::Role;

	fn authorizer() -> Authorizer {
		let table = RouteTable::builder()
			.rule(RouteRule::for_prefix("/users").require_roles([Role::SuperAdmin, Role::Admin]))
			.build()
			.expect("Route table fixture should build successfully.");

		Authorizer::new(table, PortalPolicy::default(), test_verifier())
	}

	#[test]
	fn bypass_prefixes_skip_every_check() {
		let decision = authorizer().authorize_now("/api/auth/refresh", None);

		assert!(decision.is_allowed());
		assert!(!decision.clear_credential);
	}

	#[test]
	fn malformed_tokens_degrade_to_login_redirects() {
		let authorizer = authorizer();
		let decision = authorizer.authorize_now("/home", Some("definitely.not.valid"));

		assert_eq!(
			decision.redirect_location().as_deref(),
			Some("/login?redirect=%2Fhome"),
			"Protected paths must bounce malformed credentials to login."
		);

		let public = authorizer.authorize_now("/login", Some("definitely.not.valid"));

		assert!(public.is_allowed(), "Public paths stay reachable with a broken credential.");
	}

	#[test]
	fn valid_identity_on_auth_page_lands_on_home() {
		let token = issue_token(&sample_claims(Role::Admin));
		let decision = authorizer().authorize_now("/login", Some(&token));

		assert_eq!(decision.redirect_location().as_deref(), Some("/home"));
		assert!(!decision.clear_credential);
	}
}
