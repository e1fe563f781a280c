//! Authorization decisions and redirect targets produced per navigation.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{Claims, Role, SubjectId},
};

/// Machine-readable reason attached to a redirect for the login UI banner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectReason {
	/// The account's role has no access to this portal.
	AccessDenied,
}
impl RedirectReason {
	/// Returns the stable query-parameter value for the reason.
	pub const fn as_str(self) -> &'static str {
		match self {
			RedirectReason::AccessDenied => "access_denied",
		}
	}
}
impl Display for RedirectReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Relative redirect location with percent-encoded query parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectTarget {
	/// Absolute path component of the location.
	pub path: String,
	/// Query parameters, encoded on render.
	pub params: Vec<(&'static str, String)>,
}
impl RedirectTarget {
	/// Bare redirect to the provided path.
	pub fn to(path: impl Into<String>) -> Self {
		Self { path: path.into(), params: Vec::new() }
	}

	/// Login redirect remembering the originally requested path for post-login return.
	pub fn login_with_return(login_path: &str, original_path: &str) -> Self {
		Self { path: login_path.into(), params: vec![("redirect", original_path.into())] }
	}

	/// Login redirect carrying a machine-readable denial reason.
	pub fn login_with_reason(login_path: &str, reason: RedirectReason) -> Self {
		Self { path: login_path.into(), params: vec![("error", reason.as_str().into())] }
	}

	/// Renders the location as `path` or `path?query` with percent-encoded parameters.
	pub fn render(&self) -> String {
		if self.params.is_empty() {
			return self.path.clone();
		}

		let query: String = form_urlencoded::Serializer::new(String::new())
			.extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())))
			.finish();

		format!("{}?{query}", self.path)
	}
}
impl Display for RedirectTarget {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.render())
	}
}

/// Identity fields forwarded to downstream consumers on an allowed request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardedIdentity {
	/// Subject identifier.
	pub id: SubjectId,
	/// Account email.
	pub email: String,
	/// Granted role.
	pub role: Role,
}
impl From<&Claims> for ForwardedIdentity {
	fn from(claims: &Claims) -> Self {
		Self { id: claims.id.clone(), email: claims.email.clone(), role: claims.role }
	}
}

/// Outcome of evaluating one navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
	/// Serve the request; carries forwarded identity context when one is authenticated.
	Allow {
		/// Identity context for downstream consumers; `None` on public paths.
		context: Option<ForwardedIdentity>,
	},
	/// Do not serve the request; send the browser to `target` instead.
	Redirect {
		/// Location to send the browser to.
		target: RedirectTarget,
	},
}

/// Full per-request decision, including the credential-clear side effect.
///
/// Clearing is requested only for access-denied outcomes, where leaving the cookie in
/// place would bounce the browser between login and the denied path forever.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationDecision {
	/// Allow or redirect verdict.
	pub verdict: Verdict,
	/// Instructs the caller to delete the credential cookie alongside the response.
	pub clear_credential: bool,
}
impl AuthorizationDecision {
	/// Allows an unauthenticated request (public or bypassed path).
	pub fn allow_public() -> Self {
		Self { verdict: Verdict::Allow { context: None }, clear_credential: false }
	}

	/// Allows an authenticated request, forwarding identity context.
	pub fn allow_as(context: ForwardedIdentity) -> Self {
		Self { verdict: Verdict::Allow { context: Some(context) }, clear_credential: false }
	}

	/// Redirects without touching the credential.
	pub fn redirect(target: RedirectTarget) -> Self {
		Self { verdict: Verdict::Redirect { target }, clear_credential: false }
	}

	/// Redirects and instructs the caller to purge the credential cookie.
	pub fn redirect_and_clear(target: RedirectTarget) -> Self {
		Self { verdict: Verdict::Redirect { target }, clear_credential: true }
	}

	/// Returns `true` when the request may be served.
	pub fn is_allowed(&self) -> bool {
		matches!(self.verdict, Verdict::Allow { .. })
	}

	/// Rendered redirect location, when the verdict is a redirect.
	pub fn redirect_location(&self) -> Option<String> {
		match &self.verdict {
			Verdict::Redirect { target } => Some(target.render()),
			Verdict::Allow { .. } => None,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn render_percent_encodes_query_values() {
		let target = RedirectTarget::login_with_return("/login", "/dispatch-orders");

		assert_eq!(target.render(), "/login?redirect=%2Fdispatch-orders");

		let denied = RedirectTarget::login_with_reason("/login", RedirectReason::AccessDenied);

		assert_eq!(denied.render(), "/login?error=access_denied");
	}

	#[test]
	fn bare_targets_render_without_query() {
		assert_eq!(RedirectTarget::to("/unauthorized").render(), "/unauthorized");
	}

	#[test]
	fn decision_helpers_set_side_effects() {
		let clearing =
			AuthorizationDecision::redirect_and_clear(RedirectTarget::to("/login"));

		assert!(clearing.clear_credential);
		assert!(!clearing.is_allowed());
		assert_eq!(clearing.redirect_location().as_deref(), Some("/login"));

		let public = AuthorizationDecision::allow_public();

		assert!(public.is_allowed());
		assert!(!public.clear_credential);
		assert_eq!(public.redirect_location(), None);
	}
}
