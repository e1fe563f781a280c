//! In-memory identity representation and the session trust state machine.
//!
//! Lifecycle: `Unknown -> Authenticated(Provisional)` on a successful local decode,
//! `Provisional -> Confirmed` once the backend re-validates, `-> SignedOut` whenever the
//! credential is missing/expired/denied or the user logs out. `Confirmed` can absorb any
//! number of refreshes without transitioning unless access is revoked.

// self
use crate::{
	_prelude::*,
	auth::{Claims, PermissionSet, Role, SubjectId},
	http::UserProfile,
};

/// Current user as held in process-wide session state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Subject identifier.
	pub id: SubjectId,
	/// Display name.
	pub name: String,
	/// Account email.
	pub email: String,
	/// Granted role.
	pub role: Role,
	/// Granted permission set.
	pub permissions: PermissionSet,
}
impl From<&Claims> for Identity {
	fn from(claims: &Claims) -> Self {
		Self {
			id: claims.id.clone(),
			name: claims.name.clone(),
			email: claims.email.clone(),
			role: claims.role,
			permissions: claims.permissions.clone(),
		}
	}
}
impl From<UserProfile> for Identity {
	fn from(profile: UserProfile) -> Self {
		Self {
			id: profile.id,
			name: profile.name,
			email: profile.email,
			role: profile.role,
			permissions: profile.permissions,
		}
	}
}

/// How much the current identity can be trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trust {
	/// Derived from a local decode only; not yet backend-validated.
	Provisional,
	/// Re-validated against the backend.
	Confirmed,
}
impl Trust {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Trust::Provisional => "provisional",
			Trust::Confirmed => "confirmed",
		}
	}
}
impl Display for Trust {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Why a session ended up signed out; surfaced to the login UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignOutReason {
	/// The user logged out explicitly.
	LoggedOut,
	/// No credential was persisted.
	MissingCredential,
	/// The persisted credential could not be decoded.
	InvalidCredential,
	/// The persisted credential had expired.
	Expired,
	/// The account has no access to this portal.
	AccessDenied,
}
impl SignOutReason {
	/// Returns a stable label suitable for query parameters or banners.
	pub const fn as_str(self) -> &'static str {
		match self {
			SignOutReason::LoggedOut => "logged_out",
			SignOutReason::MissingCredential => "missing_credential",
			SignOutReason::InvalidCredential => "invalid_credential",
			SignOutReason::Expired => "expired",
			SignOutReason::AccessDenied => "access_denied",
		}
	}
}
impl Display for SignOutReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Session lifecycle state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
	/// Bootstrap has not run yet.
	Unknown,
	/// No authenticated identity.
	SignedOut {
		/// Why the session is signed out.
		reason: SignOutReason,
	},
	/// An identity is populated.
	Authenticated {
		/// The current identity.
		identity: Identity,
		/// Trust level of the identity.
		trust: Trust,
	},
}
impl SessionState {
	/// Returns the identity when one is populated.
	pub fn identity(&self) -> Option<&Identity> {
		match self {
			SessionState::Authenticated { identity, .. } => Some(identity),
			_ => None,
		}
	}

	/// Returns the trust level when an identity is populated.
	pub fn trust(&self) -> Option<Trust> {
		match self {
			SessionState::Authenticated { trust, .. } => Some(*trust),
			_ => None,
		}
	}

	/// Returns `true` when an identity is populated, provisional or confirmed.
	pub fn is_authenticated(&self) -> bool {
		matches!(self, SessionState::Authenticated { .. })
	}
}
