//! Decoded credential claims and deterministic lifecycle checks.

// self
use crate::{
	_prelude::*,
	auth::{PermissionSet, Role, SubjectId},
};

/// Claims payload carried by the signed portal credential.
///
/// Portal access is intentionally NOT part of the claims; it only exists in the
/// login/identity response bodies, so cookie-only consumers approximate it with the
/// role denylist in [`PortalPolicy`](crate::policy::PortalPolicy).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
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
	/// Expiry instant (epoch seconds on the wire).
	#[serde(with = "time::serde::timestamp")]
	pub exp: OffsetDateTime,
	/// Issued-at instant, when the backend stamps one.
	#[serde(default, with = "time::serde::timestamp::option")]
	pub iat: Option<OffsetDateTime>,
}

/// Lifecycle status of a credential's claims at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialStatus {
	/// Expiry is strictly in the future.
	Active,
	/// Expiry has been reached or passed.
	Expired,
}

impl Claims {
	/// Computes the lifecycle status at a given instant.
	///
	/// A credential is valid only while its expiry is strictly in the future; an expiry
	/// equal to `instant` already counts as expired.
	pub fn status_at(&self, instant: OffsetDateTime) -> CredentialStatus {
		if instant < self.exp { CredentialStatus::Active } else { CredentialStatus::Expired }
	}

	/// Returns `true` if the claims are active at the provided instant.
	pub fn is_active_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), CredentialStatus::Active)
	}

	/// Returns `true` if the claims have expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), CredentialStatus::Expired)
	}

	/// Remaining validity window at the provided instant; zero once expired.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		if instant >= self.exp { Duration::ZERO } else { self.exp - instant }
	}
}
