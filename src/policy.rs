//! Portal-access policy: which roles may use this portal at all, and which bypass
//! permission rules.
//!
//! Portal access has two sources of truth that are deliberately kept apart. The route
//! authorizer only sees the cookie, whose claims lack a portal-access list, so it applies
//! the role denylist here. The session layer sees the login/identity response bodies and
//! additionally enforces the real allowlist via [`PortalPolicy::allows_portal`]. An account
//! whose role passes the denylist but whose scopes omit this portal is therefore admitted
//! by the authorizer and signed out by the first background refresh.

// self
use crate::{
	_prelude::*,
	auth::{PortalId, Role},
};

/// Access policy for one application portal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalPolicy {
	/// Scope identifier accounts must hold to use this portal.
	pub portal: PortalId,
	/// Roles denied portal access outright, regardless of any other claim.
	pub restricted_roles: BTreeSet<Role>,
	/// Roles that satisfy every permission rule without holding the permissions.
	pub permission_bypass_roles: BTreeSet<Role>,
}
impl PortalPolicy {
	/// Creates a policy for the provided portal scope with the default role sets.
	pub fn new(portal: PortalId) -> Self {
		Self { portal, ..Default::default() }
	}

	/// Replaces the restricted-role denylist.
	pub fn with_restricted_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
		self.restricted_roles = roles.into_iter().collect();

		self
	}

	/// Replaces the permission-bypass role set.
	pub fn with_permission_bypass_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
		self.permission_bypass_roles = roles.into_iter().collect();

		self
	}

	/// Returns `true` when the role is allowed to use the portal at all.
	pub fn role_allows(&self, role: Role) -> bool {
		!self.restricted_roles.contains(&role)
	}

	/// Returns `true` when the role satisfies permission rules unconditionally.
	pub fn bypasses_permission_rules(&self, role: Role) -> bool {
		self.permission_bypass_roles.contains(&role)
	}

	/// Returns `true` when the backend-reported scope list grants this portal.
	pub fn allows_portal(&self, portal_access: &[PortalId]) -> bool {
		portal_access.contains(&self.portal)
	}
}
impl Default for PortalPolicy {
	fn default() -> Self {
		Self {
			portal: PortalId::new("crm").expect("Default portal identifier should be valid."),
			restricted_roles: BTreeSet::from([Role::Supplier, Role::Distributor, Role::Buyer]),
			permission_bypass_roles: BTreeSet::from([Role::SuperAdmin]),
		}
	}
}
