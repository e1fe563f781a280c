//! Static route table: per-prefix requirements plus the portal's fixed navigation targets.

// self
use crate::{
	_prelude::*,
	auth::{PermissionSet, Role},
	error::ConfigError,
};

/// Authorization requirement attached to a path prefix.
///
/// A missing constraint means "any authenticated identity". When both constraints are
/// present the role check runs first; permission checks are satisfied by holding ANY of
/// the required permissions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
	/// Path prefix the rule applies to, matched on segment boundaries.
	pub prefix: String,
	/// Roles allowed to enter, when restricted.
	pub required_roles: Option<BTreeSet<Role>>,
	/// Permissions (any-of) required to enter, when restricted.
	pub required_permissions: Option<PermissionSet>,
}
impl RouteRule {
	/// Starts an unrestricted rule for the provided prefix.
	pub fn for_prefix(prefix: impl Into<String>) -> Self {
		Self { prefix: prefix.into(), required_roles: None, required_permissions: None }
	}

	/// Restricts the rule to the provided roles.
	pub fn require_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
		self.required_roles = Some(roles.into_iter().collect());

		self
	}

	/// Restricts the rule to identities holding any of the provided permissions.
	pub fn require_permissions(mut self, permissions: PermissionSet) -> Self {
		self.required_permissions = Some(permissions);

		self
	}
}

/// Immutable routing policy consulted on every navigation.
///
/// Rule lookup is explicit longest-prefix match on path segment boundaries, so a rule for
/// `/buying/return` always beats one for `/buying` regardless of registration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
	/// Per-prefix requirements.
	pub rules: Vec<RouteRule>,
	/// Prefixes served without any check (auth API endpoints).
	pub bypass_prefixes: Vec<String>,
	/// Exact paths reachable without a credential.
	pub public_paths: BTreeSet<String>,
	/// Exact auth-only paths that bounce already-authenticated identities to the landing page.
	pub auth_paths: BTreeSet<String>,
	/// Login page path used as the unauthenticated redirect target.
	pub login_path: String,
	/// Landing page for authenticated identities.
	pub landing_path: String,
	/// Page shown when a rule denies an authenticated identity.
	pub unauthorized_path: String,
}
impl RouteTable {
	/// Returns a builder seeded with the portal's conventional defaults.
	pub fn builder() -> RouteTableBuilder {
		RouteTableBuilder::default()
	}

	/// Returns `true` when the path skips authorization entirely.
	pub fn is_bypassed(&self, path: &str) -> bool {
		self.bypass_prefixes.iter().any(|prefix| prefix_matches(prefix, path))
	}

	/// Returns `true` when the path is reachable without a credential.
	pub fn is_public(&self, path: &str) -> bool {
		self.public_paths.contains(path)
	}

	/// Returns `true` when the path is an auth-only page (login/register).
	pub fn is_auth_path(&self, path: &str) -> bool {
		self.auth_paths.contains(path)
	}

	/// Finds the rule governing `path`, preferring the longest matching prefix.
	pub fn matching_rule(&self, path: &str) -> Option<&RouteRule> {
		self.rules
			.iter()
			.filter(|rule| prefix_matches(&rule.prefix, path))
			.max_by_key(|rule| rule.prefix.len())
	}
}

/// Builder for [`RouteTable`] values.
#[derive(Clone, Debug)]
pub struct RouteTableBuilder {
	/// Per-prefix requirements collected so far.
	pub rules: Vec<RouteRule>,
	/// Prefixes served without any check.
	pub bypass_prefixes: Vec<String>,
	/// Exact paths reachable without a credential.
	pub public_paths: BTreeSet<String>,
	/// Exact auth-only paths.
	pub auth_paths: BTreeSet<String>,
	/// Login page path.
	pub login_path: String,
	/// Landing page path.
	pub landing_path: String,
	/// Unauthorized page path.
	pub unauthorized_path: String,
}
impl RouteTableBuilder {
	/// Registers a rule.
	pub fn rule(mut self, rule: RouteRule) -> Self {
		self.rules.push(rule);

		self
	}

	/// Registers multiple rules.
	pub fn rules<I>(mut self, rules: I) -> Self
	where
		I: IntoIterator<Item = RouteRule>,
	{
		self.rules.extend(rules);

		self
	}

	/// Adds a bypass prefix.
	pub fn bypass_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.bypass_prefixes.push(prefix.into());

		self
	}

	/// Adds a public path.
	pub fn public_path(mut self, path: impl Into<String>) -> Self {
		self.public_paths.insert(path.into());

		self
	}

	/// Adds an auth-only path.
	pub fn auth_path(mut self, path: impl Into<String>) -> Self {
		self.auth_paths.insert(path.into());

		self
	}

	/// Overrides the login page path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the landing page path.
	pub fn landing_path(mut self, path: impl Into<String>) -> Self {
		self.landing_path = path.into();

		self
	}

	/// Overrides the unauthorized page path.
	pub fn unauthorized_path(mut self, path: impl Into<String>) -> Self {
		self.unauthorized_path = path.into();

		self
	}

	/// Consumes the builder and validates the resulting table.
	pub fn build(self) -> Result<RouteTable, ConfigError> {
		let table = RouteTable {
			rules: self.rules,
			bypass_prefixes: self.bypass_prefixes,
			public_paths: self.public_paths,
			auth_paths: self.auth_paths,
			login_path: self.login_path,
			landing_path: self.landing_path,
			unauthorized_path: self.unauthorized_path,
		};

		table.validate()?;

		Ok(table)
	}
}
impl Default for RouteTableBuilder {
	fn default() -> Self {
		Self {
			rules: Vec::new(),
			bypass_prefixes: vec!["/api/auth".into()],
			public_paths: BTreeSet::from(["/login".into(), "/register".into()]),
			auth_paths: BTreeSet::from(["/login".into(), "/register".into()]),
			login_path: "/login".into(),
			landing_path: "/home".into(),
			unauthorized_path: "/unauthorized".into(),
		}
	}
}

impl RouteTable {
	/// Validates invariants for the table.
	fn validate(&self) -> Result<(), ConfigError> {
		let mut seen = BTreeSet::new();

		for rule in &self.rules {
			validate_path(&rule.prefix)?;

			if !seen.insert(rule.prefix.as_str()) {
				return Err(ConfigError::DuplicateRoutePrefix { prefix: rule.prefix.clone() });
			}
			if rule.required_roles.as_ref().is_some_and(BTreeSet::is_empty) {
				return Err(ConfigError::EmptyRequirement { prefix: rule.prefix.clone() });
			}
			if rule.required_permissions.as_ref().is_some_and(PermissionSet::is_empty) {
				return Err(ConfigError::EmptyRequirement { prefix: rule.prefix.clone() });
			}
		}

		for prefix in &self.bypass_prefixes {
			validate_path(prefix)?;
		}
		for path in self.public_paths.iter().chain(self.auth_paths.iter()) {
			validate_path(path)?;
		}

		validate_path(&self.login_path)?;
		validate_path(&self.landing_path)?;
		validate_path(&self.unauthorized_path)?;

		Ok(())
	}
}

fn validate_path(path: &str) -> Result<(), ConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ConfigError::RelativePath { path: path.to_owned() })
	}
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
	if prefix == "/" {
		return true;
	}

	match path.strip_prefix(prefix) {
		Some(rest) => rest.is_empty() || rest.starts_with('/'),
		None => false,
	}
}
