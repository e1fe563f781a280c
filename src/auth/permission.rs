//! Permission modeling helpers used across the gatekeeper.

// std
use std::{
	cmp::Ordering,
	collections::BTreeSet,
	hash::{Hash, Hasher},
	sync::OnceLock,
};
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Errors emitted when validating permissions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum PermissionValidationError {
	/// Empty permission entries are not allowed.
	#[error("Permission entries cannot be empty.")]
	Empty,
	/// Permissions cannot contain embedded whitespace characters.
	#[error("Permission contains whitespace: {permission}.")]
	ContainsWhitespace {
		/// The offending permission string.
		permission: String,
	},
}

/// Normalized set of permission grants with a stable fingerprint cache.
///
/// Permissions are deduplicated and sorted so equality, ordering, and hashing remain
/// consistent regardless of the order the backend emits them. The
/// [`fingerprint`](Self::fingerprint) helper lazily caches a base64 (no padding) SHA-256
/// digest of the normalized string, letting diagnostics reference a grant set without
/// dumping its contents, and the [`Hash`] implementation reuses that cache.
#[derive(Default)]
pub struct PermissionSet {
	/// The normalized permissions.
	pub permissions: Arc<[String]>,
	/// The fingerprint of the normalized permissions.
	pub fingerprint_cache: OnceLock<String>,
}
impl PermissionSet {
	/// Creates a normalized permission set from any iterator.
	pub fn new<I, S>(permissions: I) -> Result<Self, PermissionValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self { permissions: normalize(permissions)?, fingerprint_cache: OnceLock::new() })
	}

	/// Number of distinct permissions.
	pub fn len(&self) -> usize {
		self.permissions.len()
	}

	/// Returns true if no permissions are granted.
	pub fn is_empty(&self) -> bool {
		self.permissions.is_empty()
	}

	/// Returns true if the normalized set contains the provided permission.
	pub fn contains(&self, permission: &str) -> bool {
		self.permissions.binary_search_by(|candidate| candidate.as_str().cmp(permission)).is_ok()
	}

	/// Returns true if the set shares at least one permission with `other`.
	///
	/// Route rules are satisfied by holding ANY of the required permissions, so this is
	/// the check the authorizer performs.
	pub fn intersects(&self, other: &PermissionSet) -> bool {
		let (probe, reference) =
			if self.len() <= other.len() { (self, other) } else { (other, self) };

		probe.iter().any(|permission| reference.contains(permission))
	}

	/// Iterator over normalized permissions.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.permissions.iter().map(|s| s.as_str())
	}

	/// Returns the normalized string representation (space-delimited).
	pub fn normalized(&self) -> String {
		self.permissions.join(" ")
	}

	/// Stable fingerprint derived from the normalized permission list.
	///
	/// The fingerprint is a base64 (no padding) encoding of the SHA-256 digest for the
	/// normalized, space-delimited permission string and is cached after the first
	/// calculation.
	pub fn fingerprint(&self) -> String {
		self.fingerprint_cache.get_or_init(|| compute_fingerprint(&self.permissions)).clone()
	}

	/// Returns the underlying slice of permission strings.
	pub fn as_slice(&self) -> &[String] {
		&self.permissions
	}
}
impl Clone for PermissionSet {
	fn clone(&self) -> Self {
		Self { permissions: self.permissions.clone(), fingerprint_cache: OnceLock::new() }
	}
}
impl PartialEq for PermissionSet {
	fn eq(&self, other: &Self) -> bool {
		self.permissions == other.permissions
	}
}
impl Eq for PermissionSet {}
impl PartialOrd for PermissionSet {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
impl Ord for PermissionSet {
	fn cmp(&self, other: &Self) -> Ordering {
		self.permissions.cmp(&other.permissions)
	}
}
impl Hash for PermissionSet {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.fingerprint_cache.get_or_init(|| compute_fingerprint(&self.permissions)).hash(state);
	}
}
impl Debug for PermissionSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("PermissionSet").field(&self.permissions).finish()
	}
}
impl Display for PermissionSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}
impl TryFrom<Vec<String>> for PermissionSet {
	type Error = PermissionValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for PermissionSet {
	type Err = PermissionValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(PermissionValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}
impl Serialize for PermissionSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.permissions.len()))?;

		for permission in self.permissions.iter() {
			seq.serialize_element(permission)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for PermissionSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		PermissionSet::new(values).map_err(DeError::custom)
	}
}

fn normalize<I, S>(permissions: I) -> Result<Arc<[String]>, PermissionValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut set = BTreeSet::new();

	for permission in permissions {
		let owned: String = permission.into();

		if owned.is_empty() {
			return Err(PermissionValidationError::Empty);
		}
		if owned.chars().any(char::is_whitespace) {
			return Err(PermissionValidationError::ContainsWhitespace { permission: owned });
		}

		set.insert(owned);
	}

	Ok(Arc::from(set.into_iter().collect::<Vec<_>>()))
}

fn compute_fingerprint(permissions: &[String]) -> String {
	let normalized = permissions.join(" ");
	let mut hasher = Sha256::new();

	hasher.update(normalized.as_bytes());

	let digest = hasher.finalize();

	STANDARD_NO_PAD.encode(digest)
}
