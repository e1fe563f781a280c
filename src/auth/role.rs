//! Closed role vocabulary for the trading portal.
//!
//! Roles are a sum type rather than free-form strings so role-gated branches stay
//! exhaustiveness-checked at compile time. Wire values use kebab-case (`"super-admin"`).

// self
use crate::_prelude::*;

/// Account role granted by the backend and embedded in credential claims.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
	/// Unrestricted operator; satisfies every permission rule.
	SuperAdmin,
	/// Administrative staff.
	Admin,
	/// Branch or department manager.
	Manager,
	/// Regular back-office employee.
	Employee,
	/// Finance staff working the payments ledger.
	Accountant,
	/// External supplier account; no portal access.
	Supplier,
	/// External distributor account; no portal access.
	Distributor,
	/// External buyer account; no portal access.
	Buyer,
}
impl Role {
	/// Every role in declaration order; handy for exhaustive table tests.
	pub const ALL: [Role; 8] = [
		Role::SuperAdmin,
		Role::Admin,
		Role::Manager,
		Role::Employee,
		Role::Accountant,
		Role::Supplier,
		Role::Distributor,
		Role::Buyer,
	];

	/// Returns the stable wire label for the role.
	pub const fn as_str(self) -> &'static str {
		match self {
			Role::SuperAdmin => "super-admin",
			Role::Admin => "admin",
			Role::Manager => "manager",
			Role::Employee => "employee",
			Role::Accountant => "accountant",
			Role::Supplier => "supplier",
			Role::Distributor => "distributor",
			Role::Buyer => "buyer",
		}
	}
}
impl Display for Role {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Role {
	type Err = UnknownRoleError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Role::ALL
			.into_iter()
			.find(|role| role.as_str() == s)
			.ok_or_else(|| UnknownRoleError { value: s.to_owned() })
	}
}

/// Error returned when parsing a role label outside the closed vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
#[error("Unknown role label: {value}.")]
pub struct UnknownRoleError {
	/// The unrecognized label.
	pub value: String,
}
