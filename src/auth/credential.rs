//! Credential secret wrapper and cookie persistence settings.

// self
use crate::_prelude::*;

/// Redacted credential wrapper keeping the signed token out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSecret(String);
impl CredentialSecret {
	/// Wraps a new credential string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for CredentialSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for CredentialSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CredentialSecret").field(&"<redacted>").finish()
	}
}
impl Display for CredentialSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// `SameSite` cookie attribute values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
	/// Cookie is only sent on same-site requests.
	Strict,
	/// Cookie is sent on top-level cross-site navigations.
	Lax,
	/// Cookie is sent on all requests (requires `Secure`).
	None,
}
impl SameSite {
	/// Returns the attribute value as it appears in a `Set-Cookie` header.
	pub const fn as_str(self) -> &'static str {
		match self {
			SameSite::Strict => "Strict",
			SameSite::Lax => "Lax",
			SameSite::None => "None",
		}
	}
}
impl Display for SameSite {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Attributes for the credential cookie.
///
/// The credential is deliberately readable by in-browser code (the session bootstrapper
/// decodes it locally), so no `HttpOnly` flag is emitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieSettings {
	/// Cookie name carrying the credential.
	pub name: String,
	/// Lifetime advertised to the browser.
	pub max_age: Duration,
	/// Restricts the cookie to HTTPS transport.
	pub secure: bool,
	/// Cross-site send policy.
	pub same_site: SameSite,
}
impl CookieSettings {
	/// Overrides the cookie name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();

		self
	}

	/// Overrides the advertised lifetime.
	pub fn with_max_age(mut self, max_age: Duration) -> Self {
		self.max_age = max_age;

		self
	}

	/// Disables the `Secure` attribute for plain-HTTP development setups.
	pub fn insecure_for_development(mut self) -> Self {
		self.secure = false;

		self
	}

	/// Renders a `Set-Cookie` header value persisting the provided credential.
	pub fn persist_header(&self, credential: &CredentialSecret) -> String {
		let mut header = format!(
			"{}={}; Max-Age={}; Path=/",
			self.name,
			credential.expose(),
			self.max_age.whole_seconds()
		);

		if self.secure {
			header.push_str("; Secure");
		}

		header.push_str("; SameSite=");
		header.push_str(self.same_site.as_str());

		header
	}

	/// Renders a `Set-Cookie` header value deleting the credential cookie.
	///
	/// Attributes other than the lifetime must match [`persist_header`](Self::persist_header)
	/// so browsers target the same cookie.
	pub fn removal_header(&self) -> String {
		let mut header = format!("{}=; Max-Age=0; Path=/", self.name);

		if self.secure {
			header.push_str("; Secure");
		}

		header.push_str("; SameSite=");
		header.push_str(self.same_site.as_str());

		header
	}
}
impl Default for CookieSettings {
	fn default() -> Self {
		Self {
			name: "auth_token".into(),
			max_age: Duration::days(1),
			secure: true,
			same_site: SameSite::Strict,
		}
	}
}
