//! Transport primitives for the identity backend.
//!
//! The module exposes [`IdentityClient`] as the crate's only dependency on an HTTP stack.
//! Callers provide an implementation (typically behind `Arc<T>`); the built-in
//! [`ReqwestIdentityClient`] covers the default stack behind the `reqwest` feature. Login
//! and register failures surface as rejections with the backend's message; `me`/`renew`
//! failures stay transient so background refreshes can swallow them.

// self
use crate::{
	_prelude::*,
	auth::{CredentialSecret, PermissionSet, PortalId, Role, SubjectId},
	error::ConfigError,
};
#[cfg(feature = "reqwest")]
use crate::error::{TransientError, TransportError};

/// Boxed future returned by [`IdentityClient`] operations.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Contract for the backend identity collaborator.
pub trait IdentityClient
where
	Self: Send + Sync,
{
	/// Exchanges credentials for a signed token and user profile.
	fn login<'a>(&'a self, request: &'a LoginRequest) -> ClientFuture<'a, AuthPayload>;

	/// Registers a new account, returning the same payload as a login.
	fn register<'a>(&'a self, request: &'a RegisterRequest) -> ClientFuture<'a, AuthPayload>;

	/// Fetches the authoritative profile for the credential's subject.
	fn me<'a>(&'a self, credential: &'a CredentialSecret) -> ClientFuture<'a, UserProfile>;

	/// Rotates the credential, returning a freshly signed replacement.
	fn renew<'a>(&'a self, credential: &'a CredentialSecret) -> ClientFuture<'a, CredentialSecret>;
}

/// Login request body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
	/// Account email.
	pub email: String,
	/// Account password; kept out of logs.
	pub password: String,
}
impl LoginRequest {
	/// Creates a login request.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Registration request body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
	/// Display name.
	pub name: String,
	/// Account email.
	pub email: String,
	/// Account password; kept out of logs.
	pub password: String,
}
impl Debug for RegisterRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RegisterRequest")
			.field("name", &self.name)
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Authoritative user profile as reported by the backend.
///
/// Unlike credential claims, this carries the portal-access allowlist, which is the real
/// source of truth for access-scope enforcement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
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
	/// Portals this account may use.
	#[serde(default, rename = "portalAccess")]
	pub portal_access: Vec<PortalId>,
}

/// Payload returned by the login and register collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
	/// Freshly signed credential.
	pub token: CredentialSecret,
	/// Profile for the authenticated account.
	pub user: UserProfile,
}

/// Validated backend endpoint configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendDescriptor {
	/// Login endpoint (`POST`).
	pub login: Url,
	/// Register endpoint (`POST`).
	pub register: Url,
	/// Identity-lookup endpoint (`GET`).
	pub me: Url,
	/// Credential-renewal endpoint (`POST`).
	pub renew: Url,
}
impl BackendDescriptor {
	/// Returns a builder seeded with the conventional `/auth/*` endpoint paths.
	pub fn builder(base: Url) -> BackendDescriptorBuilder {
		BackendDescriptorBuilder {
			base,
			login_path: "/auth/login".into(),
			register_path: "/auth/register".into(),
			me_path: "/auth/me".into(),
			renew_path: "/auth/refresh".into(),
		}
	}
}

/// Builder for [`BackendDescriptor`] values.
#[derive(Clone, Debug)]
pub struct BackendDescriptorBuilder {
	/// Base URL of the identity backend.
	pub base: Url,
	/// Path of the login endpoint.
	pub login_path: String,
	/// Path of the register endpoint.
	pub register_path: String,
	/// Path of the identity-lookup endpoint.
	pub me_path: String,
	/// Path of the credential-renewal endpoint.
	pub renew_path: String,
}
impl BackendDescriptorBuilder {
	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the register endpoint path.
	pub fn register_path(mut self, path: impl Into<String>) -> Self {
		self.register_path = path.into();

		self
	}

	/// Overrides the identity-lookup endpoint path.
	pub fn me_path(mut self, path: impl Into<String>) -> Self {
		self.me_path = path.into();

		self
	}

	/// Overrides the credential-renewal endpoint path.
	pub fn renew_path(mut self, path: impl Into<String>) -> Self {
		self.renew_path = path.into();

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	///
	/// HTTPS is mandatory except for loopback hosts, which keeps local development and
	/// `httpmock`-backed tests workable without weakening production deployments.
	pub fn build(self) -> Result<BackendDescriptor, ConfigError> {
		validate_base(&self.base)?;

		let descriptor = BackendDescriptor {
			login: join_endpoint(&self.base, &self.login_path)?,
			register: join_endpoint(&self.base, &self.register_path)?,
			me: join_endpoint(&self.base, &self.me_path)?,
			renew: join_endpoint(&self.base, &self.renew_path)?,
		};

		Ok(descriptor)
	}
}

fn validate_base(base: &Url) -> Result<(), ConfigError> {
	let loopback = matches!(base.host_str(), Some("localhost" | "127.0.0.1" | "[::1]" | "::1"));

	if base.scheme() == "https" || loopback {
		Ok(())
	} else {
		Err(ConfigError::InsecureEndpoint { url: base.to_string() })
	}
}

fn join_endpoint(base: &Url, path: &str) -> Result<Url, ConfigError> {
	if !path.starts_with('/') {
		return Err(ConfigError::RelativePath { path: path.to_owned() });
	}

	base.join(path).map_err(|_| ConfigError::RelativePath { path: path.to_owned() })
}

#[cfg(feature = "reqwest")]
pub use reqwest_client::ReqwestIdentityClient;
#[cfg(feature = "reqwest")]
mod reqwest_client {
	// crates.io
	use serde::de::DeserializeOwned;
	// self
	use super::*;

	/// Backend-reported failure body (`{"message": "..."}`).
	#[derive(Deserialize)]
	struct ErrorBody {
		message: Option<String>,
	}

	/// How a non-2xx response should surface to callers.
	#[derive(Clone, Copy)]
	enum FailureMode {
		/// Interactive exchange; the backend's message is the user-facing rejection.
		Rejection,
		/// Opportunistic exchange; failures stay transient and swallowable.
		Transient,
	}

	/// [`IdentityClient`] backed by reqwest.
	///
	/// Identity requests never follow redirects; the backend answers its endpoints
	/// directly, and a redirect usually indicates a proxy misconfiguration worth surfacing.
	#[derive(Clone, Debug)]
	pub struct ReqwestIdentityClient {
		client: ReqwestClient,
		descriptor: BackendDescriptor,
	}
	impl ReqwestIdentityClient {
		/// Builds a client with the crate's default reqwest configuration.
		pub fn new(descriptor: BackendDescriptor) -> Result<Self> {
			let client = ReqwestClient::builder()
				.redirect(reqwest::redirect::Policy::none())
				.build()
				.map_err(ConfigError::from)?;

			Ok(Self { client, descriptor })
		}

		/// Wraps an existing reqwest client.
		pub fn with_client(client: ReqwestClient, descriptor: BackendDescriptor) -> Self {
			Self { client, descriptor }
		}

		async fn execute<T>(
			&self,
			request: reqwest::RequestBuilder,
			mode: FailureMode,
		) -> Result<T>
		where
			T: DeserializeOwned,
		{
			let response = request.send().await.map_err(TransportError::from)?;
			let status = response.status();
			let bytes = response.bytes().await.map_err(TransportError::from)?;

			if !status.is_success() {
				let message = serde_json::from_slice::<ErrorBody>(&bytes)
					.ok()
					.and_then(|body| body.message)
					.unwrap_or_else(|| status.to_string());

				return Err(match mode {
					FailureMode::Rejection if status.is_client_error() =>
						Error::LoginRejected { reason: message },
					_ => TransientError::Backend {
						message,
						status: Some(status.as_u16()),
					}
					.into(),
				});
			}

			let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

			serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
				TransientError::ResponseParse { source, status: Some(status.as_u16()) }.into()
			})
		}

		fn bearer(
			&self,
			request: reqwest::RequestBuilder,
			credential: &CredentialSecret,
		) -> reqwest::RequestBuilder {
			request.bearer_auth(credential.expose())
		}
	}
	impl IdentityClient for ReqwestIdentityClient {
		fn login<'a>(&'a self, request: &'a LoginRequest) -> ClientFuture<'a, AuthPayload> {
			Box::pin(async move {
				self.execute(
					self.client.post(self.descriptor.login.clone()).json(request),
					FailureMode::Rejection,
				)
				.await
			})
		}

		fn register<'a>(&'a self, request: &'a RegisterRequest) -> ClientFuture<'a, AuthPayload> {
			Box::pin(async move {
				self.execute(
					self.client.post(self.descriptor.register.clone()).json(request),
					FailureMode::Rejection,
				)
				.await
			})
		}

		fn me<'a>(&'a self, credential: &'a CredentialSecret) -> ClientFuture<'a, UserProfile> {
			Box::pin(async move {
				#[derive(Deserialize)]
				struct MeBody {
					user: UserProfile,
				}

				let body: MeBody = self
					.execute(
						self.bearer(self.client.get(self.descriptor.me.clone()), credential),
						FailureMode::Transient,
					)
					.await?;

				Ok(body.user)
			})
		}

		fn renew<'a>(
			&'a self,
			credential: &'a CredentialSecret,
		) -> ClientFuture<'a, CredentialSecret> {
			Box::pin(async move {
				#[derive(Deserialize)]
				struct RenewBody {
					token: CredentialSecret,
				}

				let body: RenewBody = self
					.execute(
						self.bearer(self.client.post(self.descriptor.renew.clone()), credential),
						FailureMode::Transient,
					)
					.await?;

				Ok(body.token)
			})
		}
	}
}
