//! Gatekeeper-level error types shared across the authorizer, session, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gatekeeper error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The presented credential is missing, malformed, expired, or forged.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The account has no access to this portal.
	#[error("Account has no access to this portal: {reason}.")]
	AccessDenied {
		/// Backend- or policy-supplied reason string surfaced to the user.
		reason: String,
	},
	/// The login collaborator rejected the submitted credentials.
	#[error("Login was rejected: {reason}.")]
	LoginRejected {
		/// Backend-supplied human-readable message.
		reason: String,
	},
}

/// Configuration and validation failures raised while wiring the gatekeeper.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Backend base URL must use HTTPS outside loopback development hosts.
	#[error("Backend endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Route prefixes and redirect targets must be absolute paths.
	#[error("Path `{path}` must begin with '/'.")]
	RelativePath {
		/// Offending path value.
		path: String,
	},
	/// Two rules were registered for the same prefix.
	#[error("Route prefix `{prefix}` is registered twice.")]
	DuplicateRoutePrefix {
		/// Prefix that collided.
		prefix: String,
	},
	/// A rule constraint was supplied without any entries.
	#[error("Route rule for `{prefix}` has an empty requirement set.")]
	EmptyRequirement {
		/// Prefix whose rule is degenerate.
		prefix: String,
	},
	/// Requested permissions cannot be normalized.
	#[error("Configured permissions are invalid.")]
	InvalidPermission(#[from] crate::auth::PermissionValidationError),
}
#[cfg(feature = "reqwest")]
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Credential decode/verify failures.
///
/// The route authorizer never surfaces these to callers; they degrade to login redirects.
/// The session layer converts them into sign-out reasons.
#[derive(Debug, ThisError)]
pub enum CredentialError {
	/// No credential was presented.
	#[error("No credential is present.")]
	Missing,
	/// The credential's expiry instant is not strictly in the future.
	#[error("Credential has expired.")]
	Expired,
	/// The token is not a well-formed compact JWT (segments, base64, UTF-8).
	#[error("Credential is not a well-formed token.")]
	MalformedStructure,
	/// The payload segment decoded but does not match the expected claims shape.
	#[error("Credential payload does not match the expected claims.")]
	MalformedPayload {
		/// Structured parsing failure pointing at the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Header or signature verification failed.
	#[error("Credential failed signature verification.")]
	Verification {
		/// Underlying verifier failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Backend returned an unexpected but non-fatal response.
	#[error("Identity endpoint returned an unexpected response: {message}.")]
	Backend {
		/// Backend-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Backend responded with malformed JSON that could not be parsed.
	#[error("Identity endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the identity endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the identity endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		Self::network(e)
	}
}

impl Error {
	/// Returns `true` when the failure is a transient/transport hiccup that background
	/// refreshes must swallow without touching session state.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Self::Transient(_) | Self::Transport(_))
	}
}
