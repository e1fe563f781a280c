//! Rust's turnkey portal gatekeeper - longest-prefix route authorization, optimistic session
//! bootstrap, and coalesced background refresh in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod http;
pub mod jwt;
pub mod obs;
pub mod policy;
pub mod routes;
pub mod session;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience fixtures and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use jsonwebtoken::{EncodingKey, Header};
	// self
	use crate::{
		auth::{Claims, PermissionSet, Role, SubjectId},
		jwt::JwtVerifier,
	};
	#[cfg(feature = "reqwest")]
	use crate::{
		http::{BackendDescriptor, ReqwestIdentityClient},
		policy::PortalPolicy,
		session::Session,
		store::{CredentialStore, MemoryStore},
	};

	/// Signing secret shared by every test fixture in this crate.
	pub const TEST_SECRET: &[u8] = b"portal-guard-test-secret";

	#[cfg(feature = "reqwest")]
	/// Session type alias used by reqwest-backed integration tests.
	pub type ReqwestTestSession = Session<ReqwestIdentityClient>;

	/// Builds a claims fixture for the provided role that expires one hour from now.
	pub fn sample_claims(role: Role) -> Claims {
		// Claims timestamps serialize as epoch seconds, so the fixture instant must be whole
		// seconds for a signed round-trip to compare equal; `now_utc()` carries sub-second
		// nanoseconds that the wire format truncates.
		let now = OffsetDateTime::now_utc()
			.replace_nanosecond(0)
			.expect("Zero nanoseconds is always a valid component.");

		sample_claims_expiring(role, now + Duration::hours(1))
	}

	/// Builds a claims fixture for the provided role and absolute expiry instant.
	pub fn sample_claims_expiring(role: Role, expires_at: OffsetDateTime) -> Claims {
		Claims {
			id: SubjectId::new("user-1").expect("Subject fixture should be valid."),
			name: "Test User".into(),
			email: "user@example.com".into(),
			role,
			permissions: PermissionSet::new(["expense.read", "expense.write"])
				.expect("Permission fixture should be valid."),
			exp: expires_at,
			iat: Some(expires_at - Duration::days(1)),
		}
	}

	/// Signs the provided claims with [`TEST_SECRET`], producing a cookie-ready credential.
	pub fn issue_token(claims: &Claims) -> String {
		jsonwebtoken::encode(&Header::default(), claims, &EncodingKey::from_secret(TEST_SECRET))
			.expect("Test token should encode successfully.")
	}

	/// Builds an HS256 verifier wired to [`TEST_SECRET`].
	pub fn test_verifier() -> JwtVerifier {
		JwtVerifier::hs256(TEST_SECRET)
	}

	#[cfg(feature = "reqwest")]
	/// Builds a reqwest-backed identity client pointed at an `httpmock` server base URL.
	pub fn test_reqwest_identity_client(base: &str) -> ReqwestIdentityClient {
		let descriptor = BackendDescriptor::builder(
			Url::parse(base).expect("Mock backend base URL should parse successfully."),
		)
		.build()
		.expect("Mock backend descriptor should build successfully.");

		ReqwestIdentityClient::new(descriptor)
			.expect("Reqwest identity client should build successfully.")
	}

	#[cfg(feature = "reqwest")]
	/// Constructs a [`Session`] backed by an in-memory credential store, the default portal
	/// policy, and the reqwest transport used across integration tests.
	pub fn build_reqwest_test_session(base: &str) -> (ReqwestTestSession, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let session = Session::with_identity_client(
			store,
			PortalPolicy::default(),
			test_reqwest_identity_client(base),
		);

		(session, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeSet,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::{Hash, Hasher},
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use jsonwebtoken;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, portal_guard as _};
