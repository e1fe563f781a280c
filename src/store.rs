//! Storage contracts and built-in stores for the persisted portal credential.
//!
//! The store is the crate's cookie-jar seam: browsers keep the credential in a cookie,
//! desktop shells keep it in a file, tests keep it in memory. All of them expose the same
//! save/load/clear contract to the session layer.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::CredentialSecret};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the portal credential.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the credential.
	fn save(&self, credential: CredentialSecret) -> StoreFuture<'_, ()>;

	/// Fetches the persisted credential, if present.
	fn load(&self) -> StoreFuture<'_, Option<CredentialSecret>>;

	/// Deletes the persisted credential, returning the evicted value when present.
	///
	/// Clearing an already-empty store succeeds and returns `None`.
	fn clear(&self) -> StoreFuture<'_, Option<CredentialSecret>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
