//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::CredentialSecret,
	store::{CredentialStore, StoreError, StoreFuture},
};

type Slot = Arc<RwLock<Option<CredentialSecret>>>;

/// Thread-safe storage backend that keeps the credential in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Slot);
impl MemoryStore {
	fn save_now(slot: Slot, credential: CredentialSecret) -> Result<(), StoreError> {
		*slot.write() = Some(credential);

		Ok(())
	}

	fn load_now(slot: Slot) -> Option<CredentialSecret> {
		slot.read().clone()
	}

	fn clear_now(slot: Slot) -> Option<CredentialSecret> {
		slot.write().take()
	}
}
impl CredentialStore for MemoryStore {
	fn save(&self, credential: CredentialSecret) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::save_now(slot, credential) })
	}

	fn load(&self) -> StoreFuture<'_, Option<CredentialSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::load_now(slot)) })
	}

	fn clear(&self) -> StoreFuture<'_, Option<CredentialSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::clear_now(slot)) })
	}
}
