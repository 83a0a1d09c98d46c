use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;

use transmuta_core::HandleId;

/// Owns the memory behind the display/result handles the core mints.
///
/// The core only invents ids and emits register/release effects; this store
/// is where the backing buffers actually live and die. Every registered
/// handle must be revoked when its item is removed or the collection is
/// cleared, or the buffer outlives its owner.
#[derive(Debug, Default)]
pub struct HandleStore {
    buffers: Mutex<HashMap<HandleId, Bytes>>,
}

impl HandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handle: HandleId, bytes: Bytes) {
        self.lock().insert(handle, bytes);
    }

    /// Releases one handle; revoking an unknown or already-revoked handle is
    /// a no-op.
    pub fn revoke(&self, handle: HandleId) {
        self.lock().remove(&handle);
    }

    pub fn revoke_all(&self) {
        self.lock().clear();
    }

    /// Resolves a handle to its backing bytes, if still registered.
    pub fn get(&self, handle: HandleId) -> Option<Bytes> {
        self.lock().get(&handle).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<HandleId, Bytes>> {
        self.buffers.lock().unwrap_or_else(|err| err.into_inner())
    }
}
