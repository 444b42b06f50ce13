//! Kernel registry.
//!
//! Maps opaque kernel IDs to live kernels. The gateway only ever calls
//! [`KernelManager::get_kernel`]; registration and removal belong to
//! whatever supervises kernel processes (out of the gateway's scope).

use std::sync::Arc;

use dashmap::DashMap;
use kernelgate_core::KernelId;

use crate::errors::KernelsError;

/// A resolved, live kernel session.
#[derive(Clone, Debug)]
pub struct Kernel {
    /// Identifier the client addressed.
    pub id: KernelId,
    /// Kernel spec name (e.g. `"python3"`).
    pub name: String,
}

/// Resolves kernel IDs to live kernels.
pub trait KernelManager: Send + Sync {
    /// Look up a kernel by ID.
    fn get_kernel(&self, id: &KernelId) -> Result<Arc<Kernel>, KernelsError>;
}

/// In-process kernel registry backed by a concurrent map.
#[derive(Default)]
pub struct InMemoryKernelManager {
    kernels: DashMap<KernelId, Arc<Kernel>>,
}

impl InMemoryKernelManager {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kernel, replacing any existing entry with the same ID.
    pub fn register(&self, kernel: Kernel) -> Arc<Kernel> {
        let kernel = Arc::new(kernel);
        let _ = self.kernels.insert(kernel.id.clone(), kernel.clone());
        kernel
    }

    /// Remove a kernel, returning it if present.
    pub fn remove(&self, id: &KernelId) -> Option<Arc<Kernel>> {
        self.kernels.remove(id).map(|(_, k)| k)
    }

    /// Number of registered kernels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// IDs of all registered kernels.
    #[must_use]
    pub fn ids(&self) -> Vec<KernelId> {
        self.kernels.iter().map(|e| e.key().clone()).collect()
    }
}

impl KernelManager for InMemoryKernelManager {
    fn get_kernel(&self, id: &KernelId) -> Result<Arc<Kernel>, KernelsError> {
        self.kernels
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| KernelsError::KernelNotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn kernel(id: &str) -> Kernel {
        Kernel {
            id: KernelId::parse(id).unwrap(),
            name: "python3".into(),
        }
    }

    #[test]
    fn register_and_get() {
        let mgr = InMemoryKernelManager::new();
        let _ = mgr.register(kernel("a1-b2-c3-d4-e5"));
        let id = KernelId::parse("a1-b2-c3-d4-e5").unwrap();
        let found = mgr.get_kernel(&id).unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.name, "python3");
    }

    #[test]
    fn get_missing_kernel_fails() {
        let mgr = InMemoryKernelManager::new();
        let id = KernelId::parse("a1-b2-c3-d4-e5").unwrap();
        assert_matches!(mgr.get_kernel(&id), Err(KernelsError::KernelNotFound(k)) if k == id);
    }

    #[test]
    fn register_replaces_existing() {
        let mgr = InMemoryKernelManager::new();
        let _ = mgr.register(kernel("a1-b2-c3-d4-e5"));
        let _ = mgr.register(Kernel {
            id: KernelId::parse("a1-b2-c3-d4-e5").unwrap(),
            name: "ir".into(),
        });
        assert_eq!(mgr.len(), 1);
        let id = KernelId::parse("a1-b2-c3-d4-e5").unwrap();
        assert_eq!(mgr.get_kernel(&id).unwrap().name, "ir");
    }

    #[test]
    fn remove_kernel() {
        let mgr = InMemoryKernelManager::new();
        let _ = mgr.register(kernel("a1-b2-c3-d4-e5"));
        let id = KernelId::parse("a1-b2-c3-d4-e5").unwrap();
        assert!(mgr.remove(&id).is_some());
        assert!(mgr.is_empty());
        assert!(mgr.get_kernel(&id).is_err());
    }

    #[test]
    fn ids_lists_registered() {
        let mgr = InMemoryKernelManager::new();
        let _ = mgr.register(kernel("a1-b2-c3-d4-e5"));
        let _ = mgr.register(kernel("f6-a7-b8-c9-d0"));
        let mut ids: Vec<String> = mgr.ids().iter().map(ToString::to_string).collect();
        ids.sort();
        assert_eq!(ids, vec!["a1-b2-c3-d4-e5", "f6-a7-b8-c9-d0"]);
    }
}
