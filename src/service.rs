//! Port operations over a [`PortStorage`].
//!
//! Every call re-reads the whole collection from the store. Mutating calls
//! hold one lock across load, change and save, so two concurrent writers in
//! this process cannot lose each other's update. Other processes writing the
//! same file are not coordinated with.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::port::{Port, PortInput};
use crate::store::PortStorage;

pub struct PortService {
    store: Arc<dyn PortStorage>,
    write_lock: Mutex<()>,
}

impl PortService {
    pub fn new(store: Arc<dyn PortStorage>) -> Self {
        Self { store, write_lock: Mutex::new(()) }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guard protects no data, so a poisoned lock is still usable.
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All ports in insertion order.
    pub fn list(&self) -> Result<Vec<Port>, ApiError> {
        Ok(self.store.load()?)
    }

    /// Appends a new port built from `input` and returns it.
    pub fn create(&self, input: PortInput) -> Result<Port, ApiError> {
        let _guard = self.lock();
        let mut ports = self.store.load()?;
        let port = Port::from_input(input, ports.len());
        if ports.iter().any(|p| p.id == port.id) {
            warn!(id = %port.id, "created port shares its id with an existing one");
        }
        ports.push(port.clone());
        self.store.save(&ports)?;
        debug!(id = %port.id, total = ports.len(), "port created");
        Ok(port)
    }

    /// Applies `input` to the first port whose id is `id`.
    pub fn update(&self, id: &str, input: PortInput) -> Result<Port, ApiError> {
        let _guard = self.lock();
        let mut ports = self.store.load()?;
        let port = ports.iter_mut()
            .find(|p| p.id == id)
            .ok_or(ApiError::NotFound)?;
        port.apply(input);
        let updated = port.clone();
        self.store.save(&ports)?;
        debug!(%id, "port updated");
        Ok(updated)
    }

    /// Removes every port whose id is `id`, returning how many went.
    pub fn delete(&self, id: &str) -> Result<usize, ApiError> {
        let _guard = self.lock();
        let mut ports = self.store.load()?;
        let before = ports.len();
        ports.retain(|p| p.id != id);
        let removed = before - ports.len();
        if removed == 0 {
            return Err(ApiError::NotFound);
        }
        self.store.save(&ports)?;
        debug!(%id, removed, "port deleted");
        Ok(removed)
    }

    /// Whether the store can currently be read.
    pub fn is_ready(&self) -> bool {
        self.store.load().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;

    /// Counts saves so tests can assert a no-op never writes.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        saves: AtomicUsize,
    }

    impl PortStorage for CountingStore {
        fn load(&self) -> Result<Vec<Port>, StoreError> { self.inner.load() }
        fn save(&self, ports: &[Port]) -> Result<(), StoreError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(ports)
        }
    }

    fn input(body: &str) -> PortInput {
        PortInput::from_body(body.as_bytes()).unwrap()
    }

    #[test]
    fn create_appends_in_order() {
        let svc = PortService::new(Arc::new(MemoryStore::default()));
        svc.create(input(r#"{"hostname":"a"}"#)).unwrap();
        svc.create(input(r#"{"hostname":"b"}"#)).unwrap();
        let ids: Vec<_> = svc.list().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, ["port-1", "port-2"]);
    }

    #[test]
    fn sequential_ids_can_repeat_after_delete() {
        let svc = PortService::new(Arc::new(MemoryStore::default()));
        svc.create(input("{}")).unwrap();
        svc.create(input("{}")).unwrap();
        svc.delete("port-1").unwrap();
        assert_eq!(svc.create(input("{}")).unwrap().id, "port-2");
        assert_eq!(svc.list().unwrap().len(), 2);
    }

    #[test]
    fn update_keeps_position() {
        let svc = PortService::new(Arc::new(MemoryStore::default()));
        for _ in 0..3 {
            svc.create(input("{}")).unwrap();
        }
        svc.update("port-2", input(r#"{"vlan":"20"}"#)).unwrap();
        let ports = svc.list().unwrap();
        assert_eq!(ports[1].id, "port-2");
        assert_eq!(ports[1].vlan, "20");
    }

    #[test]
    fn delete_removes_every_match() {
        let svc = PortService::new(Arc::new(MemoryStore::default()));
        svc.create(input(r#"{"id":"dup"}"#)).unwrap();
        svc.create(input(r#"{"id":"keep"}"#)).unwrap();
        svc.create(input(r#"{"id":"dup"}"#)).unwrap();
        assert_eq!(svc.delete("dup").unwrap(), 2);
        let ids: Vec<_> = svc.list().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, ["keep"]);
    }

    #[test]
    fn unknown_id_never_writes() {
        let store = Arc::new(CountingStore::default());
        let svc = PortService::new(store.clone());
        assert!(matches!(svc.update("nope", input("{}")), Err(ApiError::NotFound)));
        assert!(matches!(svc.delete("nope"), Err(ApiError::NotFound)));
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn concurrent_creates_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::store::JsonFileStore::new(dir.path().join("ports.json"));
        store.ensure_exists().unwrap();
        let svc = Arc::new(PortService::new(Arc::new(store)));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = Arc::clone(&svc);
                std::thread::spawn(move || {
                    svc.create(input(&format!(r#"{{"id":"t{i}"}}"#))).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(svc.list().unwrap().len(), 8);
    }
}
