use std::sync::{Arc, Mutex};

use tracing::{debug, error};

use crate::command::{Request, Response};
use crate::engine::StorageEngine;
use crate::persist::Persistence;
use crate::router;
use crate::seed;
use crate::store::EntityStore;

/// Serves catalog [`Request`]s against an [`EntityStore`] backed by a [`StorageEngine`].
///
/// The store is loaded (or seeded) once, when the server is opened. Each request runs to
/// completion under a lock, so two mutations never interleave. After a handler reports a
/// mutation the whole store is committed through the [`Persistence`] adapter; a failed commit
/// is logged and the response is returned unchanged.
///
/// Cloning a server is cheap, every clone serves the same store.
///
/// # Example
/// ```rust
/// use bookish::{BookishServer, MemoryStorage, Request};
///
/// let server = BookishServer::open(MemoryStorage::new());
/// let resp = server.handle(&Request::get("/api/books?q=дюна"));
/// assert_eq!(resp.status, 200);
/// ```
#[derive(Debug, Clone)]
pub struct BookishServer<E: StorageEngine> {
    store: Arc<Mutex<EntityStore>>,
    persistence: Persistence<E>,
}

impl<E: StorageEngine> BookishServer<E> {
    /// opens a server over `engine`, restoring the persisted catalog or seeding a new one
    pub fn open(engine: E) -> Self {
        let persistence = Persistence::new(engine);
        let store = seed::load_or_seed(&persistence);
        BookishServer {
            store: Arc::new(Mutex::new(store)),
            persistence,
        }
    }

    /// routes `req`, applies it to the store and builds its response envelope
    pub fn handle(&self, req: &Request) -> Response {
        debug!("Receive request: {} {}", req.method, req.path);
        // a panicked handler leaves the store as it was before the panic
        let mut store = match self.store.lock() {
            Ok(store) => store,
            Err(poisoned) => poisoned.into_inner(),
        };

        let resp = match router::dispatch(&mut store, req) {
            Ok(outcome) => {
                if outcome.mutated {
                    if let Err(e) = self.persistence.commit(&store) {
                        error!("Failed to persist catalog: {}", e);
                    }
                }
                outcome.response
            }
            Err(e) => Response::from(e),
        };
        debug!("Response sent: {} {} -> {}", req.method, req.path, resp.status);
        resp
    }

    /// a copy of the current store contents
    pub fn snapshot(&self) -> EntityStore {
        match self.store.lock() {
            Ok(store) => store.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
