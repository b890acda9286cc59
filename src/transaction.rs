//! All-or-nothing mutation and shared access.
//!
//! A merge is a worklist of steps, and a failure halfway through leaves the
//! steps already applied in place. [`TopicMapSystem::transaction`] wraps any
//! sequence of operations so that an error restores the store as it was
//! before the closure ran.
//!
//! [`SharedTopicMapSystem`] puts a system behind a read/write lock for use
//! from several threads. Readers proceed in parallel; every mutation runs
//! as a transaction under the write lock.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::store::{ConstructStore, InMemoryConstructStore};
use crate::system::TopicMapSystem;

impl<S: ConstructStore + Clone> TopicMapSystem<S> {
    /// Run `f` against this system; if it fails, roll every change back.
    pub fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: std::fmt::Display,
    {
        let checkpoint = self.store.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(error = %e, "Transaction failed, rolling back");
                self.store = checkpoint;
                Err(e)
            }
        }
    }
}

/// A topic map system shared between threads.
#[derive(Debug)]
pub struct SharedTopicMapSystem<S: ConstructStore = InMemoryConstructStore> {
    inner: Arc<RwLock<TopicMapSystem<S>>>,
}

impl<S: ConstructStore> Clone for SharedTopicMapSystem<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ConstructStore + Clone> SharedTopicMapSystem<S> {
    /// Share `system`.
    pub fn new(system: TopicMapSystem<S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(system)),
        }
    }

    /// Run a read-only closure under the read lock.
    pub fn read<T>(&self, f: impl FnOnce(&TopicMapSystem<S>) -> T) -> T {
        f(&self.inner.read())
    }

    /// Run a mutating closure as a transaction under the write lock.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut TopicMapSystem<S>) -> Result<T, E>,
        E: std::fmt::Display,
    {
        self.inner.write().transaction(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::system::TopicMapSystemFactory;

    #[test]
    fn test_transaction_rollback() {
        let mut sys = TopicMapSystemFactory::new_instance().new_topic_map_system();
        let loc = sys.create_locator("http://example.org/map").unwrap();
        let tm = sys.create_topic_map(&loc).unwrap();

        let result: Result<(), ModelError> = sys.transaction(|sys| {
            let topic = sys.create_topic(tm)?;
            sys.create_name(topic, None, "Puccini", &[])?;
            Err(ModelError::constraint(topic, "abort"))
        });
        assert!(result.is_err());
        assert!(sys.get_topics(tm).unwrap().is_empty());
    }

    #[test]
    fn test_transaction_commit() {
        let mut sys = TopicMapSystemFactory::new_instance().new_topic_map_system();
        let loc = sys.create_locator("http://example.org/map").unwrap();
        let tm = sys.create_topic_map(&loc).unwrap();

        let topic = sys
            .transaction(|sys| -> Result<_, ModelError> { sys.create_topic(tm) })
            .unwrap();
        assert!(sys.exists(topic));
    }

    #[test]
    fn test_shared_system_across_threads() {
        let mut sys = TopicMapSystemFactory::new_instance().new_topic_map_system();
        let loc = sys.create_locator("http://example.org/map").unwrap();
        let tm = sys.create_topic_map(&loc).unwrap();
        let shared = SharedTopicMapSystem::new(sys);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    shared
                        .transaction(|sys| -> Result<_, ModelError> { sys.create_topic(tm) })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.read(|sys| sys.get_topics(tm).unwrap().len()), 4);
    }
}
