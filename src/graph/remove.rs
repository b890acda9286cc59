//! Removal with cascade.
//!
//! Removing a construct removes everything it owns (an association its
//! roles, a topic its names and occurrences, a name its variants), releases
//! every identity row of the removed constructs and detaches their reifiers.

use crate::error::Result;
use crate::store::{ConstructStore, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{Construct, ConstructRef};

impl<S: ConstructStore> TopicMapSystem<S> {
    /// Remove a construct and everything it owns.
    ///
    /// Topics still in use fail with
    /// [`ModelError::TopicInUse`](crate::error::ModelError::TopicInUse);
    /// topic maps are unregistered from the system.
    pub fn remove<C: Construct>(&mut self, construct: C) -> Result<()> {
        self.store.checked(construct)?;
        let target: ConstructRef = construct.into();
        match target {
            ConstructRef::TopicMap(topic_map) => self.remove_topic_map(topic_map),
            ConstructRef::Topic(topic) => {
                self.check_topic_removable(topic)?;
                self.delete_cascade(topic.into())
            }
            other => self.delete_cascade(other),
        }
    }

    /// Delete `target` and its children without any in-use check.
    pub(crate) fn delete_cascade(&mut self, target: ConstructRef) -> Result<()> {
        for child in self.store.children(target.id()) {
            self.delete_cascade(child)?;
        }
        match target {
            ConstructRef::Topic(topic) => {
                if let Some(reified) = self.store.topic(topic)?.reified {
                    if let Some(slot) = self
                        .store
                        .get_mut(reified.id())
                        .and_then(|record| record.as_reifiable_mut())
                    {
                        slot.reification_mut().set(None);
                    }
                }
            }
            _ => self.attach_reifier(target, None)?,
        }
        self.store.delete(target.id());
        tracing::trace!(construct = %target, "Removed construct");
        Ok(())
    }
}
