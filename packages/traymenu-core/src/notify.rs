use std::sync::{Mutex, PoisonError};

use crate::error::Result;
use crate::ids::{NodeId, Revision};
use crate::props::PropValue;

/// Per-item property delta announced to the remote observer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyUpdate {
    pub id: NodeId,
    pub props: Vec<(String, PropValue)>,
}

/// Property removals are unused by the current protocol: a key is reset by
/// writing its default value, never deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyRemoval {
    pub id: NodeId,
    pub keys: Vec<String>,
}

/// Outbound notification sink, implemented by the transport layer.
///
/// The tree calls these inside its write critical section so that delivery
/// order matches commit order; implementations must hand off quickly (for
/// example by queueing onto the transport) instead of blocking. A returned
/// error is aggregated and surfaced to the mutating caller, but the mutation
/// itself stays committed.
pub trait ChangeNotifier: Send + Sync {
    /// The subtree rooted at `parent` must be re-fetched by the observer.
    /// The root sentinel as scope means the whole tree.
    fn layout_updated(&self, revision: Revision, parent: NodeId) -> Result<()>;

    /// Only the listed keys changed for each item; the observer re-reads
    /// just those.
    fn properties_updated(
        &self,
        updates: &[PropertyUpdate],
        removals: &[PropertyRemoval],
    ) -> Result<()>;

    /// The environment is asked to activate `id`.
    fn activation_requested(&self, id: NodeId, timestamp: u32) -> Result<()>;
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn layout_updated(&self, _revision: Revision, _parent: NodeId) -> Result<()> {
        Ok(())
    }

    fn properties_updated(
        &self,
        _updates: &[PropertyUpdate],
        _removals: &[PropertyRemoval],
    ) -> Result<()> {
        Ok(())
    }

    fn activation_requested(&self, _id: NodeId, _timestamp: u32) -> Result<()> {
        Ok(())
    }
}

/// One recorded notification, in delivery order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    LayoutUpdated {
        revision: Revision,
        parent: NodeId,
    },
    PropertiesUpdated {
        updates: Vec<PropertyUpdate>,
        removals: Vec<PropertyRemoval>,
    },
    ActivationRequested {
        id: NodeId,
        timestamp: u32,
    },
}

/// Records notifications instead of sending them; test double for the
/// transport.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn push(&self, event: Notification) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// All notifications recorded so far, oldest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drains and returns the recorded notifications.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Just the structural updates, as `(revision, scope)` pairs.
    pub fn layout_updates(&self) -> Vec<(Revision, NodeId)> {
        self.snapshot()
            .into_iter()
            .filter_map(|n| match n {
                Notification::LayoutUpdated { revision, parent } => Some((revision, parent)),
                _ => None,
            })
            .collect()
    }
}

impl ChangeNotifier for RecordingNotifier {
    fn layout_updated(&self, revision: Revision, parent: NodeId) -> Result<()> {
        self.push(Notification::LayoutUpdated { revision, parent });
        Ok(())
    }

    fn properties_updated(
        &self,
        updates: &[PropertyUpdate],
        removals: &[PropertyRemoval],
    ) -> Result<()> {
        self.push(Notification::PropertiesUpdated {
            updates: updates.to_vec(),
            removals: removals.to_vec(),
        });
        Ok(())
    }

    fn activation_requested(&self, id: NodeId, timestamp: u32) -> Result<()> {
        self.push(Notification::ActivationRequested { id, timestamp });
        Ok(())
    }
}
