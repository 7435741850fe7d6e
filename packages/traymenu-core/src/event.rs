use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::ids::NodeId;
use crate::props::PropValue;

/// Kind of input event delivered by the desktop shell. The named variants
/// are the ones the protocol defines; anything else, including
/// vendor-specific `x-<vendor>-<event>` ids, arrives as `Custom`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventKind {
    Clicked,
    Hovered,
    Opened,
    Closed,
    Custom(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Clicked => "clicked",
            Self::Hovered => "hovered",
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Custom(s) => s,
        }
    }

    /// Splits a vendor-specific id of the form `x-<vendor>-<event>` into its
    /// vendor and event names. Returns `None` for every other id.
    pub fn parse_vendor(&self) -> Option<(&str, &str)> {
        let rest = self.as_str().strip_prefix("x-")?;
        rest.split_once('-')
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s {
            "clicked" => Self::Clicked,
            "hovered" => Self::Hovered,
            "opened" => Self::Opened,
            "closed" => Self::Closed,
            other => Self::Custom(other.to_owned()),
        }
    }
}

/// One input event as delivered by the transport. The timestamp is an
/// internal time value of the sender, not an absolute point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    pub id: NodeId,
    pub kind: EventKind,
    pub payload: Option<PropValue>,
    pub timestamp: u32,
}

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Callback registered for a node, or as the tree-wide default for events
/// addressed to the root sentinel. The returned error is surfaced to the
/// transport call that delivered the event, so handlers that can recover
/// locally should return `Ok` regardless.
pub type EventHandler = Arc<
    dyn Fn(&EventKind, Option<&PropValue>, u32) -> std::result::Result<(), HandlerError>
        + Send
        + Sync,
>;

/// Returns a handler that forwards only [`EventKind::Clicked`] events to
/// `handler` and ignores everything else.
pub fn clicked_handler<F>(handler: F) -> EventHandler
where
    F: Fn(Option<&PropValue>, u32) -> std::result::Result<(), HandlerError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(move |kind, payload, timestamp| {
        if *kind == EventKind::Clicked {
            handler(payload, timestamp)
        } else {
            Ok(())
        }
    })
}

/// Per-id outcome of a grouped event delivery. Partial failure is expected:
/// each failing id is reported with its error and the remaining events still
/// run.
#[derive(Debug, Default)]
pub struct EventGroupReport {
    pub failures: Vec<(NodeId, Error)>,
}

impl EventGroupReport {
    pub(crate) fn record(&mut self, id: NodeId, err: Error) {
        self.failures.push((id, err));
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<NodeId> {
        self.failures.iter().map(|(id, _)| *id).collect()
    }
}
