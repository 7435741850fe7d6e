#![forbid(unsafe_code)]
//! Menu tree manager for StatusNotifierItem-style tray menus.
//! This crate owns the mutable menu hierarchy and its change semantics while
//! staying independent of any concrete transport; a D-Bus binding, a test
//! harness, or any other host plugs in through [`ChangeNotifier`].

pub mod error;
pub mod event;
pub mod ids;
pub mod layout;
mod node;
pub mod notify;
pub mod props;
pub mod tree;

pub use error::{Error, Result};
pub use event::{
    clicked_handler, Event, EventGroupReport, EventHandler, EventKind, HandlerError,
};
pub use ids::{NodeId, Revision, DEPTH_UNLIMITED};
pub use layout::{Layout, NodeProps};
pub use notify::{
    ChangeNotifier, NoopNotifier, Notification, PropertyRemoval, PropertyUpdate,
    RecordingNotifier,
};
pub use props::{
    FilterMode, MenuType, PropEntry, PropValue, PropertyBag, PropertyFilter, ToggleState,
    ToggleType,
};
pub use tree::MenuTree;
