use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Well-known property names of the menu protocol.
pub mod keys {
    pub const TYPE: &str = "type";
    pub const LABEL: &str = "label";
    pub const ENABLED: &str = "enabled";
    pub const VISIBLE: &str = "visible";
    pub const ICON_NAME: &str = "icon-name";
    pub const ICON_DATA: &str = "icon-data";
    pub const SHORTCUT: &str = "shortcut";
    pub const TOGGLE_TYPE: &str = "toggle-type";
    pub const TOGGLE_STATE: &str = "toggle-state";
    pub const CHILDREN_DISPLAY: &str = "children-display";
}

/// A property value. The protocol's property set is fixed and enumerable, so
/// this is a closed union rather than an open dynamic type. Icon data passes
/// through as opaque bytes; decoding it is the embedder's concern.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PropValue {
    Text(String),
    Flag(bool),
    Int(i32),
    Bytes(Vec<u8>),
    Shortcut(Vec<Vec<String>>),
}

impl PropValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_shortcut(&self) -> Option<&[Vec<String>]> {
        match self {
            Self::Shortcut(s) => Some(s),
            _ => None,
        }
    }
}

/// Requested-key filter for layout and group property queries.
///
/// An empty request means "send everything". The default mode ignores the
/// requested keys entirely and returns the full bag: at least one
/// StatusNotifierHost implementation fails to refresh items when given only
/// the keys it asked for, and sending everything matches what other menu
/// servers do. `Strict` restores per-key filtering for hosts that honor it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    SendAll,
    Strict,
}

#[derive(Clone, Debug, Default)]
pub struct PropertyFilter {
    requested: Vec<String>,
    mode: FilterMode,
}

impl PropertyFilter {
    /// Filter that passes every property through.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            requested: keys.into_iter().map(Into::into).collect(),
            mode: FilterMode::default(),
        }
    }

    pub fn strict(mut self) -> Self {
        self.mode = FilterMode::Strict;
        self
    }

    pub fn is_pass_through(&self) -> bool {
        self.requested.is_empty() || self.mode == FilterMode::SendAll
    }

    pub fn requested(&self) -> &[String] {
        &self.requested
    }
}

/// Mapping from property name to value. Absence of a key is not an error:
/// read accessors fall back to the per-key protocol default instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropertyBag {
    props: BTreeMap<String, PropValue>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    pub fn value(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Stores `value` under `key` and reports whether the stored value
    /// actually changed. Writing a value equal to the current one is not a
    /// change and must not mark the key dirty.
    pub fn set(&mut self, key: impl Into<String>, value: PropValue) -> bool {
        let key = key.into();
        if self.props.get(&key) == Some(&value) {
            return false;
        }
        self.props.insert(key, value);
        true
    }

    /// String value of `key`, or `default` when the key is absent or holds a
    /// differently-shaped value.
    pub fn text(&self, key: &str, default: &str) -> String {
        match self.props.get(key).and_then(PropValue::as_text) {
            Some(s) => s.to_owned(),
            None => default.to_owned(),
        }
    }

    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.props.get(key).and_then(PropValue::as_flag).unwrap_or(default)
    }

    pub fn int(&self, key: &str, default: i32) -> i32 {
        self.props.get(key).and_then(PropValue::as_int).unwrap_or(default)
    }

    pub fn bytes(&self, key: &str) -> Vec<u8> {
        self.props
            .get(key)
            .and_then(PropValue::as_bytes)
            .map(<[u8]>::to_vec)
            .unwrap_or_default()
    }

    pub fn shortcut(&self, key: &str) -> Vec<Vec<String>> {
        self.props
            .get(key)
            .and_then(PropValue::as_shortcut)
            .map(<[Vec<String>]>::to_vec)
            .unwrap_or_default()
    }

    /// Copy of the bag restricted per `filter`. Pass-through filters (the
    /// default) yield the complete bag.
    pub fn filtered_view(&self, filter: &PropertyFilter) -> BTreeMap<String, PropValue> {
        if filter.is_pass_through() {
            return self.props.clone();
        }
        filter
            .requested()
            .iter()
            .filter_map(|k| self.props.get(k).map(|v| (k.clone(), v.clone())))
            .collect()
    }
}

/// The possible values of an item's "type" property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuType {
    #[default]
    Standard,
    Separator,
}

impl MenuType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Separator => "separator",
        }
    }
}

/// The kinds of togglability a menu item can advertise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToggleType {
    #[default]
    NonToggleable,
    Checkmark,
    Radio,
}

impl ToggleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NonToggleable => "",
            Self::Checkmark => "checkmark",
            Self::Radio => "radio",
        }
    }
}

/// State of a togglable item. All values other than [`ToggleState::ON`] and
/// [`ToggleState::OFF`] are indeterminate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleState(pub i32);

impl ToggleState {
    pub const OFF: ToggleState = ToggleState(0);
    pub const ON: ToggleState = ToggleState(1);

    pub fn is_indeterminate(self) -> bool {
        self != Self::OFF && self != Self::ON
    }
}

/// One property assignment, as accepted by `add_child` and `set_properties`.
pub type PropEntry = (String, PropValue);

pub fn menu_type(t: MenuType) -> PropEntry {
    (keys::TYPE.to_owned(), PropValue::text(t.as_str()))
}

pub fn label(text: impl Into<String>) -> PropEntry {
    (keys::LABEL.to_owned(), PropValue::Text(text.into()))
}

pub fn enabled(on: bool) -> PropEntry {
    (keys::ENABLED.to_owned(), PropValue::Flag(on))
}

pub fn visible(on: bool) -> PropEntry {
    (keys::VISIBLE.to_owned(), PropValue::Flag(on))
}

pub fn icon_name(name: impl Into<String>) -> PropEntry {
    (keys::ICON_NAME.to_owned(), PropValue::Text(name.into()))
}

pub fn icon_data(data: impl Into<Vec<u8>>) -> PropEntry {
    (keys::ICON_DATA.to_owned(), PropValue::Bytes(data.into()))
}

pub fn shortcut(chords: Vec<Vec<String>>) -> PropEntry {
    (keys::SHORTCUT.to_owned(), PropValue::Shortcut(chords))
}

pub fn toggle_type(t: ToggleType) -> PropEntry {
    (keys::TOGGLE_TYPE.to_owned(), PropValue::text(t.as_str()))
}

pub fn toggle_state(state: ToggleState) -> PropEntry {
    (keys::TOGGLE_STATE.to_owned(), PropValue::Int(state.0))
}

/// Vendor-specific custom property, stored under `x-<vendor>-<prop>`.
pub fn vendor(vendor: &str, prop: &str, value: PropValue) -> PropEntry {
    (vendor_prop_name(vendor, prop), value)
}

pub fn vendor_prop_name(vendor: &str, prop: &str) -> String {
    format!("x-{vendor}-{prop}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_returns_default() {
        let bag = PropertyBag::new();
        assert_eq!(bag.text(keys::LABEL, ""), "");
        assert!(bag.flag(keys::ENABLED, true));
        assert_eq!(bag.int(keys::TOGGLE_STATE, -1), -1);
        assert!(bag.bytes(keys::ICON_DATA).is_empty());
    }

    #[test]
    fn wrong_shape_returns_default() {
        let mut bag = PropertyBag::new();
        bag.set(keys::ENABLED, PropValue::text("yes"));
        assert!(bag.flag(keys::ENABLED, true));
        assert!(!bag.flag(keys::ENABLED, false));
    }

    #[test]
    fn equal_value_set_is_not_a_change() {
        let mut bag = PropertyBag::new();
        assert!(bag.set(keys::LABEL, PropValue::text("Edit")));
        assert!(!bag.set(keys::LABEL, PropValue::text("Edit")));
        assert!(bag.set(keys::LABEL, PropValue::text("File")));
    }

    #[test]
    fn default_filter_sends_everything() {
        let mut bag = PropertyBag::new();
        bag.set(keys::LABEL, PropValue::text("Edit"));
        bag.set(keys::ENABLED, PropValue::Flag(false));

        let view = bag.filtered_view(&PropertyFilter::for_keys([keys::LABEL]));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn strict_filter_restricts_to_requested_keys() {
        let mut bag = PropertyBag::new();
        bag.set(keys::LABEL, PropValue::text("Edit"));
        bag.set(keys::ENABLED, PropValue::Flag(false));

        let view = bag.filtered_view(&PropertyFilter::for_keys([keys::LABEL]).strict());
        assert_eq!(view.len(), 1);
        assert!(view.contains_key(keys::LABEL));

        // empty request still means everything, even in strict mode
        let view = bag.filtered_view(&PropertyFilter::for_keys::<_, String>([]).strict());
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn vendor_names() {
        assert_eq!(vendor_prop_name("acme", "badge"), "x-acme-badge");
        let (name, _) = vendor("acme", "badge", PropValue::Int(3));
        assert_eq!(name, "x-acme-badge");
    }

    #[test]
    fn toggle_state_indeterminate() {
        assert!(!ToggleState::ON.is_indeterminate());
        assert!(!ToggleState::OFF.is_indeterminate());
        assert!(ToggleState(-1).is_indeterminate());
    }
}
