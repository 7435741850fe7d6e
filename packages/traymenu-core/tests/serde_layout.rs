#[cfg(feature = "serde")]
#[test]
fn layout_snapshot_json_roundtrips() {
    use traymenu_core::{
        props, Layout, MenuTree, NodeId, NoopNotifier, PropertyFilter, DEPTH_UNLIMITED,
    };

    let menu = MenuTree::new(NoopNotifier);
    let file = menu
        .add_child(NodeId::ROOT, [props::label("File")])
        .unwrap();
    menu.add_child(file, [props::label("Open"), props::enabled(false)])
        .unwrap();

    let (_, layout) = menu
        .layout(NodeId::ROOT, DEPTH_UNLIMITED, &PropertyFilter::all())
        .unwrap();

    let json = serde_json::to_string(&layout).expect("serialize Layout");
    assert!(json.contains("\"label\""));

    let roundtrip: Layout = serde_json::from_str(&json).expect("deserialize Layout");
    assert_eq!(roundtrip, layout);
    assert_eq!(roundtrip.node_count(), 3);
}

#[cfg(feature = "serde")]
#[test]
fn event_json_roundtrips() {
    use traymenu_core::{Event, EventKind, NodeId, PropValue};

    let event = Event {
        id: NodeId(4),
        kind: EventKind::from("x-acme-ping"),
        payload: Some(PropValue::Int(7)),
        timestamp: 99,
    };

    let json = serde_json::to_string(&event).expect("serialize Event");
    let roundtrip: Event = serde_json::from_str(&json).expect("deserialize Event");
    assert_eq!(roundtrip, event);
}
