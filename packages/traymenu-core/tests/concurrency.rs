use traymenu_core::{props, MenuTree, NodeId, NoopNotifier, PropertyFilter, DEPTH_UNLIMITED};

#[test]
fn concurrent_mutation_and_snapshots_stay_consistent() {
    let menu = MenuTree::new(NoopNotifier);
    let left = menu.add_child(NodeId::ROOT, [props::label("left")]).unwrap();
    let right = menu
        .add_child(NodeId::ROOT, [props::label("right")])
        .unwrap();

    let menu = &menu;
    std::thread::scope(|scope| {
        for parent in [left, right] {
            scope.spawn(move || {
                let mut owned = Vec::new();
                for round in 0..50 {
                    if round % 5 == 4 {
                        if let Some(id) = owned.pop() {
                            menu.remove(id).unwrap();
                            continue;
                        }
                    }
                    if let Ok(id) = menu.add_child(parent, [props::label("item")]) {
                        owned.push(id);
                    }
                }
            });
        }
        scope.spawn(|| {
            for round in 0..100 {
                let (revision, layout) = menu
                    .layout(NodeId::ROOT, DEPTH_UNLIMITED, &PropertyFilter::all())
                    .unwrap();
                // a snapshot is internally consistent even mid-churn
                assert!(revision <= menu.revision());
                assert_eq!(layout.id, NodeId::ROOT);
                if round % 10 == 0 {
                    std::thread::yield_now();
                }
            }
        });
    });

    menu.validate_invariants().unwrap();
    let (_, layout) = menu
        .layout(NodeId::ROOT, DEPTH_UNLIMITED, &PropertyFilter::all())
        .unwrap();
    assert_eq!(layout.node_count(), 1 + menu.node_count());
}

#[test]
fn revision_never_regresses_under_contention() {
    let menu = MenuTree::new(NoopNotifier);
    let id = menu.add_child(NodeId::ROOT, [props::enabled(true)]).unwrap();

    let menu = &menu;
    std::thread::scope(|scope| {
        for flip in [true, false] {
            scope.spawn(move || {
                for _ in 0..100 {
                    menu.set_properties(id, [props::enabled(flip)]).unwrap();
                }
            });
        }
        scope.spawn(move || {
            let mut last = 0;
            for _ in 0..200 {
                let revision = menu.revision();
                assert!(revision >= last);
                last = revision;
            }
        });
    });

    assert!(menu.revision() >= 1);
    menu.validate_invariants().unwrap();
}

#[test]
fn parallel_adds_get_distinct_identities() {
    let menu = MenuTree::new(NoopNotifier);

    let menu = &menu;
    let ids: Vec<Vec<NodeId>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    (0..25)
                        .filter_map(|_| menu.add_child(NodeId::ROOT, []).ok())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut all: Vec<NodeId> = ids.into_iter().flatten().collect();
    let before = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), before);
    assert_eq!(menu.node_count(), before);
    menu.validate_invariants().unwrap();
}
