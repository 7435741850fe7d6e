use proptest::prelude::*;
use traymenu_core::{
    props, MenuTree, NodeId, NoopNotifier, PropertyFilter, DEPTH_UNLIMITED,
};

#[derive(Clone, Debug)]
enum Op {
    Add { parent: usize, label: String },
    Remove { target: usize },
    MoveBefore { target: usize, sibling: usize },
    SetLabel { target: usize, label: String },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..8, "[a-z]{1,6}").prop_map(|(parent, label)| Op::Add { parent, label }),
        (0usize..8).prop_map(|target| Op::Remove { target }),
        (0usize..8, 0usize..8).prop_map(|(target, sibling)| Op::MoveBefore { target, sibling }),
        (0usize..8, "[a-z]{1,6}").prop_map(|(target, label)| Op::SetLabel { target, label }),
    ]
}

/// Maps a small index onto an id the sequence may have produced. Index 0 is
/// the root sentinel, so removes and moves sometimes target ids that are
/// unknown or already gone, which the tree must tolerate.
fn pick(index: usize) -> NodeId {
    NodeId(index as i32)
}

proptest! {
    #[test]
    fn random_sequences_keep_the_tree_consistent(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let menu = MenuTree::new(NoopNotifier);
        let mut last_revision = menu.revision();

        for op in ops {
            match op {
                Op::Add { parent, label } => {
                    let _ = menu.add_child(pick(parent), [props::label(label)]);
                }
                Op::Remove { target } => {
                    let _ = menu.remove(pick(target));
                }
                Op::MoveBefore { target, sibling } => {
                    let _ = menu.move_before(pick(target), pick(sibling));
                }
                Op::SetLabel { target, label } => {
                    let _ = menu.set_properties(pick(target), [props::label(label)]);
                }
            }
            let revision = menu.revision();
            prop_assert!(revision >= last_revision);
            last_revision = revision;
        }

        menu.validate_invariants().unwrap();
        let (revision, layout) = menu
            .layout(NodeId::ROOT, DEPTH_UNLIMITED, &PropertyFilter::all())
            .unwrap();
        prop_assert_eq!(revision, menu.revision());
        prop_assert_eq!(layout.node_count(), 1 + menu.node_count());
    }

    #[test]
    fn every_live_node_appears_in_group_properties(adds in prop::collection::vec(0usize..6, 1..20)) {
        let menu = MenuTree::new(NoopNotifier);
        for parent in adds {
            let _ = menu.add_child(pick(parent), [props::enabled(true)]);
        }

        let all = menu.group_properties(&[], &PropertyFilter::all());
        prop_assert_eq!(all.len(), menu.node_count());
        for reply in &all {
            prop_assert!(menu.is_known(reply.id));
        }
    }
}
