use geom::Rect;
use trellis::{
    NodeId, Result, Tree,
    event::key::Key,
    tutils::{Log, Recorder, log, pane, track_focus},
};

/// root -> mid -> a, with b as a second child of root. a and b accept focus.
fn focus_tree(tree: &mut Tree, lg: &Log) -> Result<(NodeId, NodeId, NodeId, NodeId)> {
    let root = pane(tree, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    let mid = pane(tree, Rect::new(0.0, 0.0, 80.0, 80.0))?;
    let a = tree.create(Recorder::new("a", lg).focusable());
    let b = tree.create(Recorder::new("b", lg).focusable());
    tree.set_local_bounds(a, Rect::new(0.0, 0.0, 20.0, 20.0))?;
    tree.set_local_bounds(b, Rect::new(0.0, 0.0, 20.0, 20.0))?;
    tree.add_child(root, mid)?;
    tree.add_child(mid, a)?;
    tree.add_child(root, b)?;
    Ok((root, mid, a, b))
}

#[test]
fn focus_builds_a_chain() -> Result<()> {
    let lg = log();
    let mut tree = Tree::new();
    let (root, mid, a, b) = focus_tree(&mut tree, &lg)?;

    tree.focus(a)?;
    assert_eq!(tree.focused(root), Some(a));
    assert!(tree.node(root).unwrap().contains_focus());
    assert!(tree.node(mid).unwrap().contains_focus());
    assert!(tree.node(a).unwrap().contains_focus());
    assert!(!tree.node(b).unwrap().contains_focus());
    tree.validate_focus(root)?;

    tree.focus(b)?;
    assert_eq!(tree.focused(root), Some(b));
    assert!(!tree.node(mid).unwrap().contains_focus());
    assert!(!tree.node(a).unwrap().contains_focus());
    tree.validate_focus(root)?;
    Ok(())
}

#[test]
fn focus_on_a_non_accepting_widget_is_a_noop() -> Result<()> {
    let lg = log();
    let mut tree = Tree::new();
    let (root, mid, a, _) = focus_tree(&mut tree, &lg)?;

    tree.focus(mid)?;
    assert_eq!(tree.focused(root), None);

    tree.focus(a)?;
    tree.focus(mid)?;
    assert_eq!(tree.focused(root), Some(a));
    Ok(())
}

#[test]
fn focus_change_notifications() -> Result<()> {
    let lg = log();
    let mut tree = Tree::new();
    let (root, mid, a, b) = focus_tree(&mut tree, &lg)?;
    let focus_log = log();
    track_focus(&tree, root, "root", &focus_log);
    track_focus(&tree, mid, "mid", &focus_log);
    track_focus(&tree, a, "a", &focus_log);
    track_focus(&tree, b, "b", &focus_log);

    tree.focus(a)?;
    assert_eq!(
        *focus_log.borrow(),
        vec!["root:contains_focus", "mid:contains_focus", "a:focus"]
    );

    focus_log.borrow_mut().clear();
    tree.focus(b)?;
    assert_eq!(
        *focus_log.borrow(),
        vec!["a:focus", "mid:contains_focus", "b:focus"]
    );
    Ok(())
}

#[test]
fn unfocus_trims_the_chain() -> Result<()> {
    let lg = log();
    let mut tree = Tree::new();
    let (root, mid, a, _) = focus_tree(&mut tree, &lg)?;

    tree.focus(a)?;
    tree.unfocus(mid)?;
    assert!(!tree.node(a).unwrap().contains_focus());
    assert!(!tree.node(mid).unwrap().contains_focus());
    assert!(tree.node(root).unwrap().contains_focus());
    // The deepest remaining chain node becomes the focused leaf.
    assert_eq!(tree.focused(root), Some(root));
    tree.validate_focus(root)?;
    Ok(())
}

#[test]
fn unfocus_at_the_root_clears_everything() -> Result<()> {
    let lg = log();
    let mut tree = Tree::new();
    let (root, mid, a, _) = focus_tree(&mut tree, &lg)?;

    tree.focus(a)?;
    tree.unfocus(root)?;
    assert_eq!(tree.focused(root), None);
    assert!(!tree.node(root).unwrap().contains_focus());
    assert!(!tree.node(mid).unwrap().contains_focus());
    assert!(!tree.node(a).unwrap().contains_focus());

    // Unfocusing again is a no-op.
    tree.unfocus(root)?;
    Ok(())
}

#[test]
fn keys_go_leaf_first_then_bubble() -> Result<()> {
    let lg = log();
    let mut tree = Tree::new();
    let root = tree.create(Recorder::new("root", &lg));
    let mid = tree.create(Recorder::new("mid", &lg));
    let a = tree.create(Recorder::new("a", &lg).focusable());
    tree.set_local_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    tree.add_child(root, mid)?;
    tree.add_child(mid, a)?;

    tree.focus(a)?;
    assert!(!tree.key_down(root, Key::from('x'))?);
    assert_eq!(
        *lg.borrow(),
        vec!["a:key_down", "mid:key_down", "root:key_down"]
    );

    lg.borrow_mut().clear();
    tree.key_up(root, Key::from('x'))?;
    tree.key_press(root, Key::from('x'))?;
    assert_eq!(
        *lg.borrow(),
        vec![
            "a:key_up",
            "mid:key_up",
            "root:key_up",
            "a:key_press",
            "mid:key_press",
            "root:key_press",
        ]
    );
    Ok(())
}

#[test]
fn handled_keys_stop_bubbling() -> Result<()> {
    let lg = log();
    let mut tree = Tree::new();
    let root = tree.create(Recorder::new("root", &lg));
    let mid = tree.create(Recorder::new("mid", &lg));
    let a = tree.create(Recorder::new("a", &lg).focusable());
    tree.set_local_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    tree.add_child(root, mid)?;
    tree.add_child(mid, a)?;
    tree.node(mid)
        .unwrap()
        .events()
        .key_down
        .subscribe(|args| args.set_handled());

    tree.focus(a)?;
    assert!(tree.key_down(root, Key::from('x'))?);
    // mid's observer claimed the key before its own hook and before root.
    assert_eq!(*lg.borrow(), vec!["a:key_down"]);
    Ok(())
}

#[test]
fn keys_without_focus_go_to_the_root_only() -> Result<()> {
    let lg = log();
    let mut tree = Tree::new();
    let root = tree.create(Recorder::new("root", &lg));
    let a = tree.create(Recorder::new("a", &lg).focusable());
    tree.set_local_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    tree.add_child(root, a)?;

    tree.key_down(root, Key::from('x'))?;
    assert_eq!(*lg.borrow(), vec!["root:key_down"]);
    Ok(())
}

#[test]
fn disabled_nodes_do_not_receive_keys() -> Result<()> {
    let lg = log();
    let mut tree = Tree::new();
    let root = tree.create(Recorder::new("root", &lg));
    let mid = tree.create(Recorder::new("mid", &lg));
    let a = tree.create(Recorder::new("a", &lg).focusable());
    tree.set_local_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    tree.add_child(root, mid)?;
    tree.add_child(mid, a)?;

    tree.focus(a)?;
    tree.set_enabled(mid, false)?;
    tree.key_down(root, Key::from('x'))?;
    // Disabling mid disables the whole subtree below it.
    assert_eq!(*lg.borrow(), vec!["root:key_down"]);
    Ok(())
}

#[test]
fn invisible_nodes_do_not_receive_keys() -> Result<()> {
    let lg = log();
    let mut tree = Tree::new();
    let root = tree.create(Recorder::new("root", &lg));
    let mid = tree.create(Recorder::new("mid", &lg));
    let a = tree.create(Recorder::new("a", &lg).focusable());
    tree.set_local_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    tree.add_child(root, mid)?;
    tree.add_child(mid, a)?;
    tree.focus(a)?;

    // The hidden leaf is skipped; the rest of the chain still hears the key.
    tree.set_visible(a, false)?;
    tree.key_down(root, Key::from('x'))?;
    assert_eq!(*lg.borrow(), vec!["mid:key_down", "root:key_down"]);

    // Hiding an ancestor hides its whole subtree from keyboard routing.
    lg.borrow_mut().clear();
    tree.set_visible(a, true)?;
    tree.set_visible(mid, false)?;
    tree.key_down(root, Key::from('x'))?;
    assert_eq!(*lg.borrow(), vec!["root:key_down"]);
    Ok(())
}

#[test]
fn detaching_a_chain_node_moves_focus_up() -> Result<()> {
    let lg = log();
    let mut tree = Tree::new();
    let (root, mid, a, _) = focus_tree(&mut tree, &lg)?;

    tree.focus(a)?;
    tree.remove_child(root, mid)?;
    assert_eq!(tree.focused(root), Some(root));
    assert!(!tree.node(mid).unwrap().contains_focus());
    assert!(!tree.node(a).unwrap().contains_focus());
    tree.validate_focus(root)?;
    Ok(())
}
