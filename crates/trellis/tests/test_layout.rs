use std::{any::Any, cell::RefCell, rc::Rc};

use geom::{Insets, Point, Rect, Size};
use trellis::{
    AnchorLayout, Error, HAnchor, LayoutCause, LayoutEngine, LayoutEvent, NodeId, Result, Tree,
    TreeConfig, VAnchor, tutils::pane,
};

fn parent_child(tree: &mut Tree) -> Result<(NodeId, NodeId)> {
    let parent = pane(tree, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    let child = pane(tree, Rect::new(0.0, 0.0, 20.0, 20.0))?;
    tree.add_child(parent, child)?;
    tree.set_origin(child, Point::new(10.0, 10.0))?;
    Ok((parent, child))
}

#[test]
fn near_anchors_keep_the_offset() -> Result<()> {
    let mut tree = Tree::new();
    let (parent, child) = parent_child(&mut tree)?;
    tree.set_anchors(child, HAnchor::LEFT, VAnchor::TOP)?;
    tree.perform_layout(parent)?;
    assert_eq!(tree.node(child).unwrap().origin(), Point::new(10.0, 10.0));
    assert_eq!(
        tree.node(child).unwrap().local_bounds(),
        Rect::new(0.0, 0.0, 20.0, 20.0)
    );
    Ok(())
}

#[test]
fn far_anchors_snap_to_the_far_edge() -> Result<()> {
    let mut tree = Tree::new();
    let (_, child) = parent_child(&mut tree)?;
    tree.set_anchors(child, HAnchor::RIGHT, VAnchor::BOTTOM)?;
    assert_eq!(tree.node(child).unwrap().origin(), Point::new(80.0, 80.0));
    Ok(())
}

#[test]
fn far_anchors_respect_margins() -> Result<()> {
    let mut tree = Tree::new();
    let (_, child) = parent_child(&mut tree)?;
    tree.set_margin(child, Insets::uniform(5.0))?;
    tree.set_anchors(child, HAnchor::RIGHT, VAnchor::BOTTOM)?;
    assert_eq!(tree.node(child).unwrap().origin(), Point::new(75.0, 75.0));
    Ok(())
}

#[test]
fn stretch_fills_the_content_box_minus_margins() -> Result<()> {
    let mut tree = Tree::new();
    let (_, child) = parent_child(&mut tree)?;
    tree.set_margin(child, Insets::uniform(5.0))?;
    tree.set_anchors(child, HAnchor::STRETCH, VAnchor::STRETCH)?;
    let node = tree.node(child).unwrap();
    assert_eq!(node.local_bounds(), Rect::new(0.0, 0.0, 90.0, 90.0));
    assert_eq!(node.origin(), Point::new(5.0, 5.0));
    Ok(())
}

#[test]
fn stretch_respects_padding_and_border() -> Result<()> {
    let mut tree = Tree::new();
    let (parent, child) = parent_child(&mut tree)?;
    tree.set_border(parent, Insets::uniform(2.0))?;
    tree.set_padding(parent, Insets::uniform(3.0))?;
    tree.set_anchors(child, HAnchor::STRETCH, VAnchor::STRETCH)?;
    let node = tree.node(child).unwrap();
    assert_eq!(node.local_bounds(), Rect::new(0.0, 0.0, 90.0, 90.0));
    assert_eq!(node.origin(), Point::new(5.0, 5.0));
    Ok(())
}

#[test]
fn center_anchors() -> Result<()> {
    let mut tree = Tree::new();
    let (_, child) = parent_child(&mut tree)?;
    tree.set_anchors(child, HAnchor::CENTER, VAnchor::CENTER)?;
    assert_eq!(tree.node(child).unwrap().origin(), Point::new(40.0, 40.0));
    Ok(())
}

#[test]
fn center_conflicts_with_edges() -> Result<()> {
    let mut tree = Tree::new();
    let (_, child) = parent_child(&mut tree)?;
    assert!(matches!(
        tree.set_anchors(child, HAnchor::CENTER | HAnchor::LEFT, VAnchor::TOP),
        Err(Error::Invalid(_))
    ));
    assert!(matches!(
        tree.set_anchors(child, HAnchor::LEFT, VAnchor::CENTER | VAnchor::BOTTOM),
        Err(Error::Invalid(_))
    ));
    Ok(())
}

#[test]
fn stretch_is_clamped_by_max_size() -> Result<()> {
    let mut tree = Tree::new();
    let (_, child) = parent_child(&mut tree)?;
    tree.set_max_size(child, Size::new(50.0, 50.0))?;
    tree.set_anchors(child, HAnchor::STRETCH, VAnchor::STRETCH)?;
    assert_eq!(
        tree.node(child).unwrap().local_bounds(),
        Rect::new(0.0, 0.0, 50.0, 50.0)
    );
    Ok(())
}

#[test]
fn min_size_raises_max_when_they_cross() -> Result<()> {
    let mut tree = Tree::new();
    let (_, child) = parent_child(&mut tree)?;
    tree.set_max_size(child, Size::new(30.0, 30.0))?;
    tree.set_min_size(child, Size::new(40.0, 40.0))?;
    let node = tree.node(child).unwrap();
    assert_eq!(node.min_size(), Size::new(40.0, 40.0));
    assert_eq!(node.max_size(), Size::new(40.0, 40.0));
    assert_eq!(node.local_bounds().size(), Size::new(40.0, 40.0));
    Ok(())
}

#[test]
fn fit_encloses_visible_children() -> Result<()> {
    let mut tree = Tree::new();
    let parent = pane(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0))?;
    let child = pane(&mut tree, Rect::new(0.0, 0.0, 30.0, 20.0))?;
    tree.add_child(parent, child)?;
    tree.set_origin(child, Point::new(4.0, 6.0))?;
    tree.set_anchors(parent, HAnchor::FIT, VAnchor::FIT)?;
    assert_eq!(
        tree.node(parent).unwrap().local_bounds(),
        Rect::new(0.0, 0.0, 34.0, 26.0)
    );

    // Moving the child refits the parent automatically.
    tree.set_origin(child, Point::new(10.0, 10.0))?;
    assert_eq!(
        tree.node(parent).unwrap().local_bounds(),
        Rect::new(0.0, 0.0, 40.0, 30.0)
    );

    // Invisible children do not count.
    tree.set_visible(child, false)?;
    tree.perform_layout(parent)?;
    assert_eq!(
        tree.node(parent).unwrap().local_bounds(),
        Rect::new(0.0, 0.0, 40.0, 30.0)
    );
    Ok(())
}

#[test]
fn fit_or_stretch_takes_the_larger_or_smaller() -> Result<()> {
    let mut tree = Tree::new();
    let outer = pane(&mut tree, Rect::new(0.0, 0.0, 200.0, 100.0))?;
    let mid = pane(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0))?;
    let inner = pane(&mut tree, Rect::new(0.0, 0.0, 30.0, 10.0))?;
    tree.add_child(outer, mid)?;
    tree.add_child(mid, inner)?;

    tree.set_anchors(mid, HAnchor::MAX_FIT_OR_STRETCH, VAnchor::TOP)?;
    assert_eq!(tree.node(mid).unwrap().local_bounds().w, 200.0);

    tree.set_anchors(
        mid,
        HAnchor::MAX_FIT_OR_STRETCH | HAnchor::MIN_FIT_OR_STRETCH,
        VAnchor::TOP,
    )?;
    assert_eq!(tree.node(mid).unwrap().local_bounds().w, 30.0);
    Ok(())
}

#[test]
fn layout_is_idempotent() -> Result<()> {
    let mut tree = Tree::new();
    let (parent, child) = parent_child(&mut tree)?;
    tree.set_margin(child, Insets::uniform(2.0))?;
    tree.set_anchors(child, HAnchor::STRETCH, VAnchor::BOTTOM)?;

    let snapshot = |tree: &Tree| {
        let n = tree.node(child).unwrap();
        (n.local_bounds(), n.origin())
    };
    let before = snapshot(&tree);
    tree.perform_layout(parent)?;
    tree.perform_layout(parent)?;
    assert_eq!(snapshot(&tree), before);
    Ok(())
}

#[test]
fn unchanged_setters_are_silent() -> Result<()> {
    let mut tree = Tree::new();
    let (_, child) = parent_child(&mut tree)?;

    let bounds_events = Rc::new(RefCell::new(0));
    let size_events = Rc::new(RefCell::new(0));
    let b = Rc::clone(&bounds_events);
    tree.node(child)
        .unwrap()
        .events()
        .bounds_changed
        .subscribe(move |_| *b.borrow_mut() += 1);
    let s = Rc::clone(&size_events);
    tree.node(child)
        .unwrap()
        .events()
        .size_changed
        .subscribe(move |_| *s.borrow_mut() += 1);

    tree.set_local_bounds(child, Rect::new(0.0, 0.0, 20.0, 20.0))?;
    assert_eq!(*bounds_events.borrow(), 0);

    // Relocating without resizing fires bounds_changed but not size_changed.
    tree.set_local_bounds(child, Rect::new(5.0, 5.0, 20.0, 20.0))?;
    assert_eq!(*bounds_events.borrow(), 1);
    assert_eq!(*size_events.borrow(), 0);

    tree.set_local_bounds(child, Rect::new(5.0, 5.0, 25.0, 20.0))?;
    assert_eq!(*bounds_events.borrow(), 2);
    assert_eq!(*size_events.borrow(), 1);
    Ok(())
}

#[test]
fn integer_bounds_round_geometry() -> Result<()> {
    let mut tree = Tree::with_config(TreeConfig {
        device_scale: 1.0,
        integer_bounds: true,
    });
    let n = pane(&mut tree, Rect::new(0.4, 0.6, 10.2, 9.8))?;
    assert_eq!(tree.node(n).unwrap().local_bounds(), Rect::new(0.0, 1.0, 10.0, 10.0));
    tree.set_origin(n, Point::new(3.4, 3.6))?;
    assert_eq!(tree.node(n).unwrap().origin(), Point::new(3.0, 4.0));
    Ok(())
}

#[test]
fn device_scale_applies_to_insets() -> Result<()> {
    let mut tree = Tree::with_config(TreeConfig {
        device_scale: 2.0,
        integer_bounds: false,
    });
    let n = pane(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    tree.set_margin(n, Insets::uniform(3.0))?;
    tree.set_padding(n, Insets::new(1.0, 2.0, 3.0, 4.0))?;
    assert_eq!(tree.node(n).unwrap().margin(), Insets::uniform(6.0));
    assert_eq!(tree.node(n).unwrap().padding(), Insets::new(2.0, 4.0, 6.0, 8.0));
    Ok(())
}

#[test]
fn locked_layout_coalesces_per_owner() -> Result<()> {
    let mut tree = Tree::new();
    let (parent, child) = parent_child(&mut tree)?;

    let passes = Rc::new(RefCell::new(0));
    let p = Rc::clone(&passes);
    tree.node(parent)
        .unwrap()
        .events()
        .layout
        .subscribe(move |_| *p.borrow_mut() += 1);

    tree.with_layout_locked(|t| {
        t.set_local_bounds(child, Rect::new(0.0, 0.0, 30.0, 30.0))?;
        t.set_local_bounds(child, Rect::new(0.0, 0.0, 40.0, 40.0))?;
        Ok(())
    })?;
    assert_eq!(*passes.borrow(), 1);

    tree.set_local_bounds(child, Rect::new(0.0, 0.0, 50.0, 50.0))?;
    tree.set_local_bounds(child, Rect::new(0.0, 0.0, 60.0, 60.0))?;
    assert_eq!(*passes.borrow(), 3);
    Ok(())
}

#[test]
fn locked_replay_carries_the_latest_cause() -> Result<()> {
    let mut tree = Tree::new();
    let parent = pane(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    let c1 = pane(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0))?;
    let c2 = pane(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0))?;
    tree.add_child(parent, c2)?;

    let causes = Rc::new(RefCell::new(Vec::new()));
    let c = Rc::clone(&causes);
    tree.node(parent)
        .unwrap()
        .events()
        .layout
        .subscribe(move |args| c.borrow_mut().push(args.cause));

    tree.with_layout_locked(|t| {
        t.add_child(parent, c1)?;
        t.remove_child(parent, c2)
    })?;
    // One replayed pass for the parent, reporting what happened last.
    assert_eq!(*causes.borrow(), vec![LayoutCause::ChildRemoved]);
    Ok(())
}

#[test]
fn layout_causes_are_reported() -> Result<()> {
    let mut tree = Tree::new();
    let parent = pane(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0))?;

    let causes = Rc::new(RefCell::new(Vec::new()));
    let c = Rc::clone(&causes);
    tree.node(parent)
        .unwrap()
        .events()
        .layout
        .subscribe(move |args| c.borrow_mut().push(args.cause));

    let child = pane(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0))?;
    tree.add_child(parent, child)?;
    tree.set_visible(child, false)?;
    tree.remove_child(parent, child)?;
    assert_eq!(
        *causes.borrow(),
        vec![
            LayoutCause::ChildAdded,
            LayoutCause::VisibilityChanged,
            LayoutCause::ChildRemoved,
        ]
    );
    Ok(())
}

/// A minimal vertical stack engine, used to exercise the pluggable contract.
#[derive(Default)]
struct Stack;

impl LayoutEngine for Stack {
    fn layout(&mut self, tree: &mut Tree, ev: LayoutEvent) -> Result<()> {
        tree.with_layout_locked(|tree| {
            let Some(node) = tree.node(ev.owner) else {
                return Ok(());
            };
            let content = node.content_box();
            let children = node.children().to_vec();
            let mut y = content.top();
            for child in children {
                let Some(n) = tree.node(child) else {
                    continue;
                };
                if !n.visible() {
                    continue;
                }
                let h = n.local_bounds().h;
                tree.set_origin(child, Point::new(content.left(), y))?;
                y += h;
            }
            Ok(())
        })
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn custom_engines_are_pluggable() -> Result<()> {
    let mut tree = Tree::new();
    let root = pane(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    let a = pane(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0))?;
    let b = pane(&mut tree, Rect::new(0.0, 0.0, 10.0, 15.0))?;
    let c = pane(&mut tree, Rect::new(0.0, 0.0, 10.0, 5.0))?;
    tree.add_child(root, a)?;
    tree.add_child(root, b)?;
    tree.add_child(root, c)?;

    tree.set_engine(root, Stack)?;
    assert_eq!(tree.node(a).unwrap().origin(), Point::new(0.0, 0.0));
    assert_eq!(tree.node(b).unwrap().origin(), Point::new(0.0, 10.0));
    assert_eq!(tree.node(c).unwrap().origin(), Point::new(0.0, 25.0));

    // Typed access downcasts to the concrete engine.
    tree.with_engine::<Stack, _>(root, |_, _| Ok(()))?;
    assert_eq!(
        tree.with_engine::<AnchorLayout, _>(root, |_, _| Ok(())),
        Err(Error::EngineMismatch)
    );
    Ok(())
}
