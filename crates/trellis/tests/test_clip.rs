use geom::{Affine, Point, Rect};
use trellis::{NodeId, Result, Tree, tutils::TestSurface, tutils::pane};

fn nested(tree: &mut Tree) -> Result<(NodeId, NodeId, NodeId)> {
    let root = pane(tree, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    let a = pane(tree, Rect::new(0.0, 0.0, 50.0, 50.0))?;
    let g = pane(tree, Rect::new(0.0, 0.0, 50.0, 50.0))?;
    tree.add_child(root, a)?;
    tree.add_child(a, g)?;
    tree.set_origin(a, Point::new(10.0, 10.0))?;
    tree.set_origin(g, Point::new(5.0, 5.0))?;
    Ok((root, a, g))
}

#[test]
fn clips_intersect_down_the_chain() -> Result<()> {
    let mut tree = Tree::new();
    let (root, a, g) = nested(&mut tree)?;

    assert_eq!(tree.screen_clip(root), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
    assert_eq!(tree.screen_clip(a), Some(Rect::new(10.0, 10.0, 50.0, 50.0)));
    // g pokes out of a and gets trimmed by it.
    assert_eq!(tree.screen_clip(g), Some(Rect::new(15.0, 15.0, 45.0, 45.0)));
    Ok(())
}

#[test]
fn children_clip_against_the_root_edge() -> Result<()> {
    let mut tree = Tree::new();
    let root = pane(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    let child = pane(&mut tree, Rect::new(0.0, 0.0, 50.0, 50.0))?;
    tree.add_child(root, child)?;
    tree.set_origin(child, Point::new(75.0, 75.0))?;
    assert_eq!(tree.screen_clip(child), Some(Rect::new(75.0, 75.0, 25.0, 25.0)));
    Ok(())
}

#[test]
fn invisible_subtrees_have_no_clip() -> Result<()> {
    let mut tree = Tree::new();
    let (root, a, g) = nested(&mut tree)?;

    tree.set_visible(a, false)?;
    assert!(tree.screen_clip(a).is_none());
    assert!(tree.screen_clip(g).is_none());
    assert!(tree.screen_clip(root).is_some());

    tree.set_visible(a, true)?;
    assert!(tree.screen_clip(a).is_some());
    assert!(tree.screen_clip(g).is_some());
    Ok(())
}

#[test]
fn geometry_changes_invalidate_the_cache() -> Result<()> {
    let mut tree = Tree::new();
    let (root, a, g) = nested(&mut tree)?;

    // Prime and then clear the redraw flags with a draw pass.
    let mut surface = TestSurface::default();
    tree.draw(root, &mut surface)?;
    assert!(!tree.node(a).unwrap().needs_redraw());

    tree.set_origin(a, Point::new(20.0, 20.0))?;
    assert!(tree.node(a).unwrap().needs_redraw());
    assert!(tree.node(root).unwrap().needs_redraw());
    assert_eq!(tree.screen_clip(a), Some(Rect::new(20.0, 20.0, 50.0, 50.0)));
    // The descendant cache was invalidated along with the ancestor.
    assert_eq!(tree.screen_clip(g), Some(Rect::new(25.0, 25.0, 45.0, 45.0)));
    Ok(())
}

#[test]
fn fully_clipped_children_are_skipped() -> Result<()> {
    let mut tree = Tree::new();
    let root = pane(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    let child = pane(&mut tree, Rect::new(0.0, 0.0, 50.0, 50.0))?;
    tree.add_child(root, child)?;
    tree.set_origin(child, Point::new(150.0, 150.0))?;

    // Entirely outside the root: no clip, and the draw pass skips it.
    assert!(tree.screen_clip(child).is_none());
    let mut surface = TestSurface::default();
    tree.draw(root, &mut surface)?;
    assert_eq!(surface.clips.len(), 1);

    // Moving it back inside restores the clip.
    tree.set_origin(child, Point::new(75.0, 75.0))?;
    assert_eq!(tree.screen_clip(child), Some(Rect::new(75.0, 75.0, 25.0, 25.0)));
    Ok(())
}

#[test]
fn scaled_transforms_grow_the_clip() -> Result<()> {
    let mut tree = Tree::new();
    let root = pane(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0))?;
    let child = pane(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0))?;
    tree.add_child(root, child)?;
    tree.set_transform(
        child,
        Affine::translate(Point::new(10.0, 10.0)) * Affine::scale(2.0),
    )?;
    assert_eq!(tree.screen_clip(child), Some(Rect::new(10.0, 10.0, 20.0, 20.0)));
    Ok(())
}

#[test]
fn node_to_screen_composes_transforms() -> Result<()> {
    let mut tree = Tree::new();
    let (_, _, g) = nested(&mut tree)?;
    let to_screen = tree.node_to_screen(g);
    assert_eq!(to_screen.apply(Point::new(0.0, 0.0)), Point::new(15.0, 15.0));
    Ok(())
}

#[test]
fn draw_visits_visible_nodes_back_to_front() -> Result<()> {
    let mut tree = Tree::new();
    let (root, a, g) = nested(&mut tree)?;

    let mut surface = TestSurface::default();
    tree.draw(root, &mut surface)?;
    assert_eq!(surface.clips.len(), 3);
    assert_eq!(surface.clips[0], Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(surface.clips[1], Rect::new(10.0, 10.0, 50.0, 50.0));
    assert_eq!(surface.clips[2], Rect::new(15.0, 15.0, 45.0, 45.0));
    assert_eq!(surface.transforms[2].translation(), Point::new(15.0, 15.0));
    assert!(!tree.node(g).unwrap().needs_redraw());

    // Invisible subtrees are skipped entirely.
    tree.set_visible(a, false)?;
    let mut surface = TestSurface::default();
    tree.draw(root, &mut surface)?;
    assert_eq!(surface.clips.len(), 1);
    Ok(())
}
