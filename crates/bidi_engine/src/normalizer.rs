//! Selection normalization
//!
//! Maps raw selection endpoints onto the blocks that contain them,
//! synthesizing a block when an endpoint's text has none. The caller's range
//! is threaded through every edit so it stays valid.

use crate::materializer::repack;
use crate::{BidiError, EditorContext, Result};
use para_model::{DocumentTree, ModelError, NodeId, Position, SelectionRange, Tag};

/// Which end of the selection a block lookup serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPoint {
    Start,
    End,
}

/// Block-aligned view of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedRange {
    pub start_block: NodeId,
    pub end_block: NodeId,
    pub common_ancestor: NodeId,
}

/// Check both endpoints against the tree before anything is touched
pub fn validate_endpoints(tree: &DocumentTree, range: &SelectionRange) -> Result<()> {
    for position in [range.start, range.end] {
        if !tree.is_attached(position.node) {
            return Err(BidiError::DetachedRangeEndpoint(position.node));
        }
        if position.offset > tree.node_length(position.node) {
            return Err(BidiError::InvalidRangeOffset {
                node: position.node,
                offset: position.offset,
            });
        }
    }
    Ok(())
}

/// Resolve `range` to its start and end blocks.
///
/// Endpoints sitting on a block or table container are first pushed down
/// to the leaf they touch. List items win over blocks nested inside them.
pub fn normalize(ctx: &mut EditorContext<'_>, range: &mut SelectionRange) -> Result<NormalizedRange> {
    validate_endpoints(ctx.tree, range)?;

    let start = descend_start(ctx, range.start);
    range.start = start;
    let start_block = closest_block(ctx, start.node, BoundaryPoint::Start, Some(&mut *range))?;
    let start_block = list_item_or(ctx.tree, start_block);

    let end = descend_end(ctx, range.end);
    range.end = end;
    let end_block = closest_block(ctx, end.node, BoundaryPoint::End, Some(&mut *range))?;
    let end_block = list_item_or(ctx.tree, end_block);

    let common_ancestor = ctx
        .tree
        .common_ancestor(start_block, end_block)
        .unwrap_or_else(|| ctx.root());

    tracing::trace!(
        start = %start_block,
        end = %end_block,
        common = %common_ancestor,
        "normalized selection"
    );
    Ok(NormalizedRange {
        start_block,
        end_block,
        common_ancestor,
    })
}

/// Nearest block holding `node`, creating one around its inline run when
/// the run has no wrapper or shares its parent with blocks or breaks.
pub fn closest_block(
    ctx: &mut EditorContext<'_>,
    node: NodeId,
    point: BoundaryPoint,
    mut tracked: Option<&mut SelectionRange>,
) -> Result<NodeId> {
    if ctx.is_block(node) {
        return Ok(node);
    }
    let mut node = node;
    let mut parent = ctx.tree.parent(node).ok_or(ModelError::Detached(node))?;

    loop {
        let mut first = None;
        let mut last = None;
        let mut create_own_block = false;

        let mut sibling = node;
        loop {
            if ctx.is_inline_or_text(sibling) {
                first = Some(sibling);
                last.get_or_insert(sibling);
            }
            let Some(prev) = ctx.tree.previous_sibling(sibling) else {
                break;
            };
            if ctx.ends_run(prev) || ctx.tree.is_line_break(prev) {
                create_own_block = true;
                break;
            }
            if ctx.tree.is_text(prev) && ctx.tree.is_text(sibling) {
                ctx.tree.merge_text_into_next(prev, tracked.as_deref_mut())?;
                continue;
            }
            sibling = prev;
        }

        let mut sibling = node;
        loop {
            if ctx.is_inline_or_text(sibling) {
                first.get_or_insert(sibling);
                last = Some(sibling);
            }
            let Some(next) = ctx.tree.next_sibling(sibling) else {
                break;
            };
            if ctx.ends_run(next) {
                create_own_block = true;
                break;
            }
            if ctx.tree.is_line_break(next) {
                let splits = ctx
                    .tree
                    .next_sibling(next)
                    .is_some_and(|after| !ctx.ends_run(after));
                if splits {
                    last = Some(next);
                    create_own_block = true;
                    break;
                }
            } else if ctx.tree.is_text(next) && ctx.tree.is_text(sibling) {
                ctx.tree.merge_text_into_previous(next, tracked.as_deref_mut())?;
                continue;
            }
            sibling = next;
        }

        let unwrapped = ctx.is_block(parent) && !ctx.is_block_with_text(parent);
        if let (Some(first), Some(last)) = (first, last) {
            if create_own_block || unwrapped {
                let blocks = repack(ctx, first, last, parent, tracked)?;
                let chosen = match point {
                    BoundaryPoint::Start => blocks.first(),
                    BoundaryPoint::End => blocks.last(),
                };
                return chosen
                    .copied()
                    .ok_or_else(|| ModelError::TreeStructure("repack produced no block".into()).into());
            }
        }

        if ctx.is_block(parent) {
            return Ok(parent);
        }
        node = parent;
        parent = ctx.tree.parent(node).ok_or(ModelError::Detached(node))?;
    }
}

/// Leaf touched by a start endpoint on a block or table container
fn descend_start(ctx: &EditorContext<'_>, position: Position) -> Position {
    let Position { mut node, mut offset } = position;
    if !(ctx.is_block(node) || ctx.is_table_container(node)) {
        return position;
    }
    loop {
        let count = ctx.tree.child_count(node);
        if count == 0 {
            break;
        }
        node = ctx.tree.children(node)[offset.min(count - 1)];
        offset = 0;
    }
    Position::new(node, offset)
}

/// Leaf touched by an end endpoint, with the offset at the leaf's end
fn descend_end(ctx: &EditorContext<'_>, position: Position) -> Position {
    let Position { mut node, mut offset } = position;
    if !(ctx.is_block(node) || ctx.is_table_container(node)) {
        return position;
    }
    loop {
        let count = ctx.tree.child_count(node);
        if count == 0 {
            break;
        }
        node = ctx.tree.children(node)[offset.min(count - 1)];
        offset = ctx.tree.node_length(node);
    }
    Position::new(node, offset)
}

/// The enclosing list item when `block` sits inside one
fn list_item_or(tree: &DocumentTree, block: NodeId) -> NodeId {
    crate::predicates::block_ancestor(tree, block, &Tag::Li).unwrap_or(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CascadeStyleQuery, EngineConfig};
    use para_model::MarkupParser;

    fn load(markup: &str) -> DocumentTree {
        let mut tree = DocumentTree::new(Tag::Div);
        let root = tree.root_id();
        for node in MarkupParser::parse(&mut tree, markup).unwrap() {
            tree.append_child(root, node, None).unwrap();
        }
        tree
    }

    #[test]
    fn test_text_in_block_resolves_to_block() {
        let mut tree = load("<p>hello</p>");
        let p = tree.first_child(tree.root_id()).unwrap();
        let text = tree.first_child(p).unwrap();
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let block = closest_block(&mut ctx, text, BoundaryPoint::Start, None).unwrap();
        assert_eq!(block, p);
    }

    #[test]
    fn test_root_text_gets_wrapped() {
        let mut tree = load("loose <b>text</b>");
        let root = tree.root_id();
        let text = tree.first_child(root).unwrap();
        let mut range = SelectionRange::within(text, 2, 4);
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let block =
            closest_block(&mut ctx, text, BoundaryPoint::Start, Some(&mut range)).unwrap();

        assert_eq!(tree.children(root), &[block]);
        assert_eq!(tree.text_content(block), "loose text");
        assert_eq!(range, SelectionRange::within(text, 2, 4));
        tree.validate_range(&range).unwrap();
    }

    #[test]
    fn test_fragmented_text_is_merged() {
        let mut tree = DocumentTree::new(Tag::Div);
        let root = tree.root_id();
        let p = tree.create_element(Tag::P);
        tree.append_child(root, p, None).unwrap();
        let parts: Vec<_> = ["ab", "cd", "ef"]
            .iter()
            .map(|s| {
                let t = tree.create_text(*s);
                tree.append_child(p, t, None).unwrap();
                t
            })
            .collect();
        let mut range = SelectionRange::new(Position::new(parts[1], 1), Position::new(parts[2], 2));
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let block =
            closest_block(&mut ctx, parts[1], BoundaryPoint::Start, Some(&mut range)).unwrap();

        assert_eq!(block, p);
        assert_eq!(tree.child_count(p), 1);
        let merged = tree.first_child(p).unwrap();
        assert_eq!(tree.text(merged), Some("abcdef"));
        assert_eq!(range.start, Position::new(merged, 3));
        assert_eq!(range.end, Position::new(merged, 6));
    }

    #[test]
    fn test_run_beside_block_gets_own_block() {
        let mut tree = load("<div>intro<p>para</p></div>");
        let div = tree.first_child(tree.root_id()).unwrap();
        let intro = tree.first_child(div).unwrap();
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let block = closest_block(&mut ctx, intro, BoundaryPoint::End, None).unwrap();

        assert_ne!(block, div);
        assert_eq!(tree.parent(block), Some(div));
        assert_eq!(tree.text_content(block), "intro");
    }

    #[test]
    fn test_line_break_splits_endpoint_line() {
        let mut tree = load("<div>one<br>two</div>");
        let div = tree.first_child(tree.root_id()).unwrap();
        let two = tree.last_child(div).unwrap();
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let block = closest_block(&mut ctx, two, BoundaryPoint::Start, None).unwrap();

        assert_eq!(tree.text_content(block), "two");
        assert_eq!(tree.parent(block), Some(div));
        assert!(tree.is_text(tree.first_child(div).unwrap()));
    }

    #[test]
    fn test_normalize_prefers_list_item() {
        let mut tree = load("<ul><li><div>item</div></li></ul>");
        let ul = tree.first_child(tree.root_id()).unwrap();
        let li = tree.first_child(ul).unwrap();
        let inner = tree.first_child(li).unwrap();
        let text = tree.first_child(inner).unwrap();
        let mut range = SelectionRange::within(text, 0, 2);
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let normalized = normalize(&mut ctx, &mut range).unwrap();

        assert_eq!(normalized.start_block, li);
        assert_eq!(normalized.end_block, li);
        assert_eq!(normalized.common_ancestor, li);
    }

    #[test]
    fn test_normalize_descends_from_block_endpoints() {
        let mut tree = load("<p>first</p><p>second</p>");
        let root = tree.root_id();
        let ps = tree.children(root).to_vec();
        let mut range = SelectionRange::within(root, 0, 2);
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let normalized = normalize(&mut ctx, &mut range).unwrap();

        assert_eq!(normalized.start_block, ps[0]);
        assert_eq!(normalized.end_block, ps[1]);
        assert_eq!(normalized.common_ancestor, root);
        let second_text = tree.first_child(ps[1]).unwrap();
        assert_eq!(range.end, Position::new(second_text, 6));
    }

    #[test]
    fn test_detached_endpoint_is_rejected() {
        let mut tree = load("<p>x</p>");
        let loose = tree.create_text("loose");
        let mut range = SelectionRange::within(loose, 0, 1);
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let err = normalize(&mut ctx, &mut range).unwrap_err();
        assert!(matches!(err, BidiError::DetachedRangeEndpoint(n) if n == loose));
    }

    #[test]
    fn test_out_of_bounds_offset_is_rejected() {
        let mut tree = load("<p>x</p>");
        let p = tree.first_child(tree.root_id()).unwrap();
        let text = tree.first_child(p).unwrap();
        let mut range = SelectionRange::within(text, 0, 9);
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        assert!(matches!(
            normalize(&mut ctx, &mut range),
            Err(BidiError::InvalidRangeOffset { offset: 9, .. })
        ));
    }
}
