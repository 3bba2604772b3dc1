//! Block materialization
//!
//! Inline runs that are not wrapped in a block of their own (runs directly
//! under the editable root, runs beside block siblings, runs containing
//! hard line breaks) get one synthesized block per line so each line can
//! carry its own direction and alignment.

use crate::predicates::{LINE_TEXT_TAGS, TABLE_CONTAINERS};
use crate::{EditorContext, LineBreakPolicy, Result};
use para_model::{ElementData, InlineStyle, ModelError, NodeId, SelectionRange};

/// Wrap the sibling run `first..=last` of `parent` into new blocks.
///
/// A line break other than `last` closes the current block and opens the
/// next one. Returns the new blocks in document order; there is always at
/// least one.
pub fn repack(
    ctx: &mut EditorContext<'_>,
    first: NodeId,
    last: NodeId,
    parent: NodeId,
    mut tracked: Option<&mut SelectionRange>,
) -> Result<Vec<NodeId>> {
    let template = ambient_style(ctx, first, parent);
    let index = ctx
        .tree
        .index_in_parent(first)
        .ok_or(ModelError::Detached(first))?;

    let mut current = new_block(ctx, &template);
    ctx.tree.insert_at(parent, index, current, tracked.as_deref_mut())?;
    let mut blocks = vec![current];

    let mut cursor = Some(first);
    while let Some(node) = cursor {
        let next = ctx.tree.next_sibling(node);
        let is_last = node == last;

        if ctx.is_inline_or_text(node) {
            let is_break = ctx.tree.is_line_break(node);
            let is_comment = ctx.tree.is_comment(node);

            let mut opened = None;
            if is_break && !is_last {
                let block = new_block(ctx, &template);
                ctx.tree.insert_before(node, block, tracked.as_deref_mut())?;
                blocks.push(block);
                opened = Some(block);
            }

            if (is_break || is_comment) && !ctx.tree.has_children(current) {
                let filler = ctx.tree.create_text(ctx.config.placeholder.clone());
                ctx.tree.append_child(current, filler, tracked.as_deref_mut())?;
            }

            if is_comment || (is_break && ctx.config.line_break_policy == LineBreakPolicy::Drop) {
                ctx.tree.remove(node, tracked.as_deref_mut())?;
            } else {
                let end = ctx.tree.child_count(current);
                ctx.tree.move_to(node, current, end, tracked.as_deref_mut())?;
                let follows_text = ctx
                    .tree
                    .previous_sibling(node)
                    .is_some_and(|prev| ctx.tree.is_text(prev));
                if ctx.tree.is_text(node) && follows_text {
                    ctx.tree.merge_text_into_previous(node, tracked.as_deref_mut())?;
                }
            }

            if let Some(block) = opened {
                current = block;
            }
        }

        if is_last {
            break;
        }
        cursor = next;
    }

    tracing::trace!(parent = %parent, blocks = blocks.len(), "repacked inline run");
    Ok(blocks)
}

/// Give every inline run of `block` that lacks its own wrapper a block.
///
/// Runs are wrapped when `block` is not a line-text block, or when the run
/// has block siblings. Table containers are left alone; their children are
/// rows and cells.
pub fn rebuild_block(
    ctx: &mut EditorContext<'_>,
    block: NodeId,
    mut tracked: Option<&mut SelectionRange>,
) -> Result<()> {
    if ctx.has_tag_from(block, TABLE_CONTAINERS) {
        return Ok(());
    }
    let line_text = ctx.has_tag_from(block, LINE_TEXT_TAGS);
    let mut run: Option<(NodeId, NodeId)> = None;
    let mut has_own_block = false;

    let mut cursor = ctx.tree.first_child(block);
    while let Some(node) = cursor {
        let next = ctx.tree.next_sibling(node);
        if ctx.is_inline_or_text(node) && !ctx.is_table_container(node) {
            has_own_block |= !line_text;
            run = Some(match run {
                Some((first, _)) => (first, node),
                None => (node, node),
            });
        } else if ctx.is_block(node) || ctx.is_table_container(node) {
            if let Some((first, last)) = run.take() {
                repack(ctx, first, last, block, tracked.as_deref_mut())?;
            }
            has_own_block = true;
        }
        cursor = next;
    }

    if has_own_block {
        if let Some((first, last)) = run {
            repack(ctx, first, last, block, tracked)?;
        }
    }
    Ok(())
}

/// Style copied onto synthesized blocks.
///
/// Under the editable root only its direction applies; elsewhere the run's
/// element predecessor, or failing that the parent, lends its whole style.
fn ambient_style(ctx: &EditorContext<'_>, first: NodeId, parent: NodeId) -> InlineStyle {
    let root = ctx.root();
    if parent == root {
        let mut style = InlineStyle::new();
        if let Some(direction) = ctx.tree.element(root).and_then(|e| e.style.direction()) {
            style.set_direction(direction);
        }
        return style;
    }
    ctx.tree
        .previous_sibling(first)
        .and_then(|prev| ctx.tree.element(prev))
        .or_else(|| ctx.tree.element(parent))
        .map(|e| e.style.clone())
        .unwrap_or_default()
}

fn new_block(ctx: &mut EditorContext<'_>, style: &InlineStyle) -> NodeId {
    let data = ElementData::new(ctx.config.block_tag()).with_style(style.clone());
    ctx.tree.create_element_with(data)
}
