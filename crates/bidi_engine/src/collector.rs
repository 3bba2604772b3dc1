//! Block collection
//!
//! Walks the tree in document order from the start block to the end block
//! and records every text-bearing block the selection touches, wrapping
//! unwrapped inline runs on the way.

use crate::materializer::{rebuild_block, repack};
use crate::predicates::{block_ancestor, cell_container, LINE_TEXT_TAGS};
use crate::{EditorContext, GroupOrder, Result};
use para_model::{ModelError, NodeId, SelectionRange, Tag};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Blocks a command applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedBlocks {
    /// Every collected block in document order, without duplicates
    pub nodes: Vec<NodeId>,
    /// Blocks split into units that do not cross a table cell boundary
    pub groups: Vec<Vec<NodeId>>,
    /// Table cells whose content was collected, in first-seen order
    pub cells: Vec<NodeId>,
}

impl CollectedBlocks {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Accumulates blocks and flushes groups at cell boundaries
struct Accumulator {
    order: GroupOrder,
    seen: HashSet<NodeId>,
    current_cell: Option<NodeId>,
    group: Vec<NodeId>,
    out: CollectedBlocks,
}

impl Accumulator {
    fn new(order: GroupOrder) -> Self {
        Self {
            order,
            seen: HashSet::new(),
            current_cell: None,
            group: Vec::new(),
            out: CollectedBlocks::default(),
        }
    }

    fn save(&mut self, ctx: &EditorContext<'_>, block: NodeId) {
        if !self.seen.insert(block) {
            return;
        }
        let cell = cell_container(ctx.tree, block);
        if cell != self.current_cell {
            self.flush();
            self.current_cell = cell;
        }
        if let Some(cell) = cell {
            if !self.out.cells.contains(&cell) {
                self.out.cells.push(cell);
            }
        }
        self.out.nodes.push(block);
        self.group.push(block);
    }

    fn flush(&mut self) {
        if self.group.is_empty() {
            return;
        }
        let group = std::mem::take(&mut self.group);
        match self.order {
            GroupOrder::Append => self.out.groups.push(group),
            GroupOrder::Prepend => self.out.groups.insert(0, group),
        }
    }

    fn finish(mut self) -> CollectedBlocks {
        self.flush();
        self.out
    }
}

/// Collect the blocks from `start` through `end`, never leaving `common`.
///
/// Table containers are walked through, list items are collected whole,
/// structured blocks are rebuilt and entered, and inline runs met along the
/// way are repacked with every resulting block recorded.
pub fn collect(
    ctx: &mut EditorContext<'_>,
    start: NodeId,
    end: NodeId,
    common: NodeId,
    mut tracked: Option<&mut SelectionRange>,
) -> Result<CollectedBlocks> {
    let root = ctx.root();
    let mut acc = Accumulator::new(ctx.config.group_order);

    let mut node = start;
    if node == root {
        match ctx.tree.first_child(root) {
            Some(child) => node = child,
            None => return Ok(acc.finish()),
        }
    }
    let parent = parent_of(ctx, node)?;
    rebuild_block(ctx, parent, tracked.as_deref_mut())?;

    loop {
        if ctx.is_table_container(node) {
            if let Some(child) = ctx.tree.first_child(node) {
                node = child;
                continue;
            }
        } else if ctx.is_block(node) {
            if let Some(item) = block_ancestor(ctx.tree, node, &Tag::Li) {
                if item != node {
                    node = item;
                    continue;
                }
            }
            if !ctx.has_tag(node, &Tag::Li) && ctx.tree.has_children(node) {
                rebuild_block(ctx, node, tracked.as_deref_mut())?;
                if let Some(child) = ctx.tree.first_child(node) {
                    if ctx.is_block(child) || ctx.is_table_container(child) {
                        node = child;
                        continue;
                    }
                }
            }
            if ctx.has_tag_from(node, LINE_TEXT_TAGS) {
                acc.save(ctx, node);
            }
        } else {
            let parent = parent_of(ctx, node)?;
            if !ctx.is_table_container(parent) {
                match collect_run(ctx, node, parent, &mut acc, tracked.as_deref_mut())? {
                    RunEnd::Continue(block) => {
                        node = block;
                        continue;
                    }
                    RunEnd::Advance(block) => node = block,
                    RunEnd::Exhausted => break,
                }
            }
        }

        if node == end {
            break;
        }
        match next_in_walk(ctx, node, common) {
            Some(next) => node = next,
            None => break,
        }
    }

    let collected = acc.finish();
    tracing::debug!(
        blocks = collected.nodes.len(),
        groups = collected.groups.len(),
        cells = collected.cells.len(),
        "collected blocks"
    );
    Ok(collected)
}

/// Where the walk resumes after an inline run
enum RunEnd {
    /// Process this block next without advancing
    Continue(NodeId),
    /// Treat this block as handled and advance past it
    Advance(NodeId),
    /// Nothing left to visit among these siblings
    Exhausted,
}

/// Repack the inline run starting at `node`, one block per line
fn collect_run(
    ctx: &mut EditorContext<'_>,
    node: NodeId,
    parent: NodeId,
    acc: &mut Accumulator,
    mut tracked: Option<&mut SelectionRange>,
) -> Result<RunEnd> {
    let parent_is_block = ctx.is_block(parent);
    let mut run_first = Some(node);
    let mut run_last = node;
    let mut stopped_at = None;
    let mut last_block = None;

    let mut cursor = Some(node);
    while let Some(current) = cursor {
        let next = ctx.tree.next_sibling(current);
        if ctx.is_block(current) {
            stopped_at = Some(current);
            break;
        }
        run_last = current;
        let trailing_break = parent_is_block && ctx.tree.last_child(parent) == Some(current);
        if ctx.tree.is_line_break(current) && !trailing_break {
            let first = run_first.take().unwrap_or(current);
            let blocks = repack(ctx, first, current, parent, tracked.as_deref_mut())?;
            for &block in &blocks {
                acc.save(ctx, block);
            }
            last_block = blocks.last().copied();
            run_first = next.filter(|&n| ctx.is_inline_or_text(n));
        }
        cursor = next;
    }

    if let Some(first) = run_first {
        let blocks = repack(ctx, first, run_last, parent, tracked)?;
        for &block in &blocks {
            acc.save(ctx, block);
        }
        return Ok(blocks.last().copied().map_or(RunEnd::Exhausted, RunEnd::Advance));
    }
    Ok(match (stopped_at, last_block) {
        (Some(block), _) => RunEnd::Continue(block),
        (None, Some(block)) => RunEnd::Advance(block),
        (None, None) => RunEnd::Exhausted,
    })
}

/// Next sibling, or the next sibling of the nearest ancestor below `common`
fn next_in_walk(ctx: &EditorContext<'_>, node: NodeId, common: NodeId) -> Option<NodeId> {
    if let Some(next) = ctx.tree.next_sibling(node) {
        return Some(next);
    }
    let mut parent = ctx.tree.parent(node)?;
    while parent != common {
        if let Some(next) = ctx.tree.next_sibling(parent) {
            return Some(next);
        }
        parent = ctx.tree.parent(parent)?;
    }
    None
}

fn parent_of(ctx: &EditorContext<'_>, node: NodeId) -> Result<NodeId> {
    Ok(ctx.tree.parent(node).ok_or(ModelError::Detached(node))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CascadeStyleQuery, EngineConfig};
    use para_model::{DocumentTree, MarkupParser};

    fn load(markup: &str) -> DocumentTree {
        let mut tree = DocumentTree::new(Tag::Div);
        let root = tree.root_id();
        for node in MarkupParser::parse(&mut tree, markup).unwrap() {
            tree.append_child(root, node, None).unwrap();
        }
        tree
    }

    fn texts(tree: &DocumentTree, nodes: &[NodeId]) -> Vec<String> {
        nodes.iter().map(|&n| tree.text_content(n)).collect()
    }

    #[test]
    fn test_collects_sibling_paragraphs() {
        let mut tree = load("<p>a</p><p>b</p><p>c</p><p>d</p>");
        let root = tree.root_id();
        let ps = tree.children(root).to_vec();
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let collected = collect(&mut ctx, ps[1], ps[2], root, None).unwrap();

        assert_eq!(collected.nodes, vec![ps[1], ps[2]]);
        assert_eq!(collected.groups, vec![vec![ps[1], ps[2]]]);
        assert!(collected.cells.is_empty());
    }

    #[test]
    fn test_wraps_runs_between_blocks() {
        let mut tree = load("<p>a</p>loose<br>lines<p>b</p>");
        let root = tree.root_id();
        let first = tree.first_child(root).unwrap();
        let last = tree.last_child(root).unwrap();
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let collected = collect(&mut ctx, first, last, root, None).unwrap();

        assert_eq!(texts(&tree, &collected.nodes), vec!["a", "loose", "lines", "b"]);
        assert_eq!(tree.child_count(root), 4);
    }

    #[test]
    fn test_table_cells_form_groups() {
        let mut tree = load(
            "<table><tbody><tr><td>one</td><td>two</td></tr><tr><td>three</td></tr></tbody></table>",
        );
        let root = tree.root_id();
        let table = tree.first_child(root).unwrap();
        let tbody = tree.first_child(table).unwrap();
        let rows = tree.children(tbody).to_vec();
        let first_cell = tree.first_child(rows[0]).unwrap();
        let last_cell = tree.first_child(rows[1]).unwrap();
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let collected = collect(&mut ctx, first_cell, last_cell, tbody, None).unwrap();

        assert_eq!(texts(&tree, &collected.nodes), vec!["one", "two", "three"]);
        assert_eq!(collected.groups.len(), 3);
        assert_eq!(collected.cells.len(), 3);
        assert_eq!(collected.cells[0], first_cell);
    }

    #[test]
    fn test_prepend_order_reverses_groups() {
        let mut tree = load("<table><tr><td>one</td><td>two</td></tr></table>");
        let root = tree.root_id();
        let table = tree.first_child(root).unwrap();
        let tr = tree.first_child(table).unwrap();
        let cells = tree.children(tr).to_vec();
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig {
            group_order: GroupOrder::Prepend,
            ..EngineConfig::default()
        };
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let collected = collect(&mut ctx, cells[0], cells[1], tr, None).unwrap();

        assert_eq!(collected.nodes, cells);
        assert_eq!(collected.groups, vec![vec![cells[1]], vec![cells[0]]]);
    }

    #[test]
    fn test_list_items_collected_once() {
        let mut tree = load("<ul><li>x</li><li>y<ul><li>z</li></ul></li></ul>");
        let root = tree.root_id();
        let ul = tree.first_child(root).unwrap();
        let items = tree.children(ul).to_vec();
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let collected = collect(&mut ctx, items[0], items[1], ul, None).unwrap();

        assert_eq!(collected.nodes, items);
    }

    #[test]
    fn test_structured_block_is_entered() {
        let mut tree = load("<blockquote><p>a</p><p>b</p></blockquote><p>c</p>");
        let root = tree.root_id();
        let quote = tree.first_child(root).unwrap();
        let last = tree.last_child(root).unwrap();
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        let collected = collect(&mut ctx, quote, last, root, None).unwrap();

        assert_eq!(texts(&tree, &collected.nodes), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_walk_stays_below_common_ancestor() {
        let mut tree = load("<div><p>a</p><p>b</p></div><p>outside</p>");
        let root = tree.root_id();
        let div = tree.first_child(root).unwrap();
        let ps = tree.children(div).to_vec();
        let styles = CascadeStyleQuery::default();
        let config = EngineConfig::default();
        let mut ctx = EditorContext::new(&mut tree, &styles, &config);

        // end is never reached from inside; the walk must still stop at `div`
        let outside = ctx.tree.last_child(root).unwrap();
        let collected = collect(&mut ctx, ps[0], outside, div, None).unwrap();

        assert_eq!(collected.nodes, ps);
    }
}
