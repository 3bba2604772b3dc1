//! Command entry points

use crate::applier::apply_to_blocks;
use crate::collector::{collect, CollectedBlocks};
use crate::normalizer::{normalize, validate_endpoints};
use crate::predicates::is_block;
use crate::{BidiError, DirCommand, EditorContext, Result, StyleQuery};
use para_model::{Direction, DocumentTree, Position, SelectionRange};

/// Result of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Blocks the command was applied to
    pub blocks: CollectedBlocks,
    /// The caller's selection re-established on the restructured tree
    pub range: SelectionRange,
}

/// Normalize `range`, materialize and collect its blocks, then apply
/// `command` to each of them.
///
/// An empty editable root makes the command a no-op. A collapsed `range`
/// comes back collapsed onto its (possibly moved) start.
pub fn apply_command(
    ctx: &mut EditorContext<'_>,
    range: &SelectionRange,
    command: DirCommand,
) -> Result<CommandOutcome> {
    match change_state(ctx, range, command) {
        Err(BidiError::EmptyRoot) => {
            tracing::debug!(%command, "editable root is empty, nothing to do");
            Ok(CommandOutcome {
                blocks: CollectedBlocks::default(),
                range: *range,
            })
        }
        other => other,
    }
}

/// Parse `command` and apply it. The tree is untouched when parsing fails.
pub fn apply_command_str(
    ctx: &mut EditorContext<'_>,
    range: &SelectionRange,
    command: &str,
) -> Result<CommandOutcome> {
    let command: DirCommand = command.parse()?;
    apply_command(ctx, range, command)
}

fn change_state(
    ctx: &mut EditorContext<'_>,
    range: &SelectionRange,
    command: DirCommand,
) -> Result<CommandOutcome> {
    let mut tracked = *range;
    let collapsed = tracked.is_collapsed();
    let normalized = normalize(ctx, &mut tracked)?;
    if !ctx.tree.has_children(ctx.root()) {
        return Err(BidiError::EmptyRoot);
    }
    let (start, end) = (normalized.start_block, normalized.end_block);

    let common = ctx.tree.common_ancestor(start, end).unwrap_or(normalized.common_ancestor);
    let blocks = collect(ctx, start, end, common, Some(&mut tracked))?;
    apply_to_blocks(ctx, &blocks.nodes, command)?;

    if collapsed {
        tracked.collapse_to_start();
    }
    tracing::debug!(
        %command,
        start = %start,
        end = %end,
        blocks = blocks.nodes.len(),
        groups = blocks.groups.len(),
        "applied direction command"
    );
    Ok(CommandOutcome {
        blocks,
        range: tracked,
    })
}

/// Effective direction of the paragraph holding the start of `range`.
///
/// Read-only; used by hosts to reflect the current paragraph's direction.
pub fn selection_direction(
    tree: &DocumentTree,
    styles: &dyn StyleQuery,
    range: &SelectionRange,
) -> Result<Direction> {
    validate_endpoints(tree, range)?;
    let Position { mut node, mut offset } = range.start;

    if is_block(tree, styles, node) {
        loop {
            let count = tree.child_count(node);
            if count == 0 {
                break;
            }
            node = tree.children(node)[offset.min(count - 1)];
            offset = 0;
        }
    }
    let block = std::iter::once(node)
        .chain(tree.ancestors(node))
        .find(|&n| is_block(tree, styles, n))
        .unwrap_or(tree.root_id());
    Ok(styles.effective_style(tree, block).direction)
}
