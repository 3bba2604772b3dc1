//! Direction and alignment application
//!
//! Touches only the `dir`/`align` attributes and the `direction`/`text-align`
//! declarations of existing blocks. No structure or text changes here.

use crate::{DirCommand, EditorContext, Result};
use para_model::{ModelError, NodeId, Tag, TextAlign};

/// Apply `command` to each block in order
pub fn apply_to_blocks(
    ctx: &mut EditorContext<'_>,
    blocks: &[NodeId],
    command: DirCommand,
) -> Result<()> {
    for &block in blocks {
        apply_to_block(ctx, block, command)?;
    }
    Ok(())
}

/// Apply `command` to a single block.
///
/// `CENTER` elements keep their alignment under every command; direction
/// commands still set their direction. A direction change swaps unequal
/// left and right margins.
pub fn apply_to_block(ctx: &mut EditorContext<'_>, block: NodeId, command: DirCommand) -> Result<()> {
    let legacy_center = ctx.has_tag(block, &Tag::Center);
    let current = ctx.effective_style(block);
    let data = ctx
        .tree
        .element_mut(block)
        .ok_or(ModelError::NotAnElement(block))?;

    match command {
        DirCommand::Ltr | DirCommand::Rtl | DirCommand::Mirror => {
            let target = match command {
                DirCommand::Ltr => para_model::Direction::Ltr,
                DirCommand::Rtl => para_model::Direction::Rtl,
                _ => current.direction.opposite(),
            };
            data.attributes.remove("dir");
            data.style.set_direction(target);
            // indentation follows the reading direction
            if target != current.direction && current.margin_left != current.margin_right {
                data.style.set("margin-left", format!("{}px", current.margin_right));
                data.style.set("margin-right", format!("{}px", current.margin_left));
            }
            if !legacy_center {
                data.attributes.remove("align");
                data.style.clear_text_align();
                // centering does not depend on direction
                if current.text_align.is_center() {
                    data.style.set_text_align(TextAlign::Center);
                }
            }
        }
        DirCommand::Left | DirCommand::Right | DirCommand::Center => {
            if legacy_center {
                return Ok(());
            }
            if let Some(align) = command.alignment() {
                data.attributes.remove("align");
                data.style.set_text_align(align);
            }
        }
        DirCommand::ExplicitDir => {
            data.attributes.remove("dir");
            data.style.set_direction(current.direction);
        }
    }
    tracing::trace!(block = %block, %command, "applied command to block");
    Ok(())
}
