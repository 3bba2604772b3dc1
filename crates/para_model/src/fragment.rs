//! Markup fragment loading
//!
//! Reads a lenient HTML-like fragment into detached nodes of a
//! [`DocumentTree`]. Mismatched end tags are tolerated, void elements never
//! open a scope, and `style` attributes are parsed into [`InlineStyle`].

use crate::style::InlineStyle;
use crate::{DocumentTree, ElementData, ModelError, NodeId, Result, Tag};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Markup fragment parser
pub struct MarkupParser;

/// XML's predefined entities plus `&nbsp;`
fn resolve_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{a0}"),
        other => resolve_predefined_entity(other),
    }
}

impl MarkupParser {
    /// Parse `markup` into nodes owned by `tree`.
    ///
    /// Returns the top-level nodes in document order; they are detached and
    /// the caller decides where they go.
    pub fn parse(tree: &mut DocumentTree, markup: &str) -> Result<Vec<NodeId>> {
        let mut reader = Reader::from_str(markup);
        reader.config_mut().check_end_names = false;

        let mut top_level = Vec::new();
        let mut stack: Vec<(NodeId, Tag)> = Vec::new();

        loop {
            let created = match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let (data, void) = Self::element_data(e);
                    let tag = data.tag.clone();
                    let id = tree.create_element_with(data);
                    Self::attach(tree, &stack, &mut top_level, id)?;
                    if !void {
                        stack.push((id, tag));
                    }
                    None
                }
                Ok(Event::Empty(ref e)) => {
                    let (data, _) = Self::element_data(e);
                    Some(tree.create_element_with(data))
                }
                Ok(Event::End(ref e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    let tag = Tag::parse(&name);
                    if !tag.is_void() {
                        if let Some(depth) = stack.iter().rposition(|(_, t)| *t == tag) {
                            stack.truncate(depth);
                        }
                    }
                    None
                }
                Ok(Event::Text(ref e)) => {
                    let text = e
                        .unescape_with(resolve_entity)
                        .map_err(|err| ModelError::Markup(err.to_string()))?;
                    (!text.is_empty()).then(|| tree.create_text(text.into_owned()))
                }
                Ok(Event::CData(ref e)) => {
                    let text = String::from_utf8_lossy(e).to_string();
                    (!text.is_empty()).then(|| tree.create_text(text))
                }
                Ok(Event::Comment(ref e)) => {
                    Some(tree.create_comment(String::from_utf8_lossy(e).to_string()))
                }
                Ok(Event::Eof) => break,
                Err(err) => {
                    return Err(ModelError::Markup(format!(
                        "at byte {}: {err}",
                        reader.error_position()
                    )))
                }
                _ => None,
            };

            if let Some(id) = created {
                Self::attach(tree, &stack, &mut top_level, id)?;
            }
        }

        tracing::trace!(nodes = top_level.len(), "parsed markup fragment");
        Ok(top_level)
    }

    fn attach(
        tree: &mut DocumentTree,
        stack: &[(NodeId, Tag)],
        top_level: &mut Vec<NodeId>,
        id: NodeId,
    ) -> Result<()> {
        match stack.last() {
            Some(&(parent, _)) => tree.append_child(parent, id, None),
            None => {
                top_level.push(id);
                Ok(())
            }
        }
    }

    /// Element payload for a start tag, plus whether it is void
    fn element_data(e: &BytesStart) -> (ElementData, bool) {
        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let mut data = ElementData::new(Tag::parse(&name));
        for attr in e.html_attributes().filter_map(|a| a.ok()) {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value_with(resolve_entity)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());
            if key.eq_ignore_ascii_case("style") {
                data.style = InlineStyle::from_css_text(&value);
            } else {
                data.attributes.set(&key, value);
            }
        }
        let void = data.tag.is_void();
        (data, void)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Direction;

    #[test]
    fn test_parse_nested_markup() {
        let mut tree = DocumentTree::new(Tag::Div);
        let nodes =
            MarkupParser::parse(&mut tree, r#"<div style="direction: rtl">a<b>b</b></div>c"#)
                .unwrap();

        assert_eq!(nodes.len(), 2);
        let div = nodes[0];
        assert_eq!(tree.tag(div), Some(&Tag::Div));
        assert_eq!(
            tree.element(div).unwrap().style.direction(),
            Some(Direction::Rtl)
        );
        assert_eq!(tree.child_count(div), 2);
        assert_eq!(tree.text_content(div), "ab");
        assert_eq!(tree.text(nodes[1]), Some("c"));
    }

    #[test]
    fn test_unclosed_line_break_is_void() {
        let mut tree = DocumentTree::new(Tag::Div);
        let nodes = MarkupParser::parse(&mut tree, "one<br>two<br/>three").unwrap();

        assert_eq!(nodes.len(), 5);
        assert!(tree.is_line_break(nodes[1]));
        assert!(tree.is_line_break(nodes[3]));
        assert_eq!(tree.text(nodes[4]), Some("three"));
    }

    #[test]
    fn test_attributes_and_entities() {
        let mut tree = DocumentTree::new(Tag::Div);
        let nodes = MarkupParser::parse(&mut tree, r#"<p dir="rtl" align=center>&nbsp;&amp;</p>"#)
            .unwrap();
        let p = nodes[0];
        let attrs = &tree.element(p).unwrap().attributes;

        assert_eq!(attrs.get("dir"), Some("rtl"));
        assert_eq!(attrs.get("align"), Some("center"));
        assert_eq!(tree.text_content(p), "\u{a0}&");
    }

    #[test]
    fn test_predefined_entities_in_text_and_attributes() {
        let mut tree = DocumentTree::new(Tag::Div);
        let nodes = MarkupParser::parse(
            &mut tree,
            r#"<p title="a &amp; b">&lt;b&gt; &quot;q&quot; &apos;s&apos;</p>"#,
        )
        .unwrap();
        let p = nodes[0];

        assert_eq!(tree.text_content(p), "<b> \"q\" 's'");
        assert_eq!(tree.element(p).unwrap().attributes.get("title"), Some("a & b"));
        assert_eq!(tree.child_count(p), 1);
    }

    #[test]
    fn test_unknown_entity_is_a_markup_error() {
        let mut tree = DocumentTree::new(Tag::Div);
        let err = MarkupParser::parse(&mut tree, "<p>&bogus;</p>").unwrap_err();
        assert!(matches!(err, ModelError::Markup(_)));
    }

    #[test]
    fn test_comments_become_comment_nodes() {
        let mut tree = DocumentTree::new(Tag::Div);
        let nodes = MarkupParser::parse(&mut tree, "<div><!-- note -->x</div>").unwrap();
        let first = tree.first_child(nodes[0]).unwrap();
        assert!(tree.is_comment(first));
    }

    #[test]
    fn test_mismatched_end_tag_is_tolerated() {
        let mut tree = DocumentTree::new(Tag::Div);
        let nodes = MarkupParser::parse(&mut tree, "<div><span>x</div>y").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(tree.text(nodes[1]), Some("y"));
    }
}
