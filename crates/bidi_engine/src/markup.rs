//! Markup clean-up before fragment parsing

use crate::Result;
use regex_lite::Regex;

/// Normalize whitespace of markup outside `<pre>` sections.
///
/// Source newlines are dropped, tab runs and leading whitespace become a
/// single no-break space, and trailing runs of two or more no-break spaces
/// are removed. Text between `<pre>` and `</pre>` is kept verbatim.
pub fn prefilter_newlines(html: &str) -> Result<String> {
    let pre_tag = Regex::new(r"(?i)</?pre\b[^>]*>")?;
    let tabs = Regex::new(r"\t+")?;
    let leading = Regex::new(r"^\s+")?;
    let trailing = Regex::new("\u{a0}\u{a0}+$")?;

    let filter = |segment: &str| -> String {
        let segment = segment.replace('\n', "");
        let segment = tabs.replace_all(&segment, "\u{a0}");
        let segment = leading.replace_all(&segment, "\u{a0}");
        trailing.replace_all(&segment, "").into_owned()
    };

    let mut out = String::with_capacity(html.len());
    let mut in_pre = false;
    let mut cursor = 0;
    for tag in pre_tag.find_iter(html) {
        let segment = &html[cursor..tag.start()];
        if in_pre {
            out.push_str(segment);
        } else {
            out.push_str(&filter(segment));
        }
        out.push_str(tag.as_str());
        in_pre = !in_pre;
        cursor = tag.end();
    }
    let rest = &html[cursor..];
    if in_pre {
        out.push_str(rest);
    } else {
        out.push_str(&filter(rest));
    }
    Ok(out)
}
