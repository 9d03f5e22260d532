//! Generic `:::` container blocks.
//!
//! ```markdown
//! ::: container {.highlight #skills}
//! Body text, parsed as regular markdown.
//! :::
//! ```
//!
//! Marker lines are swapped for HTML comment placeholders before the markdown
//! is parsed, so the whole document still goes through a single parse (and
//! reference links resolve across container boundaries). The placeholders come
//! back out of the parser as HTML block events and are replaced by the rendered
//! `<div>` tokens.

use super::attributes::{self, Attributes};
use pulldown_cmark::{CowStr, Event};

const PLACEHOLDER_PREFIX: &str = "<!--resume-press:container:";
const PLACEHOLDER_SUFFIX: &str = "-->";

/// One open or close marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerToken {
    /// `1` for an opening marker, `-1` for a closing one
    pub nesting: i8,
    /// Depth of the container this token opens or closes, starting at 1
    pub depth: usize,
    /// Free-form text after the opening marker
    pub info: String,
    pub attrs: Option<Attributes>,
}

impl ContainerToken {
    /// Render this token as HTML.
    pub fn render(&self) -> String {
        if self.nesting < 0 {
            return "</div>\n".to_string();
        }
        match &self.attrs {
            Some(attrs) if !attrs.is_empty() => format!("<div{}>\n", attrs.to_html()),
            _ => "<div class=\"container\">\n".to_string(),
        }
    }
}

/// Marker info is accepted unconditionally.
fn validate(_info: &str) -> bool {
    true
}

fn parse_info(info: &str) -> Option<Attributes> {
    match attributes::split_trailing(info) {
        Some((_, attrs)) => Some(attrs),
        None => {
            if info.trim_end().ends_with('}') {
                log::debug!("ignoring unparseable container attributes in `{info}`");
            }
            None
        }
    }
}

/// A marker line: its indentation, the number of leading colons and the info
/// text. Up to three spaces of indentation are allowed, like any other block
/// marker.
fn marker(line: &str) -> Option<(&str, usize, &str)> {
    let rest = line.trim_start_matches(' ');
    let indent = &line[..line.len() - rest.len()];
    if indent.len() > 3 {
        return None;
    }
    let colons = rest.len() - rest.trim_start_matches(':').len();
    if colons < 3 {
        return None;
    }
    Some((indent, colons, rest[colons..].trim()))
}

/// The fence character and length of a code fence line.
pub(super) fn fence(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let c = trimmed.chars().next()?;
    if c != '`' && c != '~' {
        return None;
    }
    let len = trimmed.len() - trimmed.trim_start_matches(c).len();
    if len >= 3 {
        Some((c, len))
    } else {
        None
    }
}

/// Replace container marker lines with placeholders.
///
/// Returns the rewritten source and the tokens the placeholders refer to.
pub fn extract(source: &str) -> (String, Vec<ContainerToken>) {
    let mut out = String::with_capacity(source.len());
    let mut tokens: Vec<ContainerToken> = Vec::new();
    // marker lengths of the currently open containers
    let mut stack: Vec<usize> = Vec::new();
    let mut code_fence: Option<(char, usize)> = None;

    for line in source.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);

        if let Some((c, len)) = code_fence {
            if matches!(fence(content), Some((fc, flen)) if fc == c && flen >= len) {
                code_fence = None;
            }
            out.push_str(line);
            continue;
        }
        if let Some(f) = fence(content) {
            code_fence = Some(f);
            out.push_str(line);
            continue;
        }

        let Some((indent, len, info)) = marker(content) else {
            out.push_str(line);
            continue;
        };

        let closes = info.is_empty() && stack.last().is_some_and(|&open| len >= open);
        let token = if closes {
            let depth = stack.len();
            stack.pop();
            ContainerToken {
                nesting: -1,
                depth,
                info: String::new(),
                attrs: None,
            }
        } else if validate(info) {
            stack.push(len);
            ContainerToken {
                nesting: 1,
                depth: stack.len(),
                info: info.to_string(),
                attrs: parse_info(info),
            }
        } else {
            out.push_str(line);
            continue;
        };

        // the placeholder keeps the marker's indentation so a container
        // inside a list item stays in that item
        push_placeholder(&mut out, indent, tokens.len());
        tokens.push(token);
    }

    // close anything left open at the end of the document
    while !stack.is_empty() {
        let depth = stack.len();
        stack.pop();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        push_placeholder(&mut out, "", tokens.len());
        tokens.push(ContainerToken {
            nesting: -1,
            depth,
            info: String::new(),
            attrs: None,
        });
    }

    (out, tokens)
}

fn push_placeholder(out: &mut String, indent: &str, index: usize) {
    out.push_str(indent);
    out.push_str(PLACEHOLDER_PREFIX);
    out.push_str(&index.to_string());
    out.push_str(PLACEHOLDER_SUFFIX);
    out.push('\n');
}

fn placeholder_index(html: &str) -> Option<usize> {
    html.trim()
        .strip_prefix(PLACEHOLDER_PREFIX)?
        .strip_suffix(PLACEHOLDER_SUFFIX)?
        .parse()
        .ok()
}

/// Swap placeholder HTML events for their rendered container tokens.
pub fn apply<'a>(events: Vec<Event<'a>>, tokens: &[ContainerToken]) -> Vec<Event<'a>> {
    if tokens.is_empty() {
        return events;
    }
    events
        .into_iter()
        .map(|event| match &event {
            Event::Html(html) => match placeholder_index(html).and_then(|i| tokens.get(i)) {
                Some(token) => Event::Html(CowStr::from(token.render())),
                None => event,
            },
            _ => event,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_open_and_close_tokens() {
        let (out, tokens) = extract("::: container {.highlight}\nBody\n:::\n");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].nesting, 1);
        assert_eq!(tokens[0].depth, 1);
        assert_eq!(tokens[0].info, "container {.highlight}");
        assert_eq!(tokens[1].nesting, -1);
        assert_eq!(tokens[1].depth, 1);
        assert!(out.contains("Body\n"));
        assert!(!out.contains(":::"));
    }

    #[test]
    fn tokens_render_divs() {
        let (_, tokens) = extract("::: container\nx\n:::\n");
        assert_eq!(tokens[0].render(), "<div class=\"container\">\n");
        assert_eq!(tokens[1].render(), "</div>\n");

        let (_, tokens) = extract("::: container {key=value}\nx\n:::\n");
        assert_eq!(tokens[0].render(), "<div key=\"value\">\n");
    }

    #[test]
    fn unparseable_attributes_fall_back() {
        let (_, tokens) = extract("::: container {key=\"oops}\nx\n:::\n");
        assert_eq!(tokens[0].attrs, None);
        assert_eq!(tokens[0].render(), "<div class=\"container\">\n");
    }

    #[test]
    fn nested_containers_track_depth() {
        let (_, tokens) = extract("::: outer\n::: inner\ntext\n:::\n:::\n");
        let shape: Vec<(i8, usize)> = tokens.iter().map(|t| (t.nesting, t.depth)).collect();
        assert_eq!(shape, vec![(1, 1), (1, 2), (-1, 2), (-1, 1)]);
    }

    #[test]
    fn unclosed_containers_are_closed_at_end() {
        let (out, tokens) = extract("::: open\ntext");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].nesting, -1);
        assert!(out.ends_with("-->\n"));
    }

    #[test]
    fn markers_inside_code_fences_are_ignored() {
        let source = "```\n:::\n```\n";
        let (out, tokens) = extract(source);
        assert!(tokens.is_empty());
        assert_eq!(out, source);
    }

    #[test]
    fn short_markers_are_not_containers() {
        let (out, tokens) = extract(":: nope\n");
        assert!(tokens.is_empty());
        assert_eq!(out, ":: nope\n");
    }

    #[test]
    fn indented_markers_keep_their_indentation() {
        let (out, tokens) = extract("- item\n\n  ::: container {.x}\n  inner\n  :::\n");
        assert_eq!(tokens.len(), 2);
        assert_eq!(
            out,
            "- item\n\n  <!--resume-press:container:0-->\n  inner\n  <!--resume-press:container:1-->\n"
        );
    }
}
