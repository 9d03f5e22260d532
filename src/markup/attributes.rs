//! `{#id .class key=value}` attribute lists.
//!
//! Attribute lists attach HTML attributes to the element they follow:
//!
//! - directly after an inline element (`**bold**{.x}`, `![a](b.png){width=20}`)
//!   they apply to that element;
//! - at the end of a paragraph or tight list item they apply to the `<p>`/`<li>`.
//!
//! Headings are handled natively by pulldown-cmark's heading attributes. Lists
//! that fail to parse are left in the text untouched.

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

/// An ordered list of HTML attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Add an attribute; `class` values merge into the first `class` entry.
    pub fn push<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        if key == "class" {
            if let Some((_, existing)) = self.0.iter_mut().find(|(k, _)| k == "class") {
                if !existing.is_empty() {
                    existing.push(' ');
                }
                existing.push_str(&value);
                return;
            }
        }
        self.0.push((key, value));
    }

    /// Serialize as ` key="value"` pairs, in declaration order.
    pub fn to_html(&self) -> String {
        self.iter()
            .map(|(k, v)| format!(r#" {}="{}""#, k, html_escape::encode_double_quoted_attribute(v)))
            .collect()
    }
}

/// Parse the inside of an attribute list (without the braces).
///
/// Returns `None` for anything that isn't a well-formed, non-empty list.
pub fn parse(inner: &str) -> Option<Attributes> {
    let mut attrs = Attributes::default();
    let mut chars = inner.trim().chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        match c {
            '#' | '.' => {
                chars.next();
                let name = take_name(&mut chars);
                if name.is_empty() {
                    return None;
                }
                attrs.push(if c == '#' { "id" } else { "class" }, name);
            }
            _ => {
                let key = take_name(&mut chars);
                if key.is_empty() || !is_valid_key(&key) {
                    return None;
                }
                if chars.peek() == Some(&'=') {
                    chars.next();
                    let value = take_value(&mut chars)?;
                    attrs.push(key, value);
                } else {
                    attrs.push(key, "");
                }
            }
        }

        // each entry must be followed by whitespace or the end of the list
        match chars.peek() {
            Some(c) if !c.is_whitespace() => return None,
            _ => {}
        }
    }

    if attrs.is_empty() {
        None
    } else {
        Some(attrs)
    }
}

fn take_name<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || matches!(c, '=' | '{' | '}' | '"' | '\'') {
            break;
        }
        name.push(c);
        chars.next();
    }
    name
}

fn take_value<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) -> Option<String> {
    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some(c) if c == quote => return Some(value),
                    Some(c) => value.push(c),
                    None => return None,
                }
            }
        }
        _ => {
            let value = take_name(chars);
            if value.is_empty() {
                None
            } else {
                Some(value)
            }
        }
    }
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// Split a trailing `{...}` list off `text`, returning the text before it
/// (right-trimmed) and the parsed attributes.
pub fn split_trailing(text: &str) -> Option<(&str, Attributes)> {
    let trimmed = text.trim_end();
    if !trimmed.ends_with('}') {
        return None;
    }
    let open = trimmed.rfind('{')?;
    let attrs = parse(&trimmed[open + 1..trimmed.len() - 1])?;
    Some((trimmed[..open].trim_end(), attrs))
}

/// Split a leading `{...}` list off `text`, returning the attributes and the
/// remaining text.
pub fn split_leading(text: &str) -> Option<(Attributes, &str)> {
    if !text.starts_with('{') {
        return None;
    }
    let close = text.find('}')?;
    let attrs = parse(&text[1..close])?;
    Some((attrs, &text[close + 1..]))
}

/// Apply attribute lists found in an event stream.
pub fn apply<'a>(mut events: Vec<Event<'a>>) -> Vec<Event<'a>> {
    apply_inline(&mut events);
    apply_block(&mut events);
    events
        .into_iter()
        .filter(|event| !matches!(event, Event::Text(text) if text.is_empty()))
        .collect()
}

fn attributed_inline(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::Image | TagEnd::Link | TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough
    )
}

fn apply_inline(events: &mut [Event<'_>]) {
    let mut open: Vec<usize> = Vec::new();
    let mut rewrites: Vec<(usize, usize, Attributes)> = Vec::new();

    for i in 0..events.len() {
        let target = match &events[i] {
            Event::Start(_) => {
                open.push(i);
                continue;
            }
            Event::End(tag) => {
                let start = open.pop();
                match start {
                    Some(start) if attributed_inline(tag) => Some(start),
                    _ => None,
                }
            }
            Event::Code(_) => Some(i),
            _ => None,
        };

        let Some(start) = target else { continue };
        let Some(Event::Text(next)) = events.get(i + 1) else {
            continue;
        };
        if let Some((attrs, rest)) = split_leading(next) {
            let rest = rest.to_string();
            events[i + 1] = Event::Text(CowStr::from(rest));
            rewrites.push((start, i, attrs));
        }
    }

    for (start, end, attrs) in rewrites {
        rewrite_inline(events, start, end, &attrs);
    }
}

fn rewrite_inline(events: &mut [Event<'_>], start: usize, end: usize, attrs: &Attributes) {
    let extra = attrs.to_html();
    let (open, close) = match &events[start] {
        Event::Code(code) => {
            let html = format!("<code{extra}>{}</code>", html_escape::encode_text(&**code));
            events[start] = Event::InlineHtml(CowStr::from(html));
            return;
        }
        Event::Start(Tag::Image {
            dest_url, title, ..
        }) => {
            let alt: String = events[start + 1..end]
                .iter()
                .filter_map(|event| match event {
                    Event::Text(text) | Event::Code(text) => Some(&**text),
                    _ => None,
                })
                .collect();
            let mut html = format!(
                r#"<img src="{}" alt="{}""#,
                html_escape::encode_double_quoted_attribute(&**dest_url),
                html_escape::encode_double_quoted_attribute(&alt)
            );
            if !title.is_empty() {
                html.push_str(&format!(
                    r#" title="{}""#,
                    html_escape::encode_double_quoted_attribute(&**title)
                ));
            }
            html.push_str(&extra);
            html.push_str(" />");
            events[start] = Event::InlineHtml(CowStr::from(html));
            for event in &mut events[start + 1..=end] {
                *event = Event::Text(CowStr::from(""));
            }
            return;
        }
        Event::Start(Tag::Link {
            dest_url, title, ..
        }) => {
            let mut open = format!(
                r#"<a href="{}""#,
                html_escape::encode_double_quoted_attribute(&**dest_url)
            );
            if !title.is_empty() {
                open.push_str(&format!(
                    r#" title="{}""#,
                    html_escape::encode_double_quoted_attribute(&**title)
                ));
            }
            (format!("{open}{extra}>"), "</a>")
        }
        Event::Start(Tag::Emphasis) => (format!("<em{extra}>"), "</em>"),
        Event::Start(Tag::Strong) => (format!("<strong{extra}>"), "</strong>"),
        Event::Start(Tag::Strikethrough) => (format!("<del{extra}>"), "</del>"),
        _ => return,
    };
    events[start] = Event::InlineHtml(CowStr::from(open));
    events[end] = Event::InlineHtml(CowStr::from(close));
}

fn apply_block(events: &mut [Event<'_>]) {
    let mut open: Vec<usize> = Vec::new();

    for i in 0..events.len() {
        let (name, close) = match &events[i] {
            Event::Start(_) => {
                open.push(i);
                continue;
            }
            Event::End(TagEnd::Paragraph) => ("p", "</p>\n"),
            Event::End(TagEnd::Item) => ("li", "</li>\n"),
            Event::End(_) => {
                open.pop();
                continue;
            }
            _ => continue,
        };
        let Some(start) = open.pop() else { continue };

        // the attribute list has to be the last piece of text in the block
        let Some(last) = (start + 1..i)
            .rev()
            .find(|&j| !matches!(&events[j], Event::Text(t) if t.is_empty()))
        else {
            continue;
        };
        let Event::Text(text) = &events[last] else {
            continue;
        };
        let Some((before, attrs)) = split_trailing(text) else {
            continue;
        };
        log::trace!("applying block attributes to <{name}>");

        let before = before.to_string();
        events[last] = Event::Text(CowStr::from(before));
        events[start] = Event::Html(CowStr::from(format!("<{name}{}>", attrs.to_html())));
        events[i] = Event::Html(CowStr::from(close));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_id_class_and_pairs_in_order() {
        let attrs = parse(r#"#intro .lead key=value title="two words" .wide hidden"#)
            .expect("valid attribute list");
        let pairs: Vec<(&str, &str)> = attrs.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("id", "intro"),
                ("class", "lead wide"),
                ("key", "value"),
                ("title", "two words"),
                ("hidden", ""),
            ]
        );
        assert_eq!(
            attrs.to_html(),
            r#" id="intro" class="lead wide" key="value" title="two words" hidden="""#
        );
    }

    #[test]
    fn rejects_malformed_lists() {
        assert!(parse("").is_none());
        assert!(parse("   ").is_none());
        assert!(parse(".").is_none());
        assert!(parse(r#"key="unterminated"#).is_none());
        assert!(parse("=value").is_none());
        assert!(parse("9lives=yes").is_none());
        assert!(parse(r#"a="b"c"#).is_none());
    }

    #[test]
    fn splits_trailing_and_leading_lists() {
        let (before, attrs) = split_trailing("Some text {.note}").expect("trailing list");
        assert_eq!(before, "Some text");
        assert_eq!(attrs.to_html(), r#" class="note""#);
        assert!(split_trailing("function() { return 1 }").is_none());

        let (attrs, rest) = split_leading("{#x} and more").expect("leading list");
        assert_eq!(attrs.to_html(), r#" id="x""#);
        assert_eq!(rest, " and more");
        assert!(split_leading("no list").is_none());
    }

    #[test]
    fn values_are_escaped() {
        let attrs = parse(r#"title='say "hi"'"#).expect("valid list");
        assert_eq!(attrs.to_html(), r#" title="say &quot;hi&quot;""#);
    }
}
