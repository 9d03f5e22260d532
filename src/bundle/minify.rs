//! HTML minification for bundle entries.
//!
//! A small tokenizer splits the document into tags, text and comments; the
//! minifier then re-emits them with whitespace collapsed, comments dropped and
//! redundant attributes removed. Content of `<pre>`, `<textarea>` and
//! `<script>` is never touched, and `<style>` content goes through
//! lightningcss. Running the minifier on its own output changes nothing.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

/// Elements around which whitespace carries no meaning.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "base", "blockquote", "body", "caption", "col", "colgroup",
    "dd", "details", "dialog", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html", "li",
    "link", "main", "meta", "nav", "noscript", "ol", "option", "p", "pre", "script", "section",
    "style", "summary", "table", "tbody", "td", "template", "tfoot", "th", "thead", "title", "tr",
    "ul",
];

/// Elements whose content is copied through as-is.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Attribute<'a> {
    name: &'a str,
    value: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Doctype(&'a str),
    Comment(&'a str),
    StartTag {
        name: &'a str,
        attributes: Vec<Attribute<'a>>,
        self_closing: bool,
    },
    EndTag(&'a str),
    Text(&'a str),
    /// Content of a raw-text element, tagged with that element's name.
    RawText(&'a str, &'a str),
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    raw_until: Option<&'a str>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_until: None,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn take_until(&mut self, pattern: &str) -> &'a str {
        let rest = self.rest();
        let end = rest.find(pattern).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start_matches(is_html_space).len();
    }

    fn raw_text(&mut self, element: &'a str) -> Token<'a> {
        let rest = self.rest();
        let closing = format!("</{}", element.to_ascii_lowercase());
        let end = rest
            .to_ascii_lowercase()
            .find(&closing)
            .unwrap_or(rest.len());
        self.pos += end;
        Token::RawText(element, &rest[..end])
    }

    fn comment(&mut self) -> Token<'a> {
        let rest = self.rest();
        let end = rest[4..].find("-->").map(|i| i + 7).unwrap_or(rest.len());
        self.pos += end;
        Token::Comment(&rest[..end])
    }

    fn declaration(&mut self) -> Token<'a> {
        let rest = self.rest();
        let end = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
        self.pos += end;
        Token::Doctype(&rest[..end])
    }

    fn name(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| is_html_space(c) || matches!(c, '>' | '/' | '='))
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn end_tag(&mut self) -> Token<'a> {
        self.pos += 2;
        let name = self.name();
        self.take_until(">");
        if !self.rest().is_empty() {
            self.pos += 1;
        }
        Token::EndTag(name)
    }

    fn start_tag(&mut self) -> Token<'a> {
        self.pos += 1;
        let name = self.name();
        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            if self.rest().is_empty() {
                break;
            }
            if self.starts_with(">") {
                self.pos += 1;
                break;
            }
            if self.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            if self.starts_with("/") {
                self.pos += 1;
                continue;
            }

            let attr_name = self.name();
            if attr_name.is_empty() {
                // a stray `=` or similar; skip it rather than loop forever
                self.pos += 1;
                continue;
            }
            self.skip_whitespace();
            let value = if self.starts_with("=") {
                self.pos += 1;
                self.skip_whitespace();
                Some(self.attribute_value())
            } else {
                None
            };
            attributes.push(Attribute {
                name: attr_name,
                value,
            });
        }

        if !self_closing && RAW_TEXT_ELEMENTS.iter().any(|e| name.eq_ignore_ascii_case(e)) {
            self.raw_until = Some(name);
        }

        Token::StartTag {
            name,
            attributes,
            self_closing,
        }
    }

    fn attribute_value(&mut self) -> &'a str {
        let rest = self.rest();
        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let end = rest[1..].find(quote).map(|i| i + 1).unwrap_or(rest.len());
                self.pos += (end + 1).min(rest.len());
                &rest[1..end]
            }
            _ => {
                let end = rest
                    .find(|c: char| is_html_space(c) || c == '>')
                    .unwrap_or(rest.len());
                self.pos += end;
                &rest[..end]
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if let Some(element) = self.raw_until.take() {
            let token = self.raw_text(element);
            if let Token::RawText(_, "") = token {
                // empty element: fall through to the end tag
            } else {
                return Some(token);
            }
        }

        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }

        let mut chars = rest.chars();
        if chars.next() == Some('<') {
            if rest.starts_with("<!--") {
                return Some(self.comment());
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                return Some(self.declaration());
            }
            match chars.next() {
                Some('/') if rest[2..].starts_with(|c: char| c.is_ascii_alphabetic()) => {
                    return Some(self.end_tag());
                }
                Some(c) if c.is_ascii_alphabetic() => return Some(self.start_tag()),
                _ => {
                    self.pos += 1;
                    return Some(Token::Text(&rest[..1]));
                }
            }
        }

        let end = rest.find('<').unwrap_or(rest.len());
        self.pos += end;
        Some(Token::Text(&rest[..end]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Space {
    /// Nothing pending.
    None,
    /// Whitespace was seen and will be written as a single space if more
    /// inline content follows.
    Pending,
    /// Next to a block boundary; whitespace here is dropped.
    Suppressed,
}

/// ASCII whitespace as HTML defines it. `&nbsp;` and other Unicode spaces
/// are content.
fn is_html_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.iter().any(|e| name.eq_ignore_ascii_case(e))
}

fn is_redundant(element: &str, attribute: &Attribute<'_>) -> bool {
    let element = element.to_ascii_lowercase();
    let name = attribute.name.to_ascii_lowercase();
    let value = attribute.value.map(|v| v.trim().to_ascii_lowercase());
    let value = value.as_deref();

    match (element.as_str(), name.as_str()) {
        ("script", "language") => true,
        ("script", "type") => value == Some("text/javascript"),
        ("style" | "link", "type") => value == Some("text/css"),
        ("form", "method") => value == Some("get"),
        ("input", "type") => value == Some("text"),
        _ => false,
    }
}

fn write_start_tag(out: &mut String, name: &str, attributes: &[Attribute<'_>], self_closing: bool) {
    out.push('<');
    out.push_str(name);
    for attribute in attributes.iter().filter(|a| !is_redundant(name, a)) {
        out.push(' ');
        out.push_str(attribute.name);
        if let Some(value) = attribute.value {
            let quote = if value.contains('"') { '\'' } else { '"' };
            out.push('=');
            out.push(quote);
            out.push_str(value);
            out.push(quote);
        }
    }
    if self_closing {
        out.push_str("/>");
    } else {
        out.push('>');
    }
}

/// Minify a stylesheet, or `None` if lightningcss can't handle it.
pub fn minify_css(css: &str) -> Option<String> {
    let mut sheet = match StyleSheet::parse(css, ParserOptions::default()) {
        Ok(sheet) => sheet,
        Err(e) => {
            log::debug!("leaving stylesheet unminified: {e}");
            return None;
        }
    };
    if let Err(e) = sheet.minify(MinifyOptions::default()) {
        log::debug!("leaving stylesheet unminified: {e}");
        return None;
    }
    match sheet.to_css(PrinterOptions {
        minify: true,
        ..PrinterOptions::default()
    }) {
        Ok(result) => Some(result.code),
        Err(e) => {
            log::debug!("leaving stylesheet unminified: {e}");
            None
        }
    }
}

/// Minify an HTML document.
pub fn minify_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut space = Space::Suppressed;
    let mut preserve_depth = 0usize;

    for token in Tokenizer::new(html) {
        match token {
            Token::Doctype(decl) => {
                let lower = decl.to_ascii_lowercase();
                if lower.starts_with("<!doctype html") {
                    out.push_str("<!doctype html>");
                } else {
                    out.push_str(decl);
                }
                space = Space::Suppressed;
            }
            Token::Comment(comment) => {
                if comment.starts_with("<!--[if") {
                    if space == Space::Pending {
                        out.push(' ');
                    }
                    out.push_str(comment);
                    space = Space::None;
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                if !is_block(name) && space == Space::Pending {
                    out.push(' ');
                }
                write_start_tag(&mut out, name, &attributes, self_closing);
                if name.eq_ignore_ascii_case("pre") && !self_closing {
                    preserve_depth += 1;
                }
                space = if is_block(name) {
                    Space::Suppressed
                } else {
                    Space::None
                };
            }
            Token::EndTag(name) => {
                if !is_block(name) && space == Space::Pending {
                    out.push(' ');
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
                if name.eq_ignore_ascii_case("pre") {
                    preserve_depth = preserve_depth.saturating_sub(1);
                }
                space = if is_block(name) {
                    Space::Suppressed
                } else {
                    Space::None
                };
            }
            Token::RawText(element, content) => {
                if element.eq_ignore_ascii_case("style") {
                    match minify_css(content) {
                        Some(css) => out.push_str(&css),
                        None => out.push_str(content),
                    }
                } else {
                    out.push_str(content);
                }
                space = Space::None;
            }
            Token::Text(text) if preserve_depth > 0 => {
                if space == Space::Pending {
                    out.push(' ');
                }
                out.push_str(text);
                space = Space::None;
            }
            Token::Text(text) => {
                for c in text.chars() {
                    if is_html_space(c) {
                        if space == Space::None {
                            space = Space::Pending;
                        }
                    } else {
                        if space == Space::Pending {
                            out.push(' ');
                        }
                        out.push(c);
                        space = Space::None;
                    }
                }
            }
        }
    }

    out
}
