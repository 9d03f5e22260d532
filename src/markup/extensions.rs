//! Optional markup extensions that can be registered on a renderer.

use super::container::fence;
use super::MarkupExtension;
use anyhow::{anyhow, Result};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};
use regex::{Captures, Regex};
use std::borrow::Cow;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Image sizing: `![alt](src =200x100)`, `![alt](src =200x)` or `![alt](src =x100)`.
///
/// Rewritten into an attribute list on the image before parsing.
pub struct ImageSize {
    pattern: Regex,
}

impl ImageSize {
    pub fn new() -> ImageSize {
        let pattern = Regex::new(
            r#"!\[([^\]]*)\]\(\s*([^\s)]+)(\s+"[^"]*")?\s+=(\d*)x(\d*)\s*\)"#,
        )
        .expect("image size pattern is valid");
        ImageSize { pattern }
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        ImageSize::new()
    }
}

impl MarkupExtension for ImageSize {
    fn name(&self) -> &'static str {
        "image-size"
    }

    fn preprocess<'s>(&self, source: &'s str) -> Cow<'s, str> {
        let mut out = String::with_capacity(source.len());
        let mut changed = false;
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

            let line = self.rewrite_line(line);
            changed |= matches!(line, Cow::Owned(_));
            out.push_str(&line);
        }

        if changed {
            Cow::Owned(out)
        } else {
            Cow::Borrowed(source)
        }
    }
}

impl ImageSize {
    /// Rewrite the sized images of one line, leaving code spans alone.
    fn rewrite_line<'l>(&self, line: &'l str) -> Cow<'l, str> {
        let mut out = String::with_capacity(line.len());
        let mut text_start = 0;
        let mut pos = 0;
        while let Some(offset) = line[pos..].find('`') {
            let start = pos + offset;
            let ticks = backtick_run(&line[start..]);
            let body = start + ticks;
            match closing_run(&line[body..], ticks) {
                Some(close) => {
                    let end = body + close + ticks;
                    out.push_str(&self.pattern.replace_all(&line[text_start..start], sized_image));
                    out.push_str(&line[start..end]);
                    text_start = end;
                    pos = end;
                }
                // an unmatched run is literal text
                None => pos = body,
            }
        }
        out.push_str(&self.pattern.replace_all(&line[text_start..], sized_image));

        if out == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(out)
        }
    }
}

fn sized_image(caps: &Captures) -> String {
    let title = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
    let mut sizes = Vec::new();
    if !caps[4].is_empty() {
        sizes.push(format!("width={}", &caps[4]));
    }
    if !caps[5].is_empty() {
        sizes.push(format!("height={}", &caps[5]));
    }
    if sizes.is_empty() {
        format!("![{}]({}{})", &caps[1], &caps[2], title)
    } else {
        format!("![{}]({}{}){{{}}}", &caps[1], &caps[2], title, sizes.join(" "))
    }
}

fn backtick_run(s: &str) -> usize {
    s.len() - s.trim_start_matches('`').len()
}

/// Offset of the next backtick run of exactly `ticks` backticks.
fn closing_run(s: &str, ticks: usize) -> Option<usize> {
    let mut pos = 0;
    while let Some(offset) = s[pos..].find('`') {
        let start = pos + offset;
        let run = backtick_run(&s[start..]);
        if run == ticks {
            return Some(start);
        }
        pos = start + run;
    }
    None
}

/// Syntax highlighting of fenced code blocks with syntect.
pub struct SyntaxHighlight {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl SyntaxHighlight {
    pub fn new(theme_name: &str) -> Result<SyntaxHighlight> {
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(theme_name)
            .ok_or_else(|| anyhow!("Unknown syntax highlighting theme `{theme_name}`"))?;
        Ok(SyntaxHighlight {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    fn highlight(&self, lang: &str, code: &str) -> String {
        let syntax = self
            .syntaxes
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        match highlighted_html_for_string(code, &self.syntaxes, syntax, &self.theme) {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Failed to highlight `{lang}` code block: {e}");
                format!("<pre><code>{}</code></pre>\n", html_escape::encode_text(code))
            }
        }
    }
}

impl Default for SyntaxHighlight {
    fn default() -> Self {
        SyntaxHighlight::new("InspiredGitHub").expect("InspiredGitHub is a default syntect theme")
    }
}

impl MarkupExtension for SyntaxHighlight {
    fn name(&self) -> &'static str {
        "syntax-highlight"
    }

    fn rewrite<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        let mut block: Option<(String, String)> = None;

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => {
                    let lang = lang.split_whitespace().next().unwrap_or_default().to_string();
                    block = Some((lang, String::new()));
                }
                Event::Text(text) if block.is_some() => {
                    if let Some((_, code)) = block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) if block.is_some() => {
                    if let Some((lang, code)) = block.take() {
                        out.push(Event::Html(CowStr::from(self.highlight(&lang, &code))));
                    }
                }
                event => out.push(event),
            }
        }

        out
    }
}

/// Look up a built-in extension by the name used in configuration files.
pub fn by_name(name: &str) -> Result<Box<dyn MarkupExtension>> {
    match name {
        "image-size" => Ok(Box::new(ImageSize::new())),
        "syntax-highlight" => Ok(Box::new(SyntaxHighlight::new("InspiredGitHub")?)),
        other => Err(anyhow!(
            "Unknown markdown extension `{other}` (expected one of: {})",
            BUILTIN.join(", ")
        )),
    }
}

pub const BUILTIN: &[&str] = &["image-size", "syntax-highlight"];
