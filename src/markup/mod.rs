//! Markdown → HTML rendering.
//!
//! Wraps pulldown-cmark with the two syntax additions résumés lean on:
//!
//! - `:::` container blocks that become attributed `<div>`s ([`container`])
//! - `{#id .class key=value}` attribute lists on blocks and inline elements
//!   ([`attributes`])
//!
//! Further extensions are registered through [`RendererBuilder`] before the
//! renderer is built; a built [`MarkupRenderer`] is immutable and rendering is
//! a pure function of the source text.

pub mod attributes;
pub mod container;
pub mod extensions;

use pulldown_cmark::{Event, Options, Parser, TextMergeStream};
use std::borrow::Cow;
use std::fmt;

/// A markup extension hooks into rendering at two points: before parsing
/// (source rewriting) and after parsing (event rewriting).
pub trait MarkupExtension: Send + Sync {
    fn name(&self) -> &'static str;

    fn preprocess<'s>(&self, source: &'s str) -> Cow<'s, str> {
        Cow::Borrowed(source)
    }

    fn rewrite<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        events
    }
}

/// Collects parser options and extensions for a [`MarkupRenderer`].
pub struct RendererBuilder {
    options: Options,
    extensions: Vec<Box<dyn MarkupExtension>>,
}

impl RendererBuilder {
    pub fn new() -> RendererBuilder {
        RendererBuilder {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_HEADING_ATTRIBUTES,
            extensions: Vec::new(),
        }
    }

    /// Enable additional pulldown-cmark options.
    pub fn option(mut self, options: Options) -> RendererBuilder {
        self.options.insert(options);
        self
    }

    pub fn extension<E: MarkupExtension + 'static>(self, extension: E) -> RendererBuilder {
        self.boxed_extension(Box::new(extension))
    }

    pub fn boxed_extension(mut self, extension: Box<dyn MarkupExtension>) -> RendererBuilder {
        log::debug!("registering markdown extension `{}`", extension.name());
        self.extensions.push(extension);
        self
    }

    pub fn build(self) -> MarkupRenderer {
        MarkupRenderer {
            options: self.options,
            extensions: self.extensions,
        }
    }
}

impl Default for RendererBuilder {
    fn default() -> Self {
        RendererBuilder::new()
    }
}

pub struct MarkupRenderer {
    options: Options,
    extensions: Vec<Box<dyn MarkupExtension>>,
}

impl fmt::Debug for MarkupRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupRenderer")
            .field("options", &self.options)
            .field(
                "extensions",
                &self.extensions.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Build a renderer, letting `extend` register extensions first.
pub fn create_renderer<F>(extend: F) -> MarkupRenderer
where
    F: FnOnce(RendererBuilder) -> RendererBuilder,
{
    extend(RendererBuilder::new()).build()
}

impl MarkupRenderer {
    /// Render markdown source to an HTML fragment.
    pub fn render(&self, source: &str) -> String {
        let mut text = source.to_string();
        for extension in &self.extensions {
            if let Cow::Owned(rewritten) = extension.preprocess(&text) {
                text = rewritten;
            }
        }

        let (text, tokens) = container::extract(&text);

        let parser = Parser::new_ext(&text, self.options);
        let events: Vec<Event> = TextMergeStream::new(parser).collect();
        let events = attributes::apply(events);
        let mut events = container::apply(events, &tokens);
        for extension in &self.extensions {
            events = extension.rewrite(events);
        }

        let mut html = String::with_capacity(text.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        html
    }
}
