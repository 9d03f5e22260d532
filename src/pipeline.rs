//! One build: markdown in, minified bundle and PDF out.

use crate::assemble::assemble;
use crate::bundle::{minify_bundle, Bundle};
use crate::environment::Environment;
use crate::markup::extensions::{by_name, BUILTIN};
use crate::markup::{create_renderer, RendererBuilder};
use crate::pdf::{
    default_install_paths, render_pdf, BrowserSearch, ChromeEngine, MarginSpec, PdfJob,
    PrintEngine,
};
use crate::theme::{get_theme, Theme};
use anyhow::{anyhow, Context, Result};
use derive_builder::Builder;
use indicatif::ProgressBar;
use pulldown_cmark::Options;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

type HookFn = dyn Fn(RendererBuilder) -> RendererBuilder + Send + Sync;

/// Caller customization of the markdown renderer, applied before it is built.
#[derive(Clone, Default)]
pub struct MarkdownHook(Option<Arc<HookFn>>);

impl MarkdownHook {
    pub fn new<F>(hook: F) -> MarkdownHook
    where
        F: Fn(RendererBuilder) -> RendererBuilder + Send + Sync + 'static,
    {
        MarkdownHook(Some(Arc::new(hook)))
    }

    /// A hook registering built-in extensions by name.
    pub fn extensions(names: &[String]) -> Result<MarkdownHook> {
        if names.is_empty() {
            return Ok(MarkdownHook::default());
        }
        if let Some(unknown) = names.iter().find(|name| !BUILTIN.contains(&name.as_str())) {
            return Err(anyhow!(
                "Unknown markdown extension `{unknown}` (expected one of: {})",
                BUILTIN.join(", ")
            ));
        }

        let names = names.to_vec();
        Ok(MarkdownHook::new(move |builder| {
            names.iter().fold(builder, |builder, name| match by_name(name) {
                Ok(extension) => builder.boxed_extension(extension),
                Err(e) => {
                    log::warn!("skipping markdown extension `{name}`: {e:#}");
                    builder
                }
            })
        }))
    }

    /// This hook, followed by enabling extra parser options.
    pub fn with_options(self, options: Options) -> MarkdownHook {
        MarkdownHook::new(move |builder| self.apply(builder).option(options))
    }

    pub fn apply(&self, builder: RendererBuilder) -> RendererBuilder {
        match &self.0 {
            Some(hook) => hook(builder),
            None => builder,
        }
    }
}

impl fmt::Debug for MarkdownHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => write!(f, "MarkdownHook(..)"),
            None => write!(f, "MarkdownHook(None)"),
        }
    }
}

/// Settings for one build invocation.
#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct RenderOptions {
    /// Document name; also the PDF file name.
    #[builder(default)]
    pub name: String,
    /// Web page title.
    #[builder(default)]
    pub title: String,
    #[builder(default)]
    pub markdown: MarkdownHook,
    #[builder(setter(into, strip_option), default)]
    pub margin: Option<MarginSpec>,
    #[builder(setter(into, strip_option), default)]
    pub executable: Option<PathBuf>,
    #[builder(setter(each(name = "search_path", into)), default)]
    pub search_paths: Vec<PathBuf>,
    /// Well-known install locations, searched after `search_paths`.
    #[builder(default = "default_install_paths()")]
    pub install_paths: Vec<PathBuf>,
    #[builder(default = "true")]
    pub sandbox: bool,
    #[builder(setter(into, strip_option), default)]
    pub timeout: Option<Duration>,
    #[builder(default = "Theme::default().id().to_string()")]
    pub theme: String,
    #[builder(default)]
    pub skip_pdf: bool,
}

impl RenderOptions {
    pub fn chrome_engine(&self) -> ChromeEngine {
        ChromeEngine {
            sandbox: self.sandbox,
            timeout: self.timeout,
        }
    }
}

/// Where a project's inputs live and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub source: PathBuf,
    pub template: PathBuf,
    pub stylesheet: PathBuf,
    /// Files copied into the output unchanged.
    pub public_dir: PathBuf,
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Bundle files, in output order.
    pub written: Vec<PathBuf>,
    /// The PDF, unless the export was skipped.
    pub pdf: Option<PathBuf>,
}

/// Run every stage of a build in order.
pub fn build<E: PrintEngine + ?Sized>(
    layout: &ProjectLayout,
    options: &RenderOptions,
    env: &Environment,
    engine: &E,
    progress: &ProgressBar,
) -> Result<BuildOutcome> {
    progress.set_message("Rendering markdown...");
    let source = std::fs::read_to_string(&layout.source)
        .with_context(|| format!("Failed to read {}", layout.source.display()))?;
    let renderer = create_renderer(|builder| options.markdown.apply(builder));
    log::debug!("rendering with {renderer:?}");
    let body = renderer.render(&source);

    progress.set_message("Assembling page...");
    let shell = std::fs::read_to_string(&layout.template)
        .with_context(|| format!("Failed to read {}", layout.template.display()))?;
    let html = assemble(
        &shell,
        get_theme(&options.theme),
        &options.title,
        &options.name,
        &body,
    )
    .with_context(|| format!("Failed to assemble {}", layout.template.display()))?;

    progress.set_message("Bundling...");
    let stylesheet = if layout.stylesheet.is_file() {
        Some(
            std::fs::read_to_string(&layout.stylesheet)
                .with_context(|| format!("Failed to read {}", layout.stylesheet.display()))?,
        )
    } else {
        log::debug!("no stylesheet at {}", layout.stylesheet.display());
        None
    };
    let mut bundle = Bundle::from_document(&html, stylesheet.as_deref());
    if layout.public_dir.is_dir() {
        let copied = bundle
            .add_public_dir(&layout.public_dir)
            .with_context(|| format!("Failed to copy {}", layout.public_dir.display()))?;
        log::debug!("copied {copied} files from {}", layout.public_dir.display());
    }
    log::debug!("bundle has {} files", bundle.len());
    minify_bundle(&mut bundle).with_context(|| "Failed to minify bundle")?;
    let written = bundle
        .write_to(&layout.out_dir)
        .with_context(|| "Failed to write bundle")?;
    progress.inc(1);

    if env.ci {
        log::info!("Skipping PDF generation in CI environment");
        return Ok(BuildOutcome { written, pdf: None });
    }
    if options.skip_pdf {
        log::info!("Skipping PDF generation");
        return Ok(BuildOutcome { written, pdf: None });
    }

    progress.set_message("Printing PDF...");
    let search = BrowserSearch::with_defaults(
        env,
        options.executable.as_deref(),
        &options.search_paths,
        options.install_paths.clone(),
    );
    log::debug!("browser candidates: {:?}", search.candidates());
    let job = PdfJob {
        out_dir: &layout.out_dir,
        name: &options.name,
        margin: options.margin.as_ref(),
    };
    let pdf = render_pdf(engine, &search, &job)?;
    progress.inc(1);

    Ok(BuildOutcome {
        written,
        pdf: Some(pdf),
    })
}
