//! The `resume.toml` project file.

use crate::pdf::MarginSpec;
use crate::pipeline::{MarkdownHook, ProjectLayout, RenderOptions, RenderOptionsBuilder};
use crate::theme::Theme;
use anyhow::{Context, Result};
use pulldown_cmark::Options;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "resume.toml";

/// Complete configuration for a résumé project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Document name; the PDF is written as `<name>.pdf`.
    pub name: String,
    /// Web page title, defaulting to the name.
    pub title: String,
    pub theme: String,
    pub source: PathBuf,
    pub template: PathBuf,
    pub stylesheet: PathBuf,
    /// Copied into the output directory as-is when it exists.
    pub public_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        DocumentConfig {
            name: String::new(),
            title: String::new(),
            theme: Theme::default().id().to_string(),
            source: PathBuf::from("src/resume.md"),
            template: PathBuf::from("index.html"),
            stylesheet: PathBuf::from("src/styles/index.css"),
            public_dir: PathBuf::from("public"),
            out_dir: PathBuf::from("dist"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Built-in extensions to enable, by name.
    pub extensions: Vec<String>,
    /// `[^label]` footnote references and definitions.
    pub footnotes: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<MarginSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    pub search_paths: Vec<PathBuf>,
    pub sandbox: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for PdfConfig {
    fn default() -> Self {
        PdfConfig {
            margin: None,
            executable: None,
            search_paths: Vec::new(),
            sandbox: true,
            timeout_secs: None,
        }
    }
}

impl Configuration {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Configuration> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to load {} contents", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Input and output paths, resolved against the project root.
    pub fn layout<P: AsRef<Path>>(&self, root: P) -> ProjectLayout {
        let root = root.as_ref();
        ProjectLayout {
            source: root.join(&self.document.source),
            template: root.join(&self.document.template),
            stylesheet: root.join(&self.document.stylesheet),
            public_dir: root.join(&self.document.public_dir),
            out_dir: root.join(&self.document.out_dir),
        }
    }

    pub fn render_options(&self, skip_pdf: bool) -> Result<RenderOptions> {
        let mut markdown = MarkdownHook::extensions(&self.markdown.extensions)?;
        if self.markdown.footnotes {
            markdown = markdown.with_options(Options::ENABLE_FOOTNOTES);
        }

        let mut builder = RenderOptionsBuilder::default();
        builder
            .name(self.document.name.clone())
            .title(self.document.title.clone())
            .theme(self.document.theme.clone())
            .markdown(markdown)
            .search_paths(self.pdf.search_paths.clone())
            .sandbox(self.pdf.sandbox)
            .skip_pdf(skip_pdf);
        if let Some(margin) = &self.pdf.margin {
            builder.margin(margin.clone());
        }
        if let Some(executable) = &self.pdf.executable {
            builder.executable(executable.clone());
        }
        if let Some(secs) = self.pdf.timeout_secs {
            builder.timeout(Duration::from_secs(secs));
        }
        builder
            .build()
            .with_context(|| "Failed to build render options")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::margin::PageMargins;
    use crate::pdf::Length;

    #[test]
    fn can_serialize_default_configuration() {
        toml::to_string(&Configuration::default()).expect("can serialize configuration to TOML");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: Configuration = toml::from_str("").expect("can parse empty configuration");
        assert_eq!(config, Configuration::default());
        assert_eq!(config.document.theme, "ocean");
        assert!(config.pdf.sandbox);
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = Configuration {
            document: DocumentConfig {
                name: "jane-doe".to_string(),
                title: "Jane Doe".to_string(),
                theme: "forest".to_string(),
                ..DocumentConfig::default()
            },
            markdown: MarkdownConfig {
                extensions: vec!["image-size".to_string()],
                footnotes: true,
            },
            pdf: PdfConfig {
                margin: Some(MarginSpec::Edges(PageMargins {
                    top: Some(Length::Css("1in".to_string())),
                    bottom: Some(Length::Px(24.0)),
                    ..PageMargins::default()
                })),
                executable: Some(PathBuf::from("/opt/chrome")),
                timeout_secs: Some(30),
                ..PdfConfig::default()
            },
        };
        let text = toml::to_string_pretty(&config).expect("can serialize configuration to TOML");
        let parsed: Configuration = toml::from_str(&text).expect("can parse serialized TOML");
        assert_eq!(parsed, config);
    }

    #[test]
    fn parses_handwritten_file() {
        let config: Configuration = toml::from_str(
            r#"
            [document]
            name = "jane"
            theme = "sky"

            [markdown]
            extensions = ["image-size", "syntax-highlight"]

            [pdf]
            margin = "12mm"
            search_paths = ["/opt/chromium/chrome"]
            sandbox = false
            "#,
        )
        .expect("can parse configuration");

        assert_eq!(config.document.name, "jane");
        assert_eq!(config.document.source, PathBuf::from("src/resume.md"));
        assert_eq!(
            config.pdf.margin,
            Some(MarginSpec::Uniform(Length::Css("12mm".to_string())))
        );

        let options = config.render_options(false).expect("can build options");
        assert_eq!(options.name, "jane");
        assert_eq!(options.theme, "sky");
        assert!(!options.sandbox);
        assert_eq!(options.search_paths, vec![PathBuf::from("/opt/chromium/chrome")]);
        assert_eq!(options.timeout, None);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let config: Configuration =
            toml::from_str("[markdown]\nextensions = [\"emoji\"]").expect("can parse configuration");
        assert!(config.render_options(false).is_err());
    }

    #[test]
    fn layout_is_relative_to_root() {
        let layout = Configuration::default().layout("/home/jane/resume");
        assert_eq!(layout.source, PathBuf::from("/home/jane/resume/src/resume.md"));
        assert_eq!(layout.out_dir, PathBuf::from("/home/jane/resume/dist"));
        assert_eq!(layout.public_dir, PathBuf::from("/home/jane/resume/public"));
    }

    #[test]
    fn footnotes_switch_enables_footnotes() {
        let source = "Led the migration.[^1]\n\n[^1]: Forty services.\n";
        let render = |config: &Configuration| {
            let options = config.render_options(true).expect("can build options");
            crate::markup::create_renderer(|builder| options.markdown.apply(builder))
                .render(source)
        };

        let config: Configuration =
            toml::from_str("[markdown]\nfootnotes = true").expect("can parse configuration");
        let html = render(&config);
        assert!(html.contains("footnote-reference"), "{html}");
        assert!(html.contains("Forty services."));

        let html = render(&Configuration::default());
        assert!(!html.contains("footnote-reference"));
    }
}
