//! The on-disk HTML bundle and the post-processing applied to it.

mod inline_css;
mod minify;

pub use inline_css::inline_stylesheet;
pub use minify::{minify_css, minify_html};

use anyhow::{Context, Result};
use globset::Glob;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const INDEX_HTML: &str = "index.html";
pub const INDEX_CSS: &str = "index.css";

/// Glob selecting the entries that get minified.
pub const HTML_GLOB: &str = "**/*.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// A static file such as a page or stylesheet.
    Asset,
    /// Script code.
    Chunk,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Asset => write!(f, "asset"),
            OutputKind::Chunk => write!(f, "chunk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Text(String),
    Binary(Vec<u8>),
}

impl AssetSource {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AssetSource::Text(text) => text.as_bytes(),
            AssetSource::Binary(bytes) => bytes,
        }
    }

    /// The content as text; binary content is decoded lossily.
    pub fn to_text(&self) -> String {
        match self {
            AssetSource::Text(text) => text.clone(),
            AssetSource::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub file_name: String,
    pub kind: OutputKind,
    pub source: AssetSource,
}

impl OutputFile {
    pub fn asset<S: ToString>(file_name: S, source: AssetSource) -> OutputFile {
        OutputFile {
            file_name: file_name.to_string(),
            kind: OutputKind::Asset,
            source,
        }
    }
}

/// Output files keyed by their path relative to the output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    files: BTreeMap<String, OutputFile>,
}

impl Bundle {
    pub fn insert(&mut self, file: OutputFile) {
        self.files.insert(file.file_name.clone(), file);
    }

    pub fn get(&self, file_name: &str) -> Option<&OutputFile> {
        self.files.get(file_name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Bundle an assembled page and, if there is one, the project stylesheet.
    ///
    /// The stylesheet is emitted as `index.css` and linked from the page head.
    pub fn from_document(html: &str, stylesheet: Option<&str>) -> Bundle {
        let mut bundle = Bundle::default();
        let html = match stylesheet {
            Some(css) => {
                bundle.insert(OutputFile::asset(
                    INDEX_CSS,
                    AssetSource::Text(minify_css(css).unwrap_or_else(|| css.to_string())),
                ));
                let link = format!(r#"<link rel="stylesheet" crossorigin href="./{INDEX_CSS}">"#);
                html.replacen("</head>", &format!("{link}\n</head>"), 1)
            }
            None => html.to_string(),
        };
        bundle.insert(OutputFile::asset(INDEX_HTML, AssetSource::Text(html)));
        bundle
    }

    /// Copy every file below `dir` into the bundle verbatim, keyed by its path
    /// relative to `dir`. Scripts become chunks; everything else is an asset.
    ///
    /// Files that would replace an existing entry are skipped. Returns how many
    /// files were added.
    pub fn add_public_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize> {
        use ignore::Walk;

        let dir = dir.as_ref();
        let mut added = 0;
        for entry in Walk::new(dir) {
            let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let relative = entry.path().strip_prefix(dir).with_context(|| {
                format!("{} is outside {}", entry.path().display(), dir.display())
            })?;
            let file_name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if self.get(&file_name).is_some() {
                log::warn!("not copying {}: {file_name} is already generated", entry.path().display());
                continue;
            }

            let bytes = std::fs::read(entry.path())
                .with_context(|| format!("Failed to read {}", entry.path().display()))?;
            let kind = match relative.extension().and_then(|e| e.to_str()) {
                Some("js" | "mjs") => OutputKind::Chunk,
                _ => OutputKind::Asset,
            };
            self.insert(OutputFile {
                file_name,
                kind,
                source: AssetSource::Binary(bytes),
            });
            added += 1;
        }
        Ok(added)
    }

    /// Write every entry below `out_dir`, returning the written paths.
    pub fn write_to<P: AsRef<Path>>(&self, out_dir: P) -> Result<Vec<PathBuf>> {
        let out_dir = out_dir.as_ref();
        let mut written = Vec::with_capacity(self.files.len());
        for file in self.files.values() {
            let path = out_dir.join(&file.file_name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory {}", parent.display())
                })?;
            }
            std::fs::write(&path, file.source.as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::debug!("wrote {} {}", file.kind, path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Minify every HTML asset in the bundle, returning how many were minified.
///
/// Chunks and other assets are left alone.
pub fn minify_bundle(bundle: &mut Bundle) -> Result<usize> {
    let matcher = Glob::new(HTML_GLOB)
        .with_context(|| format!("Failed to parse glob {HTML_GLOB}"))?
        .compile_matcher();

    let mut minified = 0;
    for file in bundle.files.values_mut() {
        if file.kind != OutputKind::Asset || !matcher.is_match(&file.file_name) {
            continue;
        }
        let before = file.source.len();
        file.source = AssetSource::Text(minify_html(&file.source.to_text()));
        log::debug!(
            "minified {} ({before} -> {} bytes)",
            file.file_name,
            file.source.len()
        );
        minified += 1;
    }
    Ok(minified)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<!DOCTYPE html>\n<html>\n<head>\n<title>T</title>\n</head>\n<body>\n  <p>Hi   there</p>\n</body>\n</html>\n";

    #[test]
    fn links_stylesheet_when_present() {
        let bundle = Bundle::from_document(PAGE, Some("body { color: red; }"));
        assert_eq!(bundle.len(), 2);

        let html = bundle.get(INDEX_HTML).expect("page is bundled").source.to_text();
        assert!(html.contains("<link rel=\"stylesheet\" crossorigin href=\"./index.css\">\n</head>"));
        let css = bundle.get(INDEX_CSS).expect("stylesheet is bundled").source.to_text();
        assert_eq!(css, "body{color:red}");

        let bundle = Bundle::from_document(PAGE, None);
        assert_eq!(bundle.len(), 1);
        assert!(!bundle
            .get(INDEX_HTML)
            .expect("page is bundled")
            .source
            .to_text()
            .contains("<link"));
    }

    #[test]
    fn minifies_only_html_assets() {
        let mut bundle = Bundle::from_document(PAGE, None);
        bundle.insert(OutputFile::asset(
            "nested/about.html",
            AssetSource::Binary(b"<p>  a  </p>".to_vec()),
        ));
        bundle.insert(OutputFile::asset(
            "notes.txt",
            AssetSource::Text("  keep  ".to_string()),
        ));
        bundle.insert(OutputFile {
            file_name: "chunk.html".to_string(),
            kind: OutputKind::Chunk,
            source: AssetSource::Text("  <p> chunk </p>".to_string()),
        });

        let count = minify_bundle(&mut bundle).expect("can minify bundle");
        assert_eq!(count, 2);
        assert_eq!(
            bundle.get(INDEX_HTML).expect("page").source,
            AssetSource::Text(
                "<!doctype html><html><head><title>T</title></head><body><p>Hi there</p></body></html>"
                    .to_string()
            )
        );
        assert_eq!(
            bundle.get("nested/about.html").expect("nested page").source,
            AssetSource::Text("<p>a</p>".to_string())
        );
        assert_eq!(
            bundle.get("notes.txt").expect("text").source.to_text(),
            "  keep  "
        );
        assert_eq!(
            bundle.get("chunk.html").expect("chunk").source.to_text(),
            "  <p> chunk </p>"
        );
    }

    #[test]
    fn copies_public_files() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let public = dir.path().join("public");
        std::fs::create_dir_all(public.join("js")).expect("can create public dir");
        std::fs::write(public.join("favicon.png"), b"\x89PNG").expect("can write icon");
        std::fs::write(public.join("js/print.js"), "window.print();").expect("can write script");
        std::fs::write(public.join("about.html"), "<p>  about  </p>").expect("can write page");
        std::fs::write(public.join("index.html"), "<p>shadowed</p>").expect("can write page");

        let mut bundle = Bundle::from_document(PAGE, None);
        let added = bundle.add_public_dir(&public).expect("can copy public dir");
        assert_eq!(added, 3);
        assert_eq!(bundle.len(), 4);

        let icon = bundle.get("favicon.png").expect("icon copied");
        assert_eq!(icon.kind, OutputKind::Asset);
        assert_eq!(icon.source, AssetSource::Binary(b"\x89PNG".to_vec()));
        assert_eq!(bundle.get("js/print.js").expect("script copied").kind, OutputKind::Chunk);
        assert!(bundle
            .get(INDEX_HTML)
            .expect("page kept")
            .source
            .to_text()
            .contains("Hi   there"));

        assert_eq!(minify_bundle(&mut bundle).expect("can minify bundle"), 2);
        assert_eq!(
            bundle.get("about.html").expect("page copied").source,
            AssetSource::Text("<p>about</p>".to_string())
        );
    }

    #[test]
    fn minifying_twice_changes_nothing() {
        let mut bundle = Bundle::from_document(PAGE, Some("p { margin: 0 }"));
        minify_bundle(&mut bundle).expect("can minify bundle");
        let once = bundle.clone();
        minify_bundle(&mut bundle).expect("can minify bundle");
        assert_eq!(once, bundle);
    }

    #[test]
    fn writes_every_entry() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let mut bundle = Bundle::from_document(PAGE, Some("p{margin:0}"));
        bundle.insert(OutputFile::asset(
            "assets/photo.bin",
            AssetSource::Binary(vec![0, 1, 2]),
        ));

        let written = bundle.write_to(dir.path().join("dist")).expect("can write bundle");
        assert_eq!(written.len(), 3);
        assert_eq!(
            std::fs::read(dir.path().join("dist/assets/photo.bin")).expect("binary written"),
            vec![0, 1, 2]
        );
        assert!(dir.path().join("dist/index.html").is_file());
        assert!(dir.path().join("dist/index.css").is_file());
    }
}
