//! Inlining the page's stylesheet, so the page renders without a file server.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<link\b[^>]*>").expect("link pattern is valid"))
}

fn href_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)\shref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("href pattern is valid")
    })
}

/// A path into the bundle, as opposed to an absolute path or a URL.
fn relative_stylesheet(href: &str) -> Option<&str> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    if path.starts_with('/') || path.contains(':') || !path.to_ascii_lowercase().ends_with(".css")
    {
        return None;
    }
    Some(path.trim_start_matches("./"))
}

/// Replace the first `<link>` to a relative `.css` file with a `<style>`
/// element holding that file's contents, read relative to `base_dir`.
///
/// HTML without such a link comes back unchanged.
pub fn inline_stylesheet<P: AsRef<Path>>(html: &str, base_dir: P) -> Result<String> {
    let found = link_pattern().find_iter(html).find_map(|link| {
        let captures = href_pattern().captures(link.as_str())?;
        let href = captures
            .get(1)
            .or_else(|| captures.get(2))
            .or_else(|| captures.get(3))?
            .as_str();
        relative_stylesheet(href).map(|path| (link.range(), path.to_string()))
    });

    let Some((range, path)) = found else {
        log::debug!("no relative stylesheet link to inline");
        return Ok(html.to_string());
    };

    let path = base_dir.as_ref().join(path);
    let css = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read stylesheet {}", path.display()))?;
    log::debug!("inlining stylesheet {}", path.display());

    let mut inlined = String::with_capacity(html.len() + css.len());
    inlined.push_str(&html[..range.start]);
    inlined.push_str("<style>");
    inlined.push_str(&css);
    inlined.push_str("</style>");
    inlined.push_str(&html[range.end..]);
    Ok(inlined)
}
