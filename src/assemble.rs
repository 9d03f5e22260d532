//! Splices the theme, title and rendered body into the HTML shell template.

use crate::error::ConfigurationError;
use crate::theme::{generate_theme_css, ThemeConfig};
use anyhow::Result;

pub const HEAD_CLOSE: &str = "</head>";
pub const TITLE_PLACEHOLDER: &str = "#[title]";
pub const CONTENT_PLACEHOLDER: &str = "#[content]";

/// Used when neither a title nor a document name is configured.
pub const DEFAULT_TITLE: &str = "resume";

/// Resolve the page title: the title, else the document name, else `resume`.
pub fn page_title<'a>(title: &'a str, name: &'a str) -> &'a str {
    if !title.is_empty() {
        title
    } else if !name.is_empty() {
        name
    } else {
        DEFAULT_TITLE
    }
}

/// Assemble the final page from the shell template.
///
/// Each substitution replaces only the first occurrence. The template must
/// contain `</head>`, `#[title]` and `#[content]`; it is checked up front so a
/// broken template never produces a half-substituted page.
pub fn assemble(
    shell: &str,
    theme: &ThemeConfig,
    title: &str,
    name: &str,
    body: &str,
) -> Result<String> {
    for token in [HEAD_CLOSE, TITLE_PLACEHOLDER, CONTENT_PLACEHOLDER] {
        if !shell.contains(token) {
            return Err(ConfigurationError::TemplateMissingToken { token }.into());
        }
    }

    let style = format!(
        "<style id=\"theme-vars\">{}</style>\n{HEAD_CLOSE}",
        generate_theme_css(theme)
    );
    let html = shell.replacen(HEAD_CLOSE, &style, 1);
    let html = html.replacen(TITLE_PLACEHOLDER, page_title(title, name), 1);
    Ok(html.replacen(CONTENT_PLACEHOLDER, body, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::get_theme;

    const SHELL: &str = "<!DOCTYPE html>\n<html>\n<head>\n<title>#[title]</title>\n</head>\n<body>\n<main>#[content]</main>\n</body>\n</html>\n";

    #[test]
    fn substitutes_theme_title_and_body() {
        let html = assemble(SHELL, get_theme("sky"), "Jane Doe", "jane", "<p>Hi</p>")
            .expect("template is valid");
        assert!(!html.contains(TITLE_PLACEHOLDER));
        assert!(!html.contains(CONTENT_PLACEHOLDER));
        assert!(html.contains("<title>Jane Doe</title>"));
        assert!(html.contains("<main><p>Hi</p></main>"));
        assert!(html.contains("<style id=\"theme-vars\">:root {"));
        assert!(html.contains("--theme-primary: var(--color-sky-600);"));

        let style_at = html.find("<style id=\"theme-vars\">").expect("style injected");
        let head_at = html.find(HEAD_CLOSE).expect("head kept");
        assert!(style_at < head_at);
    }

    #[test]
    fn title_falls_back_to_name_then_default() {
        assert_eq!(page_title("T", "n"), "T");
        assert_eq!(page_title("", "n"), "n");
        assert_eq!(page_title("", ""), "resume");

        let html = assemble(SHELL, get_theme("ocean"), "", "", "").expect("template is valid");
        assert!(html.contains("<title>resume</title>"));
    }

    #[test]
    fn only_first_occurrence_is_replaced() {
        let shell = "<head></head><p>#[title] #[title]</p>#[content]";
        let html = assemble(shell, get_theme("ocean"), "A", "", "B").expect("template is valid");
        assert!(html.contains("<p>A #[title]</p>B"));
    }

    #[test]
    fn body_placeholders_are_not_resubstituted() {
        let html = assemble(SHELL, get_theme("ocean"), "T", "", "<p>#[title]</p>")
            .expect("template is valid");
        assert!(html.contains("<title>T</title>"));
        assert!(html.contains("<main><p>#[title]</p></main>"));
    }

    #[test]
    fn missing_tokens_are_configuration_errors() {
        for (shell, missing) in [
            ("<title>#[title]</title>#[content]", HEAD_CLOSE),
            ("<head></head>#[content]", TITLE_PLACEHOLDER),
            ("<head></head>#[title]", CONTENT_PLACEHOLDER),
        ] {
            let err = assemble(shell, get_theme("ocean"), "T", "", "B")
                .expect_err("template is broken");
            match err.downcast_ref::<ConfigurationError>() {
                Some(ConfigurationError::TemplateMissingToken { token }) => {
                    assert_eq!(*token, missing)
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }
}
