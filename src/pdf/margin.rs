//! Page margins and the print options derived from them.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A4 paper, in inches.
pub const A4_WIDTH_IN: f64 = 8.27;
pub const A4_HEIGHT_IN: f64 = 11.7;

const PX_PER_IN: f64 = 96.0;
const CM_PER_IN: f64 = 2.54;
const MM_PER_IN: f64 = 25.4;

/// A CSS length: a bare number of pixels or a string such as `"12mm"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Length {
    Px(f64),
    Css(String),
}

impl Length {
    /// Convert to inches, the unit the DevTools protocol expects.
    pub fn to_inches(&self) -> Result<f64, ConfigurationError> {
        let raw = match self {
            Length::Px(px) => return Ok(px / PX_PER_IN),
            Length::Css(raw) => raw.trim(),
        };

        let invalid = || ConfigurationError::InvalidLength(raw.to_string());
        let split = raw
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(raw.len());
        let (number, unit) = raw.split_at(split);
        let number: f64 = number.trim().parse().map_err(|_| invalid())?;

        match unit.to_ascii_lowercase().as_str() {
            "" | "px" => Ok(number / PX_PER_IN),
            "in" => Ok(number),
            "cm" => Ok(number / CM_PER_IN),
            "mm" => Ok(number / MM_PER_IN),
            _ => Err(invalid()),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Length::Css(raw) if raw.trim().is_empty())
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(px) => write!(f, "{px}px"),
            Length::Css(raw) => write!(f, "{raw}"),
        }
    }
}

impl From<f64> for Length {
    fn from(px: f64) -> Self {
        Length::Px(px)
    }
}

impl From<&str> for Length {
    fn from(raw: &str) -> Self {
        Length::Css(raw.to_string())
    }
}

/// Per-edge lengths; an edge that is `None` is left to the browser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Length>,
}

/// The margin setting as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarginSpec {
    Uniform(Length),
    Edges(PageMargins),
}

impl MarginSpec {
    /// Expand into per-edge margins.
    ///
    /// A uniform length applies to all four edges; per-edge margins are used
    /// as written. A blank uniform string counts as no margin at all.
    pub fn expand(&self) -> Option<PageMargins> {
        match self {
            MarginSpec::Uniform(length) if length.is_blank() => None,
            MarginSpec::Uniform(length) => Some(PageMargins {
                top: Some(length.clone()),
                bottom: Some(length.clone()),
                left: Some(length.clone()),
                right: Some(length.clone()),
            }),
            MarginSpec::Edges(edges) => Some(edges.clone()),
        }
    }
}

/// Margins in inches, ready for the print call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarginInches {
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
}

impl PageMargins {
    pub fn to_inches(&self) -> Result<MarginInches, ConfigurationError> {
        let convert = |edge: &Option<Length>| edge.as_ref().map(Length::to_inches).transpose();
        Ok(MarginInches {
            top: convert(&self.top)?,
            bottom: convert(&self.bottom)?,
            left: convert(&self.left)?,
            right: convert(&self.right)?,
        })
    }
}

/// Everything the print engine needs besides the page itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOptions {
    pub path: PathBuf,
    pub paper_width: f64,
    pub paper_height: f64,
    pub print_background: bool,
    pub display_header_footer: bool,
    pub margin: Option<PageMargins>,
}

/// Build A4 print options for `path`, validating any margin lengths.
pub fn page_options(
    path: PathBuf,
    margin: Option<&MarginSpec>,
) -> Result<PageOptions, ConfigurationError> {
    let margin = margin.and_then(MarginSpec::expand);
    if let Some(margin) = &margin {
        margin.to_inches()?;
    }

    Ok(PageOptions {
        path,
        paper_width: A4_WIDTH_IN,
        paper_height: A4_HEIGHT_IN,
        print_background: true,
        display_header_footer: false,
        margin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_zero_sets_all_edges() {
        let options = page_options(PathBuf::from("resume.pdf"), Some(&MarginSpec::Uniform(0.0.into())))
            .expect("valid margin");
        let margin = options.margin.expect("margin is set");
        for edge in [&margin.top, &margin.bottom, &margin.left, &margin.right] {
            assert_eq!(edge, &Some(Length::Px(0.0)));
        }
        let inches = margin.to_inches().expect("valid lengths");
        assert_eq!(inches.top, Some(0.0));
        assert_eq!(inches.right, Some(0.0));
    }

    #[test]
    fn edge_record_passes_through() {
        let spec = MarginSpec::Edges(PageMargins {
            top: Some("1in".into()),
            ..PageMargins::default()
        });
        let options = page_options(PathBuf::from("resume.pdf"), Some(&spec)).expect("valid margin");
        let margin = options.margin.expect("margin is set");
        assert_eq!(margin.top, Some(Length::Css("1in".to_string())));
        assert_eq!(margin.bottom, None);
        assert_eq!(margin.left, None);
        assert_eq!(margin.right, None);
    }

    #[test]
    fn absent_or_blank_margin_is_omitted() {
        let options = page_options(PathBuf::from("resume.pdf"), None).expect("no margin");
        assert_eq!(options.margin, None);
        assert!(options.print_background);
        assert!(!options.display_header_footer);
        assert_eq!((options.paper_width, options.paper_height), (8.27, 11.7));

        let blank = MarginSpec::Uniform("".into());
        let options = page_options(PathBuf::from("resume.pdf"), Some(&blank)).expect("no margin");
        assert_eq!(options.margin, None);
    }

    #[test]
    fn converts_units_to_inches() {
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(close(Length::Px(96.0).to_inches().expect("px"), 1.0));
        assert!(close(Length::from("48").to_inches().expect("bare"), 0.5));
        assert!(close(Length::from("48px").to_inches().expect("px"), 0.5));
        assert!(close(Length::from("0.5in").to_inches().expect("in"), 0.5));
        assert!(close(Length::from("2.54cm").to_inches().expect("cm"), 1.0));
        assert!(close(Length::from("12.7 mm").to_inches().expect("mm"), 0.5));
    }

    #[test]
    fn unknown_units_are_rejected() {
        assert!(matches!(
            Length::from("3em").to_inches(),
            Err(ConfigurationError::InvalidLength(raw)) if raw == "3em"
        ));
        assert!(Length::from("wide").to_inches().is_err());

        let spec = MarginSpec::Uniform("1pc".into());
        assert!(page_options(PathBuf::from("resume.pdf"), Some(&spec)).is_err());
    }

    #[test]
    fn deserializes_both_forms() {
        #[derive(Deserialize)]
        struct Pdf {
            margin: MarginSpec,
        }

        let pdf: Pdf = toml::from_str("margin = 0").expect("integer margin");
        assert_eq!(pdf.margin, MarginSpec::Uniform(Length::Px(0.0)));
        let pdf: Pdf = toml::from_str("margin = \"10mm\"").expect("string margin");
        assert_eq!(pdf.margin, MarginSpec::Uniform(Length::Css("10mm".to_string())));
        let pdf: Pdf = toml::from_str("margin = { top = \"1in\", left = 24 }").expect("edges");
        assert_eq!(
            pdf.margin,
            MarginSpec::Edges(PageMargins {
                top: Some(Length::Css("1in".to_string())),
                left: Some(Length::Px(24.0)),
                ..PageMargins::default()
            })
        );
    }
}
