use std::fmt;
use std::path::PathBuf;

/// Fatal problems with the build's setup rather than with its inputs.
///
/// These are never retried; the message names what needs to change.
#[derive(Debug)]
pub enum ConfigurationError {
    /// None of the candidate browser executables exist
    BrowserNotFound { searched: Vec<PathBuf> },
    /// The HTML shell template is missing a token it must contain
    TemplateMissingToken { token: &'static str },
    /// A margin length couldn't be understood
    InvalidLength(String),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::BrowserNotFound { searched } => {
                write!(
                    f,
                    "Chrome executable not found. Set {} or pass `pdf.executable` in the configuration",
                    crate::environment::EXECUTABLE_OVERRIDE_VAR
                )?;
                if !searched.is_empty() {
                    let searched = searched
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<String>>()
                        .join(", ");
                    write!(f, " (searched: {searched})")?;
                }
                Ok(())
            }
            ConfigurationError::TemplateMissingToken { token } => {
                write!(
                    f,
                    "HTML template is missing `{token}`; add it to the template"
                )
            }
            ConfigurationError::InvalidLength(length) => {
                write!(
                    f,
                    "Invalid margin length `{length}`; use a number of pixels or a length in px, in, cm or mm"
                )
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}
