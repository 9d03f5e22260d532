//! Locating a Chrome or Chromium executable.

use crate::environment::Environment;
use crate::error::ConfigurationError;
use std::path::{Path, PathBuf};

/// Well-known install locations for the current platform.
pub fn default_install_paths() -> Vec<PathBuf> {
    let paths: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ]
    } else if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "linux") {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium-browser",
            "/usr/bin/chromium",
            "/snap/bin/chromium",
        ]
    } else {
        &[]
    };
    paths.iter().map(PathBuf::from).collect()
}

/// An ordered list of places to look for the browser; the first that exists wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserSearch {
    candidates: Vec<PathBuf>,
}

impl BrowserSearch {
    /// Search the environment override, then `explicit`, then `extra`, then
    /// `defaults` (usually [`default_install_paths`]).
    pub fn with_defaults(
        env: &Environment,
        explicit: Option<&Path>,
        extra: &[PathBuf],
        defaults: Vec<PathBuf>,
    ) -> BrowserSearch {
        let candidates = env
            .executable_override
            .iter()
            .cloned()
            .chain(explicit.map(Path::to_path_buf))
            .chain(extra.iter().cloned())
            .chain(defaults)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        BrowserSearch { candidates }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    pub fn resolve(&self) -> Result<PathBuf, ConfigurationError> {
        match self.candidates.iter().find(|candidate| candidate.exists()) {
            Some(found) => {
                log::debug!("using browser executable {}", found.display());
                Ok(found.clone())
            }
            None => Err(ConfigurationError::BrowserNotFound {
                searched: self.candidates.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"").expect("can create fake executable");
        path
    }

    #[test]
    fn candidates_are_ordered() {
        let env = Environment {
            executable_override: Some(PathBuf::from("/env/chrome")),
            ci: false,
        };
        let search = BrowserSearch::with_defaults(
            &env,
            Some(Path::new("/explicit/chrome")),
            &[PathBuf::from("/extra/chrome")],
            vec![PathBuf::from("/default/chrome")],
        );
        assert_eq!(
            search.candidates(),
            &[
                PathBuf::from("/env/chrome"),
                PathBuf::from("/explicit/chrome"),
                PathBuf::from("/extra/chrome"),
                PathBuf::from("/default/chrome"),
            ]
        );
    }

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let explicit = touch(dir.path(), "explicit");
        let default = touch(dir.path(), "default");

        let search = BrowserSearch::with_defaults(
            &Environment::default(),
            Some(&explicit),
            &[dir.path().join("missing")],
            vec![default.clone()],
        );
        assert_eq!(search.resolve().expect("explicit exists"), explicit);

        let search = BrowserSearch::with_defaults(
            &Environment::default(),
            Some(&dir.path().join("nope")),
            &[],
            vec![default.clone()],
        );
        assert_eq!(search.resolve().expect("default exists"), default);
    }

    #[test]
    fn environment_override_beats_explicit() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let from_env = touch(dir.path(), "from-env");
        let explicit = touch(dir.path(), "explicit");
        let env = Environment {
            executable_override: Some(from_env.clone()),
            ci: false,
        };
        let search = BrowserSearch::with_defaults(&env, Some(&explicit), &[], vec![]);
        assert_eq!(search.resolve().expect("override exists"), from_env);
    }

    #[test]
    fn nothing_found_is_a_configuration_error() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let missing = dir.path().join("chrome");
        let search =
            BrowserSearch::with_defaults(&Environment::default(), Some(&missing), &[], vec![]);
        match search.resolve() {
            Err(ConfigurationError::BrowserNotFound { searched }) => {
                assert_eq!(searched, vec![missing])
            }
            other => panic!("unexpected result: {other:?}"),
        }
        let message = search.resolve().expect_err("nothing exists").to_string();
        assert!(message.contains("CHROME_PATH"));
        assert!(message.contains("pdf.executable"));
    }
}
