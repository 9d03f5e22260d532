//! Process environment signals, captured once at the start of a build.
//!
//! Nothing else in the crate reads environment variables; everything is passed
//! an [`Environment`] instead, so tests can construct whatever environment they
//! need.

use std::path::PathBuf;

/// Explicit path to a Chrome/Chromium executable, checked before anything else.
pub const EXECUTABLE_OVERRIDE_VAR: &str = "CHROME_PATH";

/// Variables that mark a continuous-integration run, where PDF export is skipped.
pub const CI_VARS: &[&str] = &["CI", "VERCEL"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub executable_override: Option<PathBuf>,
    pub ci: bool,
}

impl Environment {
    pub fn from_env() -> Environment {
        Environment::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; empty values count as unset.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Environment {
        let set = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Environment {
            executable_override: set(EXECUTABLE_OVERRIDE_VAR).map(PathBuf::from),
            ci: CI_VARS.iter().any(|key| set(key).is_some()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn detects_ci_signals() {
        assert!(Environment::from_lookup(lookup(&[("CI", "true")])).ci);
        assert!(Environment::from_lookup(lookup(&[("VERCEL", "1")])).ci);
        assert!(!Environment::from_lookup(lookup(&[("CI", "")])).ci);
        assert!(!Environment::from_lookup(lookup(&[])).ci);
    }

    #[test]
    fn reads_executable_override() {
        let env = Environment::from_lookup(lookup(&[("CHROME_PATH", "/opt/chrome")]));
        assert_eq!(env.executable_override, Some(PathBuf::from("/opt/chrome")));
        let env = Environment::from_lookup(lookup(&[("CHROME_PATH", "")]));
        assert_eq!(env.executable_override, None);
    }
}
