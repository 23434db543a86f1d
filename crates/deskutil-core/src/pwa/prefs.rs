//! Preference overrides appended to a profile's `user.js`.

use super::layout::{layout_pref_value, LAYOUT_PREF};
use crate::config::ProfileConfig;
use crate::error::{DeskutilError, Result};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

pub const USER_AGENT_PREF: &str = "general.useragent.override";

/// A preference value as written in `user.js`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Bool(b) => write!(f, "{}", b),
            PrefValue::Int(i) => write!(f, "{}", i),
            // JSON string literals are valid JS string literals.
            PrefValue::Str(s) => write!(f, "{}", serde_json::Value::from(s.as_str())),
        }
    }
}

/// One `user_pref("key", value);` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    pub key: String,
    pub value: PrefValue,
}

impl Preference {
    pub fn new(key: impl Into<String>, value: PrefValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user_pref({}, {});",
            serde_json::Value::from(self.key.as_str()),
            self.value
        )
    }
}

/// An ordered set of preference overrides.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreferenceSet {
    prefs: Vec<Preference>,
}

impl PreferenceSet {
    /// The overrides every generated profile receives: custom stylesheets,
    /// extensions enabled in all scopes, compact density.
    pub fn base() -> Self {
        Self {
            prefs: vec![
                Preference::new(
                    "toolkit.legacyUserProfileCustomizations.stylesheets",
                    PrefValue::Bool(true),
                ),
                Preference::new("extensions.autoDisableScopes", PrefValue::Int(0)),
                Preference::new("browser.uidensity", PrefValue::Int(1)),
            ],
        }
    }

    pub fn push(&mut self, pref: Preference) {
        self.prefs.push(pref);
    }

    /// Add the toolbar layout override for a keyword list.
    pub fn with_layout(mut self, keywords: &str) -> Self {
        self.push(Preference::new(
            LAYOUT_PREF,
            PrefValue::Str(layout_pref_value(keywords)),
        ));
        self
    }

    /// Force a user-agent string.
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.push(Preference::new(
            USER_AGENT_PREF,
            PrefValue::Str(user_agent.to_string()),
        ));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preference> {
        self.prefs.iter()
    }

    pub fn len(&self) -> usize {
        self.prefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefs.is_empty()
    }

    /// Render as `user.js` text, one statement per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for pref in &self.prefs {
            out.push_str(&pref.to_string());
            out.push('\n');
        }
        out
    }

    /// Append the rendered statements to `<profile>/user.js`.
    pub fn append_to(&self, profile_dir: &Path) -> Result<()> {
        let path = profile_dir.join(ProfileConfig::PREFS_FILENAME);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| DeskutilError::io_with_path(e, &path))?;

        file.write_all(self.render().as_bytes())
            .map_err(|e| DeskutilError::io_with_path(e, &path))?;

        debug!("Appended {} preferences to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_base() {
        assert_eq!(
            PreferenceSet::base().render(),
            "user_pref(\"toolkit.legacyUserProfileCustomizations.stylesheets\", true);\n\
             user_pref(\"extensions.autoDisableScopes\", 0);\n\
             user_pref(\"browser.uidensity\", 1);\n"
        );
    }

    #[test]
    fn test_string_values_are_escaped() {
        let pref = Preference::new("k", PrefValue::Str(r#"say "hi" \o/"#.to_string()));
        assert_eq!(pref.to_string(), r#"user_pref("k", "say \"hi\" \\o/");"#);
    }

    #[test]
    fn test_layout_pref_is_single_escaped_string() {
        let prefs = PreferenceSet::base().with_layout("arrows,refresh");
        let rendered = prefs.render();
        let last = rendered.lines().last().unwrap();

        assert!(last.starts_with("user_pref(\"browser.uiCustomization.state\", \"{\\\"placements\\\""));
        assert!(last.ends_with("}\");"));
        assert_eq!(prefs.len(), 4);
    }

    #[test]
    fn test_append_keeps_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let user_js = temp_dir.path().join("user.js");
        std::fs::write(&user_js, "user_pref(\"existing\", 1);\n").unwrap();

        PreferenceSet::base()
            .with_user_agent("Mozilla/5.0 Test")
            .append_to(temp_dir.path())
            .unwrap();

        let content = std::fs::read_to_string(&user_js).unwrap();
        assert!(content.starts_with("user_pref(\"existing\", 1);\n"));
        assert!(content.contains("user_pref(\"general.useragent.override\", \"Mozilla/5.0 Test\");"));
    }
}
