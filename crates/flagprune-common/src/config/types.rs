#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Top-level configuration, deserialized from a `.toml` (or plain JSON) file.
///
/// ```toml
/// version = "1"
///
/// [patterns]
/// methods = ["*.isEnabled", "registry.read(flagProvider"]
/// classes = ["FeatureFlagService"]
///
/// [flags.new_feature]
/// value = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagConfig {
    /// Free-form version string, not interpreted by the engine.
    #[serde(default)]
    pub version: String,

    /// Call-pattern and flag-service-import matching rules.
    #[serde(default)]
    pub patterns: Patterns,

    /// Canonical flag name -> definition. Keys are unique by construction
    /// (TOML/JSON maps cannot repeat a key), but aliases must additionally be
    /// checked for uniqueness across definitions — see [`FlagConfig::validate`].
    pub flags: HashMap<String, FlagDefinition>,

    /// Engine-wide behavior toggles.
    #[serde(default)]
    pub settings: Settings,
}

/// Call-pattern configuration consumed by the pattern matcher (C3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Patterns {
    /// Ordered list of call-pattern strings, tried first-match-wins.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Class names that identify flag-service imports (C6).
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Engine-wide behavior toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Keep comments attached to removed code where possible (best-effort;
    /// offset-based editing preserves most comments automatically).
    #[serde(default = "default_true")]
    pub preserve_comments: bool,

    /// Collapse blocks left empty by branch elimination into nothing rather
    /// than an empty `{}`.
    #[serde(default = "default_true")]
    pub remove_empty_blocks: bool,

    /// Invoke the external formatter on the final transformed source.
    #[serde(default)]
    pub format_output: bool,

    /// Restrict flag-service import detection to `patterns.classes` matches
    /// only, rather than falling back to the `flag`/`feature` substring
    /// heuristic.
    #[serde(default = "default_true")]
    pub strict_imports: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preserve_comments: true,
            remove_empty_blocks: true,
            format_output: false,
            strict_imports: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// A single flag's resolved value and removal policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagDefinition {
    /// Canonical name — filled in from the config map key by
    /// [`FlagConfig::validate`], not read from the TOML body itself.
    #[serde(skip)]
    pub name: String,

    /// The resolved boolean value every query of this flag collapses to.
    pub value: bool,

    /// Whether the flag's own declaration (constant / field / enum member /
    /// bound local variable) should be deleted once all its references are
    /// gone.
    #[serde(default = "default_true")]
    pub remove_definition: bool,

    /// Alternate spellings that also resolve to this flag.
    #[serde(default)]
    pub aliases: HashSet<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub ticket: Option<String>,

    #[serde(default)]
    pub owner: Option<String>,

    /// ISO-8601 date (`YYYY-MM-DD`) after which the flag is considered
    /// expired; expiry never fails validation, only produces a warning.
    #[serde(default)]
    pub expire: Option<String>,
}

impl FlagDefinition {
    /// True if `name` is this definition's canonical name or one of its
    /// aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(name)
    }

    /// True if `expire` is set, parses, and is strictly in the past relative
    /// to `today`.
    pub fn is_expired(&self, today: time::Date) -> bool {
        let Some(expire) = &self.expire else {
            return false;
        };
        let Ok(format) =
            time::format_description::parse("[year]-[month]-[day]")
        else {
            return false;
        };
        match time::Date::parse(expire, &format) {
            Ok(date) => today > date,
            Err(_) => false,
        }
    }
}

/// A config validation or loading error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No flags at all in `flags`.
    NoFlags,
    /// A flag name (map key) was empty or whitespace-only.
    EmptyFlagName,
    /// The same name or alias string names more than one flag.
    DuplicateName(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFlags => write!(f, "config must define at least one flag"),
            Self::EmptyFlagName => write!(f, "flag names must not be empty"),
            Self::DuplicateName(name) => {
                write!(f, "'{name}' is used as a name or alias by more than one flag")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl FlagConfig {
    /// Fill in each [`FlagDefinition::name`] from its map key and run the
    /// structural checks: non-empty flag set, non-empty names, and
    /// name/alias uniqueness across the whole config.
    ///
    /// Returns one warning string per expired flag; expiry is never fatal.
    pub fn validate(&mut self, today: time::Date) -> Result<Vec<String>, ConfigError> {
        if self.flags.is_empty() {
            return Err(ConfigError::NoFlags);
        }

        let mut seen: HashSet<String> = HashSet::new();
        // Stable iteration order so duplicate-detection is deterministic
        // regardless of HashMap's iteration order.
        let mut keys: Vec<String> = self.flags.keys().cloned().collect();
        keys.sort();

        for key in &keys {
            if key.trim().is_empty() {
                return Err(ConfigError::EmptyFlagName);
            }
        }

        for key in &keys {
            let Some(def) = self.flags.get_mut(key) else {
                continue;
            };
            def.name = key.clone();

            if !seen.insert(key.clone()) {
                return Err(ConfigError::DuplicateName(key.clone()));
            }
            let mut aliases: Vec<String> = def.aliases.iter().cloned().collect();
            aliases.sort();
            for alias in aliases {
                if !seen.insert(alias.clone()) {
                    return Err(ConfigError::DuplicateName(alias));
                }
            }
        }

        let mut warnings = Vec::new();
        for key in &keys {
            let def = &self.flags[key];
            if def.is_expired(today) {
                warnings.push(format!(
                    "flag '{key}' expired on {}",
                    def.expire.as_deref().unwrap_or("?")
                ));
            }
        }
        Ok(warnings)
    }

    /// Look up the flag definition matching `name` by canonical name or
    /// alias.
    pub fn find(&self, name: &str) -> Option<&FlagDefinition> {
        self.flags.values().find(|def| def.matches(name))
    }

    /// [`Self::validate`] against the current date, for callers (the CLI's
    /// config loader) that have no reason to pin `today` themselves.
    pub fn validate_now(&mut self) -> Result<Vec<String>, ConfigError> {
        self.validate(time::OffsetDateTime::now_utc().date())
    }
}
