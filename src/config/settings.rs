//! Application settings.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Whether filter controls are shown when the table opens.
    pub filters_on: bool,
    /// Event loop tick rate in milliseconds.
    pub tick_rate_ms: u64,
    /// Where successful row activations navigate.
    pub navigation: NavigationConfig,
    /// How detail objects are fetched.
    pub lookup: LookupConfig,
    /// Log filter and location.
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            filters_on: true,
            tick_rate_ms: 100,
            navigation: NavigationConfig::default(),
            lookup: LookupConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Validate these settings.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tick_rate_ms must be greater than zero".to_string(),
            ));
        }
        self.navigation.validate()?;
        self.lookup.validate()?;
        self.logging.validate()
    }
}

/// Row activation navigation targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Row types whose activation navigates to the detail.
    pub navigable_types: Vec<String>,
    /// View type set on navigation.
    pub view_type: String,
    /// Page switched to on navigation.
    pub page: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            navigable_types: vec!["courses".to_string(), "enrollments".to_string()],
            view_type: "courses".to_string(),
            page: "ObjectViewer".to_string(),
        }
    }
}

impl NavigationConfig {
    /// Whether activating a row of this type navigates.
    pub fn is_navigable(&self, row_type: &str) -> bool {
        self.navigable_types.iter().any(|t| t == row_type)
    }

    fn validate(&self) -> Result<()> {
        if self.view_type.is_empty() {
            return Err(ConfigError::ValidationError(
                "navigation.view_type cannot be empty".to_string(),
            ));
        }
        if self.page.is_empty() {
            return Err(ConfigError::ValidationError(
                "navigation.page cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Detail lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LookupConfig {
    /// Base URL of the detail service. Without one, rows are their own detail.
    pub base_url: Option<String>,
    /// Optional request timeout. Lookups wait indefinitely when unset.
    pub timeout_secs: Option<u64>,
    /// Row field holding the id, per row type.
    pub id_fields: BTreeMap<String, String>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        let id_fields = [
            ("users", "user_id"),
            ("courses", "course_id"),
            ("enrollments", "enrollment_id"),
        ]
        .into_iter()
        .map(|(row_type, field)| (row_type.to_string(), field.to_string()))
        .collect();

        Self {
            base_url: None,
            timeout_secs: None,
            id_fields,
        }
    }
}

impl LookupConfig {
    /// The id field for a row type, defaulting to `id`.
    pub fn id_field(&self, row_type: &str) -> &str {
        self.id_fields
            .get(row_type)
            .map(String::as_str)
            .unwrap_or("id")
    }

    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.base_url {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ConfigError::ValidationError(format!(
                    "lookup.base_url '{}' must start with http:// or https://",
                    url
                )));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "lookup.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Log settings. `RUST_LOG` still wins over `level` when set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `rostergrid=debug`.
    pub level: Option<String>,
    /// Directory for the rolling log files.
    pub dir: Option<PathBuf>,
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        if matches!(&self.level, Some(level) if level.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "logging.level cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.filters_on);
        assert_eq!(settings.navigation.page, "ObjectViewer");
        assert_eq!(settings.navigation.view_type, "courses");
    }

    #[test]
    fn test_default_navigable_types() {
        let nav = NavigationConfig::default();
        assert!(nav.is_navigable("courses"));
        assert!(nav.is_navigable("enrollments"));
        assert!(!nav.is_navigable("users"));
    }

    #[test]
    fn test_id_field_lookup() {
        let lookup = LookupConfig::default();
        assert_eq!(lookup.id_field("courses"), "course_id");
        assert_eq!(lookup.id_field("rooms"), "id");
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let settings = Settings {
            tick_rate_ms: 0,
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("tick_rate_ms"));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut settings = Settings::default();
        settings.lookup.base_url = Some("api.example.edu".to_string());
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("must start with http"));
    }

    #[test]
    fn test_empty_page_rejected() {
        let mut settings = Settings::default();
        settings.navigation.page.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_blank_log_level_rejected() {
        let mut settings = Settings::default();
        settings.logging.level = Some("  ".to_string());
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            filters_on = false

            [navigation]
            page = "Table"

            [logging]
            level = "rostergrid=debug"
            "#,
        )
        .unwrap();
        assert!(!settings.filters_on);
        assert_eq!(settings.navigation.page, "Table");
        assert_eq!(settings.logging.level.as_deref(), Some("rostergrid=debug"));
        assert!(settings.logging.dir.is_none());
        assert_eq!(settings.navigation.view_type, "courses");
        assert_eq!(settings.tick_rate_ms, 100);
    }
}
