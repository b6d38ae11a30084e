use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use url::Url;

use crate::error::ConfigError;

/// Category selected when no configured range contains the temperature.
pub const FALLBACK_CATEGORY: &str = "cool";

/// Largest accepted `city.timezone_offset`, in seconds.
const MAX_TIMEZONE_OFFSET_SECS: i32 = 18 * 3600;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single-line message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn into_checked(self) -> Result<Self, ConfigError> {
        if !self.is_valid() {
            return Err(ConfigError::Invalid(self.error_summary()));
        }
        for warning in &self.warnings {
            tracing::warn!("Config warning: {}", warning);
        }
        Ok(self)
    }
}

/// Parsed `weather_config` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub city: CityConfig,

    /// Condition code (e.g. "Clear") to display symbol.
    #[serde(default)]
    pub weather_emojis: BTreeMap<String, String>,

    /// Temperature bands in match order. Accepts either a name-keyed table
    /// (document order is kept) or a list of entries carrying `name`.
    #[serde(default, deserialize_with = "deserialize_categories")]
    pub temperature_categories: Vec<CategoryDefinition>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityConfig {
    #[serde(default = "default_city_name")]
    pub name: String,

    /// Fixed offset from UTC in seconds. No daylight-saving rules apply.
    #[serde(default)]
    pub timezone_offset: i32,
}

fn default_city_name() -> String {
    "City".to_string()
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            name: default_city_name(),
            timezone_offset: 0,
        }
    }
}

/// A named temperature band with inclusive bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    #[serde(default)]
    pub name: String,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub clothes: Vec<String>,
    #[serde(default)]
    pub activities: Vec<String>,
}

impl CategoryDefinition {
    /// Inclusive on both ends.
    pub fn contains(&self, temp: f64) -> bool {
        self.min <= temp && temp <= self.max
    }

    fn overlaps(&self, other: &CategoryDefinition) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// OpenWeatherMap request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub base_url: String,

    /// Language for the condition description.
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_provider_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            lang: default_lang(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_url")]
    pub base_url: String,
}

fn default_telegram_url() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            base_url: default_telegram_url(),
        }
    }
}

fn deserialize_categories<'de, D>(deserializer: D) -> Result<Vec<CategoryDefinition>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CategoriesVisitor;

    impl<'de> Visitor<'de> for CategoriesVisitor {
        type Value = Vec<CategoryDefinition>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a table of categories keyed by name, or a list of categories")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut categories = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, mut category)) = map.next_entry::<String, CategoryDefinition>()? {
                category.name = name;
                categories.push(category);
            }
            Ok(categories)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut categories = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(category) = seq.next_element::<CategoryDefinition>()? {
                if category.name.is_empty() {
                    return Err(de::Error::missing_field("name"));
                }
                categories.push(category);
            }
            Ok(categories)
        }
    }

    deserializer.deserialize_any(CategoriesVisitor)
}

impl Config {
    /// Load configuration from a JSON or TOML file (chosen by extension).
    ///
    /// # Errors
    /// `NotFound` if the file is missing, `Empty` if it has no content or is
    /// an empty document, `ParseError` if it cannot be decoded.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::NotFound(format!("{}: {}", path.display(), e)))?;

        if contents.trim().is_empty() {
            return Err(ConfigError::Empty(path.display().to_string()));
        }

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            let table: toml::Table = toml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            if table.is_empty() {
                return Err(ConfigError::Empty(path.display().to_string()));
            }
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
        } else {
            let value: serde_json::Value = serde_json::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            if value.as_object().is_some_and(|obj| obj.is_empty()) {
                return Err(ConfigError::Empty(path.display().to_string()));
            }
            // Decode from text: `Value` objects are sorted and would lose category order.
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
        }
    }

    /// Load and fully validate. Used by jobs that classify temperatures.
    ///
    /// # Errors
    /// Any load error, or `Invalid` when validation reports errors.
    pub fn load_validated(path: &Path) -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load(path)?;
        let validation = config.validate().into_checked()?;
        Ok((config, validation))
    }

    /// Load for jobs that only need display settings. A missing or empty
    /// file falls back to defaults; a malformed one is still an error.
    ///
    /// # Errors
    /// `ParseError` for undecodable content, `Invalid` when display
    /// settings fail validation.
    pub fn load_lenient(path: &Path) -> Result<(Self, ValidationResult), ConfigError> {
        let config = match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::NotFound(p)) | Err(ConfigError::Empty(p)) => {
                tracing::warn!("No usable configuration at {}, using defaults", p);
                Self::default()
            }
            Err(e) => return Err(e),
        };
        let validation = config.validate_display().into_checked()?;
        Ok((config, validation))
    }

    /// Validate everything, including the temperature category table.
    pub fn validate(&self) -> ValidationResult {
        let mut result = self.validate_display();
        self.validate_categories(&mut result);
        result
    }

    /// Validate city, symbol and endpoint settings only.
    pub fn validate_display(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.city.name.trim().is_empty() {
            result.add_error("city.name", "City name must not be empty");
        }

        if self.city.timezone_offset.abs() > MAX_TIMEZONE_OFFSET_SECS {
            result.add_error(
                "city.timezone_offset",
                format!(
                    "Offset {} seconds is outside +/-{} seconds",
                    self.city.timezone_offset, MAX_TIMEZONE_OFFSET_SECS
                ),
            );
        }

        if self.weather_emojis.is_empty() {
            result.add_warning("weather_emojis", "No condition symbols configured");
        }

        validate_url(&self.provider.base_url, "provider.base_url", &mut result);
        validate_url(&self.telegram.base_url, "telegram.base_url", &mut result);

        result
    }

    fn validate_categories(&self, result: &mut ValidationResult) {
        let categories = &self.temperature_categories;

        for (i, category) in categories.iter().enumerate() {
            let field = format!("temperature_categories.{}", category.name);

            if category.name.trim().is_empty() {
                result.add_error(
                    format!("temperature_categories[{}]", i),
                    "Category name must not be empty",
                );
            }
            if category.min > category.max {
                result.add_error(
                    &field,
                    format!("min ({}) is greater than max ({})", category.min, category.max),
                );
            }
            if category.clothes.is_empty() {
                result.add_error(&field, "No clothing recommendations");
            }
            if category.activities.is_empty() {
                result.add_error(&field, "No activity recommendations");
            }

            for earlier in &categories[..i] {
                if earlier.name == category.name {
                    result.add_error(&field, "Duplicate category name");
                } else if earlier.overlaps(category) {
                    result.add_warning(
                        &field,
                        format!(
                            "Range overlaps '{}'; '{}' wins for shared values",
                            earlier.name, earlier.name
                        ),
                    );
                }
            }
        }

        if self.category(FALLBACK_CATEGORY).is_none() {
            result.add_error(
                "temperature_categories",
                format!("Fallback category '{}' is required", FALLBACK_CATEGORY),
            );
        }
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&CategoryDefinition> {
        self.temperature_categories.iter().find(|c| c.name == name)
    }

    /// Display symbol for a condition code; empty when unknown.
    pub fn symbol_for(&self, condition_code: &str) -> &str {
        self.weather_emojis
            .get(condition_code)
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }
            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
