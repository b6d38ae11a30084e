//! Temperature to category mapping.

use skywatch_core::{CategoryDefinition, ConfigError, FALLBACK_CATEGORY};

/// Pick the category for `temp`.
///
/// The first entry in table order whose inclusive `[min, max]` range holds
/// `temp` wins, so overlapping ranges resolve to the earlier entry. When
/// nothing matches, the `"cool"` entry is returned.
///
/// # Errors
/// `MissingFallbackCategory` when nothing matches and there is no `"cool"` entry.
pub fn classify(
    temp: f64,
    categories: &[CategoryDefinition],
) -> Result<&CategoryDefinition, ConfigError> {
    if let Some(category) = categories.iter().find(|c| c.contains(temp)) {
        return Ok(category);
    }

    tracing::debug!(
        "No category range contains {:.1}°C, using '{}'",
        temp,
        FALLBACK_CATEGORY
    );

    categories
        .iter()
        .find(|c| c.name == FALLBACK_CATEGORY)
        .ok_or_else(|| ConfigError::MissingFallbackCategory(FALLBACK_CATEGORY.to_string()))
}
