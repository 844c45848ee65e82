/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Render configuration.

use serde::Deserialize;

/// Default limit for nested partial and label inclusion.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Options controlling a render call.
///
/// Can be loaded from a site configuration file:
///
/// ```
/// use konstrukteur_template::RenderOptions;
///
/// let options: RenderOptions = serde_json::from_str(r#"{"strict": true}"#).unwrap();
/// assert!(options.strict);
/// assert_eq!(options.max_depth, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderOptions {
    /// Treat missing partials and labels as fatal instead of warning.
    pub strict: bool,

    /// Maximum nesting depth of partials and labels.
    pub max_depth: usize,

    /// Memoize compiled label fragments by their text.
    pub cache_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            cache_labels: true,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Enable or disable the label fragment cache.
    pub fn with_label_cache(mut self, enabled: bool) -> Self {
        self.cache_labels = enabled;
        self
    }
}
