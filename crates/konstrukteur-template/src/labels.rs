/*
 * labels.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Runtime-overridable text fragments.
//!
//! A label is referenced from a template with `{{_name}}`. Its text comes from
//! the [`Labels`] map passed to the render call (typically one map per site
//! language) and may itself contain tags, so it is compiled before rendering.
//! Compiled fragments are memoized by their text in a process-wide cache.

use crate::error::TemplateResult;
use crate::template::Template;
use crate::value::Value;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Number of fragments kept before the cache is flushed.
const FRAGMENT_CACHE_LIMIT: usize = 1024;

static FRAGMENTS: Lazy<RwLock<HashMap<String, Template>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// The value of a single label.
#[derive(Clone)]
pub enum LabelValue {
    /// Fixed text.
    Text(String),

    /// Text computed from the current render context.
    Dynamic(Arc<dyn Fn(&Value) -> String + Send + Sync>),
}

impl LabelValue {
    /// Create a label whose text is computed from the context at render time.
    pub fn dynamic(f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        LabelValue::Dynamic(Arc::new(f))
    }

    /// The label text for the given context.
    pub fn text(&self, data: &Value) -> Cow<'_, str> {
        match self {
            LabelValue::Text(text) => Cow::Borrowed(text),
            LabelValue::Dynamic(f) => Cow::Owned(f(data)),
        }
    }
}

impl fmt::Debug for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            LabelValue::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for LabelValue {
    fn from(text: &str) -> Self {
        LabelValue::Text(text.to_string())
    }
}

impl From<String> for LabelValue {
    fn from(text: String) -> Self {
        LabelValue::Text(text)
    }
}

/// A map of label names to label values.
///
/// Deserializes from a flat JSON object of strings, e.g. a translation file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "HashMap<String, String>")]
pub struct Labels {
    entries: HashMap<String, LabelValue>,
}

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<LabelValue>) -> &mut Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Add a label computed from the render context.
    pub fn insert_fn(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&Value) -> String + Send + Sync + 'static,
    ) -> &mut Self {
        self.entries.insert(name.into(), LabelValue::dynamic(f));
        self
    }

    pub fn get(&self, name: &str) -> Option<&LabelValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<HashMap<String, String>> for Labels {
    fn from(entries: HashMap<String, String>) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Labels
where
    K: Into<String>,
    V: Into<LabelValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A label bound when its template was compiled.
///
/// Used only when the runtime labels map has no entry of the same name.
#[derive(Debug, Clone)]
pub(crate) enum BoundLabel {
    Compiled(Template),
    Dynamic(LabelValue),
}

impl BoundLabel {
    pub(crate) fn bind(value: &LabelValue) -> TemplateResult<Self> {
        match value {
            LabelValue::Text(text) => compile_fragment(text, true).map(BoundLabel::Compiled),
            LabelValue::Dynamic(_) => Ok(BoundLabel::Dynamic(value.clone())),
        }
    }
}

/// Compile label text, reusing an earlier compilation of the same text.
pub(crate) fn compile_fragment(text: &str, use_cache: bool) -> TemplateResult<Template> {
    if !use_cache {
        return Template::compile(text);
    }

    if let Ok(cache) = FRAGMENTS.read() {
        if let Some(template) = cache.get(text) {
            return Ok(template.clone());
        }
    }

    tracing::debug!(len = text.len(), "Compiling label fragment");
    let template = Template::compile(text)?;

    if let Ok(mut cache) = FRAGMENTS.write() {
        if cache.len() >= FRAGMENT_CACHE_LIMIT {
            cache.clear();
        }
        cache
            .entry(text.to_string())
            .or_insert_with(|| template.clone());
    }
    Ok(template)
}
