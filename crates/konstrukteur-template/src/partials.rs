/*
 * partials.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Partial template registry.
//!
//! Partials are looked up by name when a `{{>name}}` tag executes, never when
//! the referencing template is compiled. That allows templates to include each
//! other (or themselves) and lets a caller swap the whole set between renders.

use crate::error::TemplateResult;
use crate::labels::Labels;
use crate::template::Template;
use std::collections::HashMap;

/// A map of partial names to compiled templates.
///
/// Templates are reference counted, so building a registry from templates
/// that are also used elsewhere does not copy them.
#[derive(Debug, Clone, Default)]
pub struct Partials {
    templates: HashMap<String, Template>,
}

impl Partials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a set of named template sources into a registry.
    ///
    /// Each template is compiled with the given name, so diagnostics and
    /// errors raised inside it carry that name.
    pub fn compile_all<N, S>(
        sources: impl IntoIterator<Item = (N, S)>,
        labels: Option<&Labels>,
    ) -> TemplateResult<Self>
    where
        N: Into<String>,
        S: AsRef<str>,
    {
        let mut partials = Self::new();
        for (name, source) in sources {
            let name: String = name.into();
            let template = Template::compile_with(source.as_ref(), labels, Some(name.as_str()))?;
            partials.templates.insert(name, template);
        }
        Ok(partials)
    }

    /// Add a compiled template under `name`.
    pub fn insert(&mut self, name: impl Into<String>, template: Template) -> &mut Self {
        self.templates.insert(name.into(), template);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, Template)> for Partials {
    fn from_iter<I: IntoIterator<Item = (K, Template)>>(iter: I) -> Self {
        Self {
            templates: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
