/*
 * template.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compiled templates.

use crate::compiler::{Compiler, Procedure};
use crate::error::{RenderFault, TemplateError, TemplateResult};
use crate::eval_context::{Diagnostic, Frame};
use crate::labels::Labels;
use crate::options::RenderOptions;
use crate::parser::parse;
use crate::partials::Partials;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A compiled template ready for rendering.
///
/// Templates are immutable and cheap to clone: clones share the same
/// compiled procedure tree. A template can be rendered any number of times,
/// from any number of threads, against different contexts.
#[derive(Clone)]
pub struct Template {
    inner: Arc<Inner>,
}

struct Inner {
    name: Option<Arc<str>>,
    /// Original source (diagnostic only).
    source: Option<String>,
    root: Procedure,
}

/// Output of a render call plus the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Template {
    /// Compile an anonymous template from source text.
    pub fn compile(source: &str) -> TemplateResult<Self> {
        Self::compile_with(source, None, None)
    }

    /// Compile a template from source text.
    ///
    /// # Arguments
    /// * `source` - The template source text
    /// * `labels` - Labels bound now, used when a render call lacks them
    /// * `name` - Template name for diagnostics and errors
    pub fn compile_with(
        source: &str,
        labels: Option<&Labels>,
        name: Option<&str>,
    ) -> TemplateResult<Self> {
        tracing::debug!(template = name, "Compiling template");
        let tree = parse(source)?;
        let root = Compiler::new(labels).compile(&tree)?;
        Ok(Self::from_parts(name, Some(source.to_string()), root))
    }

    pub(crate) fn from_parts(name: Option<&str>, source: Option<String>, root: Procedure) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.map(Arc::from),
                source,
                root,
            }),
        }
    }

    /// The template name, if it was given one.
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// The source text the template was compiled from, if known.
    pub fn source(&self) -> Option<&str> {
        self.inner.source.as_deref()
    }

    /// Whether `self` and `other` share one compiled procedure tree.
    pub fn same_instance(&self, other: &Template) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Render against `data` without partials or labels.
    pub fn render_data(&self, data: &Value) -> TemplateResult<String> {
        self.render(data, &Partials::new(), &Labels::new())
    }

    /// Render against `data` with the given partials and labels.
    ///
    /// Missing partials and labels render as nothing and are logged as
    /// warnings; use [`Template::render_with`] to inspect them.
    pub fn render(
        &self,
        data: &Value,
        partials: &Partials,
        labels: &Labels,
    ) -> TemplateResult<String> {
        self.render_with(data, partials, labels, &RenderOptions::default())
            .map(|rendered| rendered.output)
    }

    /// Render with explicit options, returning output and diagnostics.
    pub fn render_with(
        &self,
        data: &Value,
        partials: &Partials,
        labels: &Labels,
        options: &RenderOptions,
    ) -> TemplateResult<Rendered> {
        let mut frame = Frame::new(partials, labels, options, self.inner.name.clone());

        match self.call(&mut frame, data) {
            Ok(()) => Ok(Rendered {
                output: frame.out,
                diagnostics: frame.diagnostics.into_diagnostics(),
            }),
            Err(fault) => {
                tracing::error!(template = self.name(), error = ?fault, "Unable to render template");
                Err(TemplateError::Render {
                    template: self.name().map(str::to_string),
                    fault,
                })
            }
        }
    }

    /// Run the compiled procedure inside an existing frame.
    pub(crate) fn call(&self, frame: &mut Frame<'_>, data: &Value) -> Result<(), RenderFault> {
        (self.inner.root)(frame, data)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.inner.name)
            .field("source", &self.inner.source)
            .finish_non_exhaustive()
    }
}
