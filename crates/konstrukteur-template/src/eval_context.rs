/*
 * eval_context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Per-call render state.
//!
//! A [`Frame`] is created fresh for every render call and threaded through
//! all compiled procedures. It owns the output buffer and tracks:
//!
//! 1. **Diagnostics**: missing partials and labels, collected as warnings
//! 2. **Nesting depth**: partial and label inclusion, for recursion protection
//! 3. **Runtime maps**: the partials and labels supplied to the call
//!
//! Nothing here is shared between calls, which is what lets one compiled
//! template be rendered from many threads at once.

use crate::error::{ReferenceKind, RenderFault};
use crate::labels::{BoundLabel, LabelValue, Labels, compile_fragment};
use crate::options::RenderOptions;
use crate::partials::Partials;
use crate::template::Template;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Kind of recoverable problem found while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    MissingPartial,
    MissingLabel,
}

/// A recoverable problem found while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Name of the partial or label that was looked up.
    pub name: String,
    /// Template that contained the reference, if it has a name.
    pub template: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::MissingPartial => write!(f, "Could not find partial: {}", self.name)?,
            DiagnosticKind::MissingLabel => write!(f, "Could not find label: {}", self.name)?,
        }
        if let Some(template) = &self.template {
            write!(f, " (in template {})", template)?;
        }
        Ok(())
    }
}

/// Collector for diagnostics raised during one render call.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Mutable state of a single render call.
pub struct Frame<'r> {
    /// Output produced so far.
    pub(crate) out: String,

    partials: &'r Partials,
    labels: &'r Labels,
    options: &'r RenderOptions,

    pub(crate) diagnostics: DiagnosticCollector,

    /// Current partial/label nesting depth.
    depth: usize,

    /// Name of the template currently executing.
    template: Option<Arc<str>>,
}

impl<'r> Frame<'r> {
    pub(crate) fn new(
        partials: &'r Partials,
        labels: &'r Labels,
        options: &'r RenderOptions,
        template: Option<Arc<str>>,
    ) -> Self {
        Self {
            out: String::new(),
            partials,
            labels,
            options,
            diagnostics: DiagnosticCollector::new(),
            depth: 0,
            template,
        }
    }

    /// Render the partial `name` against `data` into this frame.
    pub(crate) fn include_partial(&mut self, name: &str, data: &Value) -> Result<(), RenderFault> {
        let partials = self.partials;
        let Some(partial) = partials.get(name) else {
            return self.missing(ReferenceKind::Partial, name);
        };

        let previous = self.template.replace(Arc::from(name));
        let result = self.nested(name, partial, data);
        self.template = previous;

        result.map_err(|fault| match fault {
            RenderFault::RecursionLimit { .. } => fault,
            _ => RenderFault::InPartial {
                name: name.to_string(),
                source: Box::new(fault),
            },
        })
    }

    /// Render the label `name` against `data` into this frame.
    ///
    /// The runtime labels map wins over a label bound at compile time.
    pub(crate) fn include_label(
        &mut self,
        name: &str,
        bound: Option<&BoundLabel>,
        data: &Value,
    ) -> Result<(), RenderFault> {
        let labels = self.labels;
        let fragment = match (labels.get(name), bound) {
            (Some(value), _) | (None, Some(BoundLabel::Dynamic(value))) => {
                self.compile_label(name, value, data)?
            }
            (None, Some(BoundLabel::Compiled(template))) => Some(template.clone()),
            (None, None) => return self.missing(ReferenceKind::Label, name),
        };

        match fragment {
            Some(template) => self.nested(name, &template, data),
            None => Ok(()),
        }
    }

    fn compile_label(
        &self,
        name: &str,
        value: &LabelValue,
        data: &Value,
    ) -> Result<Option<Template>, RenderFault> {
        let text = value.text(data);
        if text.is_empty() {
            return Ok(None);
        }
        compile_fragment(&text, self.options.cache_labels)
            .map(Some)
            .map_err(|e| RenderFault::Label {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    fn nested(&mut self, name: &str, template: &Template, data: &Value) -> Result<(), RenderFault> {
        if self.depth >= self.options.max_depth {
            return Err(RenderFault::RecursionLimit {
                name: name.to_string(),
                max_depth: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = template.call(self, data);
        self.depth -= 1;
        result
    }

    fn missing(&mut self, kind: ReferenceKind, name: &str) -> Result<(), RenderFault> {
        if self.options.strict {
            return Err(RenderFault::MissingReference {
                kind,
                name: name.to_string(),
            });
        }

        let template = self.template.as_deref();
        let kind = match kind {
            ReferenceKind::Partial => {
                tracing::warn!(partial = name, template, "Could not find partial");
                DiagnosticKind::MissingPartial
            }
            ReferenceKind::Label => {
                tracing::warn!(label = name, template, "Could not find label");
                DiagnosticKind::MissingLabel
            }
        };
        self.diagnostics.add(Diagnostic {
            kind,
            name: name.to_string(),
            template: template.map(str::to_string),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_collector_new() {
        let collector = DiagnosticCollector::new();
        assert!(collector.is_empty());
        assert!(collector.diagnostics().is_empty());
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::MissingPartial,
            name: "Header".to_string(),
            template: Some("site.Page".to_string()),
        };
        assert_eq!(
            diagnostic.to_string(),
            "Could not find partial: Header (in template site.Page)"
        );

        let diagnostic = Diagnostic {
            kind: DiagnosticKind::MissingLabel,
            name: "greeting".to_string(),
            template: None,
        };
        assert_eq!(diagnostic.to_string(), "Could not find label: greeting");
    }

    #[test]
    fn test_missing_reference_warns() {
        let partials = Partials::new();
        let labels = Labels::new();
        let options = RenderOptions::default();
        let mut frame = Frame::new(&partials, &labels, &options, Some(Arc::from("page")));

        frame.include_partial("Header", &Value::Null).unwrap();
        frame.include_label("title", None, &Value::Null).unwrap();

        let diagnostics = frame.diagnostics.into_diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingPartial);
        assert_eq!(diagnostics[0].template.as_deref(), Some("page"));
        assert_eq!(diagnostics[1].kind, DiagnosticKind::MissingLabel);
    }

    #[test]
    fn test_missing_reference_strict() {
        let partials = Partials::new();
        let labels = Labels::new();
        let options = RenderOptions::default().with_strict(true);
        let mut frame = Frame::new(&partials, &labels, &options, None);

        match frame.include_partial("Header", &Value::Null) {
            Err(RenderFault::MissingReference { kind, name }) => {
                assert_eq!(kind, ReferenceKind::Partial);
                assert_eq!(name, "Header");
            }
            other => panic!("expected MissingReference, got {:?}", other),
        }
        assert!(frame.diagnostics.is_empty());
    }

    #[test]
    fn test_depth_limit() {
        let partials = Partials::new();
        let labels = Labels::new();
        let options = RenderOptions::default().with_max_depth(0);
        let mut frame = Frame::new(&partials, &labels, &options, None);
        let template = Template::compile("x").unwrap();

        assert!(matches!(
            frame.nested("loop", &template, &Value::Null),
            Err(RenderFault::RecursionLimit { max_depth: 0, .. })
        ));
        assert!(frame.out.is_empty());
    }
}
