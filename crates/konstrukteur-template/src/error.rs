/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template compilation and rendering.

use thiserror::Error;

/// Errors that can occur during template operations.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Error parsing the template syntax.
    #[error("Parse error at offset {offset}: {message}")]
    ParseError { message: String, offset: usize },

    /// A node kind the compiler does not understand.
    ///
    /// This is a contract violation by whoever produced the tag tree.
    #[error("Unknown tag kind '{tag}' (name: '{name}')")]
    UnknownTag { tag: String, name: String },

    /// An accessor name that cannot be resolved in any mode.
    #[error("Invalid accessor '{name}': {message}")]
    InvalidAccessor { name: String, message: String },

    /// Rendering failed.
    #[error("Unable to render template {}", .template.as_deref().unwrap_or("<anonymous>"))]
    Render {
        template: Option<String>,
        #[source]
        fault: RenderFault,
    },
}

/// Fatal conditions raised while a compiled template executes.
#[derive(Debug, Error)]
pub enum RenderFault {
    /// A value that has no text form was used as a variable.
    #[error("Value of '{key}' is a {kind} and cannot be rendered as text")]
    NotRenderable { key: String, kind: &'static str },

    /// Partial or label nesting went deeper than allowed.
    #[error("Recursive inclusion detected (depth > {max_depth}): {name}")]
    RecursionLimit { name: String, max_depth: usize },

    /// Label text did not compile.
    #[error("Label '{name}' could not be compiled")]
    Label {
        name: String,
        #[source]
        source: Box<TemplateError>,
    },

    /// A missing partial or label in strict mode.
    #[error("{kind} not found: {name}")]
    MissingReference { kind: ReferenceKind, name: String },

    /// A fault raised while rendering a partial.
    #[error("in partial '{name}'")]
    InPartial {
        name: String,
        #[source]
        source: Box<RenderFault>,
    },
}

/// What kind of runtime reference was looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Partial,
    Label,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Partial => f.write_str("Partial"),
            ReferenceKind::Label => f.write_str("Label"),
        }
    }
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;
