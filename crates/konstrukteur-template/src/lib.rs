/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Double-brace template engine for static site generation.
//!
//! Templates are compiled once into a tree of closures and then rendered
//! many times, once per output page, against fresh data. Supported tags:
//!
//! - Variables: `{{title}}` (HTML-escaped) and `{{=body}}` (raw)
//! - Paths and self access: `{{post.author.name}}`, `{{.}}`
//! - Sections: `{{#posts}}...{{/posts}}` iterates sequences or enters a value
//! - Negated sections: `{{^posts}}...{{/posts}}`
//! - Existence checks: `{{?author}}...{{/author}}`
//! - Partials: `{{>Header}}`, looked up at render time
//! - Labels: `{{_readMore}}`, localized text looked up at render time
//! - Comments: `{{! ... }}`
//!
//! # Architecture
//!
//! Parsing produces a [`TagTree`]. The compiler turns the tree into a
//! [`Template`], which owns its procedures and never changes afterwards.
//! Partials and labels are supplied with every render call, so templates can
//! include each other recursively and labels can be swapped per language
//! without recompiling anything.
//!
//! # Example
//!
//! ```
//! use konstrukteur_template::{Labels, Partials, Template, Value};
//! use serde_json::json;
//!
//! let page = Template::compile("{{>Header}}<p>{{_welcome}}</p>").unwrap();
//! let partials = Partials::compile_all([("Header", "<h1>{{title}}</h1>")], None).unwrap();
//! let labels: Labels = [("welcome", "Welcome, {{user}}!")].into_iter().collect();
//!
//! let data = Value::from(json!({"title": "Home", "user": "Ada"}));
//! let output = page.render(&data, &partials, &labels).unwrap();
//! assert_eq!(output, "<h1>Home</h1><p>Welcome, Ada!</p>");
//! ```

pub mod accessor;
pub mod ast;
pub mod compiler;
pub mod error;
pub mod eval_context;
pub mod labels;
pub mod options;
pub mod parser;
pub mod partials;
pub mod template;
pub mod value;

// Re-export main types at crate root
pub use ast::{Accessor, AccessorMode, RawNode, TagNode, TagTree};
pub use compiler::{compile, compile_raw, escape_html};
pub use error::{ReferenceKind, RenderFault, TemplateError, TemplateResult};
pub use eval_context::{Diagnostic, DiagnosticCollector, DiagnosticKind};
pub use labels::{LabelValue, Labels};
pub use options::RenderOptions;
pub use parser::parse;
pub use partials::Partials;
pub use template::{Rendered, Template};
pub use value::Value;
