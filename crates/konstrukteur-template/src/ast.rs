/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tag tree types.
//!
//! This module defines the parsed form of a template: an ordered sequence of
//! [`TagNode`]s. Trees are produced by a parser (the one in [`crate::parser`]
//! or an external one handing over [`RawNode`]s) and are read-only afterwards.

use crate::error::{TemplateError, TemplateResult};
use serde::Deserialize;

/// A parsed template: an ordered sequence of nodes.
pub type TagTree = Vec<TagNode>;

/// A node in the tag tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TagNode {
    /// Literal text to be output as-is.
    Literal(String),

    /// Single value output: `{{name}}` (escaped) or `{{=name}}` (raw).
    Variable { accessor: Accessor, escape: bool },

    /// Structural block: `{{#name}}...{{/name}}` or, negated, `{{^name}}...{{/name}}`.
    Section {
        accessor: Accessor,
        negate: bool,
        children: TagTree,
    },

    /// Existence check that keeps the enclosing context: `{{?name}}...{{/name}}`
    Has { accessor: Accessor, children: TagTree },

    /// Reference to another named template: `{{>name}}`
    Partial(String),

    /// Reference to a runtime-overridable text fragment: `{{_name}}`
    Label(String),
}

/// How a name is resolved against a data context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorMode {
    /// Direct key lookup with a camel-case fallback.
    ByKey,
    /// Dot-separated sequence of key lookups.
    ByPath,
    /// The context value itself (`.`).
    BySelf,
}

/// A name plus the mode used to resolve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub key: String,
    pub mode: AccessorMode,
}

impl Accessor {
    /// Derive the accessor for a tag name.
    ///
    /// `.` selects the context itself, names containing a dot are paths and
    /// everything else is a plain key.
    pub fn from_name(name: &str) -> TemplateResult<Self> {
        let mode = if name == "." {
            AccessorMode::BySelf
        } else if name.contains('.') {
            if name.split('.').any(str::is_empty) {
                return Err(TemplateError::InvalidAccessor {
                    name: name.to_string(),
                    message: "path has an empty segment".to_string(),
                });
            }
            AccessorMode::ByPath
        } else if name.is_empty() {
            return Err(TemplateError::InvalidAccessor {
                name: String::new(),
                message: "name is empty".to_string(),
            });
        } else {
            AccessorMode::ByKey
        };

        Ok(Self {
            key: name.to_string(),
            mode,
        })
    }
}

/// A tag tree node in the untyped form external parsers emit.
///
/// Each item is either plain text or a tag object such as
/// `{"tag": "#", "name": "items", "nodes": [...]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNode {
    Text(String),
    Tag {
        tag: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        nodes: Vec<RawNode>,
    },
}

/// Convert raw parser output into a typed tag tree.
///
/// Comments (`!`) are dropped and newline tags (`"\n"`) become literals.
/// Any tag kind outside the known set is an [`TemplateError::UnknownTag`].
pub fn from_raw(nodes: &[RawNode]) -> TemplateResult<TagTree> {
    let mut tree = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            RawNode::Text(text) => tree.push(TagNode::Literal(text.clone())),
            RawNode::Tag { tag, name, nodes } => match tag.as_str() {
                "\n" => tree.push(TagNode::Literal("\n".to_string())),
                "!" => {}
                "$" | "=" => tree.push(TagNode::Variable {
                    accessor: Accessor::from_name(name)?,
                    escape: tag == "$",
                }),
                "#" | "^" => tree.push(TagNode::Section {
                    accessor: Accessor::from_name(name)?,
                    negate: tag == "^",
                    children: from_raw(nodes)?,
                }),
                "?" => tree.push(TagNode::Has {
                    accessor: Accessor::from_name(name)?,
                    children: from_raw(nodes)?,
                }),
                ">" => tree.push(TagNode::Partial(reference_name(name)?)),
                "_" => tree.push(TagNode::Label(reference_name(name)?)),
                _ => {
                    return Err(TemplateError::UnknownTag {
                        tag: tag.clone(),
                        name: name.clone(),
                    });
                }
            },
        }
    }
    Ok(tree)
}

/// Name of a partial or label reference, which must not be empty.
fn reference_name(name: &str) -> TemplateResult<String> {
    if name.is_empty() {
        return Err(TemplateError::InvalidAccessor {
            name: String::new(),
            message: "reference name is empty".to_string(),
        });
    }
    Ok(name.to_string())
}
