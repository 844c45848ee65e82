/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Double-brace template parser.
//!
//! Converts template text into a [`TagTree`]. Supported tags:
//!
//! | tag | meaning |
//! |---|---|
//! | `{{name}}`, `{{$name}}` | escaped variable |
//! | `{{=name}}` | raw variable |
//! | `{{#name}}...{{/name}}` | section |
//! | `{{^name}}...{{/name}}` | negated section |
//! | `{{?name}}...{{/name}}` | existence check |
//! | `{{>name}}` | partial |
//! | `{{_name}}` | label |
//! | `{{!text}}` | comment |
//!
//! Text outside tags is kept byte for byte.

use crate::ast::{Accessor, TagNode, TagTree};
use crate::error::{TemplateError, TemplateResult};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// The kind of a tag, from its leading character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Section,
    Inverted,
    Has,
    Close,
    Escaped,
    Raw,
    Partial,
    Label,
    Comment,
}

/// A block tag waiting for its closing tag.
#[derive(Debug)]
struct OpenBlock {
    kind: TagKind,
    name: String,
    offset: usize,
    children: TagTree,
}

/// Parse template text into a tag tree.
pub fn parse(source: &str) -> TemplateResult<TagTree> {
    let mut root: TagTree = Vec::new();
    let mut stack: Vec<OpenBlock> = Vec::new();
    let mut pos = 0;

    while let Some(found) = source[pos..].find(OPEN) {
        let start = pos + found;
        push_literal(current(&mut root, &mut stack), &source[pos..start]);

        let inner_start = start + OPEN.len();
        let end = source[inner_start..]
            .find(CLOSE)
            .map(|i| inner_start + i)
            .ok_or_else(|| parse_error("unterminated tag", start))?;
        pos = end + CLOSE.len();

        let inner = source[inner_start..end].trim();
        let (kind, name) = split_tag(inner);
        if kind == TagKind::Comment {
            continue;
        }
        if name.is_empty() {
            return Err(parse_error("tag has no name", start));
        }

        match kind {
            TagKind::Section | TagKind::Inverted | TagKind::Has => stack.push(OpenBlock {
                kind,
                name: name.to_string(),
                offset: start,
                children: Vec::new(),
            }),
            TagKind::Close => {
                let block = stack.pop().ok_or_else(|| {
                    parse_error(format!("closing tag '{}' has no opening tag", name), start)
                })?;
                if block.name != name {
                    return Err(parse_error(
                        format!(
                            "closing tag '{}' does not match open section '{}'",
                            name, block.name
                        ),
                        start,
                    ));
                }
                let node = close_block(block)?;
                current(&mut root, &mut stack).push(node);
            }
            TagKind::Escaped | TagKind::Raw => {
                let node = TagNode::Variable {
                    accessor: Accessor::from_name(name)?,
                    escape: kind == TagKind::Escaped,
                };
                current(&mut root, &mut stack).push(node);
            }
            TagKind::Partial => {
                current(&mut root, &mut stack).push(TagNode::Partial(name.to_string()))
            }
            TagKind::Label => current(&mut root, &mut stack).push(TagNode::Label(name.to_string())),
            TagKind::Comment => {}
        }
    }

    push_literal(current(&mut root, &mut stack), &source[pos..]);

    if let Some(block) = stack.pop() {
        return Err(parse_error(
            format!("section '{}' is never closed", block.name),
            block.offset,
        ));
    }

    Ok(root)
}

/// Split the inside of a tag into its kind and name.
///
/// A tag without a leading tag character is an escaped variable.
fn split_tag(inner: &str) -> (TagKind, &str) {
    let kind = match inner.chars().next() {
        Some('#') => TagKind::Section,
        Some('^') => TagKind::Inverted,
        Some('?') => TagKind::Has,
        Some('/') => TagKind::Close,
        Some('$') => TagKind::Escaped,
        Some('=') => TagKind::Raw,
        Some('>') => TagKind::Partial,
        Some('_') => TagKind::Label,
        Some('!') => TagKind::Comment,
        _ => return (TagKind::Escaped, inner),
    };
    // every tag character is ASCII
    (kind, inner[1..].trim())
}

fn close_block(block: OpenBlock) -> TemplateResult<TagNode> {
    let accessor = Accessor::from_name(&block.name)?;
    Ok(match block.kind {
        TagKind::Has => TagNode::Has {
            accessor,
            children: block.children,
        },
        kind => TagNode::Section {
            accessor,
            negate: kind == TagKind::Inverted,
            children: block.children,
        },
    })
}

fn current<'a>(root: &'a mut TagTree, stack: &'a mut [OpenBlock]) -> &'a mut TagTree {
    match stack.last_mut() {
        Some(block) => &mut block.children,
        None => root,
    }
}

fn push_literal(nodes: &mut TagTree, text: &str) {
    if !text.is_empty() {
        nodes.push(TagNode::Literal(text.to_string()));
    }
}

fn parse_error(message: impl Into<String>, offset: usize) -> TemplateError {
    TemplateError::ParseError {
        message: message.into(),
        offset,
    }
}
