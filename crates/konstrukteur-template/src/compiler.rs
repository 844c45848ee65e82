/*
 * compiler.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Closure-based template compiler.
//!
//! The compiler walks a [`TagTree`](crate::ast::TagTree) once and turns every node into a boxed
//! closure. Each closure writes into the [`Frame`] of the current render call
//! and receives the data context it runs against. Sections own the closure
//! compiled from their children, so the result is a tree of procedures that
//! mirrors the tag tree:
//!
//! ```text
//! {{#posts}}<li>{{title}}</li>{{/posts}}
//!
//! section(posts) ── sequence ─┬─ literal("<li>")
//!                             ├─ variable(title, escaped)
//!                             └─ literal("</li>")
//! ```
//!
//! Partials and labels are not resolved here. Their closures only capture the
//! referenced name and look it up in the frame when they execute.

use crate::accessor::{has, resolve};
use crate::ast::{Accessor, RawNode, TagNode, from_raw};
use crate::error::{RenderFault, TemplateResult};
use crate::eval_context::Frame;
use crate::labels::{BoundLabel, Labels};
use crate::template::Template;
use crate::value::Value;

/// A compiled render procedure.
pub(crate) type Procedure =
    Box<dyn Fn(&mut Frame<'_>, &Value) -> Result<(), RenderFault> + Send + Sync>;

fn procedure<F>(f: F) -> Procedure
where
    F: Fn(&mut Frame<'_>, &Value) -> Result<(), RenderFault> + Send + Sync + 'static,
{
    Box::new(f)
}

/// Compile a tag tree into a template.
///
/// Labels present in `labels` are bound now and used whenever a render call
/// does not supply a label of the same name.
pub fn compile(
    tree: &[TagNode],
    labels: Option<&Labels>,
    name: Option<&str>,
) -> TemplateResult<Template> {
    let root = Compiler::new(labels).compile(tree)?;
    Ok(Template::from_parts(name, None, root))
}

/// Compile raw parser output into a template.
///
/// Fails with [`crate::TemplateError::UnknownTag`] if the tree contains a tag
/// kind the compiler does not know.
pub fn compile_raw(
    tree: &[RawNode],
    labels: Option<&Labels>,
    name: Option<&str>,
) -> TemplateResult<Template> {
    compile(&from_raw(tree)?, labels, name)
}

/// Turns tag trees into procedure trees.
pub(crate) struct Compiler<'l> {
    labels: Option<&'l Labels>,
}

impl<'l> Compiler<'l> {
    pub fn new(labels: Option<&'l Labels>) -> Self {
        Self { labels }
    }

    /// Compile a sequence of nodes into a single procedure.
    pub(crate) fn compile(&self, nodes: &[TagNode]) -> TemplateResult<Procedure> {
        let mut steps = nodes
            .iter()
            .map(|node| self.compile_node(node))
            .collect::<TemplateResult<Vec<_>>>()?;

        Ok(match steps.len() {
            0 => procedure(|_, _| Ok(())),
            1 => steps.remove(0),
            _ => procedure(move |frame, data| {
                for step in &steps {
                    step(frame, data)?;
                }
                Ok(())
            }),
        })
    }

    fn compile_node(&self, node: &TagNode) -> TemplateResult<Procedure> {
        Ok(match node {
            TagNode::Literal(text) => {
                let text = text.clone();
                procedure(move |frame, _| {
                    frame.out.push_str(&text);
                    Ok(())
                })
            }

            TagNode::Variable { accessor, escape } => compile_variable(accessor.clone(), *escape),

            TagNode::Section {
                accessor,
                negate: false,
                children,
            } => {
                let accessor = accessor.clone();
                let body = self.compile(children)?;
                procedure(move |frame, data| match resolve(&accessor, data) {
                    Some(Value::List(items)) => {
                        for item in items {
                            body(frame, item)?;
                        }
                        Ok(())
                    }
                    Some(value) if value.is_truthy() => body(frame, value),
                    _ => Ok(()),
                })
            }

            TagNode::Section {
                accessor,
                negate: true,
                children,
            } => {
                let accessor = accessor.clone();
                let body = self.compile(children)?;
                procedure(move |frame, data| {
                    if has(&accessor, data) {
                        return Ok(());
                    }
                    body(frame, data)
                })
            }

            TagNode::Has { accessor, children } => {
                let accessor = accessor.clone();
                let body = self.compile(children)?;
                procedure(move |frame, data| {
                    if !has(&accessor, data) {
                        return Ok(());
                    }
                    body(frame, data)
                })
            }

            TagNode::Partial(name) => {
                let name = name.clone();
                procedure(move |frame, data| frame.include_partial(&name, data))
            }

            TagNode::Label(name) => {
                let bound = match self.labels.and_then(|labels| labels.get(name)) {
                    Some(value) => Some(BoundLabel::bind(value)?),
                    None => None,
                };
                let name = name.clone();
                procedure(move |frame, data| frame.include_label(&name, bound.as_ref(), data))
            }
        })
    }
}

fn compile_variable(accessor: Accessor, escape: bool) -> Procedure {
    procedure(move |frame, data| {
        let Some(value) = resolve(&accessor, data) else {
            return Ok(());
        };
        let not_renderable = |kind: &'static str| RenderFault::NotRenderable {
            key: accessor.key.clone(),
            kind,
        };
        if escape {
            let text = value.to_text().map_err(not_renderable)?;
            escape_html(&text, &mut frame.out);
        } else {
            value.write_text(&mut frame.out).map_err(not_renderable)?;
        }
        Ok(())
    })
}

/// Append `text` to `out`, replacing `& < > ' "` with entities.
pub fn escape_html(text: &str, out: &mut String) {
    let mut last = 0;
    for (i, c) in text.char_indices() {
        let entity = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '\'' => "&#39;",
            '"' => "&quot;",
            _ => continue,
        };
        out.push_str(&text[last..i]);
        out.push_str(entity);
        last = i + 1;
    }
    out.push_str(&text[last..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AccessorMode;
    use crate::error::TemplateError;
    use crate::partials::Partials;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn escaped(text: &str) -> String {
        let mut out = String::new();
        escape_html(text, &mut out);
        out
    }

    fn accessor(name: &str) -> Accessor {
        Accessor::from_name(name).unwrap()
    }

    fn render(tree: &[TagNode], data: serde_json::Value) -> String {
        compile(tree, None, None)
            .unwrap()
            .render(&Value::from(data), &Partials::new(), &Labels::new())
            .unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escaped(r#"<a>&'""#), "&lt;a&gt;&amp;&#39;&quot;");
        assert_eq!(escaped("plain text"), "plain text");
        assert_eq!(escaped("ä < ö"), "ä &lt; ö");
        assert_eq!(escaped(""), "");
    }

    #[test]
    fn test_literal_passthrough() {
        let tree = vec![TagNode::Literal("  a\n\tb\n".to_string())];
        assert_eq!(render(&tree, json!({})), "  a\n\tb\n");
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(render(&[], json!({"a": 1})), "");
    }

    #[test]
    fn test_variable_escaped_and_raw() {
        let tree = vec![
            TagNode::Variable {
                accessor: accessor("v"),
                escape: true,
            },
            TagNode::Literal("|".to_string()),
            TagNode::Variable {
                accessor: accessor("v"),
                escape: false,
            },
        ];
        assert_eq!(
            render(&tree, json!({"v": "<a>&'\""})),
            "&lt;a&gt;&amp;&#39;&quot;|<a>&'\""
        );
    }

    #[test]
    fn test_section_over_sequence() {
        let tree = vec![TagNode::Section {
            accessor: accessor("items"),
            negate: false,
            children: vec![TagNode::Variable {
                accessor: accessor("n"),
                escape: true,
            }],
        }];
        assert_eq!(render(&tree, json!({"items": [{"n": 1}, {"n": 2}]})), "12");
        assert_eq!(render(&tree, json!({"items": []})), "");
    }

    #[test]
    fn test_section_over_value() {
        let tree = vec![TagNode::Section {
            accessor: accessor("user"),
            negate: false,
            children: vec![TagNode::Variable {
                accessor: accessor("name"),
                escape: true,
            }],
        }];
        assert_eq!(render(&tree, json!({"user": {"name": "x"}})), "x");
        assert_eq!(render(&tree, json!({"user": null})), "");
        assert_eq!(render(&tree, json!({"user": false})), "");
        assert_eq!(render(&tree, json!({})), "");
    }

    #[test]
    fn test_negated_section_keeps_context() {
        let tree = vec![TagNode::Section {
            accessor: accessor("flag"),
            negate: true,
            children: vec![TagNode::Variable {
                accessor: accessor("title"),
                escape: true,
            }],
        }];
        assert_eq!(render(&tree, json!({"flag": false, "title": "Y"})), "Y");
        assert_eq!(render(&tree, json!({"flag": true, "title": "Y"})), "");
        assert_eq!(render(&tree, json!({"flag": 0, "title": "Y"})), "Y");
    }

    #[test]
    fn test_has_keeps_context() {
        let tree = vec![TagNode::Has {
            accessor: accessor("author"),
            children: vec![TagNode::Variable {
                accessor: accessor("title"),
                escape: true,
            }],
        }];
        assert_eq!(render(&tree, json!({"author": "A", "title": "T"})), "T");
        assert_eq!(render(&tree, json!({"author": "", "title": "T"})), "");
    }

    #[test]
    fn test_self_accessor_in_section() {
        let tree = vec![TagNode::Section {
            accessor: accessor("tags"),
            negate: false,
            children: vec![
                TagNode::Literal("[".to_string()),
                TagNode::Variable {
                    accessor: Accessor {
                        key: ".".to_string(),
                        mode: AccessorMode::BySelf,
                    },
                    escape: true,
                },
                TagNode::Literal("]".to_string()),
            ],
        }];
        assert_eq!(render(&tree, json!({"tags": ["a", "b"]})), "[a][b]");
    }

    #[test]
    fn test_mapping_variable_is_fatal() {
        let tree = vec![TagNode::Variable {
            accessor: accessor("user"),
            escape: true,
        }];
        let template = compile(&tree, None, Some("page")).unwrap();
        let result = template.render(
            &Value::from(json!({"user": {"name": "x"}})),
            &Partials::new(),
            &Labels::new(),
        );
        match result {
            Err(TemplateError::Render { template, fault }) => {
                assert_eq!(template.as_deref(), Some("page"));
                assert!(matches!(
                    fault,
                    RenderFault::NotRenderable {
                        kind: "mapping",
                        ..
                    }
                ));
            }
            other => panic!("expected render error, got {:?}", other),
        }
    }

    #[test]
    fn test_compile_raw_unknown_tag() {
        let raw: Vec<RawNode> =
            serde_json::from_str(r#"[{"tag": "*", "name": "x"}]"#).unwrap();
        assert!(matches!(
            compile_raw(&raw, None, None),
            Err(TemplateError::UnknownTag { .. })
        ));
    }

    #[test]
    fn test_compile_raw() {
        let raw: Vec<RawNode> = serde_json::from_str(
            r##"["<p>", {"tag": "#", "name": "items", "nodes": [{"tag": "$", "name": "."}]}, "</p>"]"##,
        )
        .unwrap();
        let template = compile_raw(&raw, None, Some("list")).unwrap();
        assert_eq!(template.name(), Some("list"));
        assert_eq!(
            template
                .render(
                    &Value::from(json!({"items": ["a", "<b>"]})),
                    &Partials::new(),
                    &Labels::new()
                )
                .unwrap(),
            "<p>a&lt;b&gt;</p>"
        );
    }

    #[test]
    fn test_compile_time_label_is_fallback() {
        let tree = vec![TagNode::Label("greeting".to_string())];
        let bound: Labels = [("greeting", "Hello {{name}}")].into_iter().collect();
        let template = compile(&tree, Some(&bound), None).unwrap();
        let data = Value::from(json!({"name": "Bo"}));

        assert_eq!(
            template.render(&data, &Partials::new(), &Labels::new()).unwrap(),
            "Hello Bo"
        );

        let runtime: Labels = [("greeting", "Hallo {{name}}")].into_iter().collect();
        assert_eq!(
            template.render(&data, &Partials::new(), &runtime).unwrap(),
            "Hallo Bo"
        );
    }

    #[test]
    fn test_compile_time_label_parse_error() {
        let tree = vec![TagNode::Label("broken".to_string())];
        let bound: Labels = [("broken", "{{#x}}")].into_iter().collect();
        assert!(matches!(
            compile(&tree, Some(&bound), None),
            Err(TemplateError::ParseError { .. })
        ));
    }
}
