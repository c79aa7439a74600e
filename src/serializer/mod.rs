/*!
# Source Serializer

Linearizes an AST (original or patched) back into formatted source text in a
single traversal pass followed by one pure formatting pass.

The traversal keeps an ordered token list and a stack of pending closing
tokens mirroring nesting depth; at traversal end all pending closers are
appended in reverse push order. Control constructs register their closing
parenthesis in a deferred-token map keyed by the body node's identity, so the
condition's tokens land between the opening parenthesis and the deferred
close. All state is call-local; concurrent serialization of independent trees
needs no synchronization.

The token model reproduces the upstream emitter verbatim, including its
function-call parenthesis asymmetry (`(` only for calls with named
arguments, `)` otherwise).
*/

#[cfg(test)]
mod serializer_integration_test;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::ast::{Node, NodeId, NodeKind};

/// Serializes a tree into formatted source text
pub fn serialize(ast: &Node) -> String {
    format_tokens(&serialize_tokens(ast))
}

/// Traversal pass only: the raw token sequence before formatting
pub fn serialize_tokens(ast: &Node) -> Vec<String> {
    Emitter::default().run(ast)
}

static PRAGMA_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.\d+)").expect("valid version pattern"));

const DEFAULT_VERSION: f64 = 0.4;

/// Call-local traversal state, freshly initialized per invocation
#[derive(Debug)]
struct Emitter {
    tokens: Vec<String>,
    closers: Vec<&'static str>,
    deferred: HashMap<NodeId, &'static str>,
    version: f64,
    current_contract: Option<String>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            closers: Vec::new(),
            deferred: HashMap::new(),
            version: DEFAULT_VERSION,
            current_contract: None,
        }
    }
}

impl Emitter {
    fn run(mut self, ast: &Node) -> Vec<String> {
        self.visit(ast);
        while let Some(closer) = self.closers.pop() {
            self.push(closer);
        }
        self.tokens
    }

    fn push(&mut self, token: &str) {
        self.tokens.push(token.to_string());
    }

    fn visit(&mut self, node: &Node) {
        if let Some(token) = self.deferred.remove(&node.id()) {
            self.push(token);
        }

        match &node.kind {
            NodeKind::SourceUnit { .. } => self.visit_children(node),
            NodeKind::PragmaDirective { name, value } => {
                self.push("pragma");
                self.push(name);
                self.push(value);
                self.push(";");
                if let Some(m) = PRAGMA_VERSION.find(value) {
                    self.version = m.as_str().parse().unwrap_or(self.version);
                }
            }
            NodeKind::ContractDefinition {
                contract_kind,
                name,
                base_contracts,
                ..
            } => {
                self.push(&contract_kind.to_string());
                self.push(name);
                self.current_contract = Some(name.clone());
                if !base_contracts.is_empty() {
                    self.push("is");
                }
                self.closers.push("}");
                self.visit_children(node);
            }
            NodeKind::StateVariableDeclaration { .. } => {
                self.closers.push(";");
                self.visit_children(node);
            }
            NodeKind::UsingForDeclaration { library_name } => {
                self.push("using");
                self.push(library_name);
                self.push("for;");
            }
            NodeKind::FunctionDefinition {
                name,
                is_constructor,
                return_parameters,
                body,
                ..
            } => {
                if *is_constructor && self.version > DEFAULT_VERSION {
                    self.push("constructor");
                } else {
                    self.push("function");
                }
                if *is_constructor {
                    let contract = self.current_contract.clone().unwrap_or_default();
                    self.push(&contract);
                } else {
                    self.push(name.as_deref().unwrap_or(""));
                }
                if return_parameters.is_some() {
                    self.push("returns");
                }
                if body.is_none() {
                    self.closers.push(";");
                }
                self.visit_children(node);
            }
            NodeKind::ParameterList { .. } => self.visit_children(node),
            NodeKind::Parameter {
                type_name, name, ..
            } => {
                match &type_name.kind {
                    NodeKind::ElementaryTypeName { name } => self.push(name),
                    NodeKind::ArrayTypeName { base_type, .. } => {
                        if let Some(base) = base_type.name() {
                            self.push(base);
                        }
                        self.push("[");
                        self.push("]");
                    }
                    _ => {}
                }
                if let Some(name) = name {
                    self.push(name);
                }
            }
            NodeKind::Block { .. } => {
                self.push("{");
                self.closers.push("}");
                self.visit_children(node);
            }
            NodeKind::ExpressionStatement { .. } => {
                self.closers.push(";");
                self.visit_children(node);
            }
            NodeKind::VariableDeclarationStatement { .. } => {
                self.push("var");
                self.closers.push(";");
                self.visit_children(node);
            }
            NodeKind::IfStatement { true_body, .. } => {
                self.push("if");
                self.push("(");
                self.deferred.insert(true_body.id(), ")");
                self.visit_children(node);
            }
            NodeKind::WhileStatement { body, .. } => {
                self.push("while");
                self.push("(");
                self.deferred.insert(body.id(), ")");
                self.visit_children(node);
            }
            NodeKind::DoWhileStatement { .. } => self.visit_children(node),
            NodeKind::ForStatement { body, .. } => {
                self.push("for");
                self.push("(");
                self.deferred.insert(body.id(), ")");
                self.visit_children(node);
            }
            NodeKind::BreakStatement => self.push("break;"),
            NodeKind::ContinueStatement => {}
            NodeKind::ReturnStatement { .. } => {
                self.push("return;");
                self.visit_children(node);
            }
            NodeKind::EmitStatement { .. } => {
                self.push("emit;");
                self.visit_children(node);
            }
            // Operators are not part of the token model.
            NodeKind::BinaryOperation { .. } | NodeKind::UnaryOperation { .. } => {
                self.visit_children(node)
            }
            NodeKind::FunctionCall { names, .. } => {
                if !names.is_empty() {
                    self.push("(");
                } else {
                    self.push(")");
                }
                self.visit_children(node);
            }
            NodeKind::Identifier { name } => self.push(name),
            NodeKind::MemberAccess { .. } | NodeKind::IndexAccess { .. } => {
                self.visit_children(node)
            }
            NodeKind::ElementaryTypeName { .. } => {}
            NodeKind::ArrayTypeName { .. } => self.visit_children(node),
            NodeKind::ElementaryTypeNameExpression { .. } => self.visit_children(node),
            NodeKind::BooleanLiteral { value } => self.push(if *value { "true" } else { "false" }),
            NodeKind::NumberLiteral { .. } | NodeKind::StringLiteral { .. } => {}
        }
    }

    fn visit_children(&mut self, node: &Node) {
        for child in node.children() {
            self.visit(child);
        }
    }
}

/// Pure formatting pass over a finished token list.
///
/// Indentation depth increases after `{` and decreases before `}`; a newline
/// follows every `{`, `}` and `;` token; tokens are space-separated unless
/// the line is fresh or the next token starts with tight punctuation.
pub fn format_tokens(tokens: &[String]) -> String {
    const INDENT: &str = "    ";
    let mut text = String::new();
    let mut depth: usize = 0;

    for token in tokens {
        if token == "}" {
            depth = depth.saturating_sub(1);
        }

        if text.ends_with('\n') {
            text.push_str(&INDENT.repeat(depth));
        } else if !text.is_empty() && !starts_tight(token) {
            text.push(' ');
        }

        text.push_str(token);

        if token == "{" {
            depth += 1;
        }
        if matches!(token.as_str(), "{" | "}" | ";") {
            text.push('\n');
        }
    }
    text
}

fn starts_tight(token: &str) -> bool {
    matches!(token.chars().next(), Some(',' | ';' | '.' | '(' | '['))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Loc, NodeKind};
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> Node {
        Node::synthesized(NodeKind::Identifier {
            name: name.to_string(),
        })
    }

    fn toks(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_format_newlines_and_indent() {
        let text = format_tokens(&toks(&["contract", "A", "{", "x", ";", "}"]));
        assert_eq!(text, "contract A {\n    x;\n}\n");
    }

    #[test]
    fn test_format_tight_punctuation() {
        let text = format_tokens(&toks(&["f", "(", "a", ",", "b", "[", "]"]));
        assert_eq!(text, "f( a, b[ ]");
    }

    #[test]
    fn test_format_depth_never_underflows() {
        let text = format_tokens(&toks(&["}", "}", "x"]));
        assert_eq!(text, "}\n}\nx");
    }

    #[test]
    fn test_call_paren_asymmetry() {
        let positional = Node::synthesized(NodeKind::FunctionCall {
            expression: Box::new(ident("f")),
            arguments: vec![ident("a")],
            names: vec![],
        });
        assert_eq!(serialize_tokens(&positional), toks(&[")", "f", "a"]));

        let named = Node::synthesized(NodeKind::FunctionCall {
            expression: Box::new(ident("f")),
            arguments: vec![ident("a")],
            names: vec!["x".to_string()],
        });
        assert_eq!(serialize_tokens(&named), toks(&["(", "f", "a"]));
    }

    #[test]
    fn test_deferred_close_lands_before_body() {
        let body = Node::synthesized(NodeKind::Block {
            statements: vec![Node::synthesized(NodeKind::BreakStatement)],
        });
        let stmt = Node::new(
            NodeKind::IfStatement {
                condition: Box::new(ident("ready")),
                true_body: Box::new(body),
                false_body: None,
            },
            Loc::zero(),
        );
        assert_eq!(
            serialize_tokens(&stmt),
            toks(&["if", "(", "ready", ")", "{", "break;", "}"])
        );
    }

    #[test]
    fn test_closers_flush_in_reverse_push_order() {
        let stmt = Node::synthesized(NodeKind::ExpressionStatement {
            expression: Box::new(ident("x")),
        });
        let block = Node::synthesized(NodeKind::Block {
            statements: vec![stmt],
        });
        // Block pushes "{" + closer "}", statement pushes closer ";".
        assert_eq!(serialize_tokens(&block), toks(&["{", "x", ";", "}"]));
    }

    #[test]
    fn test_array_parameter_tokens() {
        let param = Node::synthesized(NodeKind::Parameter {
            type_name: Box::new(Node::synthesized(NodeKind::ArrayTypeName {
                base_type: Box::new(Node::synthesized(NodeKind::ElementaryTypeName {
                    name: "uint".to_string(),
                })),
                length: None,
            })),
            name: Some("xs".to_string()),
            storage_location: None,
            is_state_var: false,
            is_indexed: false,
        });
        assert_eq!(serialize_tokens(&param), toks(&["uint", "[", "]", "xs"]));
    }
}
