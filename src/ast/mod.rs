/*!
# Solidity AST Node Model

Typed tree representation shared by the confirmation engine, patch synthesis
and the source serializer. Every node kind is a variant of [`NodeKind`] with a
statically known field set, so consumers dispatch by exhaustive matching and a
new kind forces every consumer to be updated.

Ownership: every child is exclusively owned by exactly one parent field
(`Box<Node>` / `Vec<Node>`), so no node instance can appear in two trees.
*/

pub mod query;

#[cfg(test)]
mod query_integration_test;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Position in source code (one-based line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn zero() -> Self {
        Self::new(0, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source range of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loc {
    pub start: Position,
    pub end: Position,
}

impl Loc {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn zero() -> Self {
        Self::new(Position::zero(), Position::zero())
    }

    /// Range spanning whole lines, column 0
    pub fn lines(start_line: usize, end_line: usize) -> Self {
        Self::new(Position::new(start_line, 0), Position::new(end_line, 0))
    }

    /// True if the range covers the given one-based line
    pub fn covers_line(&self, line: usize) -> bool {
        self.start.line <= line && line <= self.end.line
    }
}

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Node identity, unique for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Contract definition flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    Contract,
    Library,
    Interface,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractKind::Contract => write!(f, "contract"),
            ContractKind::Library => write!(f, "library"),
            ContractKind::Interface => write!(f, "interface"),
        }
    }
}

/// Function/state-variable visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Internal,
    External,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Internal => write!(f, "internal"),
            Visibility::External => write!(f, "external"),
        }
    }
}

/// Kind tag without payload, used for filtering queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    SourceUnit,
    PragmaDirective,
    ContractDefinition,
    StateVariableDeclaration,
    UsingForDeclaration,
    FunctionDefinition,
    ParameterList,
    Parameter,
    Block,
    ExpressionStatement,
    VariableDeclarationStatement,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    BreakStatement,
    ContinueStatement,
    ReturnStatement,
    EmitStatement,
    BinaryOperation,
    UnaryOperation,
    FunctionCall,
    Identifier,
    MemberAccess,
    IndexAccess,
    ElementaryTypeName,
    ArrayTypeName,
    ElementaryTypeNameExpression,
    BooleanLiteral,
    NumberLiteral,
    StringLiteral,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Kind-specific payload of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    SourceUnit {
        items: Vec<Node>,
    },
    PragmaDirective {
        name: String,
        value: String,
    },
    ContractDefinition {
        contract_kind: ContractKind,
        name: String,
        base_contracts: Vec<String>,
        parts: Vec<Node>,
    },
    StateVariableDeclaration {
        variables: Vec<Node>,
        initial_value: Option<Box<Node>>,
    },
    UsingForDeclaration {
        library_name: String,
    },
    FunctionDefinition {
        name: Option<String>,
        visibility: Visibility,
        is_constructor: bool,
        state_mutability: Option<String>,
        modifiers: Vec<Node>,
        parameters: Box<Node>,
        return_parameters: Option<Box<Node>>,
        body: Option<Box<Node>>,
    },
    ParameterList {
        parameters: Vec<Node>,
    },
    Parameter {
        type_name: Box<Node>,
        name: Option<String>,
        storage_location: Option<String>,
        is_state_var: bool,
        is_indexed: bool,
    },
    Block {
        statements: Vec<Node>,
    },
    ExpressionStatement {
        expression: Box<Node>,
    },
    VariableDeclarationStatement {
        variables: Vec<Node>,
        initial_value: Option<Box<Node>>,
    },
    IfStatement {
        condition: Box<Node>,
        true_body: Box<Node>,
        false_body: Option<Box<Node>>,
    },
    WhileStatement {
        condition: Box<Node>,
        body: Box<Node>,
    },
    DoWhileStatement {
        condition: Box<Node>,
        body: Box<Node>,
    },
    ForStatement {
        init: Option<Box<Node>>,
        condition: Option<Box<Node>>,
        update: Option<Box<Node>>,
        body: Box<Node>,
    },
    BreakStatement,
    ContinueStatement,
    ReturnStatement {
        expression: Option<Box<Node>>,
    },
    EmitStatement {
        event_call: Box<Node>,
    },
    BinaryOperation {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    UnaryOperation {
        operator: String,
        sub_expression: Box<Node>,
        is_prefix: bool,
    },
    FunctionCall {
        expression: Box<Node>,
        arguments: Vec<Node>,
        names: Vec<String>,
    },
    Identifier {
        name: String,
    },
    MemberAccess {
        expression: Box<Node>,
        member_name: String,
    },
    IndexAccess {
        base: Box<Node>,
        index: Box<Node>,
    },
    ElementaryTypeName {
        name: String,
    },
    ArrayTypeName {
        base_type: Box<Node>,
        length: Option<Box<Node>>,
    },
    ElementaryTypeNameExpression {
        type_name: Box<Node>,
    },
    BooleanLiteral {
        value: bool,
    },
    NumberLiteral {
        value: String,
    },
    StringLiteral {
        value: String,
    },
}

/// AST node: identity + source range + kind payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    pub loc: Loc,
    pub kind: NodeKind,
}

/// Structural equality: identity and source range are not compared, so a
/// synthesized fragment equals a parser-produced tree of the same shape.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Node {
    /// Creates a node at the given source range with a fresh identity
    pub fn new(kind: NodeKind, loc: Loc) -> Self {
        Self {
            id: NodeId::next(),
            loc,
            kind,
        }
    }

    /// Creates a synthesized node with a zero source range
    pub fn synthesized(kind: NodeKind) -> Self {
        Self::new(kind, Loc::zero())
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn start_line(&self) -> usize {
        self.loc.start.line
    }

    /// Discriminant of the node kind
    pub fn node_type(&self) -> NodeType {
        match &self.kind {
            NodeKind::SourceUnit { .. } => NodeType::SourceUnit,
            NodeKind::PragmaDirective { .. } => NodeType::PragmaDirective,
            NodeKind::ContractDefinition { .. } => NodeType::ContractDefinition,
            NodeKind::StateVariableDeclaration { .. } => NodeType::StateVariableDeclaration,
            NodeKind::UsingForDeclaration { .. } => NodeType::UsingForDeclaration,
            NodeKind::FunctionDefinition { .. } => NodeType::FunctionDefinition,
            NodeKind::ParameterList { .. } => NodeType::ParameterList,
            NodeKind::Parameter { .. } => NodeType::Parameter,
            NodeKind::Block { .. } => NodeType::Block,
            NodeKind::ExpressionStatement { .. } => NodeType::ExpressionStatement,
            NodeKind::VariableDeclarationStatement { .. } => {
                NodeType::VariableDeclarationStatement
            }
            NodeKind::IfStatement { .. } => NodeType::IfStatement,
            NodeKind::WhileStatement { .. } => NodeType::WhileStatement,
            NodeKind::DoWhileStatement { .. } => NodeType::DoWhileStatement,
            NodeKind::ForStatement { .. } => NodeType::ForStatement,
            NodeKind::BreakStatement => NodeType::BreakStatement,
            NodeKind::ContinueStatement => NodeType::ContinueStatement,
            NodeKind::ReturnStatement { .. } => NodeType::ReturnStatement,
            NodeKind::EmitStatement { .. } => NodeType::EmitStatement,
            NodeKind::BinaryOperation { .. } => NodeType::BinaryOperation,
            NodeKind::UnaryOperation { .. } => NodeType::UnaryOperation,
            NodeKind::FunctionCall { .. } => NodeType::FunctionCall,
            NodeKind::Identifier { .. } => NodeType::Identifier,
            NodeKind::MemberAccess { .. } => NodeType::MemberAccess,
            NodeKind::IndexAccess { .. } => NodeType::IndexAccess,
            NodeKind::ElementaryTypeName { .. } => NodeType::ElementaryTypeName,
            NodeKind::ArrayTypeName { .. } => NodeType::ArrayTypeName,
            NodeKind::ElementaryTypeNameExpression { .. } => {
                NodeType::ElementaryTypeNameExpression
            }
            NodeKind::BooleanLiteral { .. } => NodeType::BooleanLiteral,
            NodeKind::NumberLiteral { .. } => NodeType::NumberLiteral,
            NodeKind::StringLiteral { .. } => NodeType::StringLiteral,
        }
    }

    /// Name carried by the node, if its kind has one
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::ContractDefinition { name, .. } => Some(name),
            NodeKind::FunctionDefinition { name, .. } => name.as_deref(),
            NodeKind::Parameter { name, .. } => name.as_deref(),
            NodeKind::Identifier { name } => Some(name),
            NodeKind::ElementaryTypeName { name } => Some(name),
            _ => None,
        }
    }

    /// Children in document order
    pub fn children(&self) -> Vec<&Node> {
        fn opt(n: &Option<Box<Node>>) -> Option<&Node> {
            n.as_deref()
        }

        match &self.kind {
            NodeKind::SourceUnit { items } => items.iter().collect(),
            NodeKind::PragmaDirective { .. } => Vec::new(),
            NodeKind::ContractDefinition { parts, .. } => parts.iter().collect(),
            NodeKind::StateVariableDeclaration {
                variables,
                initial_value,
            } => variables.iter().chain(opt(initial_value)).collect(),
            NodeKind::UsingForDeclaration { .. } => Vec::new(),
            NodeKind::FunctionDefinition {
                modifiers,
                parameters,
                return_parameters,
                body,
                ..
            } => std::iter::once(parameters.as_ref())
                .chain(opt(return_parameters))
                .chain(modifiers.iter())
                .chain(opt(body))
                .collect(),
            NodeKind::ParameterList { parameters } => parameters.iter().collect(),
            NodeKind::Parameter { type_name, .. } => vec![type_name.as_ref()],
            NodeKind::Block { statements } => statements.iter().collect(),
            NodeKind::ExpressionStatement { expression } => vec![expression.as_ref()],
            NodeKind::VariableDeclarationStatement {
                variables,
                initial_value,
            } => variables.iter().chain(opt(initial_value)).collect(),
            NodeKind::IfStatement {
                condition,
                true_body,
                false_body,
            } => std::iter::once(condition.as_ref())
                .chain(std::iter::once(true_body.as_ref()))
                .chain(opt(false_body))
                .collect(),
            NodeKind::WhileStatement { condition, body } => {
                vec![condition.as_ref(), body.as_ref()]
            }
            NodeKind::DoWhileStatement { condition, body } => {
                vec![body.as_ref(), condition.as_ref()]
            }
            NodeKind::ForStatement {
                init,
                condition,
                update,
                body,
            } => opt(init)
                .into_iter()
                .chain(opt(condition))
                .chain(opt(update))
                .chain(std::iter::once(body.as_ref()))
                .collect(),
            NodeKind::BreakStatement | NodeKind::ContinueStatement => Vec::new(),
            NodeKind::ReturnStatement { expression } => opt(expression).into_iter().collect(),
            NodeKind::EmitStatement { event_call } => vec![event_call.as_ref()],
            NodeKind::BinaryOperation { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            NodeKind::UnaryOperation { sub_expression, .. } => vec![sub_expression.as_ref()],
            NodeKind::FunctionCall {
                expression,
                arguments,
                ..
            } => std::iter::once(expression.as_ref())
                .chain(arguments.iter())
                .collect(),
            NodeKind::Identifier { .. } => Vec::new(),
            NodeKind::MemberAccess { expression, .. } => vec![expression.as_ref()],
            NodeKind::IndexAccess { base, index } => vec![base.as_ref(), index.as_ref()],
            NodeKind::ElementaryTypeName { .. } => Vec::new(),
            NodeKind::ArrayTypeName { base_type, length } => std::iter::once(base_type.as_ref())
                .chain(opt(length))
                .collect(),
            NodeKind::ElementaryTypeNameExpression { type_name } => vec![type_name.as_ref()],
            NodeKind::BooleanLiteral { .. }
            | NodeKind::NumberLiteral { .. }
            | NodeKind::StringLiteral { .. } => Vec::new(),
        }
    }

    /// True if the subtree rooted here contains the node with the given id
    pub fn contains(&self, id: NodeId) -> bool {
        if self.id == id {
            return true;
        }
        self.children().iter().any(|c| c.contains(id))
    }
}
