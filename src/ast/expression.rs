use crate::ast::{Block, InfixOperator, PrefixOperator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// Literal text kept verbatim; both the parser and the evaluator parse it
// as a signed 64-bit integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntLit {
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolLit {
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLit {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    pub operator: PrefixOperator,
    pub operand: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Infix {
    pub operator: InfixOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

// blocks.len() - conditions.len() is 0 (no trailing else) or 1 (with one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct If {
    pub conditions: Vec<Expression>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub params: Vec<Identifier>,
    pub body: Block,
}

// callee is always a bare identifier; fn(x){x}(5) is not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub callee: Identifier,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Array {
    pub elements: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub container: Box<Expression>,
    pub index: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashEntry {
    pub key: Expression,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hash {
    pub entries: Vec<HashEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Identifier(Identifier),
    IntLit(IntLit),
    BoolLit(BoolLit),
    StringLit(StringLit),
    Prefix(Prefix),
    Infix(Infix),
    If(If),
    Function(Function),
    Call(Call),
    Array(Array),
    Index(Index),
    Hash(Hash),
}
