// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The analysis form of a dataflow program: declarations, equations, and
//! the expressions that appear in equations and learned invariants.

use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The base types a stream can carry.
#[allow(missing_docs)]
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, Deserialize)]
pub enum Type {
    Bool,
    Int,
    Real,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Real => write!(f, "real"),
        }
    }
}

/// A named stream declaration.
#[derive(PartialEq, Eq, Clone, Debug, Hash, Serialize, Deserialize)]
pub struct VarDecl {
    /// Stream name
    pub name: String,
    /// Type of every value the stream takes
    pub typ: Type,
}

impl VarDecl {
    /// Smart constructor taking the name by reference.
    pub fn new<N: AsRef<str>>(name: N, typ: Type) -> Self {
        VarDecl {
            name: name.as_ref().to_string(),
            typ,
        }
    }
}

/// Unary operators
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Boolean negation
    Not,
    /// Arithmetic negation
    Neg,
    /// Value of the argument one step in the past
    Pre,
}

/// Binary operators
#[allow(missing_docs)]
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    And,
    Or,
    Implies,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Plus,
    Minus,
    Times,
    Divide,
    /// Stream initialization: left value at the first step, right after
    Arrow,
}

impl BinaryOp {
    fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Implies => "=>",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "<>",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Arrow => "->",
        }
    }
}

/// An expression over streams. Invariants learned by the engines are
/// expressions of boolean type.
#[derive(PartialEq, Eq, Clone, Debug, Hash, Serialize, Deserialize)]
pub enum Expr {
    /// Reference to a declared stream
    Id(String),
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Unary application
    Unary {
        /// The operator
        op: UnaryOp,
        /// The operand
        expr: Box<Expr>,
    },
    /// Binary application
    Binary {
        /// The operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Reference to a stream by name.
    pub fn id<N: AsRef<str>>(name: N) -> Self {
        Expr::Id(name.as_ref().to_string())
    }

    /// Unary application.
    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Expr::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    /// Binary application.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// The set of stream names this expression mentions.
    pub fn support(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.collect_support(&mut vars);
        vars
    }

    fn collect_support(&self, vars: &mut BTreeSet<String>) {
        match self {
            Expr::Id(name) => {
                vars.insert(name.clone());
            }
            Expr::Bool(_) | Expr::Int(_) => {}
            Expr::Unary { expr, .. } => expr.collect_support(vars),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_support(vars);
                rhs.collect_support(vars);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Id(name) => write!(f, "{name}"),
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Int(i) => write!(f, "{i}"),
            Expr::Unary {
                op: UnaryOp::Not,
                expr,
            } => write!(f, "(not {expr})"),
            Expr::Unary {
                op: UnaryOp::Neg,
                expr,
            } => write!(f, "(- {expr})"),
            Expr::Unary {
                op: UnaryOp::Pre,
                expr,
            } => write!(f, "(pre {expr})"),
            Expr::Binary { op, lhs, rhs } => {
                write!(f, "({lhs} {} {rhs})", op.symbol())
            }
        }
    }
}

/// A single-assignment definition of a stream.
#[derive(PartialEq, Eq, Clone, Debug, Hash, Serialize, Deserialize)]
pub struct Equation {
    /// The defined stream
    pub lhs: String,
    /// Its definition
    pub rhs: Expr,
}

impl Equation {
    /// Smart constructor taking the defined name by reference.
    pub fn new<N: AsRef<str>>(lhs: N, rhs: Expr) -> Self {
        Equation {
            lhs: lhs.as_ref().to_string(),
            rhs,
        }
    }
}

/// A translated node: the single flat program the engines analyze.
#[derive(PartialEq, Eq, Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    /// Node name
    pub name: String,
    /// Input streams
    pub inputs: Vec<VarDecl>,
    /// Output streams
    pub outputs: Vec<VarDecl>,
    /// Local streams
    pub locals: Vec<VarDecl>,
    /// Definitions of outputs and locals
    pub equations: Vec<Equation>,
    /// Names of boolean streams to prove always true, in source order
    pub properties: Vec<String>,
    /// Names eligible to appear in inductive validity cores
    pub ivc: Vec<String>,
}

impl Node {
    /// All declarations in order: inputs, then outputs, then locals.
    pub fn var_decls(&self) -> Vec<VarDecl> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .chain(self.locals.iter())
            .cloned()
            .collect_vec()
    }
}

/// One form of the program under analysis.
///
/// The director holds two: the user form (for rendering counterexamples in
/// source terms) and the analysis form (whose properties drive the roster).
#[derive(PartialEq, Eq, Clone, Debug, Serialize, Deserialize)]
pub struct Specification {
    /// The translated node
    pub node: Node,
}

impl Specification {
    /// Wrap a translated node.
    pub fn new(node: Node) -> Self {
        Specification { node }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_expr() -> Expr {
        // (0 -> (pre n)) + 1
        Expr::binary(
            BinaryOp::Plus,
            Expr::binary(
                BinaryOp::Arrow,
                Expr::Int(0),
                Expr::unary(UnaryOp::Pre, Expr::id("n")),
            ),
            Expr::Int(1),
        )
    }

    #[test]
    fn test_expr_display() {
        assert_eq!(counter_expr().to_string(), "((0 -> (pre n)) + 1)");
        let p = Expr::binary(
            BinaryOp::Implies,
            Expr::id("a"),
            Expr::unary(UnaryOp::Not, Expr::id("b")),
        );
        assert_eq!(p.to_string(), "(a => (not b))");
    }

    #[test]
    fn test_expr_support() {
        let e = Expr::binary(
            BinaryOp::And,
            counter_expr(),
            Expr::binary(BinaryOp::LessEqual, Expr::id("n"), Expr::id("max")),
        );
        let vars: Vec<_> = e.support().into_iter().collect();
        assert_eq!(vars, vec!["max".to_string(), "n".to_string()]);
    }

    #[test]
    fn test_var_decl_order() {
        let node = Node {
            name: "main".to_string(),
            inputs: vec![VarDecl::new("x", Type::Int)],
            outputs: vec![VarDecl::new("y", Type::Bool)],
            locals: vec![VarDecl::new("n", Type::Int)],
            equations: vec![Equation::new("n", counter_expr())],
            properties: vec!["y".to_string()],
            ivc: vec![],
        };
        let names: Vec<_> = node.var_decls().into_iter().map(|vd| vd.name).collect();
        assert_eq!(names, vec!["x", "y", "n"]);
    }
}
