//! Lowering of parsed formulas with compile-time constant folding.
//!
//! `lower` walks the syntax tree once, bottom-up. Every sub-tree that does not read `x`
//! collapses into a single constant, names are resolved against the fixed sets of constants
//! and functions, and purely syntactic nodes (groups, unary plus) disappear. The resulting
//! [`Node`] tree is what the builder turns into closures, so nothing that can be computed
//! ahead of time is left for the per-sample path.
//!
//! # Reassociation of `*` and `/`
//! When a multiplicative node has a constant left operand and its right operand is itself a
//! multiplicative node with a constant left operand, the two constants fold first:
//!
//! ```text
//! c1 * (c2 * r)  ->  (c1 * c2) * r        c1 / (c2 * r)  ->  (c1 / c2) / r
//! c1 * (c2 / r)  ->  (c1 * c2) / r        c1 / (c2 / r)  ->  (c1 / c2) * r
//! ```
//!
//! These identities hold for real numbers but can change the last bits of a floating-point
//! result, exactly like the plotter this crate serves always did.

use std::fmt;

use log::debug;

use crate::errors::CompileError;
use crate::expr::{BinaryOp, Expr};
use crate::operators::{resolve_constant, MathFunction, VARIABLE};
use crate::types::CompiledArtifact;

/// A lowered, constant-folded formula.
///
/// Unlike [`Expr`] every name is resolved, so building closures from a `Node` cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A compile-time constant
    Const(f64),
    /// The formal parameter
    X,
    /// Negation of a computed value
    Neg(Box<Node>),
    /// Binary arithmetic with at least one computed operand
    Binary(BinaryOp, Box<Node>, Box<Node>),
    /// A host math function applied to a computed value
    Call(MathFunction, Box<Node>),
}

impl Node {
    /// Returns the value if this node is a compile-time constant.
    pub fn as_const(&self) -> Option<f64> {
        match self {
            Node::Const(value) => Some(*value),
            _ => None,
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Node::Const(_) | Node::X => 1,
            Node::Neg(operand) | Node::Call(_, operand) => 1 + operand.node_count(),
            Node::Binary(_, lhs, rhs) => 1 + lhs.node_count() + rhs.node_count(),
        }
    }
}

/// Formats the lowered tree with every binary operation wrapped in parentheses.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Const(value) => write!(f, "{value}"),
            Node::X => f.write_str(VARIABLE),
            Node::Neg(operand) => write!(f, "-({operand})"),
            Node::Binary(op, lhs, rhs) => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Node::Call(function, arg) => write!(f, "{}({arg})", function.name()),
        }
    }
}

/// Compiles a parsed formula into an invokable artifact.
///
/// # Example
/// ```
/// # use plotexpr::{compiler::compile, parser::parse};
/// let artifact = compile(&parse("2*3*x").unwrap()).unwrap();
/// assert_eq!(artifact.tree().to_string(), "(6 * x)");
/// assert_eq!(artifact.evaluate(2.0), 12.0);
/// ```
///
/// # Errors
/// Returns `CompileError::UnknownSymbol` for identifiers other than `x`, `pi` and `e`, and
/// `CompileError::UnknownFunction` for calls outside the supported set.
pub fn compile(expr: &Expr) -> Result<CompiledArtifact, CompileError> {
    let tree = lower(expr)?;
    let fingerprint = expr.fingerprint();
    debug!(
        "compiled formula {fingerprint} into {} nodes: {tree}",
        tree.node_count()
    );
    Ok(CompiledArtifact::new(fingerprint, tree))
}

/// Lowers a syntax tree, folding every constant sub-tree.
pub fn lower(expr: &Expr) -> Result<Node, CompileError> {
    match expr {
        Expr::Literal(value) => Ok(Node::Const(*value)),
        Expr::Identifier(name) => lower_identifier(name),
        Expr::UnaryPos(operand) | Expr::Group(operand) => lower(operand),
        Expr::UnaryNeg(operand) => Ok(match lower(operand)? {
            Node::Const(value) => Node::Const(-value),
            node => Node::Neg(Box::new(node)),
        }),
        Expr::Call(name, arg) => {
            let function =
                MathFunction::from_name(name).ok_or_else(|| CompileError::UnknownFunction {
                    name: name.clone(),
                    supported: MathFunction::supported_names(),
                })?;
            Ok(match lower(arg)? {
                Node::Const(value) => Node::Const(function.apply(value)),
                node => Node::Call(function, Box::new(node)),
            })
        }
        Expr::Binary(op, lhs, rhs) => lower_binary(*op, lhs, rhs),
    }
}

fn lower_identifier(name: &str) -> Result<Node, CompileError> {
    if name == VARIABLE {
        return Ok(Node::X);
    }
    resolve_constant(name)
        .map(Node::Const)
        .ok_or_else(|| CompileError::UnknownSymbol(name.to_string()))
}

fn lower_binary(op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Node, CompileError> {
    let left = lower(lhs)?;

    if let (true, Some(c1), Expr::Binary(inner_op, inner_lhs, inner_rhs)) =
        (op.is_multiplicative(), left.as_const(), rhs.ungrouped())
    {
        if inner_op.is_multiplicative() {
            let inner_left = lower(inner_lhs)?;
            let inner_right = lower(inner_rhs)?;

            if let Some(c2) = inner_left.as_const() {
                let folded = Node::Const(op.apply(c1, c2));
                return Ok(fold(reassociated(op, *inner_op), folded, inner_right));
            }

            let right = fold(*inner_op, inner_left, inner_right);
            return Ok(fold(op, left, right));
        }
    }

    let right = lower(rhs)?;
    Ok(fold(op, left, right))
}

/// The operator joining `c1 op c2` with `r` once `c1 op (c2 inner r)` is reassociated.
fn reassociated(op: BinaryOp, inner: BinaryOp) -> BinaryOp {
    match (op, inner) {
        (BinaryOp::Div, BinaryOp::Mul) => BinaryOp::Div,
        (BinaryOp::Div, BinaryOp::Div) => BinaryOp::Mul,
        (_, inner) => inner,
    }
}

/// Combines two lowered operands, collapsing the node when both are constant.
fn fold(op: BinaryOp, left: Node, right: Node) -> Node {
    match (left.as_const(), right.as_const()) {
        (Some(a), Some(b)) => Node::Const(op.apply(a, b)),
        _ => Node::Binary(op, Box::new(left), Box::new(right)),
    }
}
