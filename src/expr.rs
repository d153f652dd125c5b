//! Expression module for representing parsed formulas.
//!
//! This module defines the syntax tree produced by the parser. The main types are:
//!
//! - `Expr`: An enum representing the different kinds of formula nodes
//! - `BinaryOp`: The arithmetic operators that combine two sub-expressions
//! - `Fingerprint`: A structural hash of an `Expr`, used to key the compiled-function cache
//!
//! The tree is built recursively using `Box<Expr>` for nested expressions and is never
//! mutated after construction. It has no behavior of its own beyond being matched on by the
//! compiler, displayed, and hashed.
//!
//! # Structural equality
//! Two trees are equal when they have the same shape, the same operators, the same
//! identifier spelling and bit-identical literals. `Eq` and `Hash` follow that definition,
//! so `0.0` and `-0.0` are different literals and a tree is always equal to itself.
//!
//! # Display
//! `Display` writes text the parser accepts. Parentheses are written for `Group` nodes and
//! wherever operator precedence requires them, so a parsed tree displays as text that parses
//! back to the same tree. The guarantee covers trees produced by the parser. A hand-built
//! tree may hold literals the parser never produces: negative literals display as a unary
//! minus, and non-finite literals display as the divisions `(0 / 0)`, `(1 / 0)` and
//! `(-1 / 0)`. That text parses and evaluates to the same value, but into a different tree.

use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Binary arithmetic operators, in the order they appear in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
}

impl BinaryOp {
    /// Applies the operator to two constants.
    ///
    /// The compiler folds constants with it, and generated closures perform the same `f64`
    /// operations. The one rewrite they make, `b ^ 2` as `b * b`, rounds identically, so
    /// folded and unfolded formulas agree bit for bit.
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Pow => lhs.powf(rhs),
            BinaryOp::Mod => lhs % rhs,
        }
    }

    /// Returns the operator as written in formula text.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Mod => "%",
        }
    }

    /// Binding strength, higher binds tighter.
    pub(crate) fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 2,
            BinaryOp::Pow => 3,
        }
    }

    /// True for `*` and `/`, the operators the compiler reassociates.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, BinaryOp::Mul | BinaryOp::Div)
    }
}

const UNARY_PRECEDENCE: u8 = 4;
const PRIMARY_PRECEDENCE: u8 = 5;

/// A node of a parsed formula.
///
/// Identifiers and call names are stored as written; resolving them against the fixed set
/// of constants and functions is the compiler's job.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A numeric literal
    Literal(f64),
    /// The variable `x` or a named constant (`pi`, `e`)
    Identifier(String),
    /// Unary minus
    UnaryNeg(Box<Expr>),
    /// Unary plus
    UnaryPos(Box<Expr>),
    /// Binary arithmetic
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Application of a single-argument function
    Call(String, Box<Expr>),
    /// A parenthesized sub-expression
    Group(Box<Expr>),
}

impl Expr {
    pub fn literal(value: f64) -> Self {
        Expr::Literal(value)
    }

    pub fn ident(name: &str) -> Self {
        Expr::Identifier(name.to_string())
    }

    pub fn neg(operand: Expr) -> Self {
        Expr::UnaryNeg(Box::new(operand))
    }

    pub fn pos(operand: Expr) -> Self {
        Expr::UnaryPos(Box::new(operand))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn call(name: &str, arg: Expr) -> Self {
        Expr::Call(name.to_string(), Box::new(arg))
    }

    pub fn group(inner: Expr) -> Self {
        Expr::Group(Box::new(inner))
    }

    /// Returns the expression with any enclosing `Group` nodes removed.
    pub fn ungrouped(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Group(inner) = expr {
            expr = inner;
        }
        expr
    }

    /// Computes the structural fingerprint of this tree.
    ///
    /// Structurally equal trees always produce the same fingerprint. The value is
    /// deterministic within a process but not guaranteed to be stable across crate versions.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        Fingerprint(hasher.finish())
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(op, _, _) => op.precedence(),
            Expr::UnaryNeg(_) | Expr::UnaryPos(_) => UNARY_PRECEDENCE,
            // A negative literal prints with a leading sign
            Expr::Literal(v) if v.is_finite() && v.is_sign_negative() => UNARY_PRECEDENCE,
            _ => PRIMARY_PRECEDENCE,
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Literal(a), Expr::Literal(b)) => a.to_bits() == b.to_bits(),
            (Expr::Identifier(a), Expr::Identifier(b)) => a == b,
            (Expr::UnaryNeg(a), Expr::UnaryNeg(b))
            | (Expr::UnaryPos(a), Expr::UnaryPos(b))
            | (Expr::Group(a), Expr::Group(b)) => a == b,
            (Expr::Binary(op_a, l_a, r_a), Expr::Binary(op_b, l_b, r_b)) => {
                op_a == op_b && l_a == l_b && r_a == r_b
            }
            (Expr::Call(name_a, arg_a), Expr::Call(name_b, arg_b)) => {
                name_a == name_b && arg_a == arg_b
            }
            _ => false,
        }
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Expr::Literal(value) => value.to_bits().hash(state),
            Expr::Identifier(name) => name.hash(state),
            Expr::UnaryNeg(operand) | Expr::UnaryPos(operand) | Expr::Group(operand) => {
                operand.hash(state)
            }
            Expr::Binary(op, lhs, rhs) => {
                op.hash(state);
                lhs.hash(state);
                rhs.hash(state);
            }
            Expr::Call(name, arg) => {
                name.hash(state);
                arg.hash(state);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) if value.is_nan() => f.write_str("(0 / 0)"),
            Expr::Literal(value) if value.is_infinite() => {
                f.write_str(if *value > 0.0 { "(1 / 0)" } else { "(-1 / 0)" })
            }
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Identifier(name) => write!(f, "{name}"),
            Expr::UnaryNeg(operand) => {
                f.write_str("-")?;
                write_operand(f, operand, UNARY_PRECEDENCE)
            }
            Expr::UnaryPos(operand) => {
                f.write_str("+")?;
                write_operand(f, operand, UNARY_PRECEDENCE)
            }
            Expr::Binary(op, lhs, rhs) => {
                let prec = op.precedence();
                write_operand(f, lhs, prec)?;
                write!(f, " {} ", op.symbol())?;
                // Every level is left-associative, so an equal-precedence right child needs
                // parentheses to keep its grouping.
                write_operand(f, rhs, prec + 1)
            }
            Expr::Call(name, arg) => write!(f, "{name}({arg})"),
            Expr::Group(inner) => write!(f, "({inner})"),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Expr, min_precedence: u8) -> fmt::Result {
    if operand.precedence() < min_precedence {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

/// Structural hash of an [`Expr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub u64);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::ident("x")
    }

    #[test]
    fn test_binary_op_apply() {
        assert_eq!(BinaryOp::Add.apply(2.0, 3.0), 5.0);
        assert_eq!(BinaryOp::Sub.apply(2.0, 3.0), -1.0);
        assert_eq!(BinaryOp::Mul.apply(2.0, 3.0), 6.0);
        assert_eq!(BinaryOp::Div.apply(3.0, 2.0), 1.5);
        assert_eq!(BinaryOp::Pow.apply(2.0, 3.0), 8.0);
        // Remainder takes the sign of the dividend
        assert_eq!(BinaryOp::Mod.apply(-7.0, 3.0), -1.0);
        assert_eq!(BinaryOp::Mod.apply(7.0, -3.0), 1.0);
        assert!(BinaryOp::Div.apply(1.0, 0.0).is_infinite());
        assert!(BinaryOp::Div.apply(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_structural_equality() {
        let a = Expr::binary(BinaryOp::Mul, Expr::literal(2.0), x());
        let b = Expr::binary(BinaryOp::Mul, Expr::literal(2.0), x());
        let c = Expr::binary(BinaryOp::Mul, x(), Expr::literal(2.0));
        assert_eq!(a, b);
        assert_ne!(a, c);

        // Literals compare by bit pattern
        assert_ne!(Expr::literal(0.0), Expr::literal(-0.0));
        let nan = Expr::literal(f64::NAN);
        assert_eq!(nan, nan.clone());

        // Groups are part of the structure
        assert_ne!(x(), Expr::group(x()));
    }

    #[test]
    fn test_fingerprint() {
        let a = Expr::call("sin", Expr::binary(BinaryOp::Mul, x(), Expr::ident("pi")));
        let b = Expr::call("sin", Expr::binary(BinaryOp::Mul, x(), Expr::ident("pi")));
        let c = Expr::call("cos", Expr::binary(BinaryOp::Mul, x(), Expr::ident("pi")));
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint(), a.fingerprint());
    }

    #[test]
    fn test_ungrouped() {
        let inner = Expr::binary(BinaryOp::Add, x(), Expr::literal(1.0));
        let wrapped = Expr::group(Expr::group(inner.clone()));
        assert_eq!(*wrapped.ungrouped(), inner);
        assert_eq!(*x().ungrouped(), x());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Expr::literal(0.5)), "0.5");
        assert_eq!(format!("{}", x()), "x");

        let expr = Expr::binary(
            BinaryOp::Sub,
            Expr::neg(Expr::group(Expr::binary(
                BinaryOp::Pow,
                x(),
                Expr::literal(2.0),
            ))),
            Expr::call(
                "sin",
                Expr::binary(
                    BinaryOp::Mul,
                    Expr::binary(BinaryOp::Mul, x(), Expr::ident("pi")),
                    Expr::literal(8.0),
                ),
            ),
        );
        assert_eq!(format!("{expr}"), "-(x ^ 2) - sin(x * pi * 8)");
    }

    #[test]
    fn test_display_adds_required_parentheses() {
        // (x + 1) * 2 built without a Group node
        let expr = Expr::binary(
            BinaryOp::Mul,
            Expr::binary(BinaryOp::Add, x(), Expr::literal(1.0)),
            Expr::literal(2.0),
        );
        assert_eq!(format!("{expr}"), "(x + 1) * 2");

        // x - (1 - x) keeps its right grouping
        let expr = Expr::binary(
            BinaryOp::Sub,
            x(),
            Expr::binary(BinaryOp::Sub, Expr::literal(1.0), x()),
        );
        assert_eq!(format!("{expr}"), "x - (1 - x)");

        // -(x + 1)
        let expr = Expr::neg(Expr::binary(BinaryOp::Add, x(), Expr::literal(1.0)));
        assert_eq!(format!("{expr}"), "-(x + 1)");
    }

    #[test]
    fn test_display_of_non_finite_literals() {
        let cases = [
            (f64::NAN, "(0 / 0)"),
            (f64::INFINITY, "(1 / 0)"),
            (f64::NEG_INFINITY, "(-1 / 0)"),
        ];
        for (value, text) in cases {
            let expr = Expr::binary(BinaryOp::Mul, Expr::literal(value), x());
            assert_eq!(format!("{expr}"), format!("{text} * x"));

            // The text parses and folds back to the same constant
            let reparsed = crate::parser::parse(&expr.to_string()).unwrap();
            let folded = crate::compiler::lower(&reparsed).unwrap();
            match folded {
                crate::compiler::Node::Binary(BinaryOp::Mul, lhs, _) => {
                    let constant = lhs.as_const().unwrap();
                    assert!(constant.is_nan() == value.is_nan());
                    if !value.is_nan() {
                        assert_eq!(constant, value);
                    }
                }
                other => panic!("unexpected tree for {text}: {other:?}"),
            }
        }
    }
}
