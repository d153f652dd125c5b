//! This module turns lowered formulas into native closures.
//!
//! Each node of the tree becomes one boxed closure that captures its already-built children.
//! Constants are captured as immediates, host math functions are resolved to plain function
//! pointers up front, and the most common operand shapes (`x op c`, `c op x`, `x op x`) get
//! dedicated closures so the per-sample path does no dispatch on the tree at all.
//!
//! The main entry point is `build_function()`.

use std::sync::Arc;

use crate::{compiler::Node, expr::BinaryOp, types::CompiledFn};

type Thunk = Box<dyn Fn(f64) -> f64 + Send + Sync>;

/// Builds a thread-safe closure from a lowered tree.
///
/// Building cannot fail: every name in a [`Node`] is already resolved, and every operation
/// it emits is total over `f64`, so the returned function never panics.
///
/// # Arguments
/// * `tree` - The constant-folded tree produced by the compiler
///
/// # Returns
/// A function of `x` wrapped in an Arc so it can be shared between threads.
pub fn build_function(tree: &Node) -> CompiledFn {
    Arc::from(build_thunk(tree))
}

fn build_thunk(node: &Node) -> Thunk {
    match node {
        Node::Const(value) => {
            let value = *value;
            Box::new(move |_| value)
        }
        Node::X => Box::new(|x| x),
        Node::Neg(operand) => match operand.as_ref() {
            Node::X => Box::new(|x| -x),
            operand => {
                let operand = build_thunk(operand);
                Box::new(move |x| -operand(x))
            }
        },
        Node::Call(function, arg) => {
            let host = function.host();
            match arg.as_ref() {
                Node::X => Box::new(host),
                arg => {
                    let arg = build_thunk(arg);
                    Box::new(move |x| host(arg(x)))
                }
            }
        }
        Node::Binary(op, lhs, rhs) => build_binary(*op, lhs, rhs),
    }
}

fn build_binary(op: BinaryOp, lhs: &Node, rhs: &Node) -> Thunk {
    match op {
        BinaryOp::Add => specialize(lhs, rhs, |a, b| a + b),
        BinaryOp::Sub => specialize(lhs, rhs, |a, b| a - b),
        BinaryOp::Mul => specialize(lhs, rhs, |a, b| a * b),
        BinaryOp::Div => specialize(lhs, rhs, |a, b| a / b),
        BinaryOp::Mod => specialize(lhs, rhs, |a, b| a % b),
        BinaryOp::Pow => build_power(lhs, rhs),
    }
}

/// Squares are unrolled into one multiplication, which rounds exactly like `powf(b, 2.0)`;
/// every other exponent uses `powf`.
fn build_power(base: &Node, exponent: &Node) -> Thunk {
    match (base, exponent.as_const()) {
        (Node::X, Some(e)) if e == 2.0 => Box::new(|x| x * x),
        (base, Some(e)) if e == 2.0 => {
            let base = build_thunk(base);
            Box::new(move |x| {
                let b = base(x);
                b * b
            })
        }
        _ => specialize(base, exponent, f64::powf),
    }
}

/// Builds a binary closure, capturing constant operands as immediates.
fn specialize<F>(lhs: &Node, rhs: &Node, op: F) -> Thunk
where
    F: Fn(f64, f64) -> f64 + Copy + Send + Sync + 'static,
{
    match (lhs, rhs) {
        (Node::X, Node::X) => Box::new(move |x| op(x, x)),
        (Node::X, Node::Const(b)) => {
            let b = *b;
            Box::new(move |x| op(x, b))
        }
        (Node::Const(a), Node::X) => {
            let a = *a;
            Box::new(move |x| op(a, x))
        }
        (Node::Const(a), rhs) => {
            let a = *a;
            let rhs = build_thunk(rhs);
            Box::new(move |x| op(a, rhs(x)))
        }
        (lhs, Node::Const(b)) => {
            let b = *b;
            let lhs = build_thunk(lhs);
            Box::new(move |x| op(lhs(x), b))
        }
        (lhs, rhs) => {
            let lhs = build_thunk(lhs);
            let rhs = build_thunk(rhs);
            Box::new(move |x| op(lhs(x), rhs(x)))
        }
    }
}
