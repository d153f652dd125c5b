//! Compiled single-variable formulas for function plotting.
//!
//! This crate turns formula text such as `-(x^2)-sin(x*pi*8)` into native closures that a
//! plotter can evaluate hundreds of times per redraw. Formulas are tokenized with
//! [logos](https://github.com/maciejhirsz/logos), parsed by a small precedence-climbing
//! parser, constant-folded, and built into a tree of closures that is cached per distinct
//! formula.
//!
//! # Features
//!
//! - Arithmetic (`+ - * / % ^`), unary signs, parentheses
//! - Functions `sin cos tan abs ln log sqrt` and constants `pi`, `e`
//! - Errors with the column of the offending token
//! - Compile-time folding of every constant sub-expression
//! - A thread-safe cache that compiles each distinct formula once
//! - Parallel sampling of a plot's visible functions with rayon
//!
//! # Example
//!
//! ```rust
//! use plotexpr::prelude::*;
//!
//! let cache = FunctionCache::new();
//!
//! // Compile a formula and evaluate it
//! let artifact = cache.get_or_compile(&parse("2*3*x + 1").unwrap()).unwrap();
//! assert_eq!(artifact.evaluate(2.0), 13.0);
//! assert_eq!(artifact.tree().to_string(), "((6 * x) + 1)");
//!
//! // Or work with named functions
//! let f = Function::parse("f", "-(x^2)+1", &cache).unwrap();
//! assert_eq!(f.calculate(1.0), 0.0);
//!
//! // Errors point at the offending column
//! let err = parse("2*x + )").unwrap_err();
//! assert_eq!(err.column(), Some(7));
//! ```

pub use cache::FunctionCache;
pub use errors::{CompileError, FormulaError, ParseError};
pub use function::{validate, Color, ColorCycle, Function, FunctionRecord};
pub use plot::{FunctionList, SampleGrid};
pub use types::{evaluate, CompiledArtifact, CompiledFn};

pub mod prelude {
    pub use crate::cache::FunctionCache;
    pub use crate::compiler::compile;
    pub use crate::errors::{CompileError, FormulaError, ParseError};
    pub use crate::expr::{BinaryOp, Expr};
    pub use crate::function::{validate, Color, Function, FunctionRecord};
    pub use crate::parser::parse;
    pub use crate::plot::{FunctionList, SampleGrid};
    pub use crate::types::{evaluate, CompiledArtifact};
}

/// Closure generation from lowered formulas
pub mod builder;
/// Memoization of compiled formulas
pub mod cache;
/// Lowering and constant folding
pub mod compiler;
/// Error types for the various failure modes
pub mod errors;
/// Syntax tree of a formula
pub mod expr;
/// Named functions with presentation state
pub mod function;
/// Tokenizer
pub mod lexer;
/// Supported functions and constants
pub mod operators;
/// Formula parser
pub mod parser;
/// Function lists and sample grids
pub mod plot;
/// Shared type definitions
pub mod types;
