//! Error types for the plotexpr crate.
//!
//! This module defines the error types that can occur while turning formula text into a
//! compiled function. The main error types are:
//!
//! - `ParseError`: Errors while tokenizing and parsing the formula text
//! - `CompileError`: Errors while lowering a parsed tree into a compiled function
//! - `FormulaError`: High-level errors when working with plotted functions
//!
//! None of these can occur while a compiled function is being evaluated. Numeric problems at
//! evaluation time (division by zero, `sqrt` of a negative number) degrade to NaN or infinity.

use thiserror::Error;

/// Errors that can occur while parsing formula text.
///
/// Every variant except `EmptyExpression` carries the 1-based column of the offending
/// character so a text field can point at it. Parsing stops at the first error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The input was empty or contained only whitespace
    #[error("Given expression must not be empty!")]
    EmptyExpression,
    /// The text does not follow the formula grammar
    #[error("Column {column}: {message}")]
    Syntax { column: usize, message: String },
    /// The text uses an operator or syntax that formulas do not support
    #[error("Column {column}: {construct} is not supported")]
    UnsupportedConstruct { column: usize, construct: String },
    /// A call names a function outside the supported set
    #[error("Column {column}: unknown function `{name}`. Only {supported} will be accepted!")]
    UnknownFunction {
        column: usize,
        name: String,
        supported: String,
    },
    /// A call was given other than exactly one argument
    #[error("Column {column}: `{name}` takes exactly one argument, got {got}")]
    Arity {
        column: usize,
        name: String,
        got: usize,
    },
}

impl ParseError {
    /// Returns the 1-based column the error points at, if it has one.
    pub fn column(&self) -> Option<usize> {
        match self {
            ParseError::EmptyExpression => None,
            ParseError::Syntax { column, .. }
            | ParseError::UnsupportedConstruct { column, .. }
            | ParseError::UnknownFunction { column, .. }
            | ParseError::Arity { column, .. } => Some(*column),
        }
    }
}

/// The category of a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    UnknownSymbol,
    UnknownFunction,
}

/// Errors that can occur while lowering a parsed tree into a compiled function.
///
/// The parser already rejects unknown function names, but trees can also be built by hand,
/// so the compiler checks every name it resolves.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// An identifier other than `x`, `pi` or `e`
    #[error("Unknown symbol {0}")]
    UnknownSymbol(String),
    /// A call to a function outside the supported set
    #[error("Unknown method {name}. Only {supported} will be accepted!")]
    UnknownFunction { name: String, supported: String },
}

impl CompileError {
    /// Returns the category of this error.
    pub fn kind(&self) -> CompileErrorKind {
        match self {
            CompileError::UnknownSymbol(_) => CompileErrorKind::UnknownSymbol,
            CompileError::UnknownFunction { .. } => CompileErrorKind::UnknownFunction,
        }
    }
}

/// High-level errors that can occur when defining plotted functions.
///
/// This enum wraps the lower-level parse and compile errors and adds the failure modes of
/// the function list.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    /// Error when parsing the formula text
    #[error("Invalid expression: {0}")]
    Parse(#[from] ParseError),
    /// Error when compiling the parsed formula
    #[error("Error during compiling the expression: {0}")]
    Compile(#[from] CompileError),
    /// Error when the function list is already full
    #[error("Too many functions: at most {limit} can be plotted at once")]
    TooManyFunctions { limit: usize },
    /// Error when no function with the given name exists
    #[error("Function not found: {0}")]
    FunctionNotFound(String),
}
