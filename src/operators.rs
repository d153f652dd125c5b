//! The closed set of functions and named constants a formula may use.
//!
//! Function names are matched case-insensitively. Of the constants, `pi` is matched
//! case-insensitively while `e` and the variable `x` are case-sensitive.

use std::f64::consts;

use itertools::Itertools;

/// Name of the single free variable.
pub const VARIABLE: &str = "x";

/// Single-argument functions available in formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathFunction {
    Sin,
    Cos,
    Tan,
    Abs,
    /// Natural logarithm
    Ln,
    /// Base-10 logarithm
    Log,
    Sqrt,
}

impl MathFunction {
    /// Every supported function, in the order they are listed in error messages.
    pub const ALL: [MathFunction; 7] = [
        MathFunction::Sin,
        MathFunction::Tan,
        MathFunction::Cos,
        MathFunction::Abs,
        MathFunction::Ln,
        MathFunction::Log,
        MathFunction::Sqrt,
    ];

    /// Looks up a function by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|function| function.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            MathFunction::Sin => "sin",
            MathFunction::Cos => "cos",
            MathFunction::Tan => "tan",
            MathFunction::Abs => "abs",
            MathFunction::Ln => "ln",
            MathFunction::Log => "log",
            MathFunction::Sqrt => "sqrt",
        }
    }

    /// Returns the host implementation, resolved once so generated code calls it directly.
    pub fn host(self) -> fn(f64) -> f64 {
        match self {
            MathFunction::Sin => f64::sin,
            MathFunction::Cos => f64::cos,
            MathFunction::Tan => f64::tan,
            MathFunction::Abs => f64::abs,
            MathFunction::Ln => f64::ln,
            MathFunction::Log => f64::log10,
            MathFunction::Sqrt => f64::sqrt,
        }
    }

    /// Applies the function to a value. Domain errors produce NaN or infinity.
    pub fn apply(self, value: f64) -> f64 {
        (self.host())(value)
    }

    /// The supported names joined for use in error messages, e.g. `sin,tan,cos,...`.
    pub fn supported_names() -> String {
        Self::ALL.iter().map(|function| function.name()).join(",")
    }
}

/// Resolves a named constant, returning `None` for anything that is not one.
pub fn resolve_constant(name: &str) -> Option<f64> {
    if name == "e" {
        Some(consts::E)
    } else if name.eq_ignore_ascii_case("pi") {
        Some(consts::PI)
    } else {
        None
    }
}
