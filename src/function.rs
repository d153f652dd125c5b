//! Named, plottable functions of `x`.
//!
//! A [`Function`] couples the text a user typed with its parsed tree and the shared compiled
//! artifact, plus the presentation state a renderer needs (color and visibility). Functions
//! are plain data: redefining one replaces its formula in place and nothing is notified, so
//! change tracking stays with whatever UI owns the function.
//!
//! # Example
//!
//! ```
//! use plotexpr::{Function, FunctionCache};
//!
//! let cache = FunctionCache::new();
//! let mut f = Function::parse("f", "sin(x*pi*2)", &cache).unwrap();
//! assert!(f.calculate(0.25) > 0.999);
//!
//! // A rejected redefinition leaves the function untouched
//! assert!(f.update_expression("sin(x,", &cache).is_err());
//! assert_eq!(f.expression(), "sin(x*pi*2)");
//! ```

use std::fmt;
use std::sync::Arc;

use colored::Colorize;
use log::debug;
use rayon::prelude::*;

use crate::cache::FunctionCache;
use crate::errors::FormulaError;
use crate::expr::Expr;
use crate::parser::parse;
use crate::plot::SampleGrid;
use crate::types::CompiledArtifact;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const TEAL: Color = Color::rgb(0, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Formats as `#rrggbb`.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colors handed to new functions, in order.
pub const DEFAULT_PALETTE: [Color; 5] = [
    Color::RED,
    Color::BLUE,
    Color::GREEN,
    Color::ORANGE,
    Color::TEAL,
];

/// An endless cycle through a palette, used to give each new function its own color.
#[derive(Debug, Clone)]
pub struct ColorCycle {
    palette: Vec<Color>,
    position: usize,
}

impl ColorCycle {
    /// Creates a cycle over `palette`. An empty palette falls back to [`DEFAULT_PALETTE`].
    pub fn new(palette: Vec<Color>) -> Self {
        let palette = if palette.is_empty() {
            DEFAULT_PALETTE.to_vec()
        } else {
            palette
        };
        Self {
            palette,
            position: 0,
        }
    }

    /// Returns the next color, wrapping around at the end of the palette.
    pub fn next_color(&mut self) -> Color {
        let color = self.palette[self.position % self.palette.len()];
        self.position = (self.position + 1) % self.palette.len();
        color
    }
}

impl Default for ColorCycle {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.to_vec())
    }
}

impl Iterator for ColorCycle {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        Some(self.next_color())
    }
}

/// The persisted form of a function.
///
/// Only the text is stored; loading a record parses and compiles it again.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionRecord {
    pub visible: bool,
    pub name: String,
    pub expression: String,
}

/// A named formula ready to be plotted.
#[derive(Clone)]
pub struct Function {
    name: String,
    expression: String,
    ast: Expr,
    artifact: Arc<CompiledArtifact>,
    color: Color,
    visible: bool,
}

impl Function {
    /// Parses and compiles `text` into a visible function colored with the first default color.
    ///
    /// # Errors
    /// Returns `FormulaError::Parse` or `FormulaError::Compile` when the text is rejected.
    pub fn parse(
        name: impl Into<String>,
        text: &str,
        cache: &FunctionCache,
    ) -> Result<Self, FormulaError> {
        let (ast, artifact) = compile_text(text, cache)?;
        let name = name.into();
        debug!("defined {name}(x) = {text} [{}]", artifact.fingerprint());
        Ok(Self {
            name,
            expression: text.to_string(),
            ast,
            artifact,
            color: DEFAULT_PALETTE[0],
            visible: true,
        })
    }

    /// Recreates a function from its persisted form.
    pub fn from_record(
        record: &FunctionRecord,
        cache: &FunctionCache,
    ) -> Result<Self, FormulaError> {
        let mut function = Self::parse(record.name.clone(), &record.expression, cache)?;
        function.visible = record.visible;
        Ok(function)
    }

    /// The persisted form of this function.
    pub fn record(&self) -> FunctionRecord {
        FunctionRecord {
            visible: self.visible,
            name: self.name.clone(),
            expression: self.expression.clone(),
        }
    }

    /// Replaces the formula. On error the function keeps its previous formula.
    pub fn update_expression(
        &mut self,
        text: &str,
        cache: &FunctionCache,
    ) -> Result<(), FormulaError> {
        let (ast, artifact) = compile_text(text, cache)?;
        debug!(
            "redefined {}(x) = {text} [{}]",
            self.name,
            artifact.fingerprint()
        );
        self.expression = text.to_string();
        self.ast = ast;
        self.artifact = artifact;
        Ok(())
    }

    /// Evaluates the function at `x`. Never panics; undefined points yield NaN or infinity.
    #[inline]
    pub fn calculate(&self, x: f64) -> f64 {
        self.artifact.evaluate(x)
    }

    /// Evaluates the function at every column of `grid`, in parallel.
    pub fn sample(&self, grid: &SampleGrid) -> Vec<f64> {
        (0..grid.count)
            .into_par_iter()
            .map(|i| self.calculate(grid.x_at(i)))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The formula text exactly as it was entered.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    pub fn artifact(&self) -> &Arc<CompiledArtifact> {
        &self.artifact
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        writeln!(f, "    {}: {}", "Name".cyan(), self.name)?;
        writeln!(f, "    {}: {}", "Expression".cyan(), self.expression)?;
        writeln!(f, "    {}: {}", "Folded".cyan(), self.artifact.tree())?;
        writeln!(f, "    {}: {}", "Color".cyan(), self.color)?;
        writeln!(f, "    {}: {}", "Visible".cyan(), self.visible)?;
        writeln!(f, "}}")
    }
}

/// Formats as `name(x) = expression`.
impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(x) = {}", self.name, self.expression)
    }
}

/// Checks whether `text` would be accepted as a formula, without defining a function.
///
/// Successful checks leave the compiled artifact in `cache`, so defining the function right
/// after validating it does not compile twice.
pub fn validate(text: &str, cache: &FunctionCache) -> Result<(), FormulaError> {
    compile_text(text, cache).map(|_| ())
}

fn compile_text(
    text: &str,
    cache: &FunctionCache,
) -> Result<(Expr, Arc<CompiledArtifact>), FormulaError> {
    let ast = parse(text)?;
    let artifact = cache.get_or_compile(&ast)?;
    Ok((ast, artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CompileError, ParseError};

    #[test]
    fn test_parse_defaults() {
        let cache = FunctionCache::new();
        let f = Function::parse("f", "-(x^2)+1", &cache).unwrap();

        assert_eq!(f.name(), "f");
        assert_eq!(f.expression(), "-(x^2)+1");
        assert!(f.is_visible());
        assert_eq!(f.color(), Color::RED);
        assert_eq!(f.calculate(0.0), 1.0);
        assert_eq!(f.calculate(1.0), 0.0);
        assert_eq!(f.calculate(-1.0), 0.0);
        assert_eq!(f.to_string(), "f(x) = -(x^2)+1");
    }

    #[test]
    fn test_parse_errors() {
        let cache = FunctionCache::new();

        assert!(matches!(
            Function::parse("f", "", &cache),
            Err(FormulaError::Parse(ParseError::EmptyExpression))
        ));
        assert!(matches!(
            Function::parse("f", "x + y", &cache),
            Err(FormulaError::Compile(CompileError::UnknownSymbol(_)))
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_update_expression() {
        let cache = FunctionCache::new();
        let mut f = Function::parse("f", "x", &cache).unwrap();

        f.update_expression("2*x", &cache).unwrap();
        assert_eq!(f.expression(), "2*x");
        assert_eq!(f.calculate(3.0), 6.0);

        let err = f.update_expression("2*x +", &cache).unwrap_err();
        assert!(matches!(err, FormulaError::Parse(ParseError::Syntax { .. })));
        assert_eq!(f.expression(), "2*x");
        assert_eq!(f.calculate(3.0), 6.0);

        assert!(f.update_expression("foo(x)", &cache).is_err());
        assert_eq!(f.calculate(3.0), 6.0);
    }

    #[test]
    fn test_functions_share_artifacts() {
        let cache = FunctionCache::new();
        let f = Function::parse("f", "sin(x*pi*2)", &cache).unwrap();
        let g = Function::parse("g", "sin( x * pi * 2 )", &cache).unwrap();
        assert!(Arc::ptr_eq(f.artifact(), g.artifact()));
    }

    #[test]
    fn test_record_round_trip() {
        let cache = FunctionCache::new();
        let mut f = Function::parse("wave", "sin(x*pi*2)", &cache).unwrap();
        f.set_visible(false);

        let record = f.record();
        assert_eq!(
            record,
            FunctionRecord {
                visible: false,
                name: "wave".to_string(),
                expression: "sin(x*pi*2)".to_string(),
            }
        );

        let loaded = Function::from_record(&record, &cache).unwrap();
        assert_eq!(loaded.name(), "wave");
        assert!(!loaded.is_visible());
        assert_eq!(loaded.calculate(0.25), f.calculate(0.25));
    }

    #[test]
    fn test_from_record_rejects_bad_text() {
        let cache = FunctionCache::new();
        let record = FunctionRecord {
            visible: true,
            name: "broken".to_string(),
            expression: "x ? 1 : 2".to_string(),
        };
        assert!(matches!(
            Function::from_record(&record, &cache),
            Err(FormulaError::Parse(ParseError::UnsupportedConstruct { .. }))
        ));
    }

    #[test]
    fn test_validate() {
        let cache = FunctionCache::new();
        assert!(validate("sqrt(abs(x))", &cache).is_ok());
        assert_eq!(cache.len(), 1);
        assert!(validate("sin(x, 1)", &cache).is_err());
        assert!(validate("unknownfn(x)", &cache).is_err());
        assert!(validate("", &cache).is_err());
    }

    #[test]
    fn test_color_cycle() {
        let mut cycle = ColorCycle::default();
        let colors: Vec<Color> = (0..6).map(|_| cycle.next_color()).collect();
        assert_eq!(
            colors,
            vec![
                Color::RED,
                Color::BLUE,
                Color::GREEN,
                Color::ORANGE,
                Color::TEAL,
                Color::RED
            ]
        );

        let custom = ColorCycle::new(vec![Color::rgb(1, 2, 3)]);
        assert!(custom.take(3).all(|c| c == Color::rgb(1, 2, 3)));

        let mut fallback = ColorCycle::new(Vec::new());
        assert_eq!(fallback.next(), Some(Color::RED));
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::ORANGE.to_string(), "#ffa500");
        assert_eq!(Color::TEAL.to_string(), "#008080");
    }

    #[test]
    fn test_sample() {
        let cache = FunctionCache::new();
        let f = Function::parse("f", "2*x", &cache).unwrap();
        let grid = SampleGrid::new(-1.0, 0.5, 5);
        assert_eq!(f.sample(&grid), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }
}
