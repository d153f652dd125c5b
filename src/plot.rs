//! The set of functions shown on a plot and the grid they are sampled on.
//!
//! A redraw walks the visible width in steps of `density` pixels and evaluates every visible
//! function once per step. [`SampleGrid`] captures that walk in plot coordinates so the
//! evaluation can run off the UI thread and in parallel.

use log::debug;
use rayon::prelude::*;

use crate::cache::FunctionCache;
use crate::errors::FormulaError;
use crate::function::{Color, ColorCycle, Function, FunctionRecord};

/// Default number of functions a plot holds.
pub const MAX_FUNCTIONS: usize = 5;

/// Screen resolution assumed when converting pixels to plot units.
pub const DOTS_PER_CM: f64 = 40.0;

/// Default number of pixels between two samples.
pub const DEFAULT_DENSITY: u32 = 2;

/// Default horizontal zoom, in centimeters per plot unit.
pub const DEFAULT_SCALE: f64 = 4.0;

/// Formulas a fresh plot starts with.
pub const DEFAULT_FUNCTIONS: [(&str, &str); 2] =
    [("f", "-(x^^2)-sin(x*pi*8)"), ("g", "sin(x*pi*2)")];

/// Evenly spaced sample positions: `x_min`, `x_min + dx`, ... (`count` positions in total).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGrid {
    pub x_min: f64,
    pub dx: f64,
    pub count: usize,
}

impl SampleGrid {
    pub fn new(x_min: f64, dx: f64, count: usize) -> Self {
        Self { x_min, dx, count }
    }

    /// Grid covering `count` evenly spaced points from `from` to `to`, both included.
    pub fn between(from: f64, to: f64, count: usize) -> Self {
        let dx = if count > 1 {
            (to - from) / (count - 1) as f64
        } else {
            0.0
        };
        Self::new(from, dx, count)
    }

    /// Grid for a viewport `width_px` pixels wide whose left edge is at `x_min`.
    ///
    /// One sample is taken every `density` pixels, both edges included, and `scale_x` is
    /// the zoom in centimeters per plot unit. A density of zero is treated as one.
    pub fn for_viewport(x_min: f64, width_px: u32, density: u32, scale_x: f64) -> Self {
        let density = density.max(1);
        let dx = f64::from(density) / (DOTS_PER_CM * scale_x);
        let count = (width_px / density) as usize + 1;
        Self::new(x_min, dx, count)
    }

    /// The x value of sample `index`.
    #[inline]
    pub fn x_at(&self, index: usize) -> f64 {
        self.x_min + index as f64 * self.dx
    }

    /// Iterates over all sample positions.
    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(|i| self.x_at(i))
    }
}

/// Samples of one visible function.
#[derive(Debug, Clone, PartialEq)]
pub struct Series<'a> {
    pub name: &'a str,
    pub color: Color,
    pub samples: Vec<f64>,
}

/// The functions of one plot, in insertion order.
#[derive(Debug, Clone)]
pub struct FunctionList {
    functions: Vec<Function>,
    limit: usize,
    colors: ColorCycle,
}

impl Default for FunctionList {
    fn default() -> Self {
        Self::with_limit(MAX_FUNCTIONS)
    }
}

impl FunctionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            functions: Vec::new(),
            limit,
            colors: ColorCycle::default(),
        }
    }

    /// Uses `colors` for functions created through [`FunctionList::define`].
    pub fn with_colors(mut self, colors: ColorCycle) -> Self {
        self.colors = colors;
        self
    }

    /// A list holding the two formulas a new plot starts with.
    pub fn with_defaults(cache: &FunctionCache) -> Result<Self, FormulaError> {
        let mut list = Self::new();
        for (name, text) in DEFAULT_FUNCTIONS {
            list.define(name, text, cache)?;
        }
        Ok(list)
    }

    /// Appends a function as is.
    ///
    /// # Errors
    /// Returns `FormulaError::TooManyFunctions` when the list is full.
    pub fn push(&mut self, function: Function) -> Result<(), FormulaError> {
        if self.is_full() {
            return Err(FormulaError::TooManyFunctions { limit: self.limit });
        }
        self.functions.push(function);
        Ok(())
    }

    /// Parses a formula and appends it with the next color of the cycle.
    ///
    /// The limit is checked before parsing, so a full list reports `TooManyFunctions`
    /// even for text that would not parse.
    pub fn define(
        &mut self,
        name: &str,
        text: &str,
        cache: &FunctionCache,
    ) -> Result<&mut Function, FormulaError> {
        if self.is_full() {
            return Err(FormulaError::TooManyFunctions { limit: self.limit });
        }
        let function = Function::parse(name, text, cache)?.with_color(self.colors.next_color());
        self.functions.push(function);
        let index = self.functions.len() - 1;
        Ok(&mut self.functions[index])
    }

    /// Removes the first function called `name`.
    pub fn remove(&mut self, name: &str) -> Result<Function, FormulaError> {
        let index = self
            .functions
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| FormulaError::FunctionNotFound(name.to_string()))?;
        debug!("removed function {name}");
        Ok(self.functions.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.iter_mut().find(|f| f.name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Function> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_full(&self) -> bool {
        self.functions.len() >= self.limit
    }

    pub fn clear(&mut self) {
        self.functions.clear();
    }

    /// Persisted form of every function, in order.
    pub fn records(&self) -> Vec<FunctionRecord> {
        self.functions.iter().map(Function::record).collect()
    }

    /// Rebuilds a list from persisted records, coloring functions through the default cycle.
    ///
    /// Loading stops at the first record whose formula is rejected or that exceeds the limit.
    pub fn from_records(
        records: &[FunctionRecord],
        limit: usize,
        cache: &FunctionCache,
    ) -> Result<Self, FormulaError> {
        let mut list = Self::with_limit(limit);
        for record in records {
            if list.is_full() {
                return Err(FormulaError::TooManyFunctions { limit });
            }
            let color = list.colors.next_color();
            list.functions
                .push(Function::from_record(record, cache)?.with_color(color));
        }
        Ok(list)
    }

    /// Samples every visible function over `grid`.
    ///
    /// Functions are sampled in parallel, and so are the points of each function.
    pub fn sample_visible(&self, grid: &SampleGrid) -> Vec<Series<'_>> {
        self.functions
            .par_iter()
            .filter(|f| f.is_visible())
            .map(|f| Series {
                name: f.name(),
                color: f.color(),
                samples: f.sample(grid),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a FunctionList {
    type Item = &'a Function;
    type IntoIter = std::slice::Iter<'a, Function>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
