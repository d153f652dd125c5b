use std::fmt;
use std::sync::Arc;

use crate::builder::build_function;
use crate::compiler::Node;
use crate::expr::Fingerprint;

/// Type alias for a compiled single-variable function.
///
/// This represents a function that:
/// - Takes the value of `x`
/// - Returns the formula's value, which may be NaN or infinite but never panics
/// - Is both Send and Sync so one compiled formula can be sampled from many threads
pub type CompiledFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A compiled formula: the lowered tree it was built from and the invokable closure.
///
/// Artifacts are immutable once built and are shared through `Arc` by every function and
/// cache entry that uses the same formula.
#[derive(Clone)]
pub struct CompiledArtifact {
    fingerprint: Fingerprint,
    tree: Node,
    function: CompiledFn,
}

impl CompiledArtifact {
    /// Builds the closure for a lowered tree.
    pub fn new(fingerprint: Fingerprint, tree: Node) -> Self {
        let function = build_function(&tree);
        Self {
            fingerprint,
            tree,
            function,
        }
    }

    /// Evaluates the formula at `x`.
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        (self.function)(x)
    }

    /// Fingerprint of the syntax tree this artifact was compiled from.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// The constant-folded tree the closure was built from.
    pub fn tree(&self) -> &Node {
        &self.tree
    }

    /// A clone of the underlying closure.
    pub fn function(&self) -> CompiledFn {
        Arc::clone(&self.function)
    }
}

impl fmt::Debug for CompiledArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledArtifact")
            .field("fingerprint", &format_args!("{}", self.fingerprint))
            .field("tree", &format_args!("{}", self.tree))
            .finish()
    }
}

/// Evaluates a compiled formula at `x`.
pub fn evaluate(artifact: &CompiledArtifact, x: f64) -> f64 {
    artifact.evaluate(x)
}
