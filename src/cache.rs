//! Memoization of compiled formulas.
//!
//! A [`FunctionCache`] maps each distinct syntax tree to the single artifact compiled for it.
//! Entries are keyed by the tree itself: the map hashes with the tree's structural hash (the
//! same one behind [`Expr::fingerprint`]) and confirms hits with structural equality, so two
//! different formulas can never share an artifact even if their hashes collide.
//!
//! The cache never evicts. Memory grows with the number of distinct formulas compiled over
//! the cache's lifetime, which is fine for an interactive plotter but not for a server
//! compiling untrusted input; drop the cache to release everything at once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use log::{trace, warn};
use rustc_hash::FxHashMap;

use crate::compiler::compile;
use crate::errors::CompileError;
use crate::expr::Expr;
use crate::types::CompiledArtifact;

/// Hit and miss counters of a [`FunctionCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Thread-safe map from syntax trees to compiled artifacts.
///
/// Lookups share a read lock. Compilation runs outside any lock, and the result is inserted
/// under the write lock; if another thread stored an artifact for the same tree first, that
/// one wins and the late result is dropped, so every caller observes the same `Arc`.
#[derive(Debug, Default)]
pub struct FunctionCache {
    entries: RwLock<FxHashMap<Expr, Arc<CompiledArtifact>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FunctionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the artifact for `expr`, compiling it on first use.
    ///
    /// # Errors
    /// Propagates the compile error. Failures are not cached, so a later call with the same
    /// tree compiles again.
    pub fn get_or_compile(&self, expr: &Expr) -> Result<Arc<CompiledArtifact>, CompileError> {
        if let Some(artifact) = self.lookup(expr) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("cache hit for {}", artifact.fingerprint());
            return Ok(artifact);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let compiled = Arc::new(compile(expr)?);

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let stored = entries
            .entry(expr.clone())
            .or_insert_with(|| Arc::clone(&compiled));
        if !Arc::ptr_eq(stored, &compiled) {
            warn!(
                "formula {} was compiled concurrently, keeping the first artifact",
                compiled.fingerprint()
            );
        }
        Ok(Arc::clone(stored))
    }

    /// Returns the cached artifact for `expr` without compiling.
    pub fn lookup(&self, expr: &Expr) -> Option<Arc<CompiledArtifact>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(expr)
            .cloned()
    }

    /// Number of distinct formulas compiled so far.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
