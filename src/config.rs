//! Compile-time options threaded through the pipeline, collected from the
//! `cobc` CLI (spec's external interface) into one plain struct rather than
//! passed as loose booleans.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Fold constant subexpressions before lowering (spec §4.3).
    pub fold_constants: bool,
    /// Treat an unhandled AST node as a hard `InternalError` instead of a
    /// logged warning plus `BAD_OP_PLACEHOLDER` substitution.
    pub strict: bool,
    pub include_paths: Vec<PathBuf>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions { fold_constants: true, strict: false, include_paths: Vec::new() }
    }
}
