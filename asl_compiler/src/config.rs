//! Compiler-wide configuration (`spec.md` §4, ambient "config layer").
//!
//! Kept deliberately small: the pipeline itself has almost nothing to
//! configure, but the shape mirrors how the teacher threads shared
//! compile-time settings through a single struct rather than loose
//! function parameters.

/// Settings shared across all three passes, built once from CLI flags.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Array declarations larger than this are rejected up front rather
    /// than accepted and only failing later at codegen time.
    pub max_array_size: u32,
    /// Promote any future warning to an error. No pass currently emits a
    /// warning, so this has no observable effect yet; it exists so the
    /// CLI surface doesn't need to change the day one is added.
    pub warnings_as_errors: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_array_size: 1 << 20,
            warnings_as_errors: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_a_sane_array_limit() {
        let cfg = CompilerConfig::default();
        assert!(cfg.max_array_size > 0);
        assert!(!cfg.warnings_as_errors);
    }
}
