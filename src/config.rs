//! Configuration surface recognized by the core.

use std::path::PathBuf;

/// The field prime is not a runtime option in this crate: the field is fixed
/// at compile time to the BN254 scalar field (see `crate::field`). The
/// remaining two options are genuinely runtime configuration.
#[derive(Clone, Debug, Default)]
pub struct CircuitConfig {
    /// Selects the ambient-generator lookup strategy in `crate::ambient`:
    /// a single global slot when `false`, a map keyed by thread identifier
    /// when `true`.
    pub running_multi_generators: bool,

    /// Absolute path of the external prover binary. Not read by the core,
    /// only by a binary that wants to shell out after writing the
    /// `.arith`/`.in` pair (see `src/bin/demo.rs`).
    pub prover_path: Option<PathBuf>,
}

impl CircuitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_multi_generators(mut self, enabled: bool) -> Self {
        self.running_multi_generators = enabled;
        self
    }

    pub fn with_prover_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.prover_path = Some(path.into());
        self
    }
}
