use ango_schema::{Fingerprint, Schema};

use crate::{error::GenerationError, target::GeneratedFile};

/// One output language. Implementations render everything in memory and
/// return either every file for the target or an error, never a partial set.
pub trait CodeGenerator {
    /// Target name used in diagnostics.
    const TARGET: &'static str;

    fn generate(&self, schema: &Schema, version: &Fingerprint) -> Result<Vec<GeneratedFile>, GenerationError>;
}
