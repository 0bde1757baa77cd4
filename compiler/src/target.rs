use std::{fmt, path::PathBuf};

use ango_schema::{Fingerprint, Schema};

use crate::{
    error::GenerationError,
    gen_go::{GoGenerator, GoOptions},
    gen_js::{JsGenerator, JsOptions},
    traits::CodeGenerator,
};

/// One rendered output file. `path` is relative to the target's output
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path:     PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: PathBuf, contents: String) -> Self {
        GeneratedFile { path, contents }
    }
}

/// The supported output languages and their options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Go(GoOptions),
    JavaScript(JsOptions),
}

impl Target {
    pub fn name(&self) -> &'static str {
        match self {
            Target::Go(_)         => GoGenerator::TARGET,
            Target::JavaScript(_) => JsGenerator::TARGET,
        }
    }

    /// Renders `schema` for this target. Nothing is written to disk.
    pub fn generate(&self, schema: &Schema, version: &Fingerprint) -> Result<Vec<GeneratedFile>, GenerationError> {
        match self {
            Target::Go(options)         => GoGenerator::new(options.clone()).generate(schema, version),
            Target::JavaScript(options) => JsGenerator::new(options.clone()).generate(schema, version),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
