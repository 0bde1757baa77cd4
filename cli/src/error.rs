use std::{io, path::PathBuf};

use ango_compiler::{GenerationError, ParseErrors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Error reading {}: {source}", .path.display())]
    Read {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error writing {}: {source}", .path.display())]
    Write {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error parsing ango definitions:\n{0}")]
    Parse(#[from] ParseErrors),

    #[error(transparent)]
    Generate(#[from] GenerationError),

    #[error("Not overwriting {}", .0.display())]
    OverwriteDeclined(PathBuf),

    #[error("{failed} of {total} targets failed")]
    TargetsFailed { failed: usize, total: usize },

    #[error("Error encoding schema dump: {0}")]
    Dump(#[from] serde_json::Error),
}
