//! Error types for the Hack assembler
//!
//! Parse and assembly failures carry a source line number so the CLI can
//! report what went wrong and where.

use thiserror::Error;

/// A failure encountered while assembling a single `.asm` file.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: unrecognized mnemonic in '{instruction}'")]
    InvalidMnemonic { line: usize, instruction: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AssembleError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
