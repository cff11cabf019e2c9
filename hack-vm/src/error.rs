//! Error types for the VM translator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmError {
    #[error("{file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VmError {
    pub fn parse(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}
