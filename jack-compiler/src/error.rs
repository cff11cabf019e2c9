//! Error types for the Jack compiler.
//!
//! Every kind carries a source location where the data is available, and a
//! short message naming the grammar element being parsed.

use thiserror::Error;

/// A failure encountered while compiling a single `.jack` file.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{file}:{line}:{column}: {message}")]
    Lex {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{file}:{line}: while parsing {element}: {message}")]
    Parse {
        file: String,
        line: usize,
        element: String,
        message: String,
    },

    #[error("{file}:{line}: {message}")]
    Symbol {
        file: String,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lex(file: impl Into<String>, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Lex {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn parse(file: impl Into<String>, line: usize, element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            element: element.into(),
            message: message.into(),
        }
    }

    pub fn symbol(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Symbol {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}
