//! Jack compiler for the Hack platform (`Nand2Tetris` Projects 10-11).
//!
//! Lowers Jack class source directly to VM commands in a single
//! recursive-descent pass: no separate parse tree, no resolution pass.
//! Forward references between subroutines need no special handling because
//! callees are identified by name and resolved at VM time.

pub mod compilation_engine;
pub mod error;
pub mod symbol_table;
pub mod tokenizer;
pub mod vm_writer;

pub use compilation_engine::CompilationEngine;
pub use error::CompileError;
pub use symbol_table::{Kind, SymbolTable};
pub use tokenizer::{Token, TokenType, Tokenizer};
pub use vm_writer::VmWriter;

/// Compiles a single `.jack` file to the `.vm` file beside it (same stem).
///
/// # Errors
/// Returns [`CompileError`] on a lexical, grammar, or symbol-table
/// violation, or an I/O failure.
pub fn compile_file(input_path: &str) -> Result<String, CompileError> {
    let output_path = input_path
        .strip_suffix(".jack")
        .map_or_else(|| format!("{input_path}.vm"), |stem| format!("{stem}.vm"));
    CompilationEngine::compile_file(input_path, &output_path)?;
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn compile_file_derives_vm_output_path() {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("jack_lib_test_{}_{id}.jack", std::process::id()));
        std::fs::write(&path, "class Main { function void main() { return; } }").unwrap();

        let output = compile_file(path.to_str().unwrap()).unwrap();
        assert!(output.ends_with(".vm"));
        assert!(std::path::Path::new(&output).exists());
    }
}
