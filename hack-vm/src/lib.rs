//! VM translator for the Hack platform (`Nand2Tetris` Projects 7-8).
//!
//! Lowers the VM stack-machine command set onto Hack assembly: arithmetic,
//! push/pop across all eight memory segments, branching, and the full
//! function-call convention (`function`/`call`/`return`).

pub mod code_writer;
pub mod error;
pub mod parser;

pub use code_writer::CodeWriter;
pub use error::VmError;
pub use parser::{CommandType, Parser};

/// Translates one VM file's commands into the given `CodeWriter`.
///
/// The writer's filename context must already be set via
/// [`CodeWriter::set_filename`] before calling this.
///
/// # Errors
/// Returns [`VmError`] on a malformed command.
pub fn translate_file(path: &str, writer: &mut CodeWriter) -> Result<(), VmError> {
    let mut parser = Parser::new(path)?;
    writer.set_filename(path);

    while parser.has_more_commands() {
        parser.advance();

        match parser.command_type()? {
            CommandType::Arithmetic => {
                writer.write_arithmetic(parser.arg1()?)?;
            }
            CommandType::Push => {
                writer.write_push_pop("push", parser.arg1()?, parser.arg2()?)?;
            }
            CommandType::Pop => {
                writer.write_push_pop("pop", parser.arg1()?, parser.arg2()?)?;
            }
            CommandType::Label => {
                writer.write_label(parser.arg1()?)?;
            }
            CommandType::Goto => {
                writer.write_goto(parser.arg1()?)?;
            }
            CommandType::If => {
                writer.write_if_goto(parser.arg1()?)?;
            }
            CommandType::Function => {
                writer.write_function(parser.arg1()?, parser.arg2()?)?;
            }
            CommandType::Call => {
                writer.write_call(parser.arg1()?, parser.arg2()?)?;
            }
            CommandType::Return => {
                writer.write_return()?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_path(ext: &str, tag: &str) -> String {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir()
            .join(format!(
                "hack_vm_lib_test_{tag}_{}_{id}.{ext}",
                std::process::id()
            ))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn translates_simple_push_add() {
        let vm_path = temp_path("vm", "add");
        std::fs::File::create(&vm_path)
            .unwrap()
            .write_all(b"push constant 7\npush constant 8\nadd\n")
            .unwrap();

        let asm_path = temp_path("asm", "add");
        let mut writer = CodeWriter::new(&asm_path).unwrap();
        translate_file(&vm_path, &mut writer).unwrap();
        writer.close().unwrap();

        let mut output = String::new();
        std::fs::File::open(&asm_path)
            .unwrap()
            .read_to_string(&mut output)
            .unwrap();
        assert!(output.contains("D+M"));
    }

    #[test]
    fn propagates_parse_errors() {
        let vm_path = temp_path("vm", "bad");
        std::fs::File::create(&vm_path)
            .unwrap()
            .write_all(b"push constant\n")
            .unwrap();

        let asm_path = temp_path("asm", "bad");
        let mut writer = CodeWriter::new(&asm_path).unwrap();
        let err = translate_file(&vm_path, &mut writer).unwrap_err();
        assert!(matches!(err, VmError::Parse { .. }));
    }
}
