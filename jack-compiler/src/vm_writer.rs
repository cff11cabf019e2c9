//! Emits Hack VM commands as text, one per line.
//!
//! One method per VM command, streaming straight to a buffered `Write`
//! the way `hack-vm::CodeWriter` does, instead of accumulating a list and
//! joining on close.

use std::fs::File;
use std::io::{self, BufWriter, Write};

pub struct VmWriter {
    output: BufWriter<File>,
}

impl VmWriter {
    /// # Errors
    /// Returns an error if `path` cannot be created.
    pub fn new(path: &str) -> io::Result<Self> {
        Ok(Self {
            output: BufWriter::new(File::create(path)?),
        })
    }

    pub fn write_push(&mut self, segment: &str, index: u16) -> io::Result<()> {
        writeln!(self.output, "push {segment} {index}")
    }

    pub fn write_pop(&mut self, segment: &str, index: u16) -> io::Result<()> {
        writeln!(self.output, "pop {segment} {index}")
    }

    pub fn write_arithmetic(&mut self, command: &str) -> io::Result<()> {
        writeln!(self.output, "{command}")
    }

    pub fn write_label(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.output, "label {label}")
    }

    pub fn write_goto(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.output, "goto {label}")
    }

    pub fn write_if(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.output, "if-goto {label}")
    }

    pub fn write_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        writeln!(self.output, "call {name} {n_args}")
    }

    pub fn write_function(&mut self, name: &str, n_locals: u16) -> io::Result<()> {
        writeln!(self.output, "function {name} {n_locals}")
    }

    pub fn write_return(&mut self) -> io::Result<()> {
        writeln!(self.output, "return")
    }

    pub fn close(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_path(tag: &str) -> std::path::PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "jack_vm_writer_test_{tag}_{}_{id}.vm",
            std::process::id()
        ))
    }

    #[test]
    fn emits_expected_command_text() {
        let path = temp_path("basic");
        let mut writer = VmWriter::new(path.to_str().unwrap()).unwrap();
        writer.write_push("constant", 7).unwrap();
        writer.write_call("Math.multiply", 2).unwrap();
        writer.write_return().unwrap();
        writer.close().unwrap();

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "push constant 7\ncall Math.multiply 2\nreturn\n");
    }
}
