//! Hack VM Translator - Main Entry Point
//!
//! Lowers VM stack-machine commands (`Nand2Tetris` Projects 7-8) to Hack
//! assembly. Accepts either a single `.vm` file or a directory of `.vm`
//! files; directory mode concatenates every file (in alphabetical order)
//! behind one `CodeWriter` and prepends the bootstrap sequence.
//!
//! # Usage
//! ```bash
//! cargo run <input.vm | input_dir>
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use colored::Colorize;

use hack_vm::{translate_file, CodeWriter};

/// Collects the `.vm` files to translate for the given input path, sorted
/// by filename for deterministic output. Returns whether bootstrap code
/// should be emitted (true iff `input` is a directory).
fn collect_vm_files(input: &Path) -> anyhow::Result<(Vec<PathBuf>, bool)> {
    if input.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(input)
            .with_context(|| format!("reading directory {}", input.display()))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "vm"))
            .collect();
        files.sort();
        if files.is_empty() {
            bail!("no .vm files found in {}", input.display());
        }
        Ok((files, true))
    } else {
        Ok((vec![input.to_path_buf()], false))
    }
}

fn output_path_for(input: &Path) -> PathBuf {
    if input.is_dir() {
        let name = input
            .file_name()
            .map_or_else(|| "out".to_string(), |n| n.to_string_lossy().into_owned());
        input.join(format!("{name}.asm"))
    } else {
        input.with_extension("asm")
    }
}

fn run() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <input.vm | input_dir>", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);
    let (vm_files, emit_bootstrap) = collect_vm_files(input)?;
    let output = output_path_for(input);

    log::info!(
        "translating {} file(s) from {}",
        vm_files.len(),
        input.display()
    );

    let mut writer =
        CodeWriter::new(output.to_str().expect("output path is valid UTF-8"))?;

    if emit_bootstrap {
        log::debug!("emitting bootstrap (SP=256; call Sys.init 0)");
        writer.write_init()?;
    }

    for vm_file in &vm_files {
        log::debug!("translating {}", vm_file.display());
        translate_file(
            vm_file.to_str().expect("input path is valid UTF-8"),
            &mut writer,
        )
        .with_context(|| format!("translating {}", vm_file.display()))?;
    }

    writer.close()?;
    println!(
        "Translation complete: {} -> {}",
        input.display(),
        output.display()
    );
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {err:#}", "error:".red().bold());
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_file_input_has_no_bootstrap() {
        let path = std::env::temp_dir().join("hack_vm_main_test_single.vm");
        std::fs::write(&path, "push constant 1\n").unwrap();
        let (files, bootstrap) = collect_vm_files(&path).unwrap();
        assert_eq!(files.len(), 1);
        assert!(!bootstrap);
    }

    #[test]
    fn output_path_replaces_extension_for_single_file() {
        let path = Path::new("Foo.vm");
        assert_eq!(output_path_for(path), PathBuf::from("Foo.asm"));
    }
}
