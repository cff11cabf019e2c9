//! Jack Compiler - Main Entry Point
//!
//! Compiles Jack class source (`Nand2Tetris` Projects 10-11) directly to
//! VM commands. Accepts either a single `.jack` file or a directory,
//! writing one `.vm` file per `.jack` file found (directory inputs are
//! walked non-recursively and processed in alphabetical order).
//!
//! # Usage
//! ```bash
//! cargo run <input.jack | input_dir>
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use colored::Colorize;

use jack_compiler::compile_file;

fn collect_jack_files(input: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if input.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(input)
            .with_context(|| format!("reading directory {}", input.display()))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "jack"))
            .collect();
        files.sort();
        if files.is_empty() {
            bail!("no .jack files found in {}", input.display());
        }
        Ok(files)
    } else {
        Ok(vec![input.to_path_buf()])
    }
}

fn run() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <input.jack | input_dir>", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);
    let jack_files = collect_jack_files(input)?;

    log::info!("compiling {} file(s) from {}", jack_files.len(), input.display());

    let mut failures = 0usize;
    for jack_file in &jack_files {
        log::debug!("compiling {}", jack_file.display());
        let path = jack_file.to_str().expect("input path is valid UTF-8");
        match compile_file(path) {
            Ok(output) => println!("Compiled {} -> {output}", jack_file.display()),
            Err(err) => {
                eprintln!("{} compiling {}: {err:#}", "error:".red().bold(), jack_file.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} file(s) failed to compile", jack_files.len());
    }
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
    fn single_file_input_is_collected_alone() {
        let path = std::env::temp_dir().join("jack_compiler_main_test_single.jack");
        std::fs::write(&path, "class Main {}\n").unwrap();
        let files = collect_jack_files(&path).unwrap();
        assert_eq!(files.len(), 1);
    }
}
