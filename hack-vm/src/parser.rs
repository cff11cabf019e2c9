//! Parser for Hack VM command files.

use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::error::VmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    If,
    Function,
    Return,
    Call,
}

struct RawLine {
    number: usize,
    text: String,
}

pub struct Parser {
    filename: String,
    lines: Vec<RawLine>,
    current_line: usize,
    current_line_number: usize,
    current_command: String,
    /// Cached parts of the current command to avoid repeated parsing
    cached_parts: Vec<String>,
}

impl Parser {
    pub fn new(filename: &str) -> Result<Self, VmError> {
        let file = File::open(filename)?;
        let reader = BufReader::new(file);

        let mut lines = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let stripped = if let Some(pos) = line.find("//") {
                &line[..pos]
            } else {
                &line
            };

            let trimmed = stripped.trim();

            if !trimmed.is_empty() {
                lines.push(RawLine {
                    number: index + 1,
                    text: trimmed.to_string(),
                });
            }
        }

        Ok(Parser {
            filename: filename.to_string(),
            lines,
            current_line: 0,
            current_line_number: 0,
            current_command: String::new(),
            cached_parts: Vec::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn has_more_commands(&self) -> bool {
        self.current_line < self.lines.len()
    }

    /// Returns the 1-based source line number of the current command.
    #[inline]
    #[must_use]
    pub const fn current_line_number(&self) -> usize {
        self.current_line_number
    }

    pub fn advance(&mut self) {
        if self.has_more_commands() {
            let raw = &mut self.lines[self.current_line];
            self.current_line_number = raw.number;
            std::mem::swap(&mut self.current_command, &mut raw.text);

            self.cached_parts.clear();
            self.cached_parts.extend(
                self.current_command
                    .split_whitespace()
                    .map(std::string::ToString::to_string),
            );

            self.current_line += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> VmError {
        VmError::parse(&self.filename, self.current_line_number, message)
    }

    pub fn command_type(&self) -> Result<CommandType, VmError> {
        let head = self
            .cached_parts
            .first()
            .ok_or_else(|| self.error("empty command"))?;

        Ok(match head.as_str() {
            "push" => CommandType::Push,
            "pop" => CommandType::Pop,
            "label" => CommandType::Label,
            "goto" => CommandType::Goto,
            "if-goto" => CommandType::If,
            "function" => CommandType::Function,
            "return" => CommandType::Return,
            "call" => CommandType::Call,
            _ => CommandType::Arithmetic,
        })
    }

    pub fn arg1(&self) -> Result<&str, VmError> {
        match self.command_type()? {
            CommandType::Arithmetic => Ok(&self.cached_parts[0]),
            CommandType::Return => Err(self.error("arg1 is not valid for return")),
            _ => self
                .cached_parts
                .get(1)
                .map(String::as_str)
                .ok_or_else(|| self.error("missing first argument")),
        }
    }

    pub fn arg2(&self) -> Result<i32, VmError> {
        match self.command_type()? {
            CommandType::Push | CommandType::Pop | CommandType::Function | CommandType::Call => {
                let raw = self
                    .cached_parts
                    .get(2)
                    .ok_or_else(|| self.error("missing second argument"))?;
                raw.parse()
                    .map_err(|_| self.error(format!("invalid integer argument '{raw}'")))
            }
            _ => Err(self.error("arg2 is not valid for this command type")),
        }
    }
}
