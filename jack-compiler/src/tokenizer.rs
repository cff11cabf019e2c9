//! Tokenizer for Jack source files.
//!
//! Strips comments with a byte-scanning pre-pass (no regex, matching
//! `hack-assembler::parser`'s style), then lexes the remaining text into a
//! fixed token stream. `advance()` moves to the next token; the accessors
//! below are stable until the next `advance()` call, mirroring the
//! tokenizer contract every other stage in this workspace follows.

use std::fs;

use phf::phf_set;

use crate::error::CompileError;

pub static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "class", "constructor", "function", "method", "field", "static", "var", "int", "char",
    "boolean", "void", "true", "false", "null", "this", "let", "do", "if", "else", "while",
    "return",
};

pub const SYMBOLS: &[u8] = b"{}()[].,;+-*/&|<>=~";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Keyword(String),
    Symbol(char),
    IntConst(i16),
    StringConst(String),
    Identifier(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Keyword,
    Symbol,
    IntConst,
    StringConst,
    Identifier,
}

struct Located {
    token: Token,
    line: usize,
}

/// Removes `//` line comments and non-nesting `/** ... */` block comments,
/// replacing removed bytes with spaces so every surviving token keeps its
/// original line number.
fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = vec![b' '; bytes.len()];
    let mut i = 0;
    let mut in_string = false;

    while i < bytes.len() {
        let b = bytes[i];

        if in_string {
            out[i] = b;
            if b == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if b == b'"' {
            in_string = true;
            out[i] = b;
            i += 1;
            continue;
        }

        if b == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        if b == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
            i += 2;
            while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                if bytes[i] == b'\n' {
                    out[i] = b'\n';
                }
                i += 1;
            }
            i = (i + 2).min(bytes.len());
            continue;
        }

        out[i] = b;
        i += 1;
    }

    String::from_utf8(out).expect("stripping comments preserves UTF-8 boundaries for ASCII input")
}

pub struct Tokenizer {
    filename: String,
    tokens: Vec<Located>,
    index: usize,
}

impl Tokenizer {
    /// Reads and lexes an entire `.jack` file up front.
    ///
    /// # Errors
    /// Returns [`CompileError::Lex`] on an unrecognized character or an
    /// unterminated string literal.
    pub fn new(path: &str) -> Result<Self, CompileError> {
        let source = fs::read_to_string(path)?;
        let cleaned = strip_comments(&source);
        let tokens = lex(&cleaned, path)?;
        Ok(Self {
            filename: path.to_string(),
            tokens,
            index: 0,
        })
    }

    #[must_use]
    pub fn has_more_tokens(&self) -> bool {
        self.index < self.tokens.len()
    }

    pub fn advance(&mut self) {
        self.index += 1;
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.tokens.get(self.index).map_or_else(
            || self.tokens.last().map_or(1, |t| t.line),
            |t| t.line,
        )
    }

    #[must_use]
    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|t| &t.token)
    }

    #[must_use]
    pub fn token_type(&self) -> Option<TokenType> {
        self.current().map(|t| match t {
            Token::Keyword(_) => TokenType::Keyword,
            Token::Symbol(_) => TokenType::Symbol,
            Token::IntConst(_) => TokenType::IntConst,
            Token::StringConst(_) => TokenType::StringConst,
            Token::Identifier(_) => TokenType::Identifier,
        })
    }

    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        match self.current()? {
            Token::Keyword(k) => Some(k.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> Option<char> {
        match self.current()? {
            Token::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self.current()? {
            Token::Identifier(id) => Some(id.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn int_val(&self) -> Option<i16> {
        match self.current()? {
            Token::IntConst(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn string_val(&self) -> Option<&str> {
        match self.current()? {
            Token::StringConst(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

fn lex(source: &str, filename: &str) -> Result<Vec<Located>, CompileError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    let mut line = 1usize;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line += 1;
            i += 1;
            continue;
        }

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '"' {
            let start_line = line;
            i += 1;
            let mut s = String::new();
            while i < chars.len() && chars[i] != '"' {
                if chars[i] == '\n' {
                    return Err(CompileError::lex(filename, start_line, 1, "unterminated string constant"));
                }
                s.push(chars[i]);
                i += 1;
            }
            if i >= chars.len() {
                return Err(CompileError::lex(filename, start_line, 1, "unterminated string constant"));
            }
            i += 1; // closing quote
            tokens.push(Located {
                token: Token::StringConst(s),
                line: start_line,
            });
            continue;
        }

        if SYMBOLS.contains(&(c as u8)) {
            tokens.push(Located {
                token: Token::Symbol(c),
                line,
            });
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start_line = line;
            let mut digits = String::new();
            while i < chars.len() && chars[i].is_ascii_digit() {
                digits.push(chars[i]);
                i += 1;
            }
            let value: i32 = digits
                .parse()
                .map_err(|_| CompileError::lex(filename, start_line, 1, format!("malformed integer '{digits}'")))?;
            if !(0..=32767).contains(&value) {
                return Err(CompileError::lex(filename, start_line, 1, format!("integer constant {value} out of range")));
            }
            tokens.push(Located {
                token: Token::IntConst(value as i16),
                line: start_line,
            });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start_line = line;
            let mut ident = String::new();
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                ident.push(chars[i]);
                i += 1;
            }
            let token = if KEYWORDS.contains(ident.as_str()) {
                Token::Keyword(ident)
            } else {
                Token::Identifier(ident)
            };
            tokens.push(Located { token, line: start_line });
            continue;
        }

        return Err(CompileError::lex(filename, line, 1, format!("unrecognized character '{c}'")));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn write_temp(contents: &str) -> std::path::PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "jack_tokenizer_test_{}_{id}.jack",
            std::process::id()
        ));
        std::fs::File::create(&path)
            .unwrap()
            .write_all(contents.as_bytes())
            .unwrap();
        path
    }

    #[test]
    fn strips_line_and_block_comments() {
        let path = write_temp("// header\nclass /** doc\nspanning lines */ Foo {}\n");
        let mut tok = Tokenizer::new(path.to_str().unwrap()).unwrap();
        assert_eq!(tok.keyword(), Some("class"));
        tok.advance();
        assert_eq!(tok.identifier(), Some("Foo"));
        tok.advance();
        assert_eq!(tok.symbol(), Some('{'));
        tok.advance();
        assert_eq!(tok.symbol(), Some('}'));
        tok.advance();
        assert!(!tok.has_more_tokens());
    }

    #[test]
    fn lexes_string_and_int_constants() {
        let path = write_temp("\"hello world\" 42\n");
        let tok = Tokenizer::new(path.to_str().unwrap()).unwrap();
        assert_eq!(tok.string_val(), Some("hello world"));
    }

    #[test]
    fn rejects_unterminated_string() {
        let path = write_temp("\"oops\n");
        assert!(Tokenizer::new(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn tracks_line_numbers_across_block_comment() {
        let path = write_temp("/** line1\nline2\nline3 */\nlet x = 1;\n");
        let tok = Tokenizer::new(path.to_str().unwrap()).unwrap();
        assert_eq!(tok.line(), 4);
    }
}
