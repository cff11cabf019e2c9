//! Recursive-descent compiler for the Jack grammar.
//!
//! One private method per non-terminal. Error messages carry the grammar
//! element currently being parsed via an explicit context stack.

use crate::error::CompileError;
use crate::symbol_table::{Kind, SymbolTable};
use crate::tokenizer::{TokenType, Tokenizer};
use crate::vm_writer::VmWriter;

const TYPE_KEYWORDS: &[&str] = &["int", "char", "boolean"];
const OPERATORS: &[char] = &['+', '-', '*', '/', '&', '|', '<', '>', '='];

pub struct CompilationEngine {
    tokenizer: Tokenizer,
    vm: VmWriter,
    symbols: SymbolTable,
    class_name: String,
    context: Vec<&'static str>,
    label_counter: u32,
}

impl CompilationEngine {
    /// Compiles one `.jack` file into the VM file at `output_path`.
    ///
    /// # Errors
    /// Returns [`CompileError`] on a lexical, grammar, or symbol-table
    /// violation, or an I/O failure.
    pub fn compile_file(input_path: &str, output_path: &str) -> Result<(), CompileError> {
        let tokenizer = Tokenizer::new(input_path)?;
        let vm = VmWriter::new(output_path)?;
        let mut engine = Self {
            tokenizer,
            vm,
            symbols: SymbolTable::new(),
            class_name: String::new(),
            context: Vec::new(),
            label_counter: 0,
        };
        engine.compile_class()?;
        engine.vm.close()?;
        Ok(())
    }

    fn err(&self, message: impl Into<String>) -> CompileError {
        let element = self.context.last().copied().unwrap_or("file");
        CompileError::parse(self.tokenizer.filename(), self.tokenizer.line(), element, message)
    }

    fn push_context(&mut self, element: &'static str) {
        self.context.push(element);
    }

    fn pop_context(&mut self) {
        self.context.pop();
    }

    // ----- class -----

    fn compile_class(&mut self) -> Result<(), CompileError> {
        self.push_context("class");
        self.take_keyword(&["class"])?;
        self.class_name = self.take_identifier()?;
        self.take_symbol('{')?;

        while self.tokenizer.keyword() == Some("static") || self.tokenizer.keyword() == Some("field") {
            self.compile_class_var_dec()?;
        }
        while matches!(self.tokenizer.keyword(), Some("constructor" | "function" | "method")) {
            self.compile_subroutine()?;
        }

        self.take_symbol('}')?;
        self.pop_context();
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> Result<(), CompileError> {
        self.push_context("classVarDec");
        let kind_word = self.take_keyword(&["static", "field"])?;
        let kind = if kind_word == "static" { Kind::Static } else { Kind::Field };
        let type_name = self.take_type(&[])?;
        let name = self.take_identifier()?;
        self.define(&name, &type_name, kind)?;

        while self.tokenizer.symbol() == Some(',') {
            self.take_symbol(',')?;
            let name = self.take_identifier()?;
            self.define(&name, &type_name, kind)?;
        }
        self.take_symbol(';')?;
        self.pop_context();
        Ok(())
    }

    fn define(&mut self, name: &str, type_name: &str, kind: Kind) -> Result<(), CompileError> {
        let file = self.tokenizer.filename().to_string();
        let line = self.tokenizer.line();
        self.symbols.define(&file, line, name, type_name, kind)
    }

    // ----- subroutines -----

    fn compile_subroutine(&mut self) -> Result<(), CompileError> {
        self.push_context("subroutineDec");
        self.symbols.start_subroutine();
        self.label_counter = 0;

        let subroutine_kind = self.take_keyword(&["constructor", "function", "method"])?;
        let _return_type = self.take_type(&["void"])?;
        let name = self.take_identifier()?;

        if subroutine_kind == "method" {
            self.define("this", &self.class_name.clone(), Kind::Argument)?;
        }

        self.take_symbol('(')?;
        self.compile_parameter_list()?;
        self.take_symbol(')')?;

        self.take_symbol('{')?;
        while self.tokenizer.keyword() == Some("var") {
            self.compile_var_dec()?;
        }

        self.vm.write_function(&format!("{}.{name}", self.class_name), self.symbols.var_count(Kind::Local))?;

        match subroutine_kind.as_str() {
            "constructor" => {
                self.vm.write_push("constant", self.symbols.var_count(Kind::Field))?;
                self.vm.write_call("Memory.alloc", 1)?;
                self.vm.write_pop("pointer", 0)?;
            }
            "method" => {
                self.vm.write_push("argument", 0)?;
                self.vm.write_pop("pointer", 0)?;
            }
            _ => {}
        }

        self.compile_statements()?;
        self.take_symbol('}')?;
        self.pop_context();
        Ok(())
    }

    fn compile_parameter_list(&mut self) -> Result<(), CompileError> {
        self.push_context("parameterList");
        if self.tokenizer.symbol() == Some(')') {
            self.pop_context();
            return Ok(());
        }

        let type_name = self.take_type(&[])?;
        let name = self.take_identifier()?;
        self.define(&name, &type_name, Kind::Argument)?;

        while self.tokenizer.symbol() == Some(',') {
            self.take_symbol(',')?;
            let type_name = self.take_type(&[])?;
            let name = self.take_identifier()?;
            self.define(&name, &type_name, Kind::Argument)?;
        }
        self.pop_context();
        Ok(())
    }

    fn compile_var_dec(&mut self) -> Result<(), CompileError> {
        self.push_context("varDec");
        self.take_keyword(&["var"])?;
        let type_name = self.take_type(&[])?;
        let name = self.take_identifier()?;
        self.define(&name, &type_name, Kind::Local)?;

        while self.tokenizer.symbol() == Some(',') {
            self.take_symbol(',')?;
            let name = self.take_identifier()?;
            self.define(&name, &type_name, Kind::Local)?;
        }
        self.take_symbol(';')?;
        self.pop_context();
        Ok(())
    }

    // ----- statements -----

    fn compile_statements(&mut self) -> Result<(), CompileError> {
        self.push_context("statements");
        loop {
            match self.tokenizer.keyword() {
                Some("let") => self.compile_let_statement()?,
                Some("if") => self.compile_if_statement()?,
                Some("while") => self.compile_while_statement()?,
                Some("do") => self.compile_do_statement()?,
                Some("return") => self.compile_return_statement()?,
                _ => break,
            }
        }
        self.pop_context();
        Ok(())
    }

    fn compile_let_statement(&mut self) -> Result<(), CompileError> {
        self.push_context("letStatement");
        self.take_keyword(&["let"])?;
        let var_name = self.take_identifier()?;

        if self.tokenizer.symbol() == Some('[') {
            self.take_symbol('[')?;
            self.compile_expression()?;
            self.take_symbol(']')?;
            self.write_var_push(&var_name)?;
            self.vm.write_arithmetic("add")?;

            self.take_symbol('=')?;
            self.compile_expression()?;
            self.take_symbol(';')?;

            self.vm.write_pop("temp", 0)?;
            self.vm.write_pop("pointer", 1)?;
            self.vm.write_push("temp", 0)?;
            self.vm.write_pop("that", 0)?;
        } else {
            self.take_symbol('=')?;
            self.compile_expression()?;
            self.take_symbol(';')?;
            self.write_var_pop(&var_name)?;
        }
        self.pop_context();
        Ok(())
    }

    fn compile_if_statement(&mut self) -> Result<(), CompileError> {
        self.push_context("ifStatement");
        let n = self.label_counter;
        self.label_counter += 1;
        let true_label = format!("IF_TRUE{n}");
        let false_label = format!("IF_FALSE{n}");
        let end_label = format!("IF_END{n}");

        self.take_keyword(&["if"])?;
        self.take_symbol('(')?;
        self.compile_expression()?;
        self.take_symbol(')')?;

        self.vm.write_if(&true_label)?;
        self.vm.write_goto(&false_label)?;
        self.vm.write_label(&true_label)?;

        self.take_symbol('{')?;
        self.compile_statements()?;
        self.take_symbol('}')?;

        self.vm.write_goto(&end_label)?;
        self.vm.write_label(&false_label)?;

        if self.tokenizer.keyword() == Some("else") {
            self.take_keyword(&["else"])?;
            self.take_symbol('{')?;
            self.compile_statements()?;
            self.take_symbol('}')?;
        }

        self.vm.write_label(&end_label)?;
        self.pop_context();
        Ok(())
    }

    fn compile_while_statement(&mut self) -> Result<(), CompileError> {
        self.push_context("whileStatement");
        let n = self.label_counter;
        self.label_counter += 1;
        let exp_label = format!("WHILE_EXP{n}");
        let end_label = format!("WHILE_END{n}");

        self.take_keyword(&["while"])?;
        self.vm.write_label(&exp_label)?;

        self.take_symbol('(')?;
        self.compile_expression()?;
        self.take_symbol(')')?;

        self.vm.write_arithmetic("not")?;
        self.vm.write_if(&end_label)?;

        self.take_symbol('{')?;
        self.compile_statements()?;
        self.take_symbol('}')?;

        self.vm.write_goto(&exp_label)?;
        self.vm.write_label(&end_label)?;
        self.pop_context();
        Ok(())
    }

    fn compile_do_statement(&mut self) -> Result<(), CompileError> {
        self.push_context("doStatement");
        self.take_keyword(&["do"])?;
        let name = self.take_identifier()?;
        self.compile_subroutine_call(name)?;
        self.take_symbol(';')?;
        self.vm.write_pop("temp", 0)?;
        self.pop_context();
        Ok(())
    }

    fn compile_return_statement(&mut self) -> Result<(), CompileError> {
        self.push_context("returnStatement");
        self.take_keyword(&["return"])?;
        if self.tokenizer.symbol() == Some(';') {
            self.vm.write_push("constant", 0)?;
        } else {
            self.compile_expression()?;
        }
        self.take_symbol(';')?;
        self.vm.write_return()?;
        self.pop_context();
        Ok(())
    }

    // ----- expressions -----

    fn compile_expression_list(&mut self) -> Result<u16, CompileError> {
        self.push_context("expressionList");
        if self.tokenizer.symbol() == Some(')') {
            self.pop_context();
            return Ok(0);
        }

        let mut n_args = 1;
        self.compile_expression()?;
        while self.tokenizer.symbol() == Some(',') {
            self.take_symbol(',')?;
            self.compile_expression()?;
            n_args += 1;
        }
        self.pop_context();
        Ok(n_args)
    }

    fn compile_expression(&mut self) -> Result<(), CompileError> {
        self.push_context("expression");
        self.compile_term()?;
        while let Some(op) = self.tokenizer.symbol() {
            if !OPERATORS.contains(&op) {
                break;
            }
            self.take_symbol(op)?;
            self.compile_term()?;
            self.write_binary_op(op)?;
        }
        self.pop_context();
        Ok(())
    }

    fn write_binary_op(&mut self, op: char) -> Result<(), CompileError> {
        match op {
            '+' => self.vm.write_arithmetic("add")?,
            '-' => self.vm.write_arithmetic("sub")?,
            '*' => self.vm.write_call("Math.multiply", 2)?,
            '/' => self.vm.write_call("Math.divide", 2)?,
            '&' => self.vm.write_arithmetic("and")?,
            '|' => self.vm.write_arithmetic("or")?,
            '<' => self.vm.write_arithmetic("lt")?,
            '>' => self.vm.write_arithmetic("gt")?,
            '=' => self.vm.write_arithmetic("eq")?,
            _ => unreachable!("write_binary_op called with non-operator '{op}'"),
        }
        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), CompileError> {
        self.push_context("term");
        match self.tokenizer.token_type() {
            Some(TokenType::IntConst) => {
                let value = self.take_intval()?;
                self.vm.write_push("constant", value as u16)?;
            }
            Some(TokenType::StringConst) => {
                let s = self.take_strval()?;
                self.vm.write_push("constant", s.chars().count() as u16)?;
                self.vm.write_call("String.new", 1)?;
                for c in s.chars() {
                    self.vm.write_push("constant", c as u16)?;
                    self.vm.write_call("String.appendChar", 2)?;
                }
            }
            Some(TokenType::Keyword) => {
                let keyword = self.take_keyword(&["true", "false", "null", "this"])?;
                match keyword.as_str() {
                    "true" => {
                        self.vm.write_push("constant", 0)?;
                        self.vm.write_arithmetic("not")?;
                    }
                    "false" | "null" => self.vm.write_push("constant", 0)?,
                    _ => self.vm.write_push("pointer", 0)?,
                }
            }
            Some(TokenType::Symbol) => match self.tokenizer.symbol() {
                Some(op @ ('-' | '~')) => {
                    self.take_symbol(op)?;
                    self.compile_term()?;
                    self.vm.write_arithmetic(if op == '-' { "neg" } else { "not" })?;
                }
                Some('(') => {
                    self.take_symbol('(')?;
                    self.compile_expression()?;
                    self.take_symbol(')')?;
                }
                other => {
                    return Err(self.err(format!("term only accepts '(', '~', or '-' symbols, given: {other:?}")));
                }
            },
            Some(TokenType::Identifier) => {
                let name = self.take_identifier()?;
                match self.tokenizer.symbol() {
                    Some('(' | '.') => self.compile_subroutine_call(name)?,
                    Some('[') => {
                        self.write_var_push(&name)?;
                        self.take_symbol('[')?;
                        self.compile_expression()?;
                        self.take_symbol(']')?;
                        self.vm.write_arithmetic("add")?;
                        self.vm.write_pop("pointer", 1)?;
                        self.vm.write_push("that", 0)?;
                    }
                    _ => self.write_var_push(&name)?,
                }
            }
            None => return Err(self.err("unexpected end of input")),
        }
        self.pop_context();
        Ok(())
    }

    fn compile_subroutine_call(&mut self, name: String) -> Result<(), CompileError> {
        self.push_context("subroutineCall");
        let (callee, mut n_args) = if self.tokenizer.symbol() == Some('.') {
            self.take_symbol('.')?;
            let method_name = self.take_identifier()?;
            self.take_symbol('(')?;

            if let Some(kind) = self.symbols.kind_of(&name) {
                let type_name = self.symbols.type_of(&name).unwrap().to_string();
                let index = self.symbols.index_of(&name).unwrap();
                self.write_var_push_for(&name, kind, index)?;
                (format!("{type_name}.{method_name}"), 1u16)
            } else {
                (format!("{name}.{method_name}"), 0u16)
            }
        } else {
            self.take_symbol('(')?;
            self.vm.write_push("pointer", 0)?;
            (format!("{}.{name}", self.class_name), 1u16)
        };

        n_args += self.compile_expression_list()?;
        self.take_symbol(')')?;
        self.vm.write_call(&callee, n_args)?;
        self.pop_context();
        Ok(())
    }

    fn write_var_push(&mut self, name: &str) -> Result<(), CompileError> {
        let kind = self.symbols.kind_of(name).ok_or_else(|| self.err(format!("undefined variable '{name}'")))?;
        let index = self.symbols.index_of(name).unwrap();
        self.write_var_push_for(name, kind, index)
    }

    fn write_var_push_for(&mut self, _name: &str, kind: Kind, index: u16) -> Result<(), CompileError> {
        let segment = if kind == Kind::Field { "this" } else { segment_name(kind) };
        self.vm.write_push(segment, index)?;
        Ok(())
    }

    fn write_var_pop(&mut self, name: &str) -> Result<(), CompileError> {
        let kind = self.symbols.kind_of(name).ok_or_else(|| self.err(format!("undefined variable '{name}'")))?;
        let index = self.symbols.index_of(name).unwrap();
        let segment = if kind == Kind::Field { "this" } else { segment_name(kind) };
        self.vm.write_pop(segment, index)?;
        Ok(())
    }

    // ----- token consumption helpers -----

    fn take_type(&mut self, extra_keywords: &[&str]) -> Result<String, CompileError> {
        match self.tokenizer.token_type() {
            Some(TokenType::Keyword) => {
                let keyword = self.tokenizer.keyword().unwrap().to_string();
                if TYPE_KEYWORDS.contains(&keyword.as_str()) || extra_keywords.contains(&keyword.as_str()) {
                    self.tokenizer.advance();
                    Ok(keyword)
                } else {
                    Err(self.err(format!("expected a type keyword, given: {keyword}")))
                }
            }
            Some(TokenType::Identifier) => self.take_identifier(),
            _ => Err(self.err("expected a type (identifier or keyword)")),
        }
    }

    fn take_symbol(&mut self, symbol: char) -> Result<(), CompileError> {
        if self.tokenizer.symbol() != Some(symbol) {
            return Err(self.err(format!("expected symbol '{symbol}', given: {:?}", self.tokenizer.current())));
        }
        self.tokenizer.advance();
        Ok(())
    }

    fn take_keyword(&mut self, accepted: &[&str]) -> Result<String, CompileError> {
        let Some(keyword) = self.tokenizer.keyword() else {
            return Err(self.err("expected a keyword"));
        };
        if !accepted.contains(&keyword) {
            return Err(self.err(format!("expected one of {accepted:?}, given: {keyword}")));
        }
        let keyword = keyword.to_string();
        self.tokenizer.advance();
        Ok(keyword)
    }

    fn take_identifier(&mut self) -> Result<String, CompileError> {
        let Some(identifier) = self.tokenizer.identifier() else {
            return Err(self.err(format!("expected an identifier, given: {:?}", self.tokenizer.current())));
        };
        let identifier = identifier.to_string();
        self.tokenizer.advance();
        Ok(identifier)
    }

    fn take_intval(&mut self) -> Result<i16, CompileError> {
        let Some(value) = self.tokenizer.int_val() else {
            return Err(self.err("expected an integer constant"));
        };
        self.tokenizer.advance();
        Ok(value)
    }

    fn take_strval(&mut self) -> Result<String, CompileError> {
        let Some(value) = self.tokenizer.string_val() else {
            return Err(self.err("expected a string constant"));
        };
        let value = value.to_string();
        self.tokenizer.advance();
        Ok(value)
    }
}

fn segment_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Static => "static",
        Kind::Field => "this",
        Kind::Argument => "argument",
        Kind::Local => "local",
    }
}
