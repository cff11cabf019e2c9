//! Two-scope symbol table: class scope (`Static`/`Field`) and subroutine
//! scope (`Argument`/`Local`). Subroutine scope shadows class scope and is
//! cleared on every [`SymbolTable::start_subroutine`].
//!
//! `define` rejects a same-scope redefinition as a [`CompileError::Symbol`]
//! instead of silently overwriting it, since symbol names must be unique
//! within a scope.

use std::collections::HashMap;

use crate::error::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Static,
    Field,
    Argument,
    Local,
}

#[derive(Debug, Clone)]
struct Entry {
    type_name: String,
    kind: Kind,
    index: u16,
}

#[derive(Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Entry>,
    subroutine_scope: HashMap<String, Entry>,
    static_count: u16,
    field_count: u16,
    arg_count: u16,
    local_count: u16,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears subroutine-scope state for a new subroutine.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.arg_count = 0;
        self.local_count = 0;
    }

    /// Defines a new symbol in the scope implied by `kind`.
    ///
    /// # Errors
    /// Returns [`CompileError::Symbol`] if `name` is already defined in that
    /// same scope.
    pub fn define(&mut self, file: &str, line: usize, name: &str, type_name: &str, kind: Kind) -> Result<(), CompileError> {
        let (scope, counter) = match kind {
            Kind::Static | Kind::Field => (&mut self.class_scope, if kind == Kind::Static { &mut self.static_count } else { &mut self.field_count }),
            Kind::Argument | Kind::Local => (&mut self.subroutine_scope, if kind == Kind::Argument { &mut self.arg_count } else { &mut self.local_count }),
        };

        if scope.contains_key(name) {
            return Err(CompileError::symbol(file, line, format!("'{name}' is already defined in this scope")));
        }

        let index = *counter;
        *counter += 1;
        scope.insert(
            name.to_string(),
            Entry {
                type_name: type_name.to_string(),
                kind,
                index,
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn var_count(&self, kind: Kind) -> u16 {
        match kind {
            Kind::Static => self.static_count,
            Kind::Field => self.field_count,
            Kind::Argument => self.arg_count,
            Kind::Local => self.local_count,
        }
    }

    fn find(&self, name: &str) -> Option<&Entry> {
        self.subroutine_scope.get(name).or_else(|| self.class_scope.get(name))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.find(name).map(|e| e.kind)
    }

    #[must_use]
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.find(name).map(|e| e.type_name.as_str())
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.find(name).map(|e| e.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment_independently_per_kind() {
        let mut table = SymbolTable::new();
        table.define("T.jack", 1, "x", "int", Kind::Field).unwrap();
        table.define("T.jack", 1, "y", "int", Kind::Field).unwrap();
        table.define("T.jack", 1, "count", "int", Kind::Static).unwrap();
        assert_eq!(table.var_count(Kind::Field), 2);
        assert_eq!(table.var_count(Kind::Static), 1);
        assert_eq!(table.index_of("y"), Some(1));
    }

    #[test]
    fn subroutine_scope_shadows_and_resets() {
        let mut table = SymbolTable::new();
        table.define("T.jack", 1, "x", "int", Kind::Field).unwrap();
        table.define("T.jack", 2, "x", "int", Kind::Argument).unwrap();
        assert_eq!(table.kind_of("x"), Some(Kind::Argument));

        table.start_subroutine();
        assert_eq!(table.kind_of("x"), Some(Kind::Field));
        assert_eq!(table.var_count(Kind::Argument), 0);
    }

    #[test]
    fn redefinition_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        table.define("T.jack", 1, "x", "int", Kind::Local).unwrap();
        let err = table.define("T.jack", 2, "x", "int", Kind::Local).unwrap_err();
        assert!(matches!(err, CompileError::Symbol { .. }));
    }

    #[test]
    fn unknown_symbol_resolves_to_none() {
        let table = SymbolTable::new();
        assert!(table.kind_of("missing").is_none());
        assert!(!table.contains("missing"));
    }
}
