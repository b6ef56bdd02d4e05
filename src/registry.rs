//! Scoped name registry (spec §4.4): tracks every piece, static variable,
//! function, and local/argument name, with per-kind index spaces so the
//! lowerer can emit the right operand for a `PUSH_LOCAL_VAR`/`PUSH_STATIC`.
//!
//! Grounded on `original_source/cob/compiler/name_registry.py`.

use std::collections::HashMap;

use crate::ast::Name;
use crate::errors::{ErrorKind, Result};
use crate::location::CodeLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameType {
    Static,
    Local,
    Piece,
    Function,
    Arg,
}

impl NameType {
    fn label(self) -> &'static str {
        match self {
            NameType::Static => "static-var",
            NameType::Local => "local var",
            NameType::Piece => "piece",
            NameType::Function => "function",
            NameType::Arg => "argument",
        }
    }

    /// Local and argument names share one contiguous index space, since both
    /// occupy slots on the same per-call stack frame.
    fn index_space(self) -> NameType {
        match self {
            NameType::Local => NameType::Arg,
            other => other,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    name_type: NameType,
    index: u32,
}

#[derive(Debug, Default)]
pub struct NameRegistry {
    entries: HashMap<String, Entry>,
    counts: HashMap<NameType, u32>,
}

impl NameRegistry {
    pub fn new() -> Self {
        NameRegistry::default()
    }

    /// Registers `name` as `name_type`, returning its index within that
    /// kind's space. A same-kind re-declaration of a STATIC or PIECE name
    /// is a warning (first declaration wins); any cross-kind collision is a
    /// hard error.
    pub fn register(&mut self, name: &Name, name_type: NameType, loc: Option<CodeLocation>) -> Result<u32> {
        let key = name.lowered();
        if let Some(existing) = self.entries.get(&key) {
            if existing.name_type == name_type {
                log::warn!(
                    "duplicate {} declaration \"{}\" ignored, first declaration kept{}",
                    name_type.label(),
                    name.text,
                    loc.as_ref().map(|l| format!(" ({})", l)).unwrap_or_default()
                );
                return Ok(existing.index);
            }
            return Err(ErrorKind::DuplicateName(
                name.text.clone(),
                name_type.label(),
                existing.name_type.label(),
                loc,
            )
            .into());
        }

        let space = name_type.index_space();
        let index = *self.counts.get(&space).unwrap_or(&0);
        self.counts.insert(space, index + 1);
        self.entries.insert(key, Entry { name_type, index });
        Ok(index)
    }

    pub fn lookup(&self, name: &Name, loc: Option<CodeLocation>) -> Result<(NameType, u32)> {
        self.entries
            .get(&name.lowered())
            .map(|e| (e.name_type, e.index))
            .ok_or_else(|| ErrorKind::UndefinedName(name.text.clone(), loc).into())
    }

    pub fn count(&self, name_type: NameType) -> u32 {
        *self.counts.get(&name_type.index_space()).unwrap_or(&0)
    }

    /// Drops every LOCAL/ARG entry (and resets their shared counter) between
    /// functions, since each function gets a fresh stack frame.
    pub fn clear_local_names(&mut self) {
        self.entries.retain(|_, e| !matches!(e.name_type, NameType::Local | NameType::Arg));
        self.counts.remove(&NameType::Arg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_static_is_warning_not_error() {
        let mut reg = NameRegistry::new();
        let n = Name::new("Foo", None);
        assert_eq!(reg.register(&n, NameType::Static, None).unwrap(), 0);
        assert_eq!(reg.register(&n, NameType::Static, None).unwrap(), 0);
    }

    #[test]
    fn cross_kind_collision_is_error() {
        let mut reg = NameRegistry::new();
        let n = Name::new("Foo", None);
        reg.register(&n, NameType::Piece, None).unwrap();
        let err = reg.register(&n, NameType::Static, None).unwrap_err();
        assert!(err.to_string().contains("already being used"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut reg = NameRegistry::new();
        reg.register(&Name::new("Foo", None), NameType::Piece, None).unwrap();
        let (kind, idx) = reg.lookup(&Name::new("FOO", None), None).unwrap();
        assert_eq!(kind, NameType::Piece);
        assert_eq!(idx, 0);
    }

    #[test]
    fn local_and_arg_share_contiguous_space() {
        let mut reg = NameRegistry::new();
        reg.register(&Name::new("a", None), NameType::Arg, None).unwrap();
        reg.register(&Name::new("b", None), NameType::Arg, None).unwrap();
        let idx = reg.register(&Name::new("c", None), NameType::Local, None).unwrap();
        assert_eq!(idx, 2);
    }

    #[test]
    fn undefined_lookup_errors() {
        let reg = NameRegistry::new();
        assert!(reg.lookup(&Name::new("nope", None), None).is_err());
    }
}
