//! Uniform fallible-error channel for the whole pipeline.
//!
//! Every fatal condition described in spec §7 becomes an `ErrorKind` variant.
//! Warnings (duplicate globals, overflow rebasing, unhandled AST nodes in
//! non-strict mode) are *not* modeled here — they go through `log::warn!`
//! instead, since the caller reads them off the normal logging sink rather
//! than a bespoke diagnostic collector.

use crate::location::CodeLocation;

error_chain::error_chain! {
    foreign_links {
        Io(std::io::Error);
    }

    errors {
        /// From the parser, with an exact source location.
        Syntax(msg: String, loc: Option<CodeLocation>) {
            description("syntax error")
            display("syntax error: {}{}", msg, display_loc(loc))
        }
        /// A cross-type name collision (e.g. `piece foo;` then `static-var foo;`).
        DuplicateName(name: String, new_kind: &'static str, existing_kind: &'static str, loc: Option<CodeLocation>) {
            description("duplicate name")
            display(
                "invalid declaration of {} \"{}\", name is already being used by a {} declaration{}",
                new_kind, name, existing_kind, display_loc(loc)
            )
        }
        /// Name was never registered.
        UndefinedName(name: String, loc: Option<CodeLocation>) {
            description("undefined name")
            display("name \"{}\" has not been defined{}", name, display_loc(loc))
        }
        /// Assignment to a piece or function name.
        IllegalAssignment(name: String, kind: &'static str, loc: Option<CodeLocation>) {
            description("illegal assignment")
            display("illegal assignment to {} \"{}\"{}", kind, name, display_loc(loc))
        }
        /// `PLAY_SOUND` statement, `for`-loops, and similar.
        Unsupported(what: String, loc: Option<CodeLocation>) {
            description("unsupported construct")
            display("unsupported construct: {}{}", what, display_loc(loc))
        }
        /// Constant value does not fit in a signed/unsigned 32-bit slot.
        NumericOverflow(literal: String, loc: Option<CodeLocation>) {
            description("numeric overflow")
            display("constant {} does not fit in a 32-bit int{}", literal, display_loc(loc))
        }
        /// Unhandled AST node kind reached the lowerer in strict mode.
        InternalError(what: String, loc: Option<CodeLocation>) {
            description("internal compiler error")
            display("INTERNAL COMPILER ERROR: {}{}", what, display_loc(loc))
        }
        /// Preprocessor-level failure (bad `#include`, recursive include, malformed directive).
        Preprocessor(msg: String, loc: Option<CodeLocation>) {
            description("preprocessor error")
            display("preprocessor error: {}{}", msg, display_loc(loc))
        }
        /// Malformed or unsupported object-file container.
        ObjectFile(msg: String) {
            description("object file error")
            display("object file error: {}", msg)
        }
    }
}

fn display_loc(loc: &Option<CodeLocation>) -> String {
    match loc {
        Some(l) => format!(" ({})", l),
        None => String::new(),
    }
}
