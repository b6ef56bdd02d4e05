//! Source-mapping helpers (spec §4.7): turn an `Option<ParseNodeId>` into the
//! `CodeLocation` a caller can print in an error message.
//!
//! In this implementation `#line`-adjustment already happened while lexing
//! (the lexer tracks the nearest preceding `#line` marker as it scans, which
//! is equivalent to the backward-walk described in spec §4.7 but does not
//! require a separate channel search at lookup time), so every
//! [`crate::parser::tree::ParseNode`] already carries its final, adjusted
//! [`crate::location::CodeLocation`].

use crate::location::CodeLocation;
use crate::parser::tree::{ParseArena, ParseNodeId};

pub fn location_of(arena: &ParseArena, node: Option<ParseNodeId>) -> Option<CodeLocation> {
    node.map(|id| arena.get(id).location.clone())
}
