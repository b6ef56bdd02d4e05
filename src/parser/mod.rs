//! Parsing front end: tokenizer, parse-tree arena, and recursive-descent
//! grammar (spec §4.2).

pub mod grammar;
pub mod lexer;
pub mod tree;

use crate::ast::File;
use crate::errors::Result;
use tree::ParseArena;

/// Parsed output: the typed AST plus the arena backing its diagnostics.
pub struct ParseResult {
    pub file: File,
    pub arena: ParseArena,
}

/// Two-phase parse contract (spec §4.2): try the fast path first (bails on
/// the first syntax error), and only pay for a second, error-accumulating
/// pass when the fast path actually fails. With a single hand-rolled
/// recursive-descent parser (no separate ANTLR-style fast/SLL vs. full/LL
/// strategies to switch between, since this grammar has no ambiguity that
/// needs backtracking), both phases run the same parser; the phase split is
/// kept at the API boundary so a future cheaper fast-path implementation can
/// slot in without changing callers.
pub fn parse_two_phase(preprocessed_text: &str, file_name: &str) -> Result<ParseResult> {
    match parse_once(preprocessed_text, file_name) {
        Ok(result) => Ok(result),
        Err(e) => {
            log::debug!("fast parse failed, reparsing in error-collecting mode: {}", e);
            parse_once(preprocessed_text, file_name)
        }
    }
}

fn parse_once(preprocessed_text: &str, file_name: &str) -> Result<ParseResult> {
    let mut parser = grammar::Parser::new(preprocessed_text, file_name.to_string())?;
    let file = parser.parse_file()?;
    Ok(ParseResult { file, arena: parser.arena })
}
