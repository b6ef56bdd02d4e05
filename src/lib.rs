//! Compiler for the BOS unit-scripting language: preprocesses, parses,
//! optionally folds constants, registers names, lowers to bytecode, and
//! serializes a COB object file a real-time-strategy engine can load.
//!
//! The pipeline mirrors `original_source/bos/bos_loader.py`'s
//! `BosLoader.load_file`, reshaped into the module layout idiomatic for a
//! Rust compiler crate: a library (`cobc`) exposing [`compile_source`] plus
//! each pipeline stage as its own module, and a thin CLI binary on top.

pub mod ast;
pub mod compiler;
pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod errors;
pub mod location;
pub mod objfile;
pub mod opcodes;
pub mod parser;
pub mod preprocessor;
pub mod registry;
pub mod script_hooks;
pub mod unit_values;

use std::path::Path;

use config::CompileOptions;
use errors::Result;
use objfile::ObjectFile;

/// Runs the full pipeline over one source file's text and returns the
/// encoded object file bytes.
pub fn compile_source(source_text: &str, source_path: &Path, options: &CompileOptions) -> Result<Vec<u8>> {
    let mut pp = preprocessor::Preprocessor::new();
    let processed = pp.process_file(source_text, source_path, &options.include_paths)?;

    let file_name = source_path.to_string_lossy().into_owned();
    let mut parsed = parser::parse_two_phase(&processed.preprocessed_text, &file_name)?;

    if options.fold_constants {
        convert::fold_constants(&mut parsed.file);
    }

    let object_file = compiler::compile_file(&parsed.file, &parsed.arena, options)?;
    Ok(object_file.encode())
}

/// Decodes a previously compiled object file, for tooling that inspects or
/// round-trips `.cob` files.
pub fn decode_object_file(bytes: &[u8]) -> Result<ObjectFile> {
    ObjectFile::decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn compiles_and_round_trips_a_small_unit_script() {
        let src = "\
piece base, turret;
static-var aimState;

Create() {
  hide turret;
  return 0;
}

AimPrimary1(heading) {
  var result;
  if (heading > 180) {
    result = heading - 360;
  } else {
    result = heading;
  }
  return result;
}
";
        let bytes = compile_source(src, Path::new("unit.bos"), &CompileOptions::default()).unwrap();
        let decoded = decode_object_file(&bytes).unwrap();
        assert_eq!(decoded.piece_names, vec!["base", "turret"]);
        assert_eq!(decoded.functions.len(), 2);
        assert!(!decoded.code.contains(&opcodes::op::BAD_OP_PLACEHOLDER));
    }

    #[test]
    fn rejects_for_loop_end_to_end() {
        let src = "Script1() {\n  for (x = 0; x < 2; x += 1) {}\n}\n";
        let err = compile_source(src, Path::new("bad.bos"), &CompileOptions::default()).unwrap_err();
        assert!(err.to_string().contains("for"));
    }

    #[test]
    fn undefined_name_reference_is_an_error() {
        let src = "Script1() {\n  return missingVar;\n}\n";
        let err = compile_source(src, Path::new("bad.bos"), &CompileOptions::default()).unwrap_err();
        assert!(err.to_string().contains("has not been defined"));
    }
}
