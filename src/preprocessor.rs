//! Preprocessor bridge (spec §4.1): drives a small C-style macro
//! preprocessor, injects the predefined macro table, and emits the
//! preprocessed text, the original-layout reconstructed text, and the
//! provenance chunks used by §4.7 source mapping.
//!
//! Grounded on `original_source/bos/bos_preprocessor.py`. That file wraps the
//! third-party `pcpp` preprocessor; no such crate is part of this pipeline's
//! teacher/pack stack, so macro expansion, conditional compilation, and
//! `#include` resolution are hand-rolled here at line granularity rather than
//! full-token granularity — the externally-observable contract (two parallel
//! text streams plus provenance chunks, predefined macros, comment
//! retention) is unchanged.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::{ErrorKind, Result};
use crate::unit_values::UNIT_VALUES;

/// One contiguous run of output text attributable to a single source
/// location (spec §3).
#[derive(Debug, Clone)]
pub struct Chunk {
    pub source: PathBuf,
    pub expanded_from: Option<String>,
    pub preprocessed_text: String,
    pub original_text: String,
}

#[derive(Debug, Clone)]
enum Macro {
    Object(String),
    Function(Vec<String>, String),
}

pub struct Preprocessor {
    macros: HashMap<String, Macro>,
    include_paths: Vec<PathBuf>,
}

/// Output of [`Preprocessor::process_file`].
pub struct ProcessedFile {
    pub preprocessed_text: String,
    pub reconstructed_text: String,
    pub chunks: Vec<Chunk>,
}

impl Preprocessor {
    pub fn new() -> Self {
        let mut macros = HashMap::new();
        for (name, value) in [
            ("TRUE", "1"),
            ("true", "1"),
            ("FALSE", "0"),
            ("false", "0"),
        ] {
            macros.insert(name.to_string(), Macro::Object(value.to_string()));
        }
        macros.insert(
            "UNKNOWN_UNIT_VALUE".to_string(),
            Macro::Function(vec!["v".to_string()], "v".to_string()),
        );
        for (name, value) in UNIT_VALUES {
            macros.insert(name.to_string(), Macro::Object(value.to_string()));
        }
        Preprocessor { macros, include_paths: Vec::new() }
    }

    pub fn add_include_path(&mut self, path: impl Into<PathBuf>) {
        self.include_paths.push(path.into());
    }

    pub fn define(&mut self, def_str: &str) {
        if let Some(open_paren) = def_str.find('(') {
            if let Some(name_end) = def_str[..open_paren].find(char::is_whitespace).or(Some(open_paren)) {
                let name = def_str[..name_end.min(open_paren)].trim().to_string();
                if let Some(close_paren) = def_str.find(')') {
                    let params: Vec<String> = def_str[open_paren + 1..close_paren]
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                    let body = def_str[close_paren + 1..].trim().to_string();
                    self.macros.insert(name, Macro::Function(params, body));
                    return;
                }
            }
        }
        let mut parts = def_str.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or("").to_string();
        let value = parts.next().unwrap_or("").trim().to_string();
        self.macros.insert(name, Macro::Object(value));
    }

    pub fn process_file(
        &mut self,
        file_text: &str,
        file_path: impl AsRef<Path>,
        include_paths: &[PathBuf],
    ) -> Result<ProcessedFile> {
        for p in include_paths {
            self.add_include_path(p.clone());
        }

        let source_path = file_path.as_ref().to_path_buf();
        let mut chunks = vec![Chunk {
            source: source_path.clone(),
            expanded_from: None,
            preprocessed_text: format!("#line 1 \"{}\"\n", source_path.display()),
            original_text: String::new(),
        }];

        self.process_lines(file_text, &source_path, &mut chunks, &mut Vec::new())?;

        let preprocessed_text = chunks.iter().map(|c| c.preprocessed_text.as_str()).collect();
        let reconstructed_text = chunks.iter().map(|c| c.original_text.as_str()).collect();

        Ok(ProcessedFile { preprocessed_text, reconstructed_text, chunks })
    }

    fn process_lines(
        &mut self,
        text: &str,
        source: &Path,
        chunks: &mut Vec<Chunk>,
        active_stack: &mut Vec<bool>,
    ) -> Result<()> {
        for (idx, raw_line) in text.lines().enumerate() {
            let lineno = idx as u32 + 1;
            let active = active_stack.iter().all(|b| *b);

            let trimmed = raw_line.trim_start();
            if let Some(rest) = trimmed.strip_prefix('#') {
                let directive = rest.trim();
                if self.handle_directive(directive, source, lineno, chunks, active_stack)? {
                    continue;
                }
            }

            if !active {
                continue;
            }

            // Comments are preserved verbatim in regular source lines (spec
            // §4.1); only macro-definition bodies get comments stripped,
            // in `handle_directive`'s "define" arm.
            let expanded = self.expand_macros(raw_line);

            self.push_line(chunks, source, &expanded, raw_line);
        }

        if !active_stack.is_empty() {
            return Err(ErrorKind::Preprocessor(
                "unterminated #ifdef/#ifndef (missing #endif)".to_string(),
                None,
            )
            .into());
        }

        Ok(())
    }

    /// Returns `Ok(true)` if the line was a directive and has been fully
    /// handled (including being echoed into `preprocessed_text` when it has
    /// semantic effect downstream, per spec §4.1).
    fn handle_directive(
        &mut self,
        directive: &str,
        source: &Path,
        lineno: u32,
        chunks: &mut Vec<Chunk>,
        active_stack: &mut Vec<bool>,
    ) -> Result<bool> {
        let active = active_stack.iter().all(|b| *b);

        if let Some(rest) = directive.strip_prefix("define") {
            if active {
                let (body, _) = strip_line_comments(rest.trim(), false);
                self.define(body.trim());
            }
            return Ok(true);
        }
        if let Some(rest) = directive.strip_prefix("undef") {
            if active {
                self.macros.remove(rest.trim());
            }
            return Ok(true);
        }
        if let Some(rest) = directive.strip_prefix("ifdef") {
            active_stack.push(active && self.macros.contains_key(rest.trim()));
            return Ok(true);
        }
        if let Some(rest) = directive.strip_prefix("ifndef") {
            active_stack.push(active && !self.macros.contains_key(rest.trim()));
            return Ok(true);
        }
        if directive.starts_with("else") {
            if active_stack.is_empty() {
                return Err(ErrorKind::Preprocessor("#else without #ifdef".to_string(), None).into());
            }
            let last = active_stack.len() - 1;
            let outer_active = active_stack[..last].iter().all(|b| *b);
            active_stack[last] = !active_stack[last] && outer_active;
            return Ok(true);
        }
        if directive.starts_with("endif") {
            if active_stack.pop().is_none() {
                return Err(ErrorKind::Preprocessor("#endif without #ifdef".to_string(), None).into());
            }
            return Ok(true);
        }
        if let Some(rest) = directive.strip_prefix("include") {
            if active {
                self.handle_include(rest.trim(), source, lineno, chunks)?;
            }
            return Ok(true);
        }
        if directive.starts_with("line") {
            // Pass through `#line` directives the source itself wrote.
            if active {
                chunks.push(Chunk {
                    source: source.to_path_buf(),
                    expanded_from: None,
                    preprocessed_text: format!("#{}\n", directive),
                    original_text: format!("#{}\n", directive),
                });
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn handle_include(
        &mut self,
        arg: &str,
        including_source: &Path,
        lineno: u32,
        chunks: &mut Vec<Chunk>,
    ) -> Result<()> {
        let name = arg.trim_matches(|c| c == '"' || c == '<' || c == '>');

        let mut candidates = vec![including_source.parent().unwrap_or(Path::new(".")).join(name)];
        candidates.extend(self.include_paths.iter().map(|p| p.join(name)));

        let resolved = candidates
            .iter()
            .find(|p| p.exists())
            .ok_or_else(|| {
                ErrorKind::Preprocessor(format!("included file not found: {}", name), None)
            })?
            .clone();

        let contents = std::fs::read_to_string(&resolved).map_err(|e| {
            ErrorKind::Preprocessor(format!("failed to read included file {}: {}", resolved.display(), e), None)
        })?;

        chunks.push(Chunk {
            source: including_source.to_path_buf(),
            expanded_from: None,
            preprocessed_text: format!("#line 1 \"{}\"\n", resolved.display()),
            original_text: format!("#include \"{}\"\n", name),
        });

        self.process_lines(&contents, &resolved, chunks, &mut Vec::new())?;

        chunks.push(Chunk {
            source: including_source.to_path_buf(),
            expanded_from: None,
            preprocessed_text: format!("#line {} \"{}\"\n", lineno + 1, including_source.display()),
            original_text: String::new(),
        });

        Ok(())
    }

    fn expand_macros(&self, line: &str) -> String {
        let mut out = String::new();
        let bytes: Vec<char> = line.chars().collect();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i].is_alphabetic() || bytes[i] == '_' {
                let start = i;
                while i < bytes.len() && (bytes[i].is_alphanumeric() || bytes[i] == '_') {
                    i += 1;
                }
                let ident: String = bytes[start..i].iter().collect();
                match self.macros.get(&ident) {
                    Some(Macro::Object(value)) => out.push_str(value),
                    Some(Macro::Function(params, body)) => {
                        let mut j = i;
                        while j < bytes.len() && bytes[j].is_whitespace() {
                            j += 1;
                        }
                        if j < bytes.len() && bytes[j] == '(' {
                            let close = match find_matching_paren(&bytes, j) {
                                Some(c) => c,
                                None => {
                                    out.push_str(&ident);
                                    continue;
                                }
                            };
                            let args_str: String = bytes[j + 1..close].iter().collect();
                            let args: Vec<&str> = if args_str.trim().is_empty() {
                                vec![]
                            } else {
                                args_str.split(',').map(|s| s.trim()).collect()
                            };
                            let mut substituted = body.clone();
                            for (param, arg) in params.iter().zip(args.iter()) {
                                substituted = replace_word(&substituted, param, arg);
                            }
                            out.push_str(&self.expand_macros(&substituted));
                            i = close + 1;
                        } else {
                            out.push_str(&ident);
                        }
                    }
                    None => out.push_str(&ident),
                }
            } else {
                out.push(bytes[i]);
                i += 1;
            }
        }
        out
    }

    fn push_line(&self, chunks: &mut Vec<Chunk>, source: &Path, expanded: &str, original: &str) {
        let last = chunks.last_mut();
        if let Some(last) = last {
            if last.source == source && last.expanded_from.is_none() {
                last.preprocessed_text.push_str(expanded);
                last.preprocessed_text.push('\n');
                last.original_text.push_str(original);
                last.original_text.push('\n');
                return;
            }
        }
        chunks.push(Chunk {
            source: source.to_path_buf(),
            expanded_from: None,
            preprocessed_text: format!("{}\n", expanded),
            original_text: format!("{}\n", original),
        });
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn find_matching_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, c) in chars.iter().enumerate().skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn replace_word(haystack: &str, word: &str, replacement: &str) -> String {
    if word.is_empty() {
        return haystack.to_string();
    }
    let mut result = String::new();
    let chars: Vec<char> = haystack.chars().collect();
    let word_chars: Vec<char> = word.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i..].starts_with(word_chars.as_slice()) {
            let before_ok = i == 0 || !(chars[i - 1].is_alphanumeric() || chars[i - 1] == '_');
            let after = i + word_chars.len();
            let after_ok = after >= chars.len() || !(chars[after].is_alphanumeric() || chars[after] == '_');
            if before_ok && after_ok {
                result.push_str(replacement);
                i = after;
                continue;
            }
        }
        result.push(chars[i]);
        i += 1;
    }
    result
}

/// Strips `//` and `/* ... */` comments from one line. Used only on macro
/// definition bodies (spec §4.1); ordinary source lines keep their comments
/// verbatim in the preprocessed output. Returns the stripped line and
/// whether a block comment remains open.
fn strip_line_comments(line: &str, starting_in_comment: bool) -> (String, bool) {
    let mut out = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    let mut in_comment = starting_in_comment;
    while i < chars.len() {
        if in_comment {
            if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                in_comment = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }
        if chars[i] == '/' && chars.get(i + 1) == Some(&'/') {
            break;
        }
        if chars[i] == '/' && chars.get(i + 1) == Some(&'*') {
            in_comment = true;
            i += 2;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    (out, in_comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_macros_expand() {
        let pp = Preprocessor::new();
        assert_eq!(pp.expand_macros("x = TRUE;"), "x = 1;");
        assert_eq!(pp.expand_macros("x = UNKNOWN_UNIT_VALUE(42);"), "x = 42;");
        assert_eq!(pp.expand_macros("y = HEALTH;"), "y = 4;");
    }

    #[test]
    fn process_file_emits_initial_line_marker() {
        let mut pp = Preprocessor::new();
        let result = pp.process_file("piece base;\n", "test.bos", &[]).unwrap();
        assert!(result.preprocessed_text.starts_with("#line 1 \"test.bos\"\n"));
        assert!(result.preprocessed_text.contains("piece base;"));
    }

    #[test]
    fn ifdef_excludes_inactive_branch() {
        let mut pp = Preprocessor::new();
        let src = "#define FOO\n#ifdef FOO\nalpha\n#else\nbeta\n#endif\n";
        let result = pp.process_file(src, "t.bos", &[]).unwrap();
        assert!(result.preprocessed_text.contains("alpha"));
        assert!(!result.preprocessed_text.contains("beta"));
    }

    #[test]
    fn source_comments_are_preserved_but_macro_body_comments_are_stripped() {
        let mut pp = Preprocessor::new();
        let src = "// a comment\nx = 1; // trailing\n#define FOO 1 /* unit */\n";
        let result = pp.process_file(src, "t.bos", &[]).unwrap();
        assert!(result.preprocessed_text.contains("// a comment"));
        assert!(result.preprocessed_text.contains("x = 1; // trailing"));
        assert_eq!(pp.expand_macros("y = FOO;"), "y = 1;");
    }
}
