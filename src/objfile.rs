//! Binary object-file codec (spec §4.6): the exact on-disk layout the target
//! engine loads.
//!
//! Grounded on `original_source/cob/cob_file.py`. That loader parses the
//! format with `struct`; the equivalent, exact-width, explicit-endianness
//! tool in this pipeline's stack is `byteorder` (not `serde`/`bincode`,
//! which would serialize Rust's own in-memory layout rather than this
//! format's fixed string/pointer-table ordering).
//!
//! File layout: an 11-word little-endian header, then the code section,
//! then three pointer tables (function code entries, function name
//! strings, piece name strings), then a flat block of NUL-terminated
//! strings. Every `_ptr` field in the header is an absolute byte offset
//! into the file.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read};

use crate::errors::{ErrorKind, Result};

pub const VERSION: u32 = 4;
const HEADER_WORDS: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFunction {
    pub name: String,
    /// Word offset of this function's first instruction within `code`.
    pub entry_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFile {
    pub functions: Vec<CompiledFunction>,
    pub piece_names: Vec<String>,
    pub static_var_count: u32,
    pub code: Vec<i32>,
}

impl ObjectFile {
    pub fn encode(&self) -> Vec<u8> {
        let header_size = HEADER_WORDS * 4;
        let code_ptr = header_size as u32;
        let code_bytes_len = (self.code.len() * 4) as u32;
        let func_code_ptrs_ptr = code_ptr + code_bytes_len;
        let func_names_ptrs_ptr = func_code_ptrs_ptr + (self.functions.len() * 4) as u32;
        let piece_names_ptrs_ptr = func_names_ptrs_ptr + (self.functions.len() * 4) as u32;
        let strings_ptr = piece_names_ptrs_ptr + (self.piece_names.len() * 4) as u32;

        let mut strings_buf: Vec<u8> = Vec::new();
        let mut func_name_ptrs = Vec::with_capacity(self.functions.len());
        for f in &self.functions {
            func_name_ptrs.push(strings_ptr + strings_buf.len() as u32);
            strings_buf.extend_from_slice(f.name.as_bytes());
            strings_buf.push(0);
        }
        let mut piece_name_ptrs = Vec::with_capacity(self.piece_names.len());
        for name in &self.piece_names {
            piece_name_ptrs.push(strings_ptr + strings_buf.len() as u32);
            strings_buf.extend_from_slice(name.as_bytes());
            strings_buf.push(0);
        }
        let func_code_ptrs: Vec<u32> =
            self.functions.iter().map(|f| code_ptr + f.entry_offset * 4).collect();

        let mut out = Vec::new();
        out.write_u32::<LittleEndian>(VERSION).unwrap();
        out.write_u32::<LittleEndian>(self.functions.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(self.piece_names.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(self.code.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(self.static_var_count).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(func_code_ptrs_ptr).unwrap();
        out.write_u32::<LittleEndian>(func_names_ptrs_ptr).unwrap();
        out.write_u32::<LittleEndian>(piece_names_ptrs_ptr).unwrap();
        out.write_u32::<LittleEndian>(code_ptr).unwrap();
        out.write_u32::<LittleEndian>(strings_ptr).unwrap();

        for word in &self.code {
            out.write_i32::<LittleEndian>(*word).unwrap();
        }
        for ptr in &func_code_ptrs {
            out.write_u32::<LittleEndian>(*ptr).unwrap();
        }
        for ptr in &func_name_ptrs {
            out.write_u32::<LittleEndian>(*ptr).unwrap();
        }
        for ptr in &piece_name_ptrs {
            out.write_u32::<LittleEndian>(*ptr).unwrap();
        }
        out.extend_from_slice(&strings_buf);

        out
    }

    pub fn decode(bytes: &[u8]) -> Result<ObjectFile> {
        let mut cursor = Cursor::new(bytes);
        let version = read_u32(&mut cursor)?;
        if version != VERSION {
            return Err(ErrorKind::ObjectFile(format!(
                "unsupported object file version {} (expected {})",
                version, VERSION
            ))
            .into());
        }
        let func_count = read_u32(&mut cursor)? as usize;
        let piece_count = read_u32(&mut cursor)? as usize;
        let code_len = read_u32(&mut cursor)? as usize;
        let static_var_count = read_u32(&mut cursor)?;
        let _unused = read_u32(&mut cursor)?;
        let func_code_ptrs_ptr = read_u32(&mut cursor)?;
        let func_names_ptrs_ptr = read_u32(&mut cursor)?;
        let piece_names_ptrs_ptr = read_u32(&mut cursor)?;
        let code_ptr = read_u32(&mut cursor)?;

        let code = read_i32_array_at(bytes, code_ptr as usize, code_len)?;
        let func_code_ptrs = read_u32_array_at(bytes, func_code_ptrs_ptr as usize, func_count)?;
        let func_names_ptrs = read_u32_array_at(bytes, func_names_ptrs_ptr as usize, func_count)?;
        let piece_names_ptrs = read_u32_array_at(bytes, piece_names_ptrs_ptr as usize, piece_count)?;

        let mut functions = Vec::with_capacity(func_count);
        for i in 0..func_count {
            let name = read_cstring_at(bytes, func_names_ptrs[i] as usize)?;
            let entry_offset = (func_code_ptrs[i] - code_ptr) / 4;
            functions.push(CompiledFunction { name, entry_offset });
        }

        let mut piece_names = Vec::with_capacity(piece_count);
        for ptr in piece_names_ptrs {
            piece_names.push(read_cstring_at(bytes, ptr as usize)?);
        }

        Ok(ObjectFile { functions, piece_names, static_var_count, code })
    }
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32> {
    cursor
        .read_u32::<LittleEndian>()
        .map_err(|e| ErrorKind::ObjectFile(format!("truncated header: {}", e)).into())
}

fn read_u32_array_at(bytes: &[u8], offset: usize, count: usize) -> Result<Vec<u32>> {
    let mut cursor = Cursor::new(
        bytes
            .get(offset..offset + count * 4)
            .ok_or_else(|| ErrorKind::ObjectFile("pointer table out of bounds".to_string()))?,
    );
    (0..count)
        .map(|_| {
            cursor
                .read_u32::<LittleEndian>()
                .map_err(|e| ErrorKind::ObjectFile(e.to_string()).into())
        })
        .collect()
}

fn read_i32_array_at(bytes: &[u8], offset: usize, count: usize) -> Result<Vec<i32>> {
    let mut cursor = Cursor::new(
        bytes
            .get(offset..offset + count * 4)
            .ok_or_else(|| ErrorKind::ObjectFile("code section out of bounds".to_string()))?,
    );
    (0..count)
        .map(|_| {
            cursor
                .read_i32::<LittleEndian>()
                .map_err(|e| ErrorKind::ObjectFile(e.to_string()).into())
        })
        .collect()
}

fn read_cstring_at(bytes: &[u8], offset: usize) -> Result<String> {
    let slice = bytes
        .get(offset..)
        .ok_or_else(|| ErrorKind::ObjectFile("string pointer out of bounds".to_string()))?;
    let end = slice
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| ErrorKind::ObjectFile("unterminated string in strings section".to_string()))?;
    let mut s = String::new();
    Cursor::new(&slice[..end])
        .read_to_string(&mut s)
        .map_err(|e| ErrorKind::ObjectFile(format!("invalid utf-8 in string: {}", e)))?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ObjectFile {
        ObjectFile {
            functions: vec![
                CompiledFunction { name: "Create".to_string(), entry_offset: 0 },
                CompiledFunction { name: "AimPrimary".to_string(), entry_offset: 4 },
            ],
            piece_names: vec!["base".to_string(), "turret".to_string()],
            static_var_count: 2,
            code: vec![0x1006_5000u32 as i32, 0, 0, 0, 0x1006_5000u32 as i32],
        }
    }

    #[test]
    fn round_trips() {
        let original = sample();
        let bytes = original.encode();
        let decoded = ObjectFile::decode(&bytes).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn header_has_expected_version() {
        let bytes = sample().encode();
        let version = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        assert_eq!(version, VERSION);
    }

    #[test]
    fn rejects_wrong_version() {
        let mut bytes = sample().encode();
        bytes[0..4].copy_from_slice(&99u32.to_le_bytes());
        assert!(ObjectFile::decode(&bytes).is_err());
    }
}
