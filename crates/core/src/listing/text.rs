//! ISO-8859-1 helpers. Listings and signature files are single-byte text where
//! every byte maps to the code point of the same value.

use std::fs;
use std::io;
use std::path::Path;

pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode `text` as ISO-8859-1; characters outside the range become `?`.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')).collect()
}

pub fn read_latin1(path: &Path) -> io::Result<String> {
    fs::read(path).map(|bytes| decode_latin1(&bytes))
}

pub fn write_latin1(path: &Path, text: &str) -> io::Result<()> {
    fs::write(path, encode_latin1(text))
}
