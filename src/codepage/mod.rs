//! # Codepage Encoding
//!
//! Converts Unicode strings to the single-byte codepages thermal printers
//! consume. ASCII (U+0000–U+007F) passes through unchanged in every
//! supported codepage; the upper half comes from the tables in
//! [`tables`]. Characters without a mapping are replaced with `?`.
//!
//! [`auto_encode`] segments mixed text into maximal runs, walking a
//! candidate list in declared order so that a printer's preferred
//! codepage wins whenever it can represent the run.

pub mod tables;

use crate::error::{Error, Result};
use log::debug;

/// A run of bytes sharing one codepage, produced by [`auto_encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRun {
    pub codepage: &'static str,
    pub bytes: Vec<u8>,
}

/// Whether `name` is a codepage this client can encode.
pub fn supports(name: &str) -> bool {
    tables::table(name).is_some()
}

/// Encode `text` into the named codepage.
///
/// Unmappable characters become `?` (deterministically), with a debug log
/// so misconfigured documents can be traced.
pub fn encode(text: &str, name: &str) -> Result<Vec<u8>> {
    let table =
        tables::table(name).ok_or_else(|| Error::Configuration(format!("unknown codepage: {name}")))?;

    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match encode_char(ch, table) {
            Some(byte) => out.push(byte),
            None => {
                debug!("codepage {name}: no mapping for '{ch}' (U+{:04X}), substituting '?'", ch as u32);
                out.push(b'?');
            }
        }
    }
    Ok(out)
}

/// Encode `text` by segmenting it into maximal runs over `candidates`.
///
/// Candidate order is significant and preserved: a run switches codepage
/// only when the active one cannot represent the next character, and the
/// replacement is the first candidate that can. Characters no candidate
/// covers are written as `?` without ending the run. Candidates without a
/// local table are skipped.
pub fn auto_encode(text: &str, candidates: &[&'static str]) -> Vec<EncodedRun> {
    let usable: Vec<&'static str> = candidates.iter().copied().filter(|c| supports(c)).collect();
    let fallback = usable.first().copied().unwrap_or("cp437");

    let mut runs: Vec<EncodedRun> = Vec::new();
    let mut active: Option<&'static str> = None;
    let mut bytes: Vec<u8> = Vec::new();

    for ch in text.chars() {
        let encoded = active.and_then(|cp| encode_char_in(ch, cp));
        if let Some(byte) = encoded {
            bytes.push(byte);
            continue;
        }

        match usable.iter().find_map(|cp| encode_char_in(ch, cp).map(|b| (*cp, b))) {
            Some((cp, byte)) => {
                if let Some(prev) = active
                    && prev != cp
                    && !bytes.is_empty()
                {
                    runs.push(EncodedRun { codepage: prev, bytes: std::mem::take(&mut bytes) });
                }
                active = Some(cp);
                bytes.push(byte);
            }
            None => {
                debug!("auto codepage: no candidate maps '{ch}' (U+{:04X}), substituting '?'", ch as u32);
                if active.is_none() {
                    active = Some(fallback);
                }
                bytes.push(b'?');
            }
        }
    }

    if !bytes.is_empty() {
        runs.push(EncodedRun {
            codepage: active.unwrap_or(fallback),
            bytes,
        });
    }

    runs
}

fn encode_char_in(ch: char, name: &str) -> Option<u8> {
    tables::table(name).and_then(|t| encode_char(ch, t))
}

fn encode_char(ch: char, table: &[char; 128]) -> Option<u8> {
    if (ch as u32) < 0x80 {
        return Some(ch as u8);
    }
    table
        .iter()
        .position(|&mapped| mapped == ch)
        .map(|idx| 0x80 + idx as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode("Hello!", "cp437").unwrap(), b"Hello!".to_vec());
    }

    #[test]
    fn test_cp437_upper_half() {
        assert_eq!(encode("é", "cp437").unwrap(), vec![0x82]);
        assert_eq!(encode("─", "cp437").unwrap(), vec![0xC4]);
        assert_eq!(encode("═", "cp437").unwrap(), vec![0xCD]);
    }

    #[test]
    fn test_unmappable_becomes_question_mark() {
        assert_eq!(encode("日", "cp437").unwrap(), vec![b'?']);
    }

    #[test]
    fn test_unknown_codepage_is_configuration_error() {
        assert!(matches!(encode("x", "cp9999"), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_supports() {
        assert!(supports("cp437"));
        assert!(supports("windows1252"));
        assert!(!supports("shiftjis"));
    }

    #[test]
    fn test_euro_only_in_cp858_and_1252() {
        assert_eq!(encode("€", "cp858").unwrap(), vec![0xD5]);
        assert_eq!(encode("€", "windows1252").unwrap(), vec![0x80]);
        assert_eq!(encode("€", "cp850").unwrap(), vec![b'?']);
    }

    #[test]
    fn test_auto_encode_single_run() {
        let runs = auto_encode("Hola señor", &["cp437", "cp850"]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].codepage, "cp437");
        assert_eq!(runs[0].bytes[7], 0xA4); // ñ in cp437
    }

    #[test]
    fn test_auto_encode_switches_codepage() {
        // € forces a switch away from cp437; ASCII afterwards stays in the
        // switched run (maximal runs, no flapping back).
        let runs = auto_encode("a€b", &["cp437", "cp858"]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], EncodedRun { codepage: "cp437", bytes: vec![b'a'] });
        assert_eq!(runs[1], EncodedRun { codepage: "cp858", bytes: vec![0xD5, b'b'] });
    }

    #[test]
    fn test_auto_encode_candidate_order_preserved() {
        // Both cp850 and cp437 encode é; the first candidate wins.
        let runs = auto_encode("é", &["cp850", "cp437"]);
        assert_eq!(runs[0].codepage, "cp850");
    }

    #[test]
    fn test_auto_encode_unmappable_stays_in_run() {
        let runs = auto_encode("a日b", &["cp437"]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].bytes, vec![b'a', b'?', b'b']);
    }

    #[test]
    fn test_auto_encode_empty() {
        assert!(auto_encode("", &["cp437"]).is_empty());
    }
}
