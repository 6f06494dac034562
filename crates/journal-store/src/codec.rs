//! Line-oriented `.properties` codec for the on-disk journal.
//!
//! Reading follows the Java `Properties` grammar: `#`/`!` comments, blank
//! lines, backslash line continuations, `=`/`:`/whitespace separators and
//! `\t \n \r \f \uXXXX` escapes. Writing emits one `key=value` line per
//! entry, in the order given, with everything outside printable ASCII
//! escaped so the file stays 7-bit clean.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::atomic;
use crate::error::{StoreError, StoreResult};

/// One parsed `key=value` pair and the physical line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub line: usize,
    pub key: String,
    pub value: String,
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Serialize pairs into `.properties` text, one line each.
pub fn serialize<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    for (key, value) in entries {
        escape_into(&mut out, key, true);
        out.push('=');
        escape_into(&mut out, value, false);
        out.push('\n');
    }
    out
}

fn escape_into(out: &mut String, s: &str, is_key: bool) {
    for (i, c) in s.chars().enumerate() {
        match c {
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04X}");
                }
            }
        }
    }
}

/// Parse `.properties` text into a key/value mapping. Later duplicates win.
pub fn deserialize(text: &str) -> StoreResult<BTreeMap<String, String>> {
    Ok(parse(text)?
        .into_iter()
        .map(|p| (p.key, p.value))
        .collect())
}

/// Parse `.properties` text, keeping line numbers for error reporting.
pub fn parse(text: &str) -> StoreResult<Vec<Property>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines = physical_lines(text);
    let mut properties = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let start = idx + 1;
        let first = lines[idx].trim_start_matches(is_blank);
        idx += 1;

        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }

        let mut logical = String::new();
        let mut current = first;
        while ends_with_continuation(current) {
            logical.push_str(&current[..current.len() - 1]);
            let Some(next) = lines.get(idx) else {
                return Err(StoreError::format(idx, "line continuation at end of input"));
            };
            current = next.trim_start_matches(is_blank);
            idx += 1;
        }
        logical.push_str(current);

        let (raw_key, raw_value) = split_pair(&logical);
        properties.push(Property {
            line: start,
            key: unescape(raw_key, start)?,
            value: unescape(raw_value, start)?,
        });
    }

    Ok(properties)
}

/// Read and parse a journal file. A missing file is [`StoreError::NotFound`].
pub fn read_file(path: &Path) -> StoreResult<Vec<Property>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    let text = String::from_utf8(bytes).map_err(|e| {
        let valid = e.utf8_error().valid_up_to();
        let line = e.as_bytes()[..valid].iter().filter(|&&b| b == b'\n').count() + 1;
        StoreError::format(line, "invalid UTF-8")
    })?;
    parse(&text)
}

/// Serialize pairs and atomically replace the file at `path`.
pub fn write_file<'a, I>(path: &Path, entries: I) -> StoreResult<()>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    atomic::write_atomic(path, serialize(entries).as_bytes())?;
    Ok(())
}

/// Split on `\n`, `\r\n` or a lone `\r`.
fn physical_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// An odd number of trailing backslashes joins the next line.
fn ends_with_continuation(line: &str) -> bool {
    line.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// Split a logical line at the first unescaped separator.
fn split_pair(logical: &str) -> (&str, &str) {
    let mut key_end = logical.len();
    let mut escaped = false;
    for (i, c) in logical.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = i;
            break;
        }
    }

    let rest = logical[key_end..].trim_start_matches(is_blank);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    (&logical[..key_end], rest.trim_start_matches(is_blank))
}

fn unescape(raw: &str, line: usize) -> StoreResult<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    let mut high_surrogate: Option<u16> = None;

    while let Some(c) = chars.next() {
        let decoded = if c == '\\' {
            match chars.next() {
                Some('t') => '\t',
                Some('n') => '\n',
                Some('r') => '\r',
                Some('f') => '\x0c',
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    if hex.len() != 4 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
                        return Err(StoreError::format(line, format!("malformed \\u escape: \\u{hex}")));
                    }
                    let unit = u16::from_str_radix(&hex, 16)
                        .map_err(|e| StoreError::format(line, e.to_string()))?;
                    match unit {
                        0xD800..=0xDBFF if high_surrogate.is_none() => {
                            high_surrogate = Some(unit);
                            continue;
                        }
                        0xDC00..=0xDFFF => {
                            let high = high_surrogate.take().ok_or_else(|| {
                                StoreError::format(line, "unpaired low surrogate")
                            })?;
                            char::decode_utf16([high, unit])
                                .next()
                                .and_then(Result::ok)
                                .ok_or_else(|| StoreError::format(line, "invalid surrogate pair"))?
                        }
                        _ => char::from_u32(u32::from(unit))
                            .filter(|_| high_surrogate.is_none())
                            .ok_or_else(|| StoreError::format(line, "unpaired high surrogate"))?,
                    }
                }
                Some(other) => other,
                None => return Err(StoreError::format(line, "dangling backslash")),
            }
        } else {
            c
        };

        if high_surrogate.is_some() {
            return Err(StoreError::format(line, "unpaired high surrogate"));
        }
        out.push(decoded);
    }

    if high_surrogate.is_some() {
        return Err(StoreError::format(line, "unpaired high surrogate"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn serializes_one_line_per_entry_in_order() {
        let text = serialize([("2024-01-05", "abc"), ("2024-01-10", "def")]);
        assert_eq!(text, "2024-01-05=abc\n2024-01-10=def\n");
    }

    #[test]
    fn escapes_separators_and_padding() {
        let text = serialize([("2024-01-05", "gAAAA==")]);
        assert_eq!(text, "2024-01-05=gAAAA\\=\\=\n");
        assert_eq!(deserialize(&text).unwrap(), map(&[("2024-01-05", "gAAAA==")]));
    }

    #[test]
    fn escapes_non_ascii_as_unicode() {
        let text = serialize([("k", "é😀")]);
        assert_eq!(text, "k=\\u00E9\\uD83D\\uDE00\n");
        assert_eq!(deserialize(&text).unwrap(), map(&[("k", "é😀")]));
    }

    #[test]
    fn escapes_key_spaces_and_leading_value_space() {
        let text = serialize([("a b", " x y")]);
        assert_eq!(text, "a\\ b=\\ x y\n");
        assert_eq!(deserialize(&text).unwrap(), map(&[("a b", " x y")]));
    }

    #[test]
    fn empty_input_is_empty_map() {
        assert!(deserialize("").unwrap().is_empty());
        assert!(deserialize("\n\n   \n").unwrap().is_empty());
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "#Mon Jan 01 00:00:00 2024\n! another\n\n2024-01-05=abc\n\n";
        assert_eq!(deserialize(text).unwrap(), map(&[("2024-01-05", "abc")]));
    }

    #[test]
    fn accepts_all_separator_styles() {
        let text = "a=1\nb:2\nc 3\nd = 4\ne\t:\t5\nf\n";
        assert_eq!(
            deserialize(text).unwrap(),
            map(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "5"), ("f", "")])
        );
    }

    #[test]
    fn value_keeps_later_separators_and_trailing_space() {
        assert_eq!(deserialize("k=a=b:c  \n").unwrap(), map(&[("k", "a=b:c  ")]));
    }

    #[test]
    fn handles_crlf_and_cr_line_endings() {
        let text = "a=1\r\nb=2\rc=3";
        assert_eq!(deserialize(text).unwrap(), map(&[("a", "1"), ("b", "2"), ("c", "3")]));
    }

    #[test]
    fn joins_continuation_lines() {
        let text = "k=first \\\n    second\nother=x\n";
        assert_eq!(
            deserialize(text).unwrap(),
            map(&[("k", "first second"), ("other", "x")])
        );
    }

    #[test]
    fn even_backslashes_do_not_continue() {
        assert_eq!(deserialize("k=a\\\\\nj=b\n").unwrap(), map(&[("k", "a\\"), ("j", "b")]));
    }

    #[test]
    fn later_duplicate_wins() {
        assert_eq!(deserialize("k=1\nk=2\n").unwrap(), map(&[("k", "2")]));
    }

    #[test]
    fn parse_reports_start_lines() {
        let props = parse("# header\n\na=1\nb=two \\\n  lines\nc=3\n").unwrap();
        let lines: Vec<usize> = props.iter().map(|p| p.line).collect();
        assert_eq!(lines, vec![3, 4, 6]);
    }

    #[test]
    fn malformed_unicode_escape_is_format_error() {
        for bad in ["k=\\u12", "k=\\u12G4", "k=\\u+123"] {
            match deserialize(bad) {
                Err(StoreError::Format { line: 1, .. }) => {}
                other => panic!("{bad:?} gave {other:?}"),
            }
        }
    }

    #[test]
    fn unpaired_surrogates_are_format_errors() {
        assert!(matches!(deserialize("k=\\uD83D"), Err(StoreError::Format { .. })));
        assert!(matches!(deserialize("k=\\uDE00"), Err(StoreError::Format { .. })));
        assert!(matches!(deserialize("k=\\uD83Dx"), Err(StoreError::Format { .. })));
    }

    #[test]
    fn dangling_continuation_is_format_error() {
        assert!(matches!(
            deserialize("a=1\nk=value\\"),
            Err(StoreError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_file(&dir.path().join("absent.properties"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn read_invalid_utf8_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.properties");
        std::fs::write(&path, b"a=1\nb=\xff\n").unwrap();
        assert!(matches!(read_file(&path), Err(StoreError::Format { line: 2, .. })));
    }

    #[test]
    fn write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("j.properties");
        write_file(&path, [("2024-03-01", "tok=en")]).unwrap();
        let props = read_file(&path).unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].key, "2024-03-01");
        assert_eq!(props[0].value, "tok=en");
    }

    #[test]
    fn line_breaks_and_controls_stay_on_one_line() {
        let value = "line one\nline two\r\nend \\\x00\x7f";
        let text = serialize([("k\r\n", value)]);
        assert_eq!(text.lines().count(), 1);
        assert_eq!(deserialize(&text).unwrap(), map(&[("k\r\n", value)]));
    }

    proptest! {
        #[test]
        fn codec_roundtrip_is_lossless(entries in prop::collection::btree_map("(?s).*", "(?s).*", 0..8)) {
            let text = serialize(entries.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            prop_assert_eq!(deserialize(&text).unwrap(), entries);
        }
    }
}
