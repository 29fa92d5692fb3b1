//! BIP32-style derivation path parsing.

use crate::errors::{Error, Result};

/// The index of the first hardened child key.
pub const FIRST_HARDENED_CHILD: u32 = 0x8000_0000;

/// Parse a derivation path of the form `[m/]segment(/segment)*`.
///
/// A segment is a decimal non-negative integer, optionally suffixed with `'`
/// or `H` for a hardened index (`2^31 + n`). Whitespace is ignored; a leading
/// `m`, `/m`, or `/` is stripped. The empty path, `m` and `/m/` all parse to
/// an empty index list.
pub fn parse_path(path: &str) -> Result<Vec<u32>> {
    let cleaned: String = path.chars().filter(|c| !c.is_whitespace()).collect();
    let mut rest = cleaned.as_str();
    rest = rest.strip_prefix('m').unwrap_or(rest);
    rest = rest.strip_prefix("/m").unwrap_or(rest);
    rest = rest.strip_prefix('/').unwrap_or(rest);

    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let mut indexes = Vec::new();
    for segment in rest.split('/') {
        if segment.is_empty() {
            return Err(Error::MalformedPath(format!("empty segment in {path:?}")));
        }
        let (digits, hardened) = match segment.strip_suffix(['\'', 'H']) {
            Some(digits) => (digits, true),
            None => (segment, false),
        };
        let n: u32 = digits
            .parse()
            .map_err(|_| Error::MalformedPath(format!("invalid segment {segment:?}")))?;
        let index = if hardened {
            FIRST_HARDENED_CHILD
                .checked_add(n)
                .ok_or_else(|| Error::MalformedPath(format!("hardened index {n} out of range")))?
        } else {
            n
        };
        indexes.push(index);
    }
    Ok(indexes)
}

/// Render an index list in canonical form, `'`-suffixing hardened indices.
pub fn format_path(indexes: &[u32]) -> String {
    indexes
        .iter()
        .map(|&i| {
            if i >= FIRST_HARDENED_CHILD {
                format!("{}'", i - FIRST_HARDENED_CHILD)
            } else {
                format!("{i}")
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalent_spellings_parse_identically() {
        let expected = vec![2147483692, 2147483648, 2147483648, 0, 0];
        for path in [
            "m/44'/0'/0'/0/0",
            " m / 44H / 0H / 0H / 0 / 0 ",
            "44'/0'/0'/0/0",
        ] {
            assert_eq!(parse_path(path).unwrap(), expected, "path {path:?}");
        }
    }

    #[test]
    fn empty_forms_parse_to_no_indexes() {
        for path in ["", "m", "/m/", "  m  "] {
            assert!(parse_path(path).unwrap().is_empty(), "path {path:?}");
        }
    }

    #[test]
    fn empty_segment_is_malformed() {
        for path in ["m//0", "0//1", "m/0/"] {
            assert!(matches!(
                parse_path(path).unwrap_err(),
                Error::MalformedPath(_)
            ));
        }
    }

    #[test]
    fn non_numeric_segment_is_malformed() {
        for path in ["m/x", "m/0x1", "m/-1", "m/''"] {
            assert!(parse_path(path).is_err(), "path {path:?}");
        }
    }

    #[test]
    fn hardened_index_overflow_is_malformed() {
        assert!(parse_path("m/2147483648'").is_err());
        assert_eq!(parse_path("m/2147483647'").unwrap(), vec![u32::MAX]);
    }

    #[test]
    fn canonical_reserialization() {
        for path in ["44'/0'/0'/0/0", "0/1/2", "2147483647'"] {
            let indexes = parse_path(path).unwrap();
            assert_eq!(format_path(&indexes), path);
            assert_eq!(parse_path(&format_path(&indexes)).unwrap(), indexes);
        }
        assert_eq!(format_path(&[]), "");
    }
}
