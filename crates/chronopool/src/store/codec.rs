//! Line-oriented text encoding of a pool.
//!
//! One decimal identifier per line, lines joined by `\n`, no terminator after
//! the last entry. Decoding also accepts `\r\n` and a single trailing line
//! terminator, but never a blank or non-numeric line: corruption must not be
//! mistaken for the [`NO_ID`](crate::NO_ID) sentinel.

use core::fmt::Write;

use crate::{Error, NO_ID, Result};

/// Encodes identifiers one per line, without a trailing newline.
///
/// ```
/// assert_eq!(chronopool::encode_ids(&[3, 1, 2]), "3\n1\n2");
/// assert_eq!(chronopool::encode_ids(&[]), "");
/// ```
pub fn encode_ids(ids: &[u64]) -> String {
    // Up to 7 digits plus a separator for the default range.
    let mut out = String::with_capacity(ids.len() * 8);
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{id}");
    }
    out
}

/// Decodes the output of [`encode_ids`].
///
/// # Errors
///
/// Returns [`Error::Parse`] with the 1-based line number for any line that is
/// not a positive decimal integer.
///
/// ```
/// use chronopool::{Error, decode_ids};
///
/// assert_eq!(decode_ids("3\n1\n2").unwrap(), [3, 1, 2]);
/// assert!(matches!(decode_ids("3\nx\n2"), Err(Error::Parse { line: 2, .. })));
/// ```
pub fn decode_ids(text: &str) -> Result<Vec<u64>> {
    text.lines()
        .enumerate()
        .map(|(i, line)| match line.parse::<u64>() {
            Ok(id) if id != NO_ID => Ok(id),
            _ => Err(Error::Parse {
                line: i + 1,
                content: line.to_owned(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_without_trailing_newline() {
        let text = encode_ids(&[100_003, 100_000, 100_002]);
        assert_eq!(text, "100003\n100000\n100002");
    }

    #[test]
    fn decodes_in_file_order() {
        let ids = decode_ids("100003\n100000\n100002\n100004\n100001").unwrap();
        assert_eq!(ids, [100_003, 100_000, 100_002, 100_004, 100_001]);
    }

    #[test]
    fn empty_text_is_an_empty_pool() {
        assert!(decode_ids("").unwrap().is_empty());
    }

    #[test]
    fn tolerates_crlf_and_one_trailing_newline() {
        assert_eq!(decode_ids("7\r\n8\r\n").unwrap(), [7, 8]);
        assert_eq!(decode_ids("7\n8\n").unwrap(), [7, 8]);
    }

    #[test]
    fn blank_interior_line_is_rejected() {
        let err = decode_ids("7\n\n8").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, ref content } if content.is_empty()));
    }

    #[test]
    fn garbage_and_sentinel_are_rejected() {
        assert!(matches!(
            decode_ids("12\nabc"),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(decode_ids("0"), Err(Error::Parse { line: 1, .. })));
        assert!(matches!(decode_ids("-4"), Err(Error::Parse { line: 1, .. })));
        assert!(matches!(decode_ids(" 4"), Err(Error::Parse { line: 1, .. })));
    }
}
