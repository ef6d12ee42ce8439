//! Utility macros and functions shared by the message types.
//!
//! This module provides helper macros and functions that are used internally
//! by the crate implementation.

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
/// It's useful for validation checks where you want to return early with an error
/// if some condition is not satisfied.
///
/// # Arguments
///
/// * `$predicate` - A boolean expression that should evaluate to true
/// * `$error` - The error value to return if the predicate is false
///
/// # Example
///
/// ```ignore
/// ensure!(stream.is_seekable(), MessageError::validation("the body is not seekable"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything outside the RFC 3986 unreserved set `A-Z a-z 0-9 - _ . ~`.
const NON_UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

pub(crate) fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, NON_UNRESERVED).to_string()
}

/// Returns true for the characters a regex `\w` matches in ASCII mode.
#[inline]
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_unreserved() {
        assert_eq!(percent_encode("books-15_a.b~c"), "books-15_a.b~c");
    }

    #[test]
    fn encodes_reserved_and_utf8() {
        assert_eq!(percent_encode("a b/c?"), "a%20b%2Fc%3F");
        assert_eq!(percent_encode("é"), "%C3%A9");
        assert_eq!(percent_encode("100%"), "100%25");
    }
}
