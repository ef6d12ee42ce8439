//! Case-insensitive, ordered, multi-value header storage.
//!
//! Header names keep the spelling they were supplied with, lookups ignore
//! ASCII case. A single string value is normalized into several stored values
//! following [`split_header_value`].

use http::{HeaderName, HeaderValue};

use crate::utils::ensure;
use crate::{MessageError, Result};

/// A header value as supplied by the caller: one line or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderInput {
    Line(String),
    List(Vec<String>),
}

impl From<&str> for HeaderInput {
    fn from(value: &str) -> Self {
        HeaderInput::Line(value.to_string())
    }
}

impl From<String> for HeaderInput {
    fn from(value: String) -> Self {
        HeaderInput::Line(value)
    }
}

impl From<Vec<String>> for HeaderInput {
    fn from(values: Vec<String>) -> Self {
        HeaderInput::List(values)
    }
}

impl From<Vec<&str>> for HeaderInput {
    fn from(values: Vec<&str>) -> Self {
        HeaderInput::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for HeaderInput {
    fn from(values: &[&str]) -> Self {
        HeaderInput::List(values.iter().map(|v| (*v).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for HeaderInput {
    fn from(values: [&str; N]) -> Self {
        HeaderInput::List(values.iter().map(|v| (*v).to_string()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    values: Vec<String>,
}

/// Ordered mapping of header names to value lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBag {
    entries: Vec<HeaderEntry>,
}

impl HeaderBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the values of a header, ignoring case.
    pub fn find(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|index| self.entries[index].values.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the values joined by `,`, or an empty string if the header is absent.
    pub fn line(&self, name: &str) -> String {
        self.find(name).map(|values| values.join(",")).unwrap_or_default()
    }

    /// Iterates over `(name, values)` in insertion order, names as supplied.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|entry| (entry.name.as_str(), entry.values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a bag where `name` holds exactly the normalized `value`.
    ///
    /// An existing header matched case-insensitively keeps its position and
    /// takes the new spelling of the name.
    ///
    /// # Errors
    ///
    /// Returns a validation error for names that are not HTTP tokens and for
    /// values holding control characters.
    pub fn with(&self, name: &str, value: impl Into<HeaderInput>) -> Result<Self> {
        validate_name(name)?;
        let values = match value.into() {
            HeaderInput::List(values) => values,
            HeaderInput::Line(line) => split_header_value(name, &line),
        };
        validate_values(&values)?;

        let mut entries = self.entries.clone();
        let entry = HeaderEntry { name: name.to_string(), values };
        match self.position(name) {
            Some(index) => entries[index] = entry,
            None => entries.push(entry),
        }
        Ok(Self { entries })
    }

    /// Returns a bag where `value` is appended to the values of `name`.
    ///
    /// A single line is appended as one value, without splitting.
    ///
    /// # Errors
    ///
    /// Fails on an invalid header name or value.
    pub fn with_added(&self, name: &str, value: impl Into<HeaderInput>) -> Result<Self> {
        validate_name(name)?;
        let values = match value.into() {
            HeaderInput::List(values) => values,
            HeaderInput::Line(line) => vec![line],
        };
        validate_values(&values)?;

        let mut entries = self.entries.clone();
        match self.position(name) {
            Some(index) => entries[index].values.extend(values),
            None => entries.push(HeaderEntry { name: name.to_string(), values }),
        }
        Ok(Self { entries })
    }

    /// Returns a bag without `name`; an equal bag when the header is absent.
    pub fn without(&self, name: &str) -> Self {
        let entries = self.entries.iter().filter(|entry| !entry.name.eq_ignore_ascii_case(name)).cloned().collect();
        Self { entries }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name.eq_ignore_ascii_case(name))
    }
}

/// Splits a single header line into stored values.
///
/// When the line holds a `;`, or a `,` preceded by some character on the same
/// line, and the header name does not contain `Date` or `Expires` (ignoring
/// case), the line is split on every `,` and `;`. Otherwise it is only split on
/// line breaks, so `Expires: Tue, 15 Nov 1994 08:12:31 GMT` stays one value.
/// Values are not trimmed.
pub fn split_header_value(name: &str, line: &str) -> Vec<String> {
    if has_separated_segments(line) && !is_date_like(name) {
        line.split([',', ';']).map(str::to_string).collect()
    } else {
        line.split('\n').map(|value| value.strip_suffix('\r').unwrap_or(value).to_string()).collect()
    }
}

fn has_separated_segments(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.iter().enumerate().any(|(index, &b)| match b {
        b';' => true,
        b',' => index > 0 && bytes[index - 1] != b'\n',
        _ => false,
    })
}

fn is_date_like(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.contains("date") || name.contains("expires")
}

fn validate_name(name: &str) -> Result<()> {
    HeaderName::from_bytes(name.as_bytes())
        .map(|_| ())
        .map_err(|_e| MessageError::validation(format!("[{name}] is not a valid header name")))
}

fn validate_values(values: &[String]) -> Result<()> {
    for value in values {
        ensure!(
            HeaderValue::from_str(value).is_ok(),
            MessageError::validation(format!("[{}] is not a valid header value", value.escape_debug()))
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag() -> HeaderBag {
        HeaderBag::new()
            .with("Accept-Encoding", ["gzip", "compress"])
            .unwrap()
            .with("Content-Encoding", "gzip")
            .unwrap()
            .with("Accept", vec!["en-gb", "fr"])
            .unwrap()
    }

    #[test]
    fn lookup_ignores_case() {
        let bag = HeaderBag::new().with("Content-Type", "x").unwrap();
        assert!(bag.contains("content-type"));
        assert!(bag.contains("CONTENT-TYPE"));
        assert_eq!(bag.find("content-TYPE"), Some(&["x".to_string()][..]));
        assert_eq!(bag.line("content-type"), "x");
        assert!(!bag.contains("Content-Length"));
        assert_eq!(bag.line("Content-Length"), "");
    }

    #[test]
    fn list_stored_verbatim() {
        let bag = bag();
        assert_eq!(bag.find("Accept").unwrap(), ["en-gb", "fr"]);
        assert_eq!(bag.line("Accept-Encoding"), "gzip,compress");
    }

    #[test]
    fn line_split_on_comma_and_semicolon() {
        let bag = HeaderBag::new().with("Accept", "text/html,application/xml;q=0.9").unwrap();
        assert_eq!(bag.find("Accept").unwrap(), ["text/html", "application/xml", "q=0.9"]);
        assert_eq!(bag.line("Accept"), "text/html,application/xml,q=0.9");
    }

    #[test]
    fn comma_join_round_trip() {
        let bag = HeaderBag::new().with("Cache-Control", "no-cache, no-store").unwrap();
        assert_eq!(bag.find("Cache-Control").unwrap(), ["no-cache", " no-store"]);
        assert_eq!(bag.line("Cache-Control"), "no-cache, no-store");
    }

    #[test]
    fn date_like_headers_not_split() {
        let date = "Tue, 15 Nov 1994 08:12:31 GMT";
        for name in ["Expires", "Date", "Last-Date-Seen", "expires"] {
            let bag = HeaderBag::new().with(name, date).unwrap();
            assert_eq!(bag.find(name).unwrap(), [date], "{name} should not be split");
            assert_eq!(bag.line(name), date);
        }
    }

    #[test]
    fn leading_comma_not_split() {
        let bag = HeaderBag::new().with("X-Token", ",abc").unwrap();
        assert_eq!(bag.find("X-Token").unwrap(), [",abc"]);
    }

    #[test]
    fn multi_line_value_split_on_newlines() {
        let bag = HeaderBag::new().with("Expires", "Tue, 15 Nov\r\nWed, 16 Nov").unwrap();
        assert_eq!(bag.find("Expires").unwrap(), ["Tue, 15 Nov", "Wed, 16 Nov"]);
    }

    #[test]
    fn replace_keeps_position() {
        let bag = bag().with("accept-encoding", ["compress", "gzip"]).unwrap();
        let names: Vec<_> = bag.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["accept-encoding", "Content-Encoding", "Accept"]);
        assert_eq!(bag.line("Accept-Encoding"), "compress,gzip");
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn added_header_appends() {
        let original = bag();
        let bag = original.with_added("accept-encoding", "identity").unwrap();
        assert_eq!(bag.find("Accept-Encoding").unwrap(), ["gzip", "compress", "identity"]);
        assert_eq!(original.find("Accept-Encoding").unwrap(), ["gzip", "compress"]);

        let bag = bag.with_added("X-Trace", ["a", "b"]).unwrap();
        assert_eq!(bag.find("x-trace").unwrap(), ["a", "b"]);
    }

    #[test]
    fn without_header() {
        let bag = bag().without("content-encoding");
        assert!(!bag.contains("Content-Encoding"));
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.without("X-Missing"), bag);
    }

    #[test]
    fn invalid_name_rejected() {
        for bad in ["", "Bad Name", "X:Y", "Ünicode"] {
            assert!(HeaderBag::new().with(bad, "v").unwrap_err().is_validation(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn control_characters_rejected() {
        let error = HeaderBag::new().with_added("X-Injected", "a\r\nSet-Cookie: b").unwrap_err();
        assert!(error.is_validation());
        assert!(HeaderBag::new().with("X-Null", vec!["a\0b"]).unwrap_err().is_validation());
    }
}
