use std::fmt;

use crate::utils::percent_encode;

/// Ordered query parameters: name to optional value.
///
/// A parameter without `=` has no value. Inserting an existing name replaces
/// its value in place, so the original order is kept for reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string such as `a=1&b&c=3`.
    ///
    /// A leading `?` is ignored, pairs are split on `&` and then on the first
    /// `=`, empty pairs are skipped. No percent-decoding is applied.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value.to_string())),
                None => (pair.to_string(), None),
            })
            .collect()
    }

    /// Returns `Some(value)` when the parameter exists, the inner option being its value.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.pairs.iter().find(|(n, _)| n == name).map(|(_, value)| value.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(n, _)| n == name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.pairs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Option<String>> {
        let index = self.pairs.iter().position(|(n, _)| n == name)?;
        Some(self.pairs.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.pairs.iter().map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Serializes as `&`-joined `key[=value]` pairs, percent-encoding names and values.
///
/// The `=` is left out when a parameter has no value or an empty one.
impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, value)) in self.pairs.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }
            f.write_str(&percent_encode(name))?;
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                write!(f, "={}", percent_encode(value))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pairs() {
        let params = QueryParams::parse("?author=yvan&draft&&page=2");
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("author"), Some(Some("yvan")));
        assert_eq!(params.get("draft"), Some(None));
        assert_eq!(params.get("page"), Some(Some("2")));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn value_keeps_later_equals() {
        let params = QueryParams::parse("expr=a=b");
        assert_eq!(params.get("expr"), Some(Some("a=b")));
    }

    #[test]
    fn duplicate_replaces_in_place() {
        let params = QueryParams::parse("a=1&b=2&a=3");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", Some("3")), ("b", Some("2"))]);
    }

    #[test]
    fn serialize_encodes() {
        let params = QueryParams::parse("q=rust lang&flag&empty=&x=a/b");
        assert_eq!(params.to_string(), "q=rust%20lang&flag&empty&x=a%2Fb");
    }

    #[test]
    fn remove_param() {
        let mut params = QueryParams::parse("a=1&b");
        assert_eq!(params.remove("b"), Some(None));
        assert_eq!(params.remove("b"), None);
        assert_eq!(params.to_string(), "a=1");
    }
}
