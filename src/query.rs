//! Submitted form data.

use crate::{
    error::ValidationError,
    pct_enc::{encoder::Query, EStr, EString},
};
use alloc::{string::String, vec::Vec};

/// An ordered list of key-value pairs submitted through an HTML form.
///
/// Duplicate keys are allowed and meaningful, e.g., several checked
/// checkboxes sharing one name. Pairs keep their submission order.
///
/// # Examples
///
/// ```
/// use webform::FormQuery;
///
/// let q = FormQuery::decode("n=a&m=1&n=b")?;
/// assert_eq!(q.get("n"), Some("a"));
/// assert_eq!(q.get_all("n").collect::<Vec<_>>(), ["a", "b"]);
/// assert_eq!(q.keys().collect::<Vec<_>>(), ["n", "m"]);
/// # Ok::<_, webform::ValidationError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FormQuery {
    pairs: Vec<(String, String)>,
}

impl FormQuery {
    /// Creates an empty `FormQuery`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `FormQuery` from key-value pairs, keeping their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Decodes an escaped `application/x-www-form-urlencoded` string.
    ///
    /// See [`EStr::<Query>::decode_form`] for the decoding rules.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidQueryEncoding`] if the string is not
    /// a properly escaped query or does not decode to UTF-8.
    pub fn decode(s: &str) -> Result<Self, ValidationError> {
        EStr::<Query>::new(s)
            .ok_or(ValidationError::InvalidQueryEncoding)?
            .decode_form()
    }

    /// Decodes a raw request body as `application/x-www-form-urlencoded` data.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidQueryEncoding`] on the same conditions
    /// as [`decode`](Self::decode), or if the body is not ASCII.
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        let s = core::str::from_utf8(bytes).map_err(|_| ValidationError::InvalidQueryEncoding)?;
        Self::decode(s)
    }

    /// Appends a pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Checks whether there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns an iterator over the pairs in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the first value submitted for the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Returns all values submitted for the key, in submission order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter().filter(move |(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Returns the distinct keys in order of first appearance.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.pairs.iter().enumerate().filter_map(move |(i, (k, _))| {
            (!self.pairs[..i].iter().any(|(k2, _)| k2 == k)).then_some(k.as_str())
        })
    }

    /// Groups the values by key.
    ///
    /// Keys come in order of first appearance and values in submission order.
    #[must_use]
    pub fn grouped(&self) -> Vec<(&str, Vec<&str>)> {
        let mut out: Vec<(&str, Vec<&str>)> = Vec::new();
        for (k, v) in self.iter() {
            match out.iter_mut().find(|(k2, _)| *k2 == k) {
                Some((_, vs)) => vs.push(v),
                None => out.push((k, alloc::vec![v])),
            }
        }
        out
    }

    /// Encodes the pairs as a query string joined by `sep`.
    ///
    /// # Panics
    ///
    /// Panics if the separator is neither `'&'` nor `';'`.
    #[must_use]
    pub fn encode(&self, sep: char) -> EString<Query> {
        EString::from_form_pairs(self.iter(), sep)
    }

    /// Consumes the `FormQuery` and yields its pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormQuery {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<'a> IntoIterator for &'a FormQuery {
    type Item = (&'a str, &'a str);
    type IntoIter = core::iter::Map<
        core::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let f: fn(&'a (String, String)) -> (&'a str, &'a str) =
            |(k, v)| (k.as_str(), v.as_str());
        self.pairs.iter().map(f)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FormQuery {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FormQuery {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let pairs = Vec::<(String, String)>::deserialize(deserializer)?;
        Ok(Self { pairs })
    }
}
