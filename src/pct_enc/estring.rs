use super::{encoder::FormKeyValue, encoder::Query, Assert, EStr, Encode, EncodedChunk, Encoder};
use alloc::{borrow::ToOwned, collections::BTreeMap, string::String, vec::Vec};
use core::{borrow::Borrow, cmp::Ordering, fmt, hash, marker::PhantomData, ops::Deref};

/// A percent-encoded, growable string.
///
/// The borrowed counterpart of `EString` is [`EStr`].
/// See its documentation for the meaning of the type parameter `E`.
///
/// An `EString<Query>` is what the crate calls a *query string*: a query
/// component that is already escaped and is embedded verbatim wherever it is used.
///
/// # Examples
///
/// Encode a path whose segments may contain the slash (`'/'`) character:
///
/// ```
/// use webform::pct_enc::{encoder::{Path, PathSegment}, EString};
///
/// let mut path = EString::<Path>::new();
/// path.push('/');
/// path.encode_str::<PathSegment>("foo/bar baz");
///
/// assert_eq!(path, "/foo%2Fbar%20baz");
/// ```
#[derive(Clone, Default)]
pub struct EString<E: Encoder> {
    pub(crate) buf: String,
    encoder: PhantomData<E>,
}

impl<E: Encoder> Deref for EString<E> {
    type Target = EStr<E>;

    fn deref(&self) -> &EStr<E> {
        EStr::new_validated(&self.buf)
    }
}

impl<E: Encoder> EString<E> {
    pub(crate) fn new_validated(buf: String) -> Self {
        Self {
            buf,
            encoder: PhantomData,
        }
    }

    /// Creates a new empty `EString`.
    #[must_use]
    pub fn new() -> Self {
        Self::new_validated(String::new())
    }

    /// Creates a new empty `EString` with at least the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new_validated(String::with_capacity(capacity))
    }

    /// Coerces to an `EStr` slice.
    #[must_use]
    pub fn as_estr(&self) -> &EStr<E> {
        self
    }

    /// Encodes a string with a sub-encoder and appends the result onto the end of this `EString`.
    ///
    /// A character will be preserved if `SubE::TABLE` [allows] it; each byte of
    /// its UTF-8 encoding will be percent-encoded otherwise.
    ///
    /// [allows]: super::Table::allows
    ///
    /// # Panics
    ///
    /// Panics at compile time if `SubE` is not a [sub-encoder](Encoder#sub-encoders) of `E`,
    /// or if `SubE::TABLE` does not [allow percent-encoded octets].
    ///
    /// [allow percent-encoded octets]: super::Table::allows_pct_encoded
    pub fn encode_str<SubE: Encoder>(&mut self, s: &str) {
        () = Assert::<SubE, E>::L_IS_SUB_ENCODER_OF_R;
        () = EStr::<SubE>::ASSERT_ALLOWS_PCT_ENCODED;

        for chunk in Encode::new(SubE::TABLE, s) {
            self.buf.push_str(chunk.as_str());
        }
    }

    /// Appends an unencoded character onto the end of this `EString`.
    ///
    /// # Panics
    ///
    /// Panics if `E::TABLE` does not [allow] the character.
    ///
    /// [allow]: super::Table::allows
    pub fn push(&mut self, ch: char) {
        assert!(E::TABLE.allows(ch), "table does not allow the char");
        self.buf.push(ch);
    }

    /// Appends an `EStr` slice onto the end of this `EString`.
    pub fn push_estr(&mut self, s: &EStr<E>) {
        self.buf.push_str(s.as_str());
    }

    /// Truncates this `EString`, removing all contents.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Consumes this `EString` and yields the underlying `String`.
    #[must_use]
    pub fn into_string(self) -> String {
        self.buf
    }
}

/// A value in a form map passed to [`EString::<Query>::from_form_map`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormValue {
    /// A single value.
    Scalar(String),
    /// Multiple values for the same key, in order.
    Array(Vec<String>),
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_owned())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl<T: Into<String>> From<Vec<T>> for FormValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Extension methods for query strings.
impl EString<Query> {
    /// Encodes a form key or value and appends the result onto the end of this `EString`.
    ///
    /// Everything outside the [`FormKeyValue`] table is percent-encoded,
    /// then each space is serialized as `"+"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use webform::pct_enc::{encoder::Query, EString};
    ///
    /// let mut buf = EString::<Query>::new();
    /// buf.push_form_component("a b+c&d");
    /// assert_eq!(buf, "a+b%2Bc%26d");
    /// ```
    pub fn push_form_component(&mut self, s: &str) {
        for chunk in Encode::new(<FormKeyValue as Encoder>::TABLE, s) {
            match chunk {
                EncodedChunk::Unencoded(s) => {
                    self.buf.extend(s.chars().map(|ch| if ch == ' ' { '+' } else { ch }));
                }
                EncodedChunk::PctEncoded(s) => self.buf.push_str(s),
            }
        }
    }

    /// Builds a form query from key-value pairs, keeping their order.
    ///
    /// # Panics
    ///
    /// Panics if the separator is neither `'&'` nor `';'`.
    ///
    /// # Examples
    ///
    /// ```
    /// use webform::pct_enc::{encoder::Query, EString};
    ///
    /// let q = EString::<Query>::from_form_pairs([("b", "1"), ("a", "x y")], ';');
    /// assert_eq!(q, "b=1;a=x+y");
    /// ```
    pub fn from_form_pairs<I, K, V>(pairs: I, sep: char) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        assert!(sep == '&' || sep == ';', "invalid form separator");
        let mut buf = Self::new();
        for (k, v) in pairs {
            if !buf.is_empty() {
                buf.push(sep);
            }
            buf.push_form_component(k.as_ref());
            buf.push('=');
            buf.push_form_component(v.as_ref());
        }
        buf
    }

    /// Builds a form query from a map, in key order.
    ///
    /// Each element of an array value yields its own pair.
    ///
    /// # Panics
    ///
    /// Panics if the separator is neither `'&'` nor `';'`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use webform::pct_enc::{encoder::Query, EString, FormValue};
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("b".to_owned(), FormValue::from("2"));
    /// map.insert("a".to_owned(), FormValue::from(vec!["x", "y"]));
    /// assert_eq!(EString::<Query>::from_form_map(&map, ';'), "a=x;a=y;b=2");
    /// ```
    pub fn from_form_map(map: &BTreeMap<String, FormValue>, sep: char) -> Self {
        let pairs = map.iter().flat_map(|(k, v)| {
            let values = match v {
                FormValue::Scalar(v) => core::slice::from_ref(v),
                FormValue::Array(vs) => vs.as_slice(),
            };
            values.iter().map(move |v| (k, v))
        });
        Self::from_form_pairs(pairs, sep)
    }
}

impl<E: Encoder> AsRef<EStr<E>> for EString<E> {
    fn as_ref(&self) -> &EStr<E> {
        self
    }
}

impl<E: Encoder> AsRef<str> for EString<E> {
    fn as_ref(&self) -> &str {
        &self.buf
    }
}

impl<E: Encoder> Borrow<EStr<E>> for EString<E> {
    fn borrow(&self) -> &EStr<E> {
        self
    }
}

impl<E: Encoder> From<&EStr<E>> for EString<E> {
    fn from(s: &EStr<E>) -> Self {
        s.to_owned()
    }
}

impl<E: Encoder> PartialEq for EString<E> {
    fn eq(&self, other: &Self) -> bool {
        self.buf == other.buf
    }
}

impl<E: Encoder> PartialEq<EStr<E>> for EString<E> {
    fn eq(&self, other: &EStr<E>) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<E: Encoder> PartialEq<str> for EString<E> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<E: Encoder> PartialEq<&str> for EString<E> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<E: Encoder> Eq for EString<E> {}

impl<E: Encoder> hash::Hash for EString<E> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.buf.hash(state);
    }
}

impl<E: Encoder> PartialOrd for EString<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E: Encoder> Ord for EString<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.buf.cmp(&other.buf)
    }
}

impl<E: Encoder> fmt::Debug for EString<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<E: Encoder> fmt::Display for EString<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}
