//! URI references.

use crate::{
    parse::{self, Meta, ParseError},
    pct_enc::{
        encoder::{Fragment, Path, Query},
        EStr,
    },
    resolve::{self, ResolveError},
};
use alloc::{borrow::ToOwned, string::String};
use borrow_or_share::{BorrowOrShare, Bos};
use core::{fmt, hash, str::FromStr};

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A [URI reference] defined in RFC 3986.
///
/// [URI reference]: https://datatracker.ietf.org/doc/html/rfc3986/#section-4.1
///
/// # Variants
///
/// - `UriRef<&str>`: borrowed.
/// - `UriRef<String>`: owned.
///
/// # Examples
///
/// ```
/// use webform::UriRef;
///
/// let base = UriRef::parse("http://example.com/foo/bar.cgi")?;
/// let r = UriRef::parse("../baz?q#top")?;
///
/// assert_eq!(r.path(), "../baz");
/// assert_eq!(r.query().unwrap(), "q");
/// assert_eq!(r.fragment().unwrap(), "top");
/// assert_eq!(r.resolve_against(&base).unwrap(), "http://example.com/baz?q#top");
/// # Ok::<_, webform::ParseError>(())
/// ```
#[derive(Clone, Copy)]
pub struct UriRef<T> {
    val: T,
    meta: Meta,
}

impl<'a> UriRef<&'a str> {
    /// Parses a URI reference from a string slice.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string does not match the
    /// [`URI-reference`][abnf] ABNF rule from RFC 3986.
    ///
    /// [abnf]: https://datatracker.ietf.org/doc/html/rfc3986/#section-4.1
    pub fn parse(s: &'a str) -> Result<Self, ParseError> {
        let meta = parse::parse(s.as_bytes())?;
        Ok(Self { val: s, meta })
    }

    /// Creates a new `UriRef<String>` by cloning the contents of this `UriRef<&str>`.
    #[must_use]
    pub fn to_owned(&self) -> UriRef<String> {
        UriRef {
            val: self.val.to_owned(),
            meta: self.meta,
        }
    }
}

impl UriRef<String> {
    /// Parses a URI reference from an owned string.
    ///
    /// # Errors
    ///
    /// Returns `Err` along with the string if it is not a valid URI reference.
    pub fn parse_from(s: String) -> Result<Self, (ParseError, String)> {
        match parse::parse(s.as_bytes()) {
            Ok(meta) => Ok(Self { val: s, meta }),
            Err(e) => Err((e, s)),
        }
    }

    pub(crate) fn new_validated(val: String, meta: Meta) -> Self {
        debug_assert_eq!(parse::parse(val.as_bytes()), Ok(meta));
        Self { val, meta }
    }

    /// Borrows this `UriRef<String>` as `UriRef<&str>`.
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn borrow(&self) -> UriRef<&str> {
        UriRef {
            val: &self.val,
            meta: self.meta,
        }
    }

    /// Consumes this `UriRef<String>` and yields the underlying [`String`].
    #[must_use]
    pub fn into_string(self) -> String {
        self.val
    }
}

impl<'i, 'o, T: BorrowOrShare<'i, 'o, str>> UriRef<T> {
    /// Returns the URI reference as a string slice.
    #[must_use]
    pub fn as_str(&'i self) -> &'o str {
        self.val.borrow_or_share()
    }

    fn slice(&'i self, start: usize, end: usize) -> &'o str {
        &self.as_str()[start..end]
    }

    /// Returns the optional [scheme] component, without the trailing colon.
    ///
    /// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986/#section-3.1
    #[must_use]
    pub fn scheme(&'i self) -> Option<&'o str> {
        let end = self.meta.scheme_end?.get();
        Some(self.slice(0, end))
    }

    /// Returns the optional [authority] component, without the leading `"//"`.
    ///
    /// [authority]: https://datatracker.ietf.org/doc/html/rfc3986/#section-3.2
    #[must_use]
    pub fn authority(&'i self) -> Option<&'o str> {
        let (start, end) = self.meta.auth_bounds?;
        Some(self.slice(start, end))
    }

    /// Returns the [path] component.
    ///
    /// [path]: https://datatracker.ietf.org/doc/html/rfc3986/#section-3.3
    #[must_use]
    pub fn path(&'i self) -> &'o EStr<Path> {
        let (start, end) = self.meta.path_bounds;
        EStr::new_validated(self.slice(start, end))
    }

    /// Returns the optional [query] component, without the leading `"?"`.
    ///
    /// [query]: https://datatracker.ietf.org/doc/html/rfc3986/#section-3.4
    #[must_use]
    pub fn query(&'i self) -> Option<&'o EStr<Query>> {
        let end = self.meta.query_end?.get();
        Some(EStr::new_validated(
            self.slice(self.meta.path_bounds.1 + 1, end),
        ))
    }

    /// Returns the optional [fragment] component, without the leading `"#"`.
    ///
    /// [fragment]: https://datatracker.ietf.org/doc/html/rfc3986/#section-3.5
    #[must_use]
    pub fn fragment(&'i self) -> Option<&'o EStr<Fragment>> {
        let start = self.meta.query_or_path_end();
        let len = self.as_str().len();
        (start != len).then(|| EStr::new_validated(self.slice(start + 1, len)))
    }
}

impl<T: Bos<str>> UriRef<T> {
    /// Checks whether a scheme component is present.
    #[must_use]
    pub fn has_scheme(&self) -> bool {
        self.meta.scheme_end.is_some()
    }

    /// Checks whether an authority component is present.
    #[must_use]
    pub fn has_authority(&self) -> bool {
        self.meta.auth_bounds.is_some()
    }

    /// Checks whether a query component is present.
    #[must_use]
    pub fn has_query(&self) -> bool {
        self.meta.query_end.is_some()
    }

    /// Checks whether a fragment component is present.
    #[must_use]
    pub fn has_fragment(&self) -> bool {
        self.meta.query_or_path_end() != self.as_str().len()
    }

    /// Resolves the URI reference against the given base URI.
    ///
    /// The [reference resolution] algorithm of RFC 3986 is applied, with
    /// dot segments removed from the output path.
    ///
    /// [reference resolution]: https://datatracker.ietf.org/doc/html/rfc3986/#section-5.2
    ///
    /// # Errors
    ///
    /// Returns `Err` if the base has no scheme or has a fragment.
    pub fn resolve_against<U: Bos<str>>(
        &self,
        base: &UriRef<U>,
    ) -> Result<UriRef<String>, ResolveError> {
        resolve::resolve(base.borrow_ref(), self.borrow_ref())
    }

    pub(crate) fn borrow_ref(&self) -> UriRef<&str> {
        UriRef {
            val: self.as_str(),
            meta: self.meta,
        }
    }
}

impl FromStr for UriRef<String> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UriRef::parse(s).map(|r| r.to_owned())
    }
}

impl<T: Bos<str>> fmt::Debug for UriRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UriRef")
            .field("scheme", &self.scheme())
            .field("authority", &self.authority())
            .field("path", &self.path())
            .field("query", &self.query())
            .field("fragment", &self.fragment())
            .finish()
    }
}

impl<T: Bos<str>> fmt::Display for UriRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl<T: Bos<str>, U: Bos<str>> PartialEq<UriRef<U>> for UriRef<T> {
    fn eq(&self, other: &UriRef<U>) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<T: Bos<str>> PartialEq<str> for UriRef<T> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<T: Bos<str>> PartialEq<&str> for UriRef<T> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<T: Bos<str>> Eq for UriRef<T> {}

impl<T: Bos<str>> hash::Hash for UriRef<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl<T: Bos<str>> AsRef<str> for UriRef<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(feature = "serde")]
impl<T: Bos<str>> Serialize for UriRef<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for UriRef<&'de str> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        UriRef::parse(s).map_err(|e| {
            de::Error::custom(format_args!("failed to parse {s:?} as URI reference: {e}"))
        })
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for UriRef<String> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UriRef::parse_from(s).map_err(|(e, s)| {
            de::Error::custom(format_args!("failed to parse {s:?} as URI reference: {e}"))
        })
    }
}
