//! Relative and absolute URI generation for a running script.

use crate::{
    parse::{Meta, ParseError},
    pct_enc::{
        encoder::{Fragment, Path, PathSegment, Query},
        EStr, EString, FormValue,
    },
    request::RequestContext,
    resolve,
    uri::UriRef,
};
use alloc::{
    borrow::ToOwned,
    collections::BTreeMap,
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::num::NonZeroUsize;

/// A location to generate a URI for, relative to the running script.
///
/// Unset parts default to the script's own location with no query and
/// no fragment.
///
/// # Examples
///
/// ```
/// use webform::uri_gen::Target;
///
/// let target = Target::new()
///     .path_info("/page/2")
///     .query_pairs([("sort", "name")])
///     .fragment("top");
/// # let _ = target;
/// ```
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct Target {
    script: Option<String>,
    path_info: Option<String>,
    query: Option<EString<Query>>,
    fragment: Option<String>,
}

impl Target {
    /// Creates a target pointing at the running script itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the script path, unescaped.
    ///
    /// An absolute path is used as is. A relative one replaces the last
    /// segment of the running script's path.
    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Sets the path info, unescaped.
    ///
    /// A `'/'` is prepended if the path info does not start with one.
    pub fn path_info(mut self, path_info: impl Into<String>) -> Self {
        self.path_info = Some(path_info.into());
        self
    }

    /// Sets an already escaped query string, which is used verbatim.
    pub fn query_string(mut self, query: &EStr<Query>) -> Self {
        self.query = Some(query.to_owned());
        self
    }

    /// Sets form pairs as the query, sorted by key and joined by `';'`.
    ///
    /// Pairs with equal keys keep their relative order.
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pairs: Vec<(K, V)> = pairs.into_iter().collect();
        pairs.sort_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));
        self.query = Some(EString::from_form_pairs(pairs, ';'));
        self
    }

    /// Sets a form map as the query, in key order and joined by `';'`.
    pub fn query_map(mut self, map: &BTreeMap<String, FormValue>) -> Self {
        self.query = Some(EString::from_form_map(map, ';'));
        self
    }

    /// Sets the fragment, unescaped.
    pub fn fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }
}

/// A URI generator for a script running at a fixed location.
///
/// # Examples
///
/// ```
/// use webform::uri_gen::{Target, UriGen};
///
/// let gen = UriGen::new("http", "example.com", 80, "/foo/bar.cgi", "/baz/qux")?;
///
/// assert_eq!(gen.make_relative_uri(&Target::new().path_info("/hoge")), "../hoge");
/// assert_eq!(gen.make_relative_uri(&Target::new()), "../../bar.cgi");
/// assert_eq!(
///     gen.make_absolute_uri(&Target::new().path_info("/hoge")),
///     "http://example.com/foo/bar.cgi/hoge",
/// );
/// # Ok::<_, webform::ParseError>(())
/// ```
#[derive(Clone, Debug)]
pub struct UriGen {
    script_name: String,
    path_info: String,
    base_uri: UriRef<String>,
}

impl UriGen {
    /// Creates a generator for a script.
    ///
    /// `script_name` and `path_info` are unescaped, as found in the CGI
    /// meta-variables of the same names. The port is left out of the base
    /// URI when it is the default one for `http` or `https`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the scheme or server name makes the base URI invalid.
    pub fn new(
        scheme: &str,
        server_name: &str,
        server_port: u16,
        script_name: &str,
        path_info: &str,
    ) -> Result<Self, ParseError> {
        let path_info = with_leading_slash(path_info);

        let mut buf = format!("{scheme}://{server_name}");
        if default_port(scheme) != Some(server_port) {
            buf.push(':');
            buf.push_str(&server_port.to_string());
        }
        push_escaped_path(&mut buf, script_name);
        push_escaped_path(&mut buf, &path_info);

        let base_uri = UriRef::parse_from(buf).map_err(|(e, _)| e)?;
        tracing::debug!("Created URI generator with base {}", base_uri);
        Ok(Self {
            script_name: script_name.to_owned(),
            path_info,
            base_uri,
        })
    }

    /// Creates a generator from the location of a request.
    ///
    /// # Errors
    ///
    /// Returns `Err` on the same conditions as [`new`](Self::new).
    pub fn from_request<R: RequestContext + ?Sized>(req: &R) -> Result<Self, ParseError> {
        Self::new(
            req.scheme(),
            req.server_name(),
            req.server_port(),
            req.script_name(),
            req.path_info(),
        )
    }

    /// Returns the absolute URI of the running script, including its path info.
    #[must_use]
    pub fn base_uri(&self) -> &UriRef<String> {
        &self.base_uri
    }

    /// Returns the unescaped script path.
    #[must_use]
    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    /// Returns the unescaped path info, empty or starting with `'/'`.
    #[must_use]
    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    /// Generates the shortest relative reference from the running script to a target.
    ///
    /// The path is made of `"../"` steps up from the script's directory
    /// followed by the remaining target segments, each escaped with the
    /// RFC 2396 `pchar` rule. A path that would otherwise read as absolute
    /// or as having a scheme gets a `"./"` prefix.
    #[must_use]
    pub fn make_relative_uri(&self, target: &Target) -> UriRef<String> {
        let script = match &target.script {
            None => self.script_name.clone(),
            Some(s) if s.starts_with('/') => s.clone(),
            Some(s) => splice_script(&self.script_name, s),
        };
        let path_info = target
            .path_info
            .as_deref()
            .map_or_else(String::new, with_leading_slash);

        let dst_full = [script.as_str(), path_info.as_str()].concat();
        let (mut dst, dst_basename) = split_dir(strip_slash(&dst_full));
        let src_full = [self.script_name.as_str(), self.path_info.as_str()].concat();
        let (mut src, _) = split_dir(strip_slash(&src_full));

        while let (Some(s), Some(d)) = (first_dir(src), first_dir(dst)) {
            if s != d {
                break;
            }
            src = &src[s.len()..];
            dst = &dst[d.len()..];
        }

        let mut rel = "../".repeat(src.matches('/').count());
        rel.push_str(dst);
        rel.push_str(dst_basename);
        if rel.is_empty() {
            rel.push_str("./");
        }

        let mut buf = String::with_capacity(rel.len());
        push_escaped_path(&mut buf, &rel);
        let first_seg = buf.split('/').next().unwrap_or_default();
        if buf.starts_with('/') || first_seg.contains(':') {
            buf.insert_str(0, "./");
        }

        let mut meta = Meta {
            path_bounds: (0, buf.len()),
            ..Meta::default()
        };

        if let Some(query) = target.query.as_deref().filter(|q| !q.is_empty()) {
            buf.push('?');
            buf.push_str(query.as_str());
            meta.query_end = NonZeroUsize::new(buf.len());
        }

        if let Some(fragment) = &target.fragment {
            let mut escaped = EString::<Fragment>::new();
            escaped.encode_str::<Fragment>(fragment);
            buf.push('#');
            buf.push_str(escaped.as_str());
        }

        tracing::trace!("Generated relative URI {:?}", buf);
        UriRef::new_validated(buf, meta)
    }

    /// Generates the absolute URI of a target.
    ///
    /// This is the relative reference from
    /// [`make_relative_uri`](Self::make_relative_uri) resolved against the
    /// [base URI](Self::base_uri).
    #[must_use]
    pub fn make_absolute_uri(&self, target: &Target) -> UriRef<String> {
        let rel = self.make_relative_uri(target);
        let base = self.base_uri.borrow();
        let scheme = base.scheme().unwrap_or_default();
        resolve::resolve_checked(scheme, base, rel.borrow())
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    if scheme.eq_ignore_ascii_case("http") {
        Some(80)
    } else if scheme.eq_ignore_ascii_case("https") {
        Some(443)
    } else {
        None
    }
}

fn with_leading_slash(path_info: &str) -> String {
    if path_info.is_empty() || path_info.starts_with('/') {
        path_info.to_owned()
    } else {
        ["/", path_info].concat()
    }
}

/// Escapes each run of non-`'/'` characters as a path segment.
fn push_escaped_path(buf: &mut String, path: &str) {
    let mut escaped = EString::<Path>::with_capacity(path.len());
    for (i, seg) in path.split('/').enumerate() {
        if i > 0 {
            escaped.push('/');
        }
        escaped.encode_str::<PathSegment>(seg);
    }
    buf.push_str(escaped.as_str());
}

fn strip_slash(s: &str) -> &str {
    s.strip_prefix('/').unwrap_or(s)
}

/// Splits a path into its directory part, ending with `'/'` if not empty,
/// and its last segment.
fn split_dir(path: &str) -> (&str, &str) {
    let i = path.rfind('/').map_or(0, |i| i + 1);
    path.split_at(i)
}

/// Returns the first segment of a path, including its trailing `'/'`.
fn first_dir(path: &str) -> Option<&str> {
    path.find('/').map(|i| &path[..=i])
}

/// Replaces the last segment of `base` with a relative script path and
/// collapses `"seg/.."` pairs.
fn splice_script(base: &str, rel: &str) -> String {
    let (dir, _) = split_dir(base);
    let mut script = [dir, rel].concat();
    while let Some((start, end)) = find_parent_pair(&script) {
        script.replace_range(start..end, "");
    }
    if let Some(rest) = script.strip_prefix("/..") {
        if rest.is_empty() || rest.starts_with('/') {
            script.replace_range(..3, "");
        }
    }
    script
}

/// Finds the leftmost `"/seg/.."` followed by `'/'` or the end.
fn find_parent_pair(s: &str) -> Option<(usize, usize)> {
    s.match_indices('/').find_map(|(start, _)| {
        let seg_end = s[start + 1..].find('/').map(|i| start + 1 + i)?;
        let rest = &s[seg_end..];
        let end = seg_end + 3;
        (rest.starts_with("/..") && (rest.len() == 3 || rest.as_bytes()[3] == b'/'))
            .then_some((start, end))
    })
}
