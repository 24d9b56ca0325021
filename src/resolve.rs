//! Reference resolution.

use crate::{parse::Meta, uri::UriRef};
use alloc::string::String;
use core::{fmt, num::NonZeroUsize};

/// An error occurred when resolving a URI reference.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolveError {
    /// The base has no scheme.
    BaseWithoutScheme,
    /// The base has a fragment.
    BaseWithFragment,
    /// The base has no authority and its path is rootless, but the reference
    /// is relative, is not empty and does not start with `'#'`.
    InvalidReferenceAgainstOpaqueBase,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::BaseWithoutScheme => "base URI without scheme",
            Self::BaseWithFragment => "base URI with fragment",
            Self::InvalidReferenceAgainstOpaqueBase => {
                "relative reference must be empty or start with '#' when resolved against authority-less base URI with rootless path"
            }
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "impl-error")]
impl crate::Error for ResolveError {}

pub(crate) fn resolve(
    base: UriRef<&str>,
    /* reference */ r: UriRef<&str>,
) -> Result<UriRef<String>, ResolveError> {
    let Some(base_scheme) = base.scheme() else {
        return Err(ResolveError::BaseWithoutScheme);
    };
    if base.has_fragment() {
        return Err(ResolveError::BaseWithFragment);
    }
    if !base.has_authority()
        && !base.path().as_str().starts_with('/')
        && !base.path().is_empty()
        && !r.has_scheme()
        && !matches!(r.as_str().bytes().next(), None | Some(b'#'))
    {
        return Err(ResolveError::InvalidReferenceAgainstOpaqueBase);
    }
    Ok(resolve_checked(base_scheme, base, r))
}

/// Resolves a reference against a base with a scheme and no fragment.
pub(crate) fn resolve_checked(
    base_scheme: &str,
    base: UriRef<&str>,
    r: UriRef<&str>,
) -> UriRef<String> {
    let (t_scheme, t_authority, t_path, t_query, t_fragment);
    let mut buf = String::new();

    let r_path = r.path().as_str();
    let r_query = r.query().map(|q| q.as_str());

    if let Some(r_scheme) = r.scheme() {
        t_scheme = r_scheme;
        t_authority = r.authority();
        t_path = if r_path.starts_with('/') {
            remove_dot_segments(&mut buf, r_path)
        } else {
            r_path
        };
        t_query = r_query;
    } else {
        if r.has_authority() {
            t_authority = r.authority();
            t_path = remove_dot_segments(&mut buf, r_path);
            t_query = r_query;
        } else {
            if r_path.is_empty() {
                let base_path = base.path().as_str();
                t_path = if base_path.starts_with('/') {
                    remove_dot_segments(&mut buf, base_path)
                } else {
                    base_path
                };
                t_query = r_query.or_else(|| base.query().map(|q| q.as_str()));
            } else {
                if r_path.starts_with('/') {
                    t_path = remove_dot_segments(&mut buf, r_path);
                } else {
                    // Remove dot segments incrementally instead of merging the paths.
                    let base_path = base.path().as_str();
                    match base_path.rfind('/') {
                        None => buf.push('/'),
                        Some(last_slash_i) => {
                            let last_seg = &base_path[last_slash_i + 1..];
                            let base_path_stripped = match classify_segment(last_seg) {
                                SegKind::DoubleDot => base_path,
                                _ => &base_path[..=last_slash_i],
                            };
                            remove_dot_segments(&mut buf, base_path_stripped);
                        }
                    }
                    t_path = remove_dot_segments(&mut buf, r_path);
                }
                t_query = r_query;
            }
            t_authority = base.authority();
        }
        t_scheme = base_scheme;
    }
    t_fragment = r.fragment().map(|f| f.as_str());

    let mut out = String::new();
    let mut meta = Meta::default();

    out.push_str(t_scheme);
    meta.scheme_end = NonZeroUsize::new(out.len());
    out.push(':');

    if let Some(authority) = t_authority {
        out.push_str("//");
        let start = out.len();
        out.push_str(authority);
        meta.auth_bounds = Some((start, out.len()));
    }

    meta.path_bounds.0 = out.len();
    // Keep a leading "//" of the path from being read as an authority.
    if t_authority.is_none() && t_path.starts_with("//") {
        out.push_str("/.");
    }
    out.push_str(t_path);
    meta.path_bounds.1 = out.len();

    if let Some(query) = t_query {
        out.push('?');
        out.push_str(query);
        meta.query_end = NonZeroUsize::new(out.len());
    }

    if let Some(fragment) = t_fragment {
        out.push('#');
        out.push_str(fragment);
    }

    UriRef::new_validated(out, meta)
}

/// Appends an absolute path with dot segments removed onto `buf`, which
/// must be empty or end with `'/'`.
///
/// A `".."` segment never removes the leading `'/'`.
pub(crate) fn remove_dot_segments<'a>(buf: &'a mut String, path: &str) -> &'a str {
    for seg in path.split_inclusive('/') {
        let seg_stripped = seg.strip_suffix('/').unwrap_or(seg);
        match classify_segment(seg_stripped) {
            SegKind::Dot => truncate_after_last_slash(buf),
            SegKind::DoubleDot => {
                if buf.len() > 1 {
                    buf.pop();
                    truncate_after_last_slash(buf);
                }
            }
            SegKind::Normal => buf.push_str(seg),
        }
    }
    buf
}

fn truncate_after_last_slash(buf: &mut String) {
    let len = buf.rfind('/').map_or(0, |i| i + 1);
    buf.truncate(len);
}

enum SegKind {
    Dot,
    DoubleDot,
    Normal,
}

fn classify_segment(mut seg: &str) -> SegKind {
    if seg.is_empty() {
        return SegKind::Normal;
    }
    if let Some(rem) = seg.strip_prefix('.') {
        seg = rem;
    } else if let Some(rem) = seg.strip_prefix("%2E") {
        seg = rem;
    } else if let Some(rem) = seg.strip_prefix("%2e") {
        seg = rem;
    }
    if seg.is_empty() {
        SegKind::Dot
    } else if seg == "." || seg == "%2E" || seg == "%2e" {
        SegKind::DoubleDot
    } else {
        SegKind::Normal
    }
}
