//! Percent-encoders for URI components and form data.

use super::{table::*, Encoder, Table};

/// An encoder for a path segment.
///
/// Uses the RFC 2396 `pchar` rule, so `"/"`, `";"`, `"?"` and `"#"` are
/// always encoded.
#[derive(Clone, Copy, Debug)]
pub struct PathSegment(());

impl Encoder for PathSegment {
    const TABLE: Table = PCHAR_2396;
}

/// An encoder for a path, i.e., path segments joined by `"/"`.
#[derive(Clone, Copy, Debug)]
pub struct Path(());

impl Encoder for Path {
    const TABLE: Table = PATH;
}

/// An encoder for query.
#[derive(Clone, Copy, Debug)]
pub struct Query(());

impl Encoder for Query {
    const TABLE: Table = QUERY;
}

/// An encoder for a key or value of an `application/x-www-form-urlencoded` query.
///
/// The table allows `" "`, which is serialized as `"+"` afterwards.
/// See [`EString::<Query>::push_form_component`].
///
/// [`EString::<Query>::push_form_component`]: super::EString::push_form_component
#[derive(Clone, Copy, Debug)]
pub struct FormKeyValue(());

impl Encoder for FormKeyValue {
    const TABLE: Table = FORM_KEY_VALUE;
}

/// An encoder for fragment.
#[derive(Clone, Copy, Debug)]
pub struct Fragment(());

impl Encoder for Fragment {
    const TABLE: Table = FRAGMENT;
}
