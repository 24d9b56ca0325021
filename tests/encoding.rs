use webform::pct_enc::{
    encoder::{Fragment, Path, PathSegment, Query},
    table, EStr, EString,
};

fn fragment_escape(s: &str) -> String {
    let mut buf = EString::<Fragment>::new();
    buf.encode_str::<Fragment>(s);
    buf.into_string()
}

fn form_escape(s: &str) -> String {
    let mut buf = EString::<Query>::new();
    buf.push_form_component(s);
    buf.into_string()
}

fn pchar_escape(s: &str) -> String {
    let mut buf = EString::<PathSegment>::new();
    buf.encode_str::<PathSegment>(s);
    buf.into_string()
}

#[test]
fn escape_fragment() {
    for (raw, escaped) in [
        ("\0", "%00"),
        (" ", "%20"),
        ("\"", "%22"),
        ("#", "%23"),
        ("%", "%25"),
        ("<", "%3C"),
        (">", "%3E"),
        ("[", "%5B"),
        ("\\", "%5C"),
        ("]", "%5D"),
        ("^", "%5E"),
        ("`", "%60"),
        ("{", "%7B"),
        ("|", "%7C"),
        ("}", "%7D"),
        ("\x7f", "%7F"),
    ] {
        assert_eq!(fragment_escape(raw), escaped, "{raw:?}");
    }

    for raw in [
        "!", "$", "&", "'", "(", ")", "*", "+", ",", "-", ".", "/", "0", ":", ";", "=", "?", "@",
        "A", "_", "a", "~",
    ] {
        assert_eq!(fragment_escape(raw), raw);
    }
}

#[test]
fn escape_form_key_value() {
    assert_eq!(form_escape(" "), "+");

    for (raw, escaped) in [
        ("&", "%26"),
        ("+", "%2B"),
        (";", "%3B"),
        ("=", "%3D"),
        ("\0", "%00"),
        ("\"", "%22"),
        ("#", "%23"),
        ("%", "%25"),
        ("<", "%3C"),
        (">", "%3E"),
        ("[", "%5B"),
        ("\\", "%5C"),
        ("]", "%5D"),
        ("^", "%5E"),
        ("`", "%60"),
        ("{", "%7B"),
        ("|", "%7C"),
        ("}", "%7D"),
        ("\x7f", "%7F"),
    ] {
        assert_eq!(form_escape(raw), escaped, "{raw:?}");
    }

    for raw in [
        "!", "$", "'", "(", ")", "*", ",", "-", ".", "/", "0", ":", "?", "@", "A", "_", "a", "~",
    ] {
        assert_eq!(form_escape(raw), raw);
    }

    assert_eq!(form_escape("caf\u{e9} au lait"), "caf%C3%A9+au+lait");
}

#[test]
fn escape_path_segment() {
    assert_eq!(pchar_escape("h?#o"), "h%3F%23o");
    assert_eq!(pchar_escape("x y"), "x%20y");
    assert_eq!(pchar_escape("ho%o.cgi"), "ho%25o.cgi");
    assert_eq!(pchar_escape("a/b;c"), "a%2Fb%3Bc");
    assert_eq!(pchar_escape("a:@&=+$,-_.!~*'()"), "a:@&=+$,-_.!~*'()");
    assert_eq!(pchar_escape("\u{3042}"), "%E3%81%82");

    let mut path = EString::<Path>::new();
    path.push('/');
    path.encode_str::<PathSegment>("foo/bar baz");
    assert_eq!(path, "/foo%2Fbar%20baz");
}

#[test]
fn validate() {
    assert!(EStr::<Query>::new("a=b&c=%2B").is_some());
    assert!(EStr::<Query>::new("a=b?/:@").is_some());
    assert!(EStr::<Query>::new("a b").is_none());
    assert!(EStr::<Query>::new("a=%4").is_none());
    assert!(EStr::<Query>::new("a=%zz").is_none());
    assert!(EStr::<Query>::new("#").is_none());
    assert!(EStr::<Query>::new("\u{e9}").is_none());
    // Slot 0 must not double as the percent-encoded flag.
    assert!(EStr::<Query>::new("\0").is_none());

    assert!(EStr::<PathSegment>::new("a/b").is_none());
    assert!(EStr::<Path>::new("a/b").is_some());
}

#[test]
fn decode() {
    let s = EStr::<Query>::new_or_panic("%41%2b+%E6%B5%8B");
    assert_eq!(s.decode().to_bytes().as_ref(), b"A++\xe6\xb5\x8b");
    assert_eq!(s.decode().to_string().unwrap(), "A++\u{6d4b}");

    let s = EStr::<Query>::new_or_panic("%FF");
    assert_eq!(s.decode().to_string().unwrap_err(), [0xff]);

    let s = EStr::<Query>::new_or_panic("plain");
    assert_eq!(s.decode().to_string().unwrap(), "plain");
}

#[test]
fn split() {
    let s = EStr::<Query>::new_or_panic("id=3&name=%E5%BC%A0%E4%B8%89");
    let mut split = s.split('&');

    let it = split.next().unwrap();
    assert_eq!(it, "id=3");

    let (k, v) = it.split_once('=').unwrap();
    assert_eq!(k, "id");
    assert_eq!(v, "3");

    let it = split.next().unwrap();
    let (k, v) = it.split_once('=').unwrap();
    assert_eq!(k, "name");
    assert_eq!(v.decode().to_string().unwrap(), "\u{5f20}\u{4e09}");

    assert_eq!(split.next(), None);
}

#[test]
fn tables() {
    assert!(table::PCHAR_2396.is_subset(table::PATH));
    assert!(table::FORM_KEY_VALUE.allows(' '));
    assert!(!table::FORM_KEY_VALUE.allows('+'));
    assert!(!table::FRAGMENT.allows('#'));
    assert!(table::QUERY.allows_pct_encoded());
    assert!(!table::SCHEME.allows_pct_encoded());
}
