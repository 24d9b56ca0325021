#![no_main]
use libfuzzer_sys::fuzz_target;
use webform::UriRef;

fuzz_target!(|data: (&str, &str)| {
    let (Ok(base), Ok(r)) = (UriRef::parse(data.0), UriRef::parse(data.1)) else {
        return;
    };

    let Ok(u1) = r.resolve_against(&base) else {
        return;
    };
    let u2 = UriRef::parse(u1.as_str()).unwrap();

    assert_eq!(u1.scheme(), u2.scheme());
    assert_eq!(u1.authority(), u2.authority());
    assert_eq!(u1.path(), u2.path());
    assert_eq!(u1.query(), u2.query());
    assert_eq!(u1.fragment(), u2.fragment());

    // Resolving an already resolved URI changes nothing.
    assert_eq!(u1.resolve_against(&base).unwrap(), u1);
});
