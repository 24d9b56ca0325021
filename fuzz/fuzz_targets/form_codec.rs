#![no_main]
use libfuzzer_sys::fuzz_target;
use webform::FormQuery;

fuzz_target!(|pairs: Vec<(String, String)>| {
    let q = FormQuery::from_pairs(pairs);
    let encoded = q.encode('&');
    assert_eq!(FormQuery::decode(encoded.as_str()).unwrap(), q);
});
