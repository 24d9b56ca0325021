#![no_main]
use libfuzzer_sys::fuzz_target;
use webform::FormQuery;

fuzz_target!(|data: &[u8]| {
    let Ok(q) = FormQuery::decode_bytes(data) else {
        return;
    };
    for sep in ['&', ';'] {
        let encoded = q.encode(sep);
        assert_eq!(FormQuery::decode(encoded.as_str()).unwrap(), q);
    }
});
