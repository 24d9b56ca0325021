#![no_main]
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};
use webform::{
    pct_enc::{encoder::PathSegment, EString},
    uri_gen::{Target, UriGen},
    UriRef,
};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    script_name: &'a str,
    path_info: &'a str,
    target_script: &'a str,
    target_path_info: &'a str,
}

fn has_dot_segment(path: &str) -> bool {
    path.split('/').any(|seg| seg == "." || seg == "..")
}

fn escape(path: &str) -> String {
    let mut buf = String::new();
    for (i, seg) in path.split('/').enumerate() {
        if i > 0 {
            buf.push('/');
        }
        let mut escaped = EString::<PathSegment>::new();
        escaped.encode_str::<PathSegment>(seg);
        buf.push_str(escaped.as_str());
    }
    buf
}

fn with_leading_slash(s: &str) -> String {
    if s.is_empty() || s.starts_with('/') {
        s.to_owned()
    } else {
        format!("/{s}")
    }
}

fuzz_target!(|input: Input<'_>| {
    let paths = [
        input.script_name,
        input.path_info,
        input.target_script,
        input.target_path_info,
    ];
    if !input.script_name.starts_with('/')
        || !input.target_script.starts_with('/')
        || paths.iter().any(|p| has_dot_segment(p))
    {
        return;
    }

    let Ok(gen) = UriGen::new("http", "host", 80, input.script_name, input.path_info) else {
        return;
    };
    let target = Target::new()
        .script(input.target_script)
        .path_info(input.target_path_info);

    let rel = gen.make_relative_uri(&target);
    let reparsed = UriRef::parse(rel.as_str()).unwrap();
    assert!(!reparsed.has_scheme());
    assert!(!reparsed.has_authority());

    let expected = format!(
        "http://host{}{}",
        escape(input.target_script),
        escape(&with_leading_slash(input.target_path_info))
    );
    assert_eq!(gen.make_absolute_uri(&target), expected.as_str());
});
