use criterion::{black_box, criterion_group, criterion_main, Criterion};
use url::form_urlencoded;
use webform::{
    markup::ElementNode,
    uri_gen::{Target, UriGen},
    FormModel, FormQuery, UriRef,
};

criterion_group!(
    benches,
    bench_decode,
    bench_decode_url,
    bench_encode,
    bench_encode_url,
    bench_build,
    bench_validate,
    bench_relative_uri,
    bench_absolute_uri,
    bench_resolve,
);
criterion_main!(benches);

const QUERY_CASE: &str = "user=alice&pass=s3cr%E6%B5%8B&lang=ja&tags=a&tags=b&note=hello+world&go=Log+in";
const RESOLVE_CASE_BASE: &str = "http://example.com/foo/bar.cgi/baz/qux";
const RESOLVE_CASE_REF: &str = "../../bar.cgi?a=1;b=2#top";

fn login_form() -> ElementNode {
    let input = |ty: &str, name: &str| {
        ElementNode::new("input")
            .with_attr("type", ty)
            .with_attr("name", name)
    };
    let option = |v: &str| ElementNode::new("option").with_attr("value", v);
    ElementNode::new("form")
        .with_child(input("text", "user").with_attr("maxlength", "16"))
        .with_child(input("password", "pass"))
        .with_child(
            ElementNode::new("select")
                .with_attr("name", "lang")
                .with_child(option("en").with_attr("selected", ""))
                .with_child(option("ja")),
        )
        .with_child(input("checkbox", "tags").with_attr("value", "a"))
        .with_child(input("checkbox", "tags").with_attr("value", "b"))
        .with_child(ElementNode::new("textarea").with_attr("name", "note"))
        .with_child(input("submit", "go").with_attr("value", "Log in"))
}

fn bench_decode(c: &mut Criterion) {
    c.bench_function("decode", |b| {
        b.iter(|| FormQuery::decode(black_box(QUERY_CASE)))
    });
}

fn bench_decode_url(c: &mut Criterion) {
    c.bench_function("decode_url", |b| {
        b.iter(|| {
            form_urlencoded::parse(black_box(QUERY_CASE).as_bytes())
                .into_owned()
                .collect::<Vec<_>>()
        })
    });
}

fn bench_encode(c: &mut Criterion) {
    let q = FormQuery::decode(QUERY_CASE).unwrap();
    c.bench_function("encode", |b| b.iter(|| black_box(&q).encode('&')));
}

fn bench_encode_url(c: &mut Criterion) {
    let q = FormQuery::decode(QUERY_CASE).unwrap();
    c.bench_function("encode_url", |b| {
        b.iter(|| {
            form_urlencoded::Serializer::new(String::new())
                .extend_pairs(black_box(&q).iter())
                .finish()
        })
    });
}

fn bench_build(c: &mut Criterion) {
    let form = login_form();
    c.bench_function("build", |b| {
        b.iter(|| FormModel::build(black_box(&form), None))
    });
}

fn bench_validate(c: &mut Criterion) {
    let model = FormModel::build(&login_form(), None).unwrap();
    let q = FormQuery::decode(QUERY_CASE).unwrap();
    c.bench_function("validate", |b| {
        b.iter(|| model.validate("GET", black_box(q.clone())))
    });
}

fn bench_relative_uri(c: &mut Criterion) {
    let gen = UriGen::new("http", "example.com", 80, "/foo/bar.cgi", "/baz/qux").unwrap();
    let target = Target::new()
        .path_info("/hoge/fuga")
        .query_pairs([("b", "2"), ("a", "1")])
        .fragment("top");
    c.bench_function("relative_uri", |b| {
        b.iter(|| gen.make_relative_uri(black_box(&target)))
    });
}

fn bench_absolute_uri(c: &mut Criterion) {
    let gen = UriGen::new("http", "example.com", 80, "/foo/bar.cgi", "/baz/qux").unwrap();
    let target = Target::new().script("../other.cgi").path_info("/x");
    c.bench_function("absolute_uri", |b| {
        b.iter(|| gen.make_absolute_uri(black_box(&target)))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let base = UriRef::parse(RESOLVE_CASE_BASE).unwrap();
    let r = UriRef::parse(RESOLVE_CASE_REF).unwrap();
    c.bench_function("resolve", |b| {
        b.iter(|| black_box(r).resolve_against(black_box(&base)))
    });
}
