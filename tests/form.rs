use webform::{
    error::ControlMarkupIssue,
    form::{ButtonType, ControlKind, InputType, Method},
    markup::{ElementNode, XHTML_NS},
    CgiRequest, FormError, FormModel, FormQuery, ValidationError,
};

fn el(name: &str, attrs: &[(&str, &str)]) -> ElementNode {
    attrs
        .iter()
        .fold(ElementNode::new(name), |e, &(k, v)| e.with_attr(k, v))
}

fn input(ty: &str, name: &str, value: Option<&str>) -> ElementNode {
    let e = el("input", &[("type", ty), ("name", name)]);
    match value {
        Some(v) => e.with_attr("value", v),
        None => e,
    }
}

fn no_controls() -> Vec<ElementNode> {
    Vec::new()
}

fn option(value: &str) -> ElementNode {
    el("option", &[("value", value)])
}

fn form_with(attrs: &[(&str, &str)], children: impl IntoIterator<Item = ElementNode>) -> ElementNode {
    children
        .into_iter()
        .fold(el("form", attrs), ElementNode::with_child)
}

#[track_caller]
fn build(children: impl IntoIterator<Item = ElementNode>) -> FormModel {
    FormModel::build(&form_with(&[], children), None).unwrap()
}

#[track_caller]
fn build_err(children: impl IntoIterator<Item = ElementNode>) -> FormError {
    FormModel::build(&form_with(&[], children), None).unwrap_err()
}

fn extra(key: &str, value: &str) -> ValidationError {
    ValidationError::ExtraParameter {
        key: key.into(),
        value: value.into(),
    }
}

fn missing(name: &str) -> ValidationError {
    ValidationError::MissingParameter { name: name.into() }
}

fn ambiguous(name: Option<&str>) -> ValidationError {
    ValidationError::AmbiguousSelection {
        name: name.map(Into::into),
    }
}

fn unselected(name: Option<&str>) -> ValidationError {
    ValidationError::MissingSelection {
        name: name.map(Into::into),
    }
}

trait Test {
    fn pass(&self, query: &str);
    fn fail(&self, query: &str, err: ValidationError);
}

impl Test for FormModel {
    #[track_caller]
    fn pass(&self, query: &str) {
        let q = FormQuery::decode(query).unwrap();
        match self.validate(self.method().as_str(), q.clone()) {
            Ok(out) => assert_eq!(out, q),
            Err(e) => panic!("{query:?} rejected: {e:?}"),
        }
    }

    #[track_caller]
    fn fail(&self, query: &str, err: ValidationError) {
        let q = FormQuery::decode(query).unwrap();
        assert_eq!(self.validate(self.method().as_str(), q), Err(err), "{query:?}");
    }
}

#[test]
fn text() {
    let m = build([el("input", &[("name", "n"), ("maxlength", "3")])]);
    m.pass("n=abc");
    m.pass("n=");
    m.pass("n=%E3%81%82%E3%81%84%E3%81%86");
    m.fail("n=abcd", extra("n", "abcd"));
    m.fail("n=%E3%81%82%E3%81%84%E3%81%86%E3%81%88", extra("n", "\u{3042}\u{3044}\u{3046}\u{3048}"));
    m.fail("", missing("n"));
    m.fail("n=a&n=b", extra("n", "b"));
    m.fail("n=a&x=b", extra("x", "b"));

    let m = build([input("password", "p", None)]);
    m.pass("p=anything+at+all");
    m.fail("", missing("p"));

    let m = build([el("input", &[("name", "n"), ("maxlength", "0")])]);
    m.pass("n=");
    m.fail("n=a", extra("n", "a"));
}

#[test]
fn text_readonly_and_disabled() {
    let m = build([el("input", &[("name", "n"), ("value", "v"), ("readonly", "")])]);
    m.pass("n=v");
    m.fail("n=w", extra("n", "w"));
    m.fail("", missing("n"));

    let m = build([el("input", &[("name", "n"), ("disabled", "")])]);
    m.pass("");
    m.fail("n=a", extra("n", "a"));
}

#[test]
fn checkbox() {
    let m = build([
        input("checkbox", "c", Some("1")),
        input("checkbox", "c", Some("2")),
    ]);
    m.pass("");
    m.pass("c=1");
    m.pass("c=2&c=1");
    m.fail("c=3", extra("c", "3"));
    m.fail("c=1&c=1", extra("c", "1"));
}

#[test]
fn radio() {
    let m = build([input("radio", "r", Some("a")), input("radio", "r", Some("b"))]);
    m.pass("");
    m.pass("r=a");
    m.pass("r=b");
    m.fail("r=a&r=b", ambiguous(Some("r")));
    m.fail("r=c", extra("r", "c"));

    let m = build([
        input("radio", "r", Some("a")),
        input("radio", "r", Some("b")).with_attr("checked", "checked"),
        input("radio", "s", Some("x")),
    ]);
    m.pass("r=a");
    m.pass("r=b&s=x");
    m.fail("", unselected(Some("r")));
    m.fail("s=x", unselected(Some("r")));
    assert!(m.radio_must_be_checked().eq(["r"]));
}

#[test]
fn hidden() {
    let m = build([input("hidden", "h", Some("x"))]);
    m.pass("h=x");
    m.fail("h=y", extra("h", "y"));
    m.fail("", missing("h"));

    let m = build([input("hidden", "h", Some("x")).with_attr("disabled", "")]);
    m.pass("");
    m.fail("h=x", extra("h", "x"));
}

#[test]
fn textarea() {
    let m = build([el("textarea", &[("name", "t")]).with_text("initial")]);
    m.pass("t=");
    m.pass("t=anything%0D%0Aat+all");
    m.fail("", missing("t"));

    let m = build([el("textarea", &[("name", "t"), ("readonly", "")]).with_text("fixed")]);
    m.pass("");
    m.pass("t=fixed");
    m.fail("t=other", extra("t", "other"));
}

#[test]
fn submit() {
    let m = build([
        input("submit", "s", Some("OK")),
        input("submit", "s", Some("Cancel")),
    ]);
    assert!(!m.has_unnamed_submit());
    m.pass("s=OK");
    m.pass("s=Cancel");
    m.fail("", unselected(None));
    m.fail("s=OK&s=Cancel", ambiguous(None));
    m.fail("s=Maybe", extra("s", "Maybe"));

    let m = build([
        input("submit", "s", Some("OK")),
        el("input", &[("type", "submit")]),
    ]);
    assert!(m.has_unnamed_submit());
    m.pass("");
    m.pass("s=OK");

    // Without any named submit the form can only be sent without one.
    let m = build([input("text", "q", None)]);
    assert!(m.has_unnamed_submit());
    m.pass("q=x");
}

#[test]
fn image() {
    let m = build([el("input", &[("type", "image"), ("name", "img")])]);
    assert!(m.controls().iter().map(|c| c.name()).eq(["img.x", "img.y"]));
    m.pass("img.x=10&img.y=20");
    m.pass("img.y=0&img.x=0");
    m.fail("", unselected(None));
    m.fail("img.x=1a&img.y=2", extra("img.x", "1a"));
    m.fail("img.x=&img.y=1", extra("img.x", ""));
    m.fail("img.x=-1&img.y=1", extra("img.x", "-1"));
    m.fail(
        "img.x=1",
        ValidationError::PairingMismatch {
            names: vec!["img".into()],
        },
    );
    m.fail("img.y=1", unselected(None));

    let m = build([
        el("input", &[("type", "image"), ("name", "img")]),
        input("submit", "go", Some("Go")),
    ]);
    m.pass("go=Go");
    m.pass("img.x=1&img.y=2");
    m.fail("go=Go&img.x=1&img.y=2", ambiguous(None));
    m.fail("go=Go&img.y=2", ValidationError::PairingMismatch { names: vec!["img".into()] });

    let m = build([
        el("input", &[("type", "image"), ("name", "a")]),
        el("input", &[("type", "image"), ("name", "b")]),
        el("input", &[("type", "submit")]),
    ]);
    m.fail(
        "a.x=1&b.y=2",
        ValidationError::PairingMismatch {
            names: vec!["a".into(), "b".into()],
        },
    );
}

#[test]
fn select() {
    let menu = el("select", &[("name", "sel")])
        .with_child(option("a"))
        .with_child(option("b"))
        .with_child(ElementNode::new("option").with_text("Third"))
        .with_child(option("d").with_attr("disabled", ""));
    let m = build([menu.clone()]);
    m.pass("");
    m.pass("sel=a");
    m.pass("sel=Third");
    m.fail("sel=a&sel=b", ambiguous(Some("sel")));
    m.fail("sel=d", extra("sel", "d"));
    m.fail("sel=e", extra("sel", "e"));
    assert!(!m.selects()[0].must_choose());

    let selected = menu
        .clone()
        .with_child(option("e").with_attr("selected", "selected"));
    let m = build([selected.clone()]);
    m.pass("sel=a");
    m.fail("", unselected(Some("sel")));
    assert!(m.select_must_be_chosen().eq(["sel"]));

    let m = build([selected.with_attr("multiple", "")]);
    m.pass("");
    m.pass("sel=a&sel=b&sel=e");
    m.fail("sel=a&sel=a", extra("sel", "a"));
    assert!(m.select_must_be_chosen().eq(None::<&str>));

    let m = build([menu.with_attr("disabled", "")]);
    assert!(m.selects()[0].is_disabled());
    m.pass("");
    m.fail("sel=a", extra("sel", "a"));
}

#[test]
fn select_same_name() {
    // Each menu must have its own option chosen, even when names collide.
    let m = build([
        el("select", &[("name", "s")])
            .with_child(option("a").with_attr("selected", "")),
        el("select", &[("name", "s")]).with_child(option("b")),
    ]);
    assert_eq!(m.selects().len(), 2);
    m.pass("s=a");
    m.pass("s=a&s=b");
    m.fail("s=b", unselected(Some("s")));
}

#[test]
#[should_panic]
fn select_id_from_other_model() {
    let small = build([el("select", &[("name", "s")]).with_child(option("a"))]);
    let large = build([
        el("select", &[("name", "s")]).with_child(option("a")),
        el("select", &[("name", "t")]).with_child(option("b")),
    ]);
    let ControlKind::Option(id) = large.controls()[1].kind() else {
        panic!("expected an option");
    };
    let _ = small.select(id);
}

#[test]
fn select_optgroup() {
    let menu = el("select", &[("name", "sel")])
        .with_child(
            el("optgroup", &[("label", "G")])
                .with_child(option("a"))
                .with_child(option("b")),
        )
        .with_child(option("c"));
    let m = build([menu]);
    assert_eq!(m.controls().len(), 3);
    m.pass("sel=b");
    m.pass("sel=c");
    m.fail("sel=a&sel=c", ambiguous(Some("sel")));
}

#[test]
fn buttons() {
    let m = build([
        el("button", &[("name", "b"), ("value", "v")]).with_text("Press"),
        el("button", &[("type", "button"), ("name", "bb"), ("value", "x")]),
        el("button", &[("type", "reset"), ("name", "r"), ("value", "x")]),
    ]);
    assert_eq!(m.controls().len(), 2);
    assert_eq!(m.controls()[0].kind(), ControlKind::Button(ButtonType::Submit));
    assert_eq!(m.controls()[1].kind(), ControlKind::Button(ButtonType::Button));
    m.pass("b=v");
    m.pass("b=v&bb=x");
    m.fail("", unselected(None));
    m.fail("bb=x", unselected(None));
    m.fail("b=w", extra("b", "w"));
    m.fail("r=x", extra("r", "x"));

    let m = build([el("button", &[("name", "b")])]);
    m.pass("b=");

    let m = build([
        el("button", &[("name", "b"), ("value", "v")]),
        ElementNode::new("button").with_text("Go"),
    ]);
    assert!(m.has_unnamed_submit());
    m.pass("");
    m.pass("b=v");

    // Unnamed buttons are skipped whatever their type.
    let m = build([
        input("submit", "s", Some("OK")),
        el("button", &[("type", "menu")]),
        el("button", &[("type", "button")]),
    ]);
    assert_eq!(m.controls().len(), 1);
    assert!(!m.has_unnamed_submit());
    m.fail("", unselected(None));

    let m = build([
        input("button", "x", None),
        input("button", "y", Some("Y")),
        input("reset", "z", Some("Z")),
    ]);
    assert!(m.controls().iter().map(|c| c.name()).eq(["y"]));
    m.pass("y=Y");
    m.fail("x=", extra("x", ""));
    m.fail("z=Z", extra("z", "Z"));
}

#[test]
fn method() {
    let m = FormModel::build(
        &form_with(&[("method", "post")], [input("text", "q", None)]),
        None,
    )
    .unwrap();
    assert_eq!(m.method(), Method::Post);
    assert!(m.validate("POST", FormQuery::decode("q=1").unwrap()).is_ok());
    assert!(m.validate("post", FormQuery::decode("q=1").unwrap()).is_ok());
    assert_eq!(
        m.validate("GET", FormQuery::decode("q=1").unwrap()),
        Err(ValidationError::MethodMismatch {
            expected: "POST".into(),
            actual: "GET".into(),
        })
    );
    // The method is checked before anything else.
    assert!(matches!(
        m.validate("GET", FormQuery::new()),
        Err(ValidationError::MethodMismatch { .. })
    ));

    let m = build(no_controls());
    assert_eq!(m.method(), Method::Get);
}

#[test]
fn validate_request() {
    let get = build([input("text", "q", None)]);
    let req = CgiRequest::new().with_query_string("q=rust+lang");
    assert_eq!(
        get.validate_request(&req).unwrap().get("q"),
        Some("rust lang")
    );
    assert_eq!(
        get.validate_request(&CgiRequest::new().with_query_string("q=%ZZ")),
        Err(ValidationError::InvalidQueryEncoding)
    );
    assert_eq!(
        get.validate_request(&CgiRequest::new().with_method("POST").with_body("q=1")),
        Err(ValidationError::MethodMismatch {
            expected: "GET".into(),
            actual: "POST".into(),
        })
    );

    let post = FormModel::build(
        &form_with(&[("method", "POST")], [input("text", "q", None)]),
        None,
    )
    .unwrap();
    let req = CgiRequest::new()
        .with_method("POST")
        .with_query_string("ignored=1")
        .with_body("q=%E6%B5%8B");
    assert_eq!(post.validate_request(&req).unwrap().get("q"), Some("\u{6d4b}"));
    assert_eq!(
        post.validate_request(&req.with_body(b"q=\xff".to_vec())),
        Err(ValidationError::InvalidQueryEncoding)
    );
}

#[test]
fn claim_order() {
    let m = build([input("text", "a", None), input("text", "b", None)]);
    m.pass("a=1&b=2");
    m.pass("b=2&a=1");

    let m = build([
        el("input", &[("name", "n"), ("maxlength", "1")]),
        input("hidden", "m", Some("x")),
        input("text", "n", None),
    ]);
    m.pass("n=long&m=x&n=s");
    m.pass("n=s&n=long&m=x");
    m.fail("n=long&n=long&m=x", extra("n", "long"));
}

#[test]
fn first_fit() {
    // A pair goes to the first control that accepts it, so a radio listed
    // before a hidden input of the same name and value takes its pair.
    let m = build([input("radio", "n", Some("x")), input("hidden", "n", Some("x"))]);
    m.fail("n=x", missing("n"));
    m.pass("n=x&n=x");

    let m = build([input("hidden", "n", Some("x")), input("radio", "n", Some("x"))]);
    m.pass("n=x");
}

#[test]
fn pure() {
    let m = build([
        input("text", "q", None),
        input("radio", "r", Some("a")),
        input("radio", "r", Some("b")),
    ]);
    for query in ["q=1&r=a", "q=1&r=a&r=b", "r=a"] {
        let q = FormQuery::decode(query).unwrap();
        let first = m.validate("GET", q.clone());
        assert_eq!(m.validate("GET", q), first);
    }
}

#[test]
fn build_errors() {
    assert_eq!(
        FormModel::build(&ElementNode::new("div"), None),
        Err(FormError::FormNotFound { selector: None })
    );

    let nested = build_err([el("div", &[]).with_child(el("form", &[]))]);
    assert_eq!(nested, FormError::NestedForm);

    assert_eq!(
        build_err([input("file", "upload", None)]),
        FormError::FileUploadUnsupported {
            name: "upload".into()
        }
    );

    assert_eq!(
        FormModel::build(&form_with(&[("enctype", "multipart/form-data")], no_controls()), None),
        Err(FormError::UnsupportedEnctype("multipart/form-data".into()))
    );
    assert!(FormModel::build(
        &form_with(&[("enctype", "Application/X-WWW-Form-URLEncoded")], no_controls()),
        None
    )
    .is_ok());
    assert_eq!(
        FormModel::build(&form_with(&[("method", "PUT")], no_controls()), None),
        Err(FormError::UnsupportedMethod("PUT".into()))
    );

    let invalid = |reason| FormError::InvalidControlMarkup {
        element: "input".into(),
        reason,
    };
    assert_eq!(
        build_err([input("checkbox", "c", None)]),
        invalid(ControlMarkupIssue::MissingValue)
    );
    assert_eq!(
        build_err([input("hidden", "h", None)]),
        invalid(ControlMarkupIssue::MissingValue)
    );
    assert_eq!(
        build_err([el("input", &[("name", "n"), ("maxlength", "ten")])]),
        invalid(ControlMarkupIssue::NonNumericMaxlength("ten".into()))
    );
    assert_eq!(
        build_err([el("input", &[("name", "n"), ("maxlength", "-1")])]),
        invalid(ControlMarkupIssue::NonNumericMaxlength("-1".into()))
    );
    assert_eq!(
        build_err([input("color", "c", Some("#fff"))]),
        invalid(ControlMarkupIssue::UnexpectedType("color".into()))
    );
    assert_eq!(
        build_err([el("button", &[("type", "menu"), ("name", "b")])]),
        FormError::InvalidControlMarkup {
            element: "button".into(),
            reason: ControlMarkupIssue::UnexpectedType("menu".into()),
        }
    );
}

#[test]
fn find_form() {
    let doc = el("body", &[])
        .with_child(form_with(&[("id", "a")], [input("hidden", "which", Some("a"))]))
        .with_child(form_with(&[("name", "b")], [input("hidden", "which", Some("b"))]));

    let first = FormModel::build(&doc, None).unwrap();
    assert_eq!(first.controls()[0].value(), Some("a"));
    let by_id = FormModel::build(&doc, Some("a")).unwrap();
    assert_eq!(by_id, first);
    let by_name = FormModel::build(&doc, Some("b")).unwrap();
    assert_eq!(by_name.controls()[0].value(), Some("b"));
    assert_eq!(
        FormModel::build(&doc, Some("c")),
        Err(FormError::FormNotFound {
            selector: Some("c".into())
        })
    );
}

#[test]
fn markup_case_and_namespace() {
    let form = ElementNode::new("FORM")
        .with_namespace(XHTML_NS)
        .with_child(el("INPUT", &[("type", "Hidden"), ("name", "h"), ("value", "1")]))
        .with_child(
            el("input", &[("type", "hidden"), ("name", "svg"), ("value", "1")])
                .with_namespace("http://www.w3.org/2000/svg"),
        );
    let m = FormModel::build(&form, None).unwrap();
    assert!(m.controls().iter().map(|c| c.name()).eq(["h"]));
    m.pass("h=1");
}

#[test]
fn introspection() {
    let form = form_with(
        &[
            ("method", "Post"),
            ("accept", "text/plain"),
            ("accept-charset", "UTF-8"),
        ],
        [
            el("input", &[("name", "t"), ("maxlength", "8"), ("value", "hi")]),
            el("input", &[("type", "checkbox"), ("name", "c"), ("value", "1"), ("disabled", "")]),
            el("select", &[("name", "s"), ("multiple", "")]).with_child(option("o")),
            el("textarea", &[("name", "ta")]),
        ],
    );
    let m = FormModel::build(&form, None).unwrap();
    assert_eq!(m.method(), Method::Post);
    assert_eq!(m.enctype(), webform::form::URLENCODED);
    assert_eq!(m.accept(), Some("text/plain"));
    assert_eq!(m.accept_charset(), Some("UTF-8"));
    assert!(m.has_unnamed_submit());

    let c = m.controls();
    assert_eq!(c.len(), 4);
    assert_eq!(c[0].kind(), ControlKind::Input(InputType::Text));
    assert_eq!(c[0].value(), Some("hi"));
    assert_eq!(c[0].maxlength(), Some(8));
    assert!(c[0].is_always_successful());
    assert!(!c[0].is_fixed_value());

    assert_eq!(c[1].kind(), ControlKind::Input(InputType::Checkbox));
    assert!(c[1].is_disabled());
    assert!(!c[1].corresponds("c", "1"));

    let ControlKind::Option(id) = c[2].kind() else {
        panic!("expected an option, got {:?}", c[2].kind());
    };
    assert_eq!(m.select(id).name(), "s");
    assert!(m.select(id).is_multiple());
    assert!(c[2].corresponds("s", "o"));
    assert!(!c[2].corresponds("s", "p"));

    assert_eq!(c[3].kind(), ControlKind::Textarea);
    assert_eq!(c[3].value(), None);
    assert!(!c[3].is_readonly());
}

#[cfg(feature = "html")]
#[test]
fn parse_html() {
    let doc = webform::markup::parse_html(
        r#"<!DOCTYPE html>
        <html><body>
        <form id="login" method="post">
          <input type="text" name="user" maxlength="8">
          <input type="password" name="pass">
          <select name="lang"><option selected>en</option><option value="ja">Japanese</option></select>
          <input type="submit" name="go" value="Log in">
        </form>
        </body></html>"#,
    );
    let m = FormModel::build(&doc, Some("login")).unwrap();
    assert_eq!(m.method(), Method::Post);
    m.pass("user=alice&pass=secret&lang=en&go=Log+in");
    m.pass("user=bob&pass=&lang=ja&go=Log+in");
    m.fail("user=alice&pass=secret&go=Log+in", unselected(Some("lang")));
    m.fail("user=alice&pass=secret&lang=en", unselected(None));
    m.fail("user=alice_long&pass=&lang=en&go=Log+in", extra("user", "alice_long"));
}

#[test]
fn shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FormModel>();
    assert_send_sync::<FormQuery>();
    assert_send_sync::<webform::UriGen>();
}
