use super::{
    ButtonType, ControlKind, FormControl, FormModel, InputType, Method, Select, SelectId,
    URLENCODED,
};
use crate::{
    error::{ControlMarkupIssue, FormError},
    markup::{Element, NodeRef},
};
use alloc::{
    borrow::ToOwned,
    format,
    string::{String, ToString},
    vec::Vec,
};

impl FormModel {
    /// Builds the model of a form found in a parsed tree.
    ///
    /// The first `<form>` element in document order is used, or the first
    /// one whose `id` or `name` equals `selector` if given. `root` itself
    /// may be that form.
    ///
    /// # Errors
    ///
    /// Returns `Err` if no form is found, if the form is not
    /// `application/x-www-form-urlencoded` with method `GET` or `POST`,
    /// or if any of its controls is malformed or unsupported.
    /// See [`FormError`] for details.
    pub fn build<E: Element + ?Sized>(root: &E, selector: Option<&str>) -> Result<Self, FormError> {
        let Some(form) = find_form(root, selector) else {
            tracing::debug!("No form matches selector {:?}", selector);
            return Err(FormError::FormNotFound {
                selector: selector.map(ToOwned::to_owned),
            });
        };

        let mut builder = Builder::default();
        builder.visit_children(form)?;

        let method_attr = form.attr("method").unwrap_or("GET");
        let method = Method::parse(method_attr)
            .ok_or_else(|| FormError::UnsupportedMethod(method_attr.to_owned()))?;

        let enctype = form.attr("enctype").unwrap_or(URLENCODED);
        if !enctype.eq_ignore_ascii_case(URLENCODED) {
            return Err(FormError::UnsupportedEnctype(enctype.to_owned()));
        }

        let model = builder.finish(
            method,
            enctype.to_owned(),
            form.attr("accept").map(ToOwned::to_owned),
            form.attr("accept-charset").map(ToOwned::to_owned),
        );
        tracing::debug!(
            "Built {} form model with {} controls and {} menus",
            model.method,
            model.controls.len(),
            model.selects.len()
        );
        Ok(model)
    }
}

fn find_form<'a, E: Element + ?Sized>(e: &'a E, selector: Option<&str>) -> Option<&'a E> {
    let matches = |sel: &str| e.attr("id") == Some(sel) || e.attr("name") == Some(sel);
    if e.is_html("form") && selector.map_or(true, matches) {
        return Some(e);
    }
    e.children().find_map(|child| match child {
        NodeRef::Element(child) => find_form(child, selector),
        NodeRef::Text(_) => None,
    })
}

fn invalid(element: &str, reason: ControlMarkupIssue) -> FormError {
    FormError::InvalidControlMarkup {
        element: element.to_owned(),
        reason,
    }
}

#[derive(Default)]
struct Builder {
    controls: Vec<FormControl>,
    selects: Vec<Select>,
    radio_must_be_checked: Vec<String>,
    has_unnamed_submit: bool,
    has_named_submit: bool,
}

impl Builder {
    fn finish(
        self,
        method: Method,
        enctype: String,
        accept: Option<String>,
        accept_charset: Option<String>,
    ) -> FormModel {
        FormModel {
            controls: self.controls,
            selects: self.selects,
            radio_must_be_checked: self.radio_must_be_checked,
            method,
            enctype,
            accept,
            accept_charset,
            // With no named submit, the form can only be sent without a submit pair.
            has_unnamed_submit: self.has_unnamed_submit || !self.has_named_submit,
        }
    }

    fn push(&mut self, control: FormControl) {
        tracing::trace!(
            "Extracted {:?} control {:?} with value {:?}",
            control.kind,
            control.name,
            control.value
        );
        self.controls.push(control);
    }

    fn visit_children<E: Element + ?Sized>(&mut self, e: &E) -> Result<(), FormError> {
        for child in e.children() {
            if let NodeRef::Element(child) = child {
                self.visit(child)?;
            }
        }
        Ok(())
    }

    fn visit<E: Element + ?Sized>(&mut self, e: &E) -> Result<(), FormError> {
        if e.is_html("form") {
            return Err(FormError::NestedForm);
        } else if e.is_html("input") {
            self.input(e)?;
        } else if e.is_html("select") {
            self.select(e);
        } else if e.is_html("textarea") {
            self.textarea(e);
        } else if e.is_html("button") {
            self.button(e)?;
        }
        self.visit_children(e)
    }

    fn input<E: Element + ?Sized>(&mut self, e: &E) -> Result<(), FormError> {
        let ty = e.attr("type").unwrap_or("text").to_ascii_lowercase();
        let Some(name) = e.attr("name") else {
            if ty == "submit" {
                self.has_unnamed_submit = true;
            }
            return Ok(());
        };
        let disabled = e.attr("disabled").is_some();

        let input_type = match &ty[..] {
            "text" => InputType::Text,
            "password" => InputType::Password,
            "checkbox" => InputType::Checkbox,
            "radio" => InputType::Radio,
            "submit" => InputType::Submit,
            "hidden" => InputType::Hidden,
            "button" => InputType::Button,
            "reset" => return Ok(()),
            "file" => {
                return Err(FormError::FileUploadUnsupported {
                    name: name.to_owned(),
                })
            }
            "image" => {
                for (suffix, input_type) in [(".x", InputType::ImageX), (".y", InputType::ImageY)] {
                    let mut control =
                        FormControl::new(ControlKind::Input(input_type), format!("{name}{suffix}"));
                    control.disabled = disabled;
                    self.push(control);
                }
                self.has_named_submit = true;
                return Ok(());
            }
            _ => {
                let ty = e.attr("type").unwrap_or_default().to_owned();
                return Err(invalid("input", ControlMarkupIssue::UnexpectedType(ty)));
            }
        };

        let mut control = FormControl::new(ControlKind::Input(input_type), name);
        control.disabled = disabled;

        match input_type {
            InputType::Text | InputType::Password => {
                control.value = Some(e.attr("value").unwrap_or_default().to_owned());
                control.readonly = e.attr("readonly").is_some();
                if let Some(max) = e.attr("maxlength") {
                    control.maxlength = Some(parse_maxlength(max)?);
                }
            }
            // A value-less button submits nothing.
            InputType::Button => match e.attr("value") {
                Some(value) => control.value = Some(value.to_owned()),
                None => return Ok(()),
            },
            _ => {
                let value = e
                    .attr("value")
                    .ok_or_else(|| invalid("input", ControlMarkupIssue::MissingValue))?;
                control.value = Some(value.to_owned());
            }
        }

        match input_type {
            InputType::Submit => self.has_named_submit = true,
            InputType::Radio if e.attr("checked").is_some() => {
                if !self.radio_must_be_checked.iter().any(|n| n == name) {
                    self.radio_must_be_checked.push(name.to_owned());
                }
            }
            _ => {}
        }

        self.push(control);
        Ok(())
    }

    fn select<E: Element + ?Sized>(&mut self, e: &E) {
        let Some(name) = e.attr("name") else {
            return;
        };
        let id = SelectId(self.selects.len());
        let multiple = e.attr("multiple").is_some();
        let disabled = e.attr("disabled").is_some();

        let mut options = Vec::new();
        collect_options(e, &mut options);

        let mut has_selected = false;
        for option in options {
            let mut control = FormControl::new(ControlKind::Option(id), name);
            control.disabled = disabled || option.attr("disabled").is_some();
            control.value = Some(match option.attr("value") {
                Some(value) => value.to_owned(),
                None => option.text_content(),
            });
            has_selected |= option.attr("selected").is_some();
            self.push(control);
        }

        self.selects.push(Select {
            name: name.to_owned(),
            multiple,
            disabled,
            must_choose: has_selected && !multiple,
        });
    }

    fn textarea<E: Element + ?Sized>(&mut self, e: &E) {
        let Some(name) = e.attr("name") else {
            return;
        };
        let mut control = FormControl::new(ControlKind::Textarea, name);
        control.disabled = e.attr("disabled").is_some();
        control.readonly = e.attr("readonly").is_some();
        if control.readonly {
            control.value = Some(e.text_content());
        }
        self.push(control);
    }

    fn button<E: Element + ?Sized>(&mut self, e: &E) -> Result<(), FormError> {
        let ty = e.attr("type").unwrap_or("submit");
        let Some(name) = e.attr("name") else {
            if ty.eq_ignore_ascii_case("submit") {
                self.has_unnamed_submit = true;
            }
            return Ok(());
        };

        let button_type = if ty.eq_ignore_ascii_case("submit") {
            ButtonType::Submit
        } else if ty.eq_ignore_ascii_case("button") {
            ButtonType::Button
        } else if ty.eq_ignore_ascii_case("reset") {
            return Ok(());
        } else {
            return Err(invalid(
                "button",
                ControlMarkupIssue::UnexpectedType(ty.to_string()),
            ));
        };

        let mut control = FormControl::new(ControlKind::Button(button_type), name);
        control.disabled = e.attr("disabled").is_some();
        control.value = Some(e.attr("value").unwrap_or_default().to_owned());
        if button_type == ButtonType::Submit {
            self.has_named_submit = true;
        }
        self.push(control);
        Ok(())
    }
}

fn parse_maxlength(s: &str) -> Result<usize, FormError> {
    if s.is_empty() || !s.bytes().all(|x| x.is_ascii_digit()) {
        return Err(invalid(
            "input",
            ControlMarkupIssue::NonNumericMaxlength(s.to_owned()),
        ));
    }
    // Digits only, so the only possible failure is overflow.
    Ok(s.parse().unwrap_or(usize::MAX))
}

fn collect_options<'a, E: Element + ?Sized>(e: &'a E, out: &mut Vec<&'a E>) {
    for child in e.children() {
        if let NodeRef::Element(child) = child {
            if child.is_html("option") {
                out.push(child);
            }
            collect_options(child, out);
        }
    }
}
