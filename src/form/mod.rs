//! Form models built from markup, and validation of submissions against them.
//!
//! A [`FormModel`] is the set of submissions a well-behaved user agent could
//! produce from one `<form>` element. [`FormModel::build`] extracts it from a
//! parsed tree and [`FormModel::validate`] checks a submitted [`FormQuery`]
//! against it.
//!
//! # Examples
//!
//! ```
//! use webform::{markup::ElementNode, FormModel, FormQuery, ValidationError};
//!
//! let form = ElementNode::new("form")
//!     .with_child(ElementNode::new("input").with_attr("name", "q"))
//!     .with_child(ElementNode::new("input").with_attr("type", "submit"));
//! let model = FormModel::build(&form, None)?;
//!
//! assert!(model.validate("GET", FormQuery::decode("q=rust")?).is_ok());
//! assert_eq!(
//!     model.validate("GET", FormQuery::decode("q=rust&x=1")?),
//!     Err(ValidationError::ExtraParameter { key: "x".into(), value: "1".into() }),
//! );
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! [`FormQuery`]: crate::FormQuery

mod build;
mod control;
mod validate;

pub use control::{ButtonType, ControlKind, FormControl, InputType, Select, SelectId};

use alloc::{string::String, vec::Vec};
use core::fmt;

/// The only supported form encoding type.
pub const URLENCODED: &str = "application/x-www-form-urlencoded";

/// An HTTP method a form may submit with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`: the submission is carried in the request URI's query.
    Get,
    /// `POST`: the submission is carried in the request body.
    Post,
}

impl Method {
    /// Parses a method name case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("GET") {
            Some(Self::Get)
        } else if s.eq_ignore_ascii_case("POST") {
            Some(Self::Post)
        } else {
            None
        }
    }

    /// Returns the upper-case method name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The model of one HTML form.
///
/// A `FormModel` is immutable once built and may be shared across threads
/// to validate any number of submissions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormModel {
    controls: Vec<FormControl>,
    selects: Vec<Select>,
    radio_must_be_checked: Vec<String>,
    method: Method,
    enctype: String,
    accept: Option<String>,
    accept_charset: Option<String>,
    has_unnamed_submit: bool,
}

impl FormModel {
    /// Returns the controls in document order.
    #[must_use]
    pub fn controls(&self) -> &[FormControl] {
        &self.controls
    }

    /// Returns the `<select>` menus in document order.
    #[must_use]
    pub fn selects(&self) -> &[Select] {
        &self.selects
    }

    /// Returns the menu an option belongs to.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not taken from a control of this model.
    #[must_use]
    pub fn select(&self, id: SelectId) -> &Select {
        &self.selects[id.0]
    }

    /// Returns the names of radio groups with a button initially checked.
    ///
    /// Exactly one button of each such group must be submitted.
    pub fn radio_must_be_checked(&self) -> impl Iterator<Item = &str> + '_ {
        self.radio_must_be_checked.iter().map(String::as_str)
    }

    /// Returns the names of single-select menus with an option initially selected.
    ///
    /// Exactly one option of each such menu must be submitted.
    pub fn select_must_be_chosen(&self) -> impl Iterator<Item = &str> + '_ {
        self.selects
            .iter()
            .filter(|s| s.must_choose)
            .map(|s| s.name.as_str())
    }

    /// Returns the method the form submits with.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the encoding type of the form, as written in the markup.
    #[must_use]
    pub fn enctype(&self) -> &str {
        &self.enctype
    }

    /// Returns the `accept` attribute of the form.
    #[must_use]
    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    /// Returns the `accept-charset` attribute of the form.
    #[must_use]
    pub fn accept_charset(&self) -> Option<&str> {
        self.accept_charset.as_deref()
    }

    /// Checks whether the form may be submitted without any submit pair,
    /// e.g., through an unnamed submit button or by pressing enter.
    #[must_use]
    pub fn has_unnamed_submit(&self) -> bool {
        self.has_unnamed_submit
    }
}
