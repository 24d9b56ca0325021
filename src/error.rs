//! Error types.

use alloc::{string::String, vec::Vec};
use core::fmt;

/// An error occurred when building a [`FormModel`] from markup.
///
/// These errors point at a defect in the form template rather than in a
/// request, and are not expected to be handled per request.
///
/// [`FormModel`]: crate::FormModel
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FormError {
    /// No `<form>` element matches the selector.
    FormNotFound {
        /// The `id` or `name` that was looked for, if any.
        selector: Option<String>,
    },
    /// A `<form>` element occurs inside the selected form.
    NestedForm,
    /// The form's `enctype` is not `application/x-www-form-urlencoded`.
    UnsupportedEnctype(String),
    /// The form's `method` is neither `GET` nor `POST`.
    UnsupportedMethod(String),
    /// The form contains an `<input type="file">`.
    FileUploadUnsupported {
        /// The name of the file input.
        name: String,
    },
    /// A control is malformed.
    InvalidControlMarkup {
        /// The local name of the offending element.
        element: String,
        /// What is wrong with it.
        reason: ControlMarkupIssue,
    },
}

/// Detailed cause of [`FormError::InvalidControlMarkup`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ControlMarkupIssue {
    /// A checkbox, radio, named submit or hidden input has no `value` attribute.
    MissingValue,
    /// The `maxlength` attribute is not a decimal number.
    NonNumericMaxlength(String),
    /// The `type` attribute is not supported.
    UnexpectedType(String),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormNotFound { selector: None } => f.write_str("no form found"),
            Self::FormNotFound {
                selector: Some(sel),
            } => write!(f, "no form found with id or name {sel:?}"),
            Self::NestedForm => f.write_str("nested form"),
            Self::UnsupportedEnctype(enctype) => write!(f, "enctype not supported: {enctype:?}"),
            Self::UnsupportedMethod(method) => write!(f, "method not supported: {method:?}"),
            Self::FileUploadUnsupported { name } => {
                write!(f, "file upload not supported: {name:?}")
            }
            Self::InvalidControlMarkup { element, reason } => {
                write!(f, "invalid <{element}> control: ")?;
                match reason {
                    ControlMarkupIssue::MissingValue => f.write_str("no value attribute"),
                    ControlMarkupIssue::NonNumericMaxlength(s) => {
                        write!(f, "non-number maxlength {s:?}")
                    }
                    ControlMarkupIssue::UnexpectedType(s) => write!(f, "unexpected type {s:?}"),
                }
            }
        }
    }
}

#[cfg(feature = "impl-error")]
impl crate::Error for FormError {}

/// An error occurred when validating a submission against a [`FormModel`].
///
/// Validation stops at the first violation found.
///
/// [`FormModel`]: crate::FormModel
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValidationError {
    /// The request method differs from the form's method.
    MethodMismatch {
        /// The form's method.
        expected: String,
        /// The request method.
        actual: String,
    },
    /// A submitted pair corresponds to no remaining control.
    ExtraParameter {
        /// The submitted key.
        key: String,
        /// The submitted value.
        value: String,
    },
    /// A control that is always submitted is absent.
    MissingParameter {
        /// The control name.
        name: String,
    },
    /// More than one choice was submitted where at most one is allowed.
    AmbiguousSelection {
        /// The radio group or menu name, or `None` for submit actions.
        name: Option<String>,
    },
    /// No choice was submitted where exactly one is required.
    MissingSelection {
        /// The radio group or menu name, or `None` for submit actions.
        name: Option<String>,
    },
    /// Image click coordinates were submitted without their counterpart.
    PairingMismatch {
        /// The image control names lacking a counterpart, sorted.
        names: Vec<String>,
    },
    /// The query is not properly escaped or does not decode to UTF-8.
    InvalidQueryEncoding,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MethodMismatch { expected, actual } => {
                write!(f, "method mismatch: {actual} (expected: {expected})")
            }
            Self::ExtraParameter { key, value } => {
                write!(f, "extra parameter: {key:?}={value:?}")
            }
            Self::MissingParameter { name } => write!(f, "parameter lacks: {name:?}"),
            Self::AmbiguousSelection { name: None } => f.write_str("multiple submits selected"),
            Self::AmbiguousSelection { name: Some(name) } => {
                write!(f, "multiple choices selected: {name:?}")
            }
            Self::MissingSelection { name: None } => f.write_str("no submit selected"),
            Self::MissingSelection { name: Some(name) } => {
                write!(f, "no choice selected: {name:?}")
            }
            Self::PairingMismatch { names } => {
                f.write_str("non-pair image position:")?;
                for name in names {
                    write!(f, " {name:?}")?;
                }
                Ok(())
            }
            Self::InvalidQueryEncoding => f.write_str("invalid query encoding"),
        }
    }
}

#[cfg(feature = "impl-error")]
impl crate::Error for ValidationError {}
