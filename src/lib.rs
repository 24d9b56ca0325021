#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![cfg_attr(not(feature = "std"), no_std)]

//! Validation of HTML form submissions and relative URI generation for
//! server-side web scripts.
//!
//! **Form validation.** A [`FormModel`] is built once from the markup of a
//! `<form>` and then checks whether a submitted query is one a well-behaved
//! user agent could have produced from that form: every pair must come from a
//! distinct control with an acceptable value, controls that are always
//! submitted must be present, and radio groups, single-select menus, submit
//! buttons and image coordinates must be consistent.
//!
//! ```
//! use webform::{markup::ElementNode, FormModel, FormQuery, ValidationError};
//!
//! let form = ElementNode::new("form")
//!     .with_child(ElementNode::new("input").with_attr("name", "n").with_attr("maxlength", "3"));
//! let model = FormModel::build(&form, None)?;
//!
//! assert!(model.validate("GET", FormQuery::decode("n=abc")?).is_ok());
//! assert!(matches!(
//!     model.validate("GET", FormQuery::decode("n=abcd")?),
//!     Err(ValidationError::ExtraParameter { .. }),
//! ));
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! **URI generation.** A [`UriGen`] computes the shortest relative reference
//! from the running script to another location of the same application,
//! escaping every part the way it must be escaped.
//!
//! ```
//! use webform::{uri_gen::Target, UriGen};
//!
//! let gen = UriGen::new("http", "example.com", 80, "/foo/bar.cgi", "/baz/qux")?;
//! assert_eq!(gen.make_relative_uri(&Target::new().fragment("sp ce")), "../../bar.cgi#sp%20ce");
//! # Ok::<_, webform::ParseError>(())
//! ```
//!
//! # Feature flags
//!
//! - `std` (default): Enables `std` support, including [`Error`] implementations
//!   and [`CgiRequest::from_env`].
//!
//! - `impl-error`: Enables [`Error`] implementations only. Enabled by `std`.
//!
//! - `serde`: Enables [`serde`] support for [`UriRef`] and [`FormQuery`].
//!
//! - `html`: Enables [`markup::parse_html`], building markup trees with
//!   [`html5ever`].
//!
//! [`Error`]: core::error::Error
//! [`serde`]: https://docs.rs/serde
//! [`html5ever`]: https://docs.rs/html5ever

extern crate alloc;

#[cfg(all(feature = "impl-error", not(feature = "std")))]
use core::error::Error;
#[cfg(feature = "std")]
use std::error::Error;

pub mod error;
pub mod form;
pub mod markup;
pub mod pct_enc;
pub mod request;
pub mod uri_gen;

mod parse;
mod query;
mod resolve;
mod uri;

pub use error::{FormError, ValidationError};
pub use form::{FormControl, FormModel};
pub use parse::{ParseError, ParseErrorKind};
pub use query::FormQuery;
pub use request::{CgiRequest, RequestContext};
pub use resolve::ResolveError;
pub use uri::UriRef;
pub use uri_gen::UriGen;
