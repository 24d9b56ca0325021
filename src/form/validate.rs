use super::{ButtonType, ControlKind, FormControl, FormModel, InputType, Method};
use crate::{error::ValidationError, query::FormQuery, request::RequestContext};
use alloc::{borrow::ToOwned, string::String, vec, vec::Vec};

impl FormModel {
    /// Validates a submission against the form.
    ///
    /// The query is returned unchanged on success. Validation is a pure
    /// function of the model and its arguments.
    ///
    /// Every submitted pair must be claimed by a distinct enabled control. A
    /// fixed-value control claims only its markup value, while text inputs,
    /// textareas and image coordinates claim any value a user could enter.
    /// Controls are tried in document order starting after the one that
    /// claimed the previous pair, wrapping around.
    ///
    /// # Errors
    ///
    /// Returns `Err` at the first violation found, checked in this order:
    ///
    /// 1. [`MethodMismatch`] if `method` is not the form's method.
    /// 2. [`ExtraParameter`] for a pair no remaining control claims.
    /// 3. [`MissingParameter`] for an unclaimed text input, password,
    ///    hidden input or editable textarea.
    /// 4. [`AmbiguousSelection`] for a radio group with several buttons
    ///    submitted, then for several submit actions.
    /// 5. [`MissingSelection`] if no submit action is submitted and the
    ///    form cannot be sent without one.
    /// 6. [`AmbiguousSelection`] for a single-select menu with several
    ///    options submitted.
    /// 7. [`PairingMismatch`] if image coordinates come unpaired.
    /// 8. [`MissingSelection`] for an initially checked radio group or an
    ///    initially selected single-select menu with nothing submitted.
    ///
    /// [`MethodMismatch`]: ValidationError::MethodMismatch
    /// [`ExtraParameter`]: ValidationError::ExtraParameter
    /// [`MissingParameter`]: ValidationError::MissingParameter
    /// [`AmbiguousSelection`]: ValidationError::AmbiguousSelection
    /// [`MissingSelection`]: ValidationError::MissingSelection
    /// [`PairingMismatch`]: ValidationError::PairingMismatch
    pub fn validate(&self, method: &str, query: FormQuery) -> Result<FormQuery, ValidationError> {
        match self.check(method, &query) {
            Ok(()) => {
                tracing::debug!("Accepted submission of {} pairs", query.len());
                Ok(query)
            }
            Err(e) => {
                tracing::debug!("Rejected submission: {}", e);
                Err(e)
            }
        }
    }

    /// Decodes and validates the submission carried by a request.
    ///
    /// A `GET` form reads the query string and a `POST` form reads the body.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidQueryEncoding`] if the submission
    /// cannot be decoded, or any error [`validate`](Self::validate) returns.
    pub fn validate_request<R: RequestContext + ?Sized>(
        &self,
        req: &R,
    ) -> Result<FormQuery, ValidationError> {
        let method = req.request_method();
        self.check_method(method)?;
        let query = match self.method {
            Method::Get => FormQuery::decode(req.query_string())?,
            Method::Post => FormQuery::decode_bytes(req.body())?,
        };
        self.validate(method, query)
    }

    fn check(&self, method: &str, query: &FormQuery) -> Result<(), ValidationError> {
        self.check_method(method)?;
        let successful = self.claim_pairs(query)?;
        self.check_combination(&successful)
    }

    fn check_method(&self, method: &str) -> Result<(), ValidationError> {
        if method.eq_ignore_ascii_case(self.method.as_str()) {
            Ok(())
        } else {
            Err(ValidationError::MethodMismatch {
                expected: self.method.as_str().to_owned(),
                actual: method.to_owned(),
            })
        }
    }

    /// Assigns each pair to a control, returning the claiming controls.
    fn claim_pairs(&self, query: &FormQuery) -> Result<Vec<&FormControl>, ValidationError> {
        let mut remaining: Vec<&FormControl> =
            self.controls.iter().filter(|c| !c.disabled).collect();
        let mut successful = Vec::with_capacity(query.len());
        let mut start = 0;

        for (key, value) in query {
            let len = remaining.len();
            let found = (start..start + len)
                .map(|j| j % len)
                .find(|&j| remaining[j].corresponds(key, value));
            let Some(i) = found else {
                return Err(ValidationError::ExtraParameter {
                    key: key.to_owned(),
                    value: value.to_owned(),
                });
            };
            tracing::trace!("Pair {:?}={:?} claimed by control #{}", key, value, i);
            successful.push(remaining.remove(i));
            start = i;
        }

        match remaining.iter().find(|c| c.is_always_successful()) {
            Some(c) => Err(ValidationError::MissingParameter {
                name: c.name.clone(),
            }),
            None => Ok(successful),
        }
    }

    fn check_combination(&self, successful: &[&FormControl]) -> Result<(), ValidationError> {
        let mut radio_counts: Vec<(&str, usize)> = Vec::new();
        let mut option_counts = vec![0usize; self.selects.len()];
        let mut submit_count = 0;
        let mut image_x = Vec::new();
        let mut image_y = Vec::new();

        for c in successful {
            match c.kind {
                ControlKind::Input(InputType::Radio) => {
                    match radio_counts.iter_mut().find(|(n, _)| *n == c.name) {
                        Some((_, count)) => *count += 1,
                        None => radio_counts.push((c.name.as_str(), 1)),
                    }
                }
                ControlKind::Input(InputType::Submit) | ControlKind::Button(ButtonType::Submit) => {
                    submit_count += 1;
                }
                ControlKind::Input(InputType::ImageX) => {
                    submit_count += 1;
                    image_x.push(c.image_basename());
                }
                ControlKind::Input(InputType::ImageY) => image_y.push(c.image_basename()),
                ControlKind::Option(id) if !self.selects[id.0].multiple => {
                    option_counts[id.0] += 1;
                }
                _ => {}
            }
        }

        if let Some((name, _)) = radio_counts.iter().find(|(_, count)| *count > 1) {
            return Err(ValidationError::AmbiguousSelection {
                name: Some((*name).to_owned()),
            });
        }
        if submit_count > 1 {
            return Err(ValidationError::AmbiguousSelection { name: None });
        }
        if submit_count == 0 && !self.has_unnamed_submit {
            return Err(ValidationError::MissingSelection { name: None });
        }
        for (select, &count) in self.selects.iter().zip(&option_counts) {
            if count > 1 {
                return Err(ValidationError::AmbiguousSelection {
                    name: Some(select.name.clone()),
                });
            }
        }

        image_x.sort_unstable();
        image_y.sort_unstable();
        if image_x != image_y {
            return Err(ValidationError::PairingMismatch {
                names: unpaired(&image_x, &image_y),
            });
        }

        for name in &self.radio_must_be_checked {
            if !radio_counts.iter().any(|(n, _)| *n == name.as_str()) {
                return Err(ValidationError::MissingSelection {
                    name: Some(name.clone()),
                });
            }
        }
        for (select, &count) in self.selects.iter().zip(&option_counts) {
            if select.must_choose && count == 0 {
                return Err(ValidationError::MissingSelection {
                    name: Some(select.name.clone()),
                });
            }
        }
        Ok(())
    }
}

/// Returns the sorted, distinct names whose occurrence counts differ.
fn unpaired(xs: &[&str], ys: &[&str]) -> Vec<String> {
    let count = |list: &[&str], name: &str| list.iter().filter(|&&n| n == name).count();
    let mut names: Vec<String> = xs
        .iter()
        .chain(ys)
        .filter(|&&n| count(xs, n) != count(ys, n))
        .map(|&n| n.to_owned())
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}
