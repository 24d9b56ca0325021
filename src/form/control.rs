use alloc::string::String;

/// The type of an `<input>` control.
///
/// An `<input type="image">` is split into two controls, one per
/// click coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputType {
    /// `type="text"`, also the default.
    Text,
    /// `type="password"`.
    Password,
    /// `type="checkbox"`.
    Checkbox,
    /// `type="radio"`.
    Radio,
    /// `type="submit"`.
    Submit,
    /// `type="hidden"`.
    Hidden,
    /// The `x` coordinate of a `type="image"` click.
    ImageX,
    /// The `y` coordinate of a `type="image"` click.
    ImageY,
    /// `type="button"` with a `value`.
    Button,
}

/// The type of a `<button>` control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonType {
    /// `type="submit"`, also the default.
    Submit,
    /// `type="button"`.
    Button,
}

/// Identifies a `<select>` menu within a [`FormModel`](super::FormModel).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SelectId(pub(super) usize);

/// The kind of a [`FormControl`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// An `<input>` element.
    Input(InputType),
    /// An `<option>` of the given `<select>` menu.
    Option(SelectId),
    /// A `<textarea>` element.
    Textarea,
    /// A `<button>` element.
    Button(ButtonType),
}

/// A `<select>` menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Select {
    pub(super) name: String,
    pub(super) multiple: bool,
    pub(super) disabled: bool,
    pub(super) must_choose: bool,
}

impl Select {
    /// Returns the name of the menu.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks whether the menu allows multiple selections.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Checks whether the menu is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Checks whether exactly one option of this menu must be submitted.
    ///
    /// This holds for a single-select menu with an option
    /// initially selected. The rule applies per menu, not per name: an
    /// option submitted through another menu of the same name does not
    /// satisfy it.
    #[must_use]
    pub fn must_choose(&self) -> bool {
        self.must_choose
    }
}

/// A named form control that may contribute a pair to a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormControl {
    pub(super) kind: ControlKind,
    pub(super) name: String,
    pub(super) value: Option<String>,
    pub(super) disabled: bool,
    pub(super) readonly: bool,
    pub(super) maxlength: Option<usize>,
}

impl FormControl {
    pub(super) fn new(kind: ControlKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            value: None,
            disabled: false,
            readonly: false,
            maxlength: None,
        }
    }

    /// Returns the kind of the control.
    #[must_use]
    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    /// Returns the name the control submits under.
    ///
    /// For image coordinates this includes the `.x` or `.y` suffix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value written in the markup, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Checks whether the control is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Checks whether the control is read-only.
    #[must_use]
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Returns the maximum length in characters of a text input.
    #[must_use]
    pub fn maxlength(&self) -> Option<usize> {
        self.maxlength
    }

    /// Checks whether the control can only submit its markup value.
    #[must_use]
    pub fn is_fixed_value(&self) -> bool {
        if self.readonly {
            return true;
        }
        match self.kind {
            ControlKind::Input(InputType::Text | InputType::Password)
            | ControlKind::Input(InputType::ImageX | InputType::ImageY)
            | ControlKind::Textarea => false,
            ControlKind::Input(_) | ControlKind::Option(_) | ControlKind::Button(_) => true,
        }
    }

    /// Checks whether the control is submitted by every user agent
    /// regardless of user interaction.
    #[must_use]
    pub fn is_always_successful(&self) -> bool {
        if self.disabled {
            return false;
        }
        match self.kind {
            ControlKind::Input(InputType::Text | InputType::Password | InputType::Hidden) => true,
            ControlKind::Textarea => !self.readonly,
            _ => false,
        }
    }

    /// Checks whether a user could enter the value into this control.
    ///
    /// Only meaningful for controls that are not fixed-value.
    pub(super) fn accepts_value(&self, value: &str) -> bool {
        match self.kind {
            ControlKind::Input(InputType::Text | InputType::Password) => self
                .maxlength
                .map_or(true, |max| value.chars().count() <= max),
            ControlKind::Input(InputType::ImageX | InputType::ImageY) => {
                !value.is_empty() && value.bytes().all(|x| x.is_ascii_digit())
            }
            _ => true,
        }
    }

    /// Checks whether the submitted pair could have come from this control.
    #[must_use]
    pub fn corresponds(&self, name: &str, value: &str) -> bool {
        if self.disabled || self.name != name {
            return false;
        }
        if self.is_fixed_value() {
            self.value.as_deref() == Some(value)
        } else {
            self.accepts_value(value)
        }
    }

    /// Returns the image control name without its coordinate suffix.
    pub(super) fn image_basename(&self) -> &str {
        self.name
            .strip_suffix(".x")
            .or_else(|| self.name.strip_suffix(".y"))
            .unwrap_or(&self.name)
    }
}
