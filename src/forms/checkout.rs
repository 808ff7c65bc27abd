use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::checkout::{CheckoutField, PersonalData, ShippingAddress};
use crate::domain::user::AuthenticatedUser;
use crate::forms::catalog::sanitize_inline_text;

/// Maximum allowed length for a buyer name.
const NAME_MAX_LEN: usize = 128;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Longest accepted RUT input, separators included (`99.999.999-K`).
const RUT_MAX_LEN_VALIDATOR: u64 = 16;

/// Longest accepted phone input, separators included.
const PHONE_MAX_LEN_VALIDATOR: u64 = 24;

/// Maximum allowed length for an address field.
const ADDRESS_FIELD_MAX_LEN_VALIDATOR: u64 = 256;

/// Valid RUT bodies lie in this range.
const RUT_MIN: u64 = 1_000_000;
const RUT_MAX: u64 = 99_999_999;

/// Result type returned by the checkout form helpers.
pub type CheckoutFormResult<T> = Result<T, CheckoutFormError>;

/// Errors that can occur while processing checkout forms.
#[derive(Debug, Error)]
pub enum CheckoutFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("name cannot be empty")]
    EmptyName,
    /// The national identifier is malformed or has a wrong check digit.
    #[error("invalid RUT `{value}`: {reason}")]
    InvalidRut { value: String, reason: &'static str },
    /// The phone number cannot be normalized.
    #[error("invalid phone `{value}`: {reason}")]
    InvalidPhone { value: String, reason: &'static str },
    /// A required address field is blank.
    #[error("address field `{field}` is required")]
    IncompleteAddress { field: &'static str },
}

/// Buyer details as typed into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PersonalDataForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    #[validate(length(min = 1, max = RUT_MAX_LEN_VALIDATOR))]
    pub rut: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = PHONE_MAX_LEN_VALIDATOR))]
    pub phone: String,
}

impl PersonalDataForm {
    /// Validates and normalizes the payload into domain `PersonalData`.
    pub fn into_personal_data(self) -> CheckoutFormResult<PersonalData> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(CheckoutFormError::EmptyName);
        }

        Ok(PersonalData {
            name,
            rut: normalize_rut(&self.rut)?,
            email: self.email.trim().to_lowercase(),
            phone: normalize_phone(&self.phone)?,
        })
    }

    /// Fields that would make `into_personal_data` fail.
    pub fn invalid_fields(&self) -> Vec<CheckoutField> {
        let errors = self.validate().err();
        let rejected = |field: &str| {
            errors
                .as_ref()
                .is_some_and(|errors| errors.field_errors().contains_key(field))
        };

        let mut fields = Vec::new();
        if rejected("name") || sanitize_inline_text(&self.name).is_empty() {
            fields.push(CheckoutField::Name);
        }
        if rejected("rut") || normalize_rut(&self.rut).is_err() {
            fields.push(CheckoutField::Rut);
        }
        if rejected("email") {
            fields.push(CheckoutField::Email);
        }
        if rejected("phone") || normalize_phone(&self.phone).is_err() {
            fields.push(CheckoutField::Phone);
        }
        fields
    }
}

impl From<&AuthenticatedUser> for PersonalDataForm {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            name: user.name.clone(),
            rut: user.rut.clone().unwrap_or_default(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
        }
    }
}

/// Delivery address as typed into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ShippingAddressForm {
    #[validate(length(max = ADDRESS_FIELD_MAX_LEN_VALIDATOR))]
    pub street: String,
    #[validate(length(max = ADDRESS_FIELD_MAX_LEN_VALIDATOR))]
    pub postal_code: String,
    #[validate(length(max = ADDRESS_FIELD_MAX_LEN_VALIDATOR))]
    pub commune: String,
    #[validate(length(max = ADDRESS_FIELD_MAX_LEN_VALIDATOR))]
    pub city: String,
}

impl ShippingAddressForm {
    /// Validates the payload into a complete domain `ShippingAddress`.
    pub fn into_address(self) -> CheckoutFormResult<ShippingAddress> {
        self.validate()?;

        let required = |field: &'static str, value: &str| {
            let sanitized = sanitize_inline_text(value);
            if sanitized.is_empty() {
                Err(CheckoutFormError::IncompleteAddress { field })
            } else {
                Ok(sanitized)
            }
        };

        Ok(ShippingAddress {
            street: required("street", &self.street)?,
            postal_code: required("postal_code", &self.postal_code)?,
            commune: required("commune", &self.commune)?,
            city: required("city", &self.city)?,
        })
    }
}

/// Normalize a Chilean RUT to `<digits>-<check digit>` after verifying it.
///
/// Accepts dots, spaces and an optional dash (`12.345.678-5`, `123456785`).
pub fn normalize_rut(input: &str) -> CheckoutFormResult<String> {
    let invalid = |reason: &'static str| CheckoutFormError::InvalidRut {
        value: input.to_string(),
        reason,
    };

    let cleaned: String = input
        .trim()
        .chars()
        .filter(|ch| *ch != '.' && !ch.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    let (body, check) = match cleaned.split_once('-') {
        Some((body, check)) => (body.to_string(), check.to_string()),
        None => match cleaned.char_indices().next_back() {
            Some((split_at, _)) if split_at > 0 => {
                let (body, check) = cleaned.split_at(split_at);
                (body.to_string(), check.to_string())
            }
            _ => return Err(invalid("too short")),
        },
    };

    if body.is_empty() || !body.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(invalid("body must contain only digits"));
    }
    if check.len() != 1 || !check.chars().all(|ch| ch.is_ascii_digit() || ch == 'K') {
        return Err(invalid("check digit must be a digit or K"));
    }

    let number = body
        .parse::<u64>()
        .map_err(|_| invalid("body is not a number"))?;
    if !(RUT_MIN..=RUT_MAX).contains(&number) {
        return Err(invalid("body out of range"));
    }

    if check != rut_check_digit(&body) {
        return Err(invalid("check digit mismatch"));
    }

    Ok(format!("{body}-{check}"))
}

/// Modulo-11 check digit for a RUT body made of ASCII digits.
fn rut_check_digit(body: &str) -> String {
    let sum: u32 = body
        .bytes()
        .rev()
        .zip([2u32, 3, 4, 5, 6, 7].into_iter().cycle())
        .map(|(digit, factor)| u32::from(digit - b'0') * factor)
        .sum();

    match 11 - (sum % 11) {
        11 => "0".to_string(),
        10 => "K".to_string(),
        digit => digit.to_string(),
    }
}

/// Normalize a Chilean phone number to international `+56…` form.
pub fn normalize_phone(input: &str) -> CheckoutFormResult<String> {
    let invalid = |reason: &'static str| CheckoutFormError::InvalidPhone {
        value: input.to_string(),
        reason,
    };

    let cleaned: String = input
        .trim()
        .chars()
        .filter(|ch| !ch.is_whitespace() && !matches!(ch, '-' | '(' | ')'))
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(invalid("only digits are allowed"));
    }

    match digits.len() {
        11 if digits.starts_with("569") => Ok(format!("+{digits}")),
        10 if digits.starts_with("56") && !digits.starts_with("569") => Ok(format!("+{digits}")),
        9 if digits.starts_with('9') => Ok(format!("+56{digits}")),
        9 => Err(invalid("local numbers must start with 9")),
        8 => Ok(format!("+569{digits}")),
        _ => Err(invalid("unexpected number of digits")),
    }
}
