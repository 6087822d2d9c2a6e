//! 表单校验模块
//!
//! 每个表单对应一个校验函数，返回字段级错误列表。
//! 每个字段只报告第一条未通过的规则，与表单逐字段展示错误的方式一致。

use crate::Salutation;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static COUNTRY_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("valid country code regex"));

const OTHER_SALUTATION_MAX: usize = 30;
const NAME_MAX: usize = 60;
const ADDRESS_MAX: usize = 120;
const CITY_MAX: usize = 60;
const ZIP_MAX: usize = 16;
const PICTURE_PATH_MAX: usize = 255;
const REGISTRATION_PASSWORD_MIN: usize = 12;
const NEW_PASSWORD_MIN: usize = 8;

// =========================================================
// 错误类型 (Field Errors)
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// 表单校验结果中的全部字段错误
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// 获取某个字段的错误信息
    pub fn field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// =========================================================
// 表单定义 (Forms)
// =========================================================

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub salutation: String,
    pub other_salutation: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub repeat_password: String,
    pub country: String,
}

#[derive(Debug, Clone, Default)]
pub struct AccountForm {
    pub salutation: String,
    pub other_salutation: String,
    pub first_name: String,
    pub last_name: String,
    pub country_code: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub profile_picture_path: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub repeat_new_password: String,
}

// =========================================================
// 校验规则 (Rules)
// =========================================================

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

/// 称谓必须是预设值之一；选择 MX 时自定义称谓必填
fn check_salutation(errors: &mut ValidationErrors, salutation: &str, other: &str) {
    if salutation.is_empty() {
        errors.push("salutation", "Please choose a salutation");
        return;
    }
    match Salutation::parse(salutation) {
        None => errors.push("salutation", "Invalid salutation"),
        Some(Salutation::Mx) => {
            if other.is_empty() {
                errors.push("otherSalutation", "Please enter a salutation");
            } else if too_long(other, OTHER_SALUTATION_MAX) {
                errors.push("otherSalutation", "At most 30 characters allowed");
            }
        }
        Some(_) => {}
    }
}

fn check_required_max(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: &str,
    max: usize,
) {
    if value.is_empty() {
        errors.push(field, format!("{} is required", label));
    } else if too_long(value, max) {
        errors.push(field, format!("{} must be at most {} characters", label, max));
    }
}

pub fn validate_registration(form: &RegistrationForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_salutation(&mut errors, &form.salutation, &form.other_salutation);

    if form.email.is_empty() {
        errors.push("email", "Email is required");
    } else if !EMAIL_RE.is_match(&form.email) {
        errors.push("email", "Please enter a valid email address");
    }

    if form.username.is_empty() {
        errors.push("username", "Username must not be empty");
    }

    let pw = &form.password;
    if pw.is_empty() {
        errors.push("password", "Password is required");
    } else if pw.chars().count() < REGISTRATION_PASSWORD_MIN {
        errors.push("password", "At least 12 characters required");
    } else if !pw.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("password", "At least one lowercase letter required");
    } else if !pw.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("password", "At least one uppercase letter required");
    } else if !pw.chars().any(|c| c.is_ascii_digit()) {
        errors.push("password", "At least one digit required");
    } else if pw.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push("password", "At least one special character required");
    }

    if form.repeat_password != form.password {
        errors.push("repeatPassword", "Passwords must match");
    } else if form.repeat_password.is_empty() {
        errors.push("repeatPassword", "Please confirm the password");
    }

    if form.country.is_empty() {
        errors.push("country", "Please choose a country");
    }

    errors.into_result()
}

pub fn validate_account(form: &AccountForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_salutation(&mut errors, &form.salutation, &form.other_salutation);
    check_required_max(&mut errors, "firstName", "First name", &form.first_name, NAME_MAX);
    check_required_max(&mut errors, "lastName", "Last name", &form.last_name, NAME_MAX);

    if form.country_code.is_empty() {
        errors.push("countryCode", "Country code is required");
    } else if !COUNTRY_CODE_RE.is_match(&form.country_code) {
        errors.push(
            "countryCode",
            "Country code must be an ISO-2 code (e.g. AT, DE, IT)",
        );
    }

    check_required_max(&mut errors, "address", "Address", &form.address, ADDRESS_MAX);
    check_required_max(&mut errors, "city", "City", &form.city, CITY_MAX);
    check_required_max(&mut errors, "zip", "ZIP", &form.zip, ZIP_MAX);

    if let Some(path) = &form.profile_picture_path {
        if too_long(path, PICTURE_PATH_MAX) {
            errors.push(
                "profilePicturePath",
                "Profile picture path must be at most 255 characters",
            );
        }
    }

    errors.into_result()
}

pub fn validate_password_change(form: &PasswordForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if form.current_password.is_empty() {
        errors.push("currentPassword", "Current password is required");
    }

    let pw = &form.new_password;
    let strong = pw.chars().count() >= NEW_PASSWORD_MIN
        && pw.chars().any(|c| c.is_ascii_digit())
        && pw.chars().any(|c| c.is_ascii_lowercase())
        && pw.chars().any(|c| c.is_ascii_uppercase());
    if pw.is_empty() {
        errors.push("newPassword", "New password is required");
    } else if !strong {
        errors.push(
            "newPassword",
            "At least 8 characters, one digit, one uppercase and one lowercase letter",
        );
    }

    if form.repeat_new_password.is_empty() {
        errors.push("repeatNewPassword", "Please confirm the password");
    } else if form.repeat_new_password != form.new_password {
        errors.push("repeatNewPassword", "Passwords must match");
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> RegistrationForm {
        RegistrationForm {
            salutation: "MS".into(),
            other_salutation: String::new(),
            email: "jane@example.org".into(),
            username: "jane".into(),
            password: "Correct-Horse-7".into(),
            repeat_password: "Correct-Horse-7".into(),
            country: "AT".into(),
        }
    }

    fn valid_account() -> AccountForm {
        AccountForm {
            salutation: "MR".into(),
            other_salutation: String::new(),
            first_name: "Max".into(),
            last_name: "Muster".into(),
            country_code: "DE".into(),
            address: "Hauptstrasse 1".into(),
            city: "Berlin".into(),
            zip: "10115".into(),
            profile_picture_path: None,
        }
    }

    #[test]
    fn registration_accepts_valid_form() {
        assert!(validate_registration(&valid_registration()).is_ok());
    }

    #[test]
    fn other_salutation_required_only_for_mx() {
        let mut form = valid_registration();
        form.other_salutation = "ignored".repeat(10);
        assert!(validate_registration(&form).is_ok());

        form.salutation = "MX".into();
        form.other_salutation = String::new();
        let errors = validate_registration(&form).unwrap_err();
        assert_eq!(
            errors.field("otherSalutation"),
            Some("Please enter a salutation")
        );

        form.other_salutation = "x".repeat(31);
        let errors = validate_registration(&form).unwrap_err();
        assert_eq!(
            errors.field("otherSalutation"),
            Some("At most 30 characters allowed")
        );

        form.other_salutation = "Dr.".into();
        assert!(validate_registration(&form).is_ok());
    }

    #[test]
    fn unknown_salutation_rejected() {
        let mut form = valid_registration();
        form.salutation = "SIR".into();
        let errors = validate_registration(&form).unwrap_err();
        assert_eq!(errors.field("salutation"), Some("Invalid salutation"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn registration_password_rules_report_first_failure() {
        let mut form = valid_registration();
        for (pw, expected) in [
            ("", "Password is required"),
            ("Short-1", "At least 12 characters required"),
            ("ALLUPPERCASE-1", "At least one lowercase letter required"),
            ("alllowercase-1", "At least one uppercase letter required"),
            ("NoDigitsHere-x", "At least one digit required"),
            ("NoSpecials1234", "At least one special character required"),
        ] {
            form.password = pw.into();
            form.repeat_password = pw.into();
            let errors = validate_registration(&form).unwrap_err();
            assert_eq!(errors.field("password"), Some(expected), "password {:?}", pw);
        }
    }

    #[test]
    fn registration_repeat_must_match() {
        let mut form = valid_registration();
        form.repeat_password = "different".into();
        let errors = validate_registration(&form).unwrap_err();
        assert_eq!(errors.field("repeatPassword"), Some("Passwords must match"));
    }

    #[test]
    fn registration_collects_multiple_fields() {
        let form = RegistrationForm::default();
        let errors = validate_registration(&form).unwrap_err();
        assert!(errors.field("salutation").is_some());
        assert!(errors.field("email").is_some());
        assert!(errors.field("username").is_some());
        assert!(errors.field("password").is_some());
        assert!(errors.field("country").is_some());
    }

    #[test]
    fn invalid_email_rejected() {
        let mut form = valid_registration();
        form.email = "not-an-email".into();
        let errors = validate_registration(&form).unwrap_err();
        assert_eq!(
            errors.field("email"),
            Some("Please enter a valid email address")
        );
    }

    #[test]
    fn account_accepts_valid_form() {
        assert!(validate_account(&valid_account()).is_ok());
    }

    #[test]
    fn account_country_code_must_be_iso2() {
        let mut form = valid_account();
        for code in ["de", "DEU", "D1"] {
            form.country_code = code.into();
            let errors = validate_account(&form).unwrap_err();
            assert!(errors.field("countryCode").is_some(), "code {:?}", code);
        }
    }

    #[test]
    fn account_length_limits() {
        let mut form = valid_account();
        form.first_name = "a".repeat(61);
        form.zip = "1".repeat(17);
        form.profile_picture_path = Some("p".repeat(256));
        let errors = validate_account(&form).unwrap_err();
        assert_eq!(
            errors.field("firstName"),
            Some("First name must be at most 60 characters")
        );
        assert_eq!(errors.field("zip"), Some("ZIP must be at most 16 characters"));
        assert!(errors.field("profilePicturePath").is_some());
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn password_change_rules() {
        let ok = PasswordForm {
            current_password: "old".into(),
            new_password: "Abcdefg1".into(),
            repeat_new_password: "Abcdefg1".into(),
        };
        assert!(validate_password_change(&ok).is_ok());

        let weak = PasswordForm {
            new_password: "abcdefgh".into(),
            repeat_new_password: "abcdefgh".into(),
            ..ok.clone()
        };
        let errors = validate_password_change(&weak).unwrap_err();
        assert!(errors.field("newPassword").is_some());

        let mismatch = PasswordForm {
            repeat_new_password: "Abcdefg2".into(),
            ..ok.clone()
        };
        let errors = validate_password_change(&mismatch).unwrap_err();
        assert_eq!(errors.field("repeatNewPassword"), Some("Passwords must match"));

        let missing = PasswordForm::default();
        let errors = validate_password_change(&missing).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
