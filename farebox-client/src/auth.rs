use farebox_core::validation::{self, FieldErrors};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CredentialField {
    Username,
    Email,
    Password,
}

impl CredentialField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialField::Username => "username",
            CredentialField::Email => "email",
            CredentialField::Password => "password",
        }
    }
}

fn check_username(value: &str) -> Option<String> {
    if !validation::has_text(value) {
        return Some("Username is required".to_string());
    }
    None
}

fn check_email(value: &str) -> Option<String> {
    if !validation::has_text(value) {
        return Some("Email is required".to_string());
    }
    if !validation::is_email(value) {
        return Some("Email is invalid".to_string());
    }
    None
}

fn check_password(value: &str) -> Option<String> {
    if value.is_empty() {
        return Some("Password is required".to_string());
    }
    if !validation::is_strong_password(value) {
        return Some(
            "Password must be at least 8 characters and include uppercase, lowercase, number, and special character."
                .to_string(),
        );
    }
    None
}

/// Sign-in form state: username and password with touched tracking, so
/// errors surface on blur and clear as the user corrects them.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    username: String,
    password: String,
    touched: BTreeSet<CredentialField>,
    errors: FieldErrors<CredentialField>,
}

impl LoginForm {
    const FIELDS: [CredentialField; 2] = [CredentialField::Username, CredentialField::Password];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn errors(&self) -> &FieldErrors<CredentialField> {
        &self.errors
    }

    fn check_field(&self, field: CredentialField) -> Option<String> {
        match field {
            CredentialField::Username => check_username(&self.username),
            CredentialField::Password => check_password(&self.password),
            CredentialField::Email => None,
        }
    }

    pub fn edit(&mut self, field: CredentialField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CredentialField::Username => self.username = value,
            CredentialField::Password => self.password = value,
            CredentialField::Email => return,
        }
        if self.touched.contains(&field) {
            self.errors.set(field, self.check_field(field));
        }
    }

    pub fn blur(&mut self, field: CredentialField) {
        self.touched.insert(field);
        self.errors.set(field, self.check_field(field));
    }

    /// Submission mode: every field touched and checked at once. Returns
    /// true when the form may be sent.
    pub fn validate_all(&mut self) -> bool {
        self.touched.extend(Self::FIELDS);
        for field in Self::FIELDS {
            self.errors.set(field, self.check_field(field));
        }
        self.errors.is_empty()
    }
}

/// Registration form state: username, email and password.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    username: String,
    email: String,
    password: String,
    touched: BTreeSet<CredentialField>,
    errors: FieldErrors<CredentialField>,
}

impl RegisterForm {
    const FIELDS: [CredentialField; 3] = [
        CredentialField::Username,
        CredentialField::Email,
        CredentialField::Password,
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn errors(&self) -> &FieldErrors<CredentialField> {
        &self.errors
    }

    fn check_field(&self, field: CredentialField) -> Option<String> {
        match field {
            CredentialField::Username => check_username(&self.username),
            CredentialField::Email => check_email(&self.email),
            CredentialField::Password => check_password(&self.password),
        }
    }

    pub fn edit(&mut self, field: CredentialField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CredentialField::Username => self.username = value,
            CredentialField::Email => self.email = value,
            CredentialField::Password => self.password = value,
        }
        if self.touched.contains(&field) {
            self.errors.set(field, self.check_field(field));
        }
    }

    pub fn blur(&mut self, field: CredentialField) {
        self.touched.insert(field);
        self.errors.set(field, self.check_field(field));
    }

    pub fn validate_all(&mut self) -> bool {
        self.touched.extend(Self::FIELDS);
        for field in Self::FIELDS {
            self.errors.set(field, self.check_field(field));
        }
        self.errors.is_empty()
    }
}
