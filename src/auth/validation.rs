//! Sign-up and login forms and the sign-up rules

use serde::Deserialize;

use crate::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "firstName")]
    pub first_name: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Check a sign-up form. Rules run in a fixed order and the first failure wins.
pub fn validate_sign_up(form: &SignUpForm, email_taken: bool) -> Result<(), AppError> {
    let email = form.email.trim();

    if email_taken {
        Err(AppError::validation("Email already exists."))
    } else if email.chars().count() < 4 {
        Err(AppError::validation("Email must be greater than 4 characters."))
    } else if !email.contains('@') {
        Err(AppError::validation("Email must contain @."))
    } else if form.first_name.chars().count() < 2 {
        Err(AppError::validation(
            "First name must be greater than 1 character.",
        ))
    } else if form.password1 != form.password2 {
        Err(AppError::validation("Passwords don't match."))
    } else if form.password1.chars().count() < 7 {
        Err(AppError::validation("Password must be at least 7 characters."))
    } else {
        Ok(())
    }
}
