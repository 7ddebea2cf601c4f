//! Form payloads and their validation.

use std::borrow::Cow;
use std::collections::BTreeMap;

use axum::extract::Multipart;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::error::AppError;
use crate::media::Upload;

/// Field name to messages, as the templates show them.
pub type FormErrors = BTreeMap<String, Vec<String>>;

const REQUIRED: &str = "This field is required.";

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", REQUIRED));
    }
    Ok(())
}

fn valid_username(value: &str) -> Result<(), ValidationError> {
    let ok = !value.is_empty()
        && value.chars().count() <= 150
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if ok {
        Ok(())
    } else {
        Err(invalid(
            "username",
            "Enter a valid username: up to 150 letters, digits and @/./+/-/_ characters.",
        ))
    }
}

fn optional_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(invalid("email", "Enter a valid email address."))
    }
}

pub fn form_errors(result: Result<(), ValidationErrors>) -> FormErrors {
    let mut out = FormErrors::new();
    if let Err(errs) = result {
        for (field, list) in errs.field_errors() {
            out.entry(field.to_string()).or_default().extend(
                list.iter()
                    .map(|e| e.message.as_deref().unwrap_or(REQUIRED).to_string()),
            );
        }
    }
    out
}

pub fn add_error(errors: &mut FormErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// Post create/edit form, sent as multipart because of the image field.
#[derive(Debug, Default, Validate)]
pub struct PostForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    /// Raw group id; empty means no group.
    pub group: Option<String>,
    pub image: Option<Upload>,
}

impl PostForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = PostForm::default();
        while let Some(field) = multipart.next_field().await.map_err(AppError::bad_request)? {
            match field.name().unwrap_or_default() {
                "text" => form.text = field.text().await.map_err(AppError::bad_request)?,
                "group" => {
                    let raw = field.text().await.map_err(AppError::bad_request)?;
                    form.group = Some(raw.trim().to_string()).filter(|g| !g.is_empty());
                }
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(AppError::bad_request)?;
                    // browsers send an empty part when no file was chosen
                    if !(file_name.is_empty() && bytes.is_empty()) {
                        form.image = Some(Upload {
                            file_name,
                            content_type,
                            bytes,
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }

    /// The group id, or a field error when the value is not a number.
    pub fn group_id(&self) -> Result<Option<i32>, &'static str> {
        match &self.group {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| "Select a valid choice."),
        }
    }

    pub fn view(&self) -> PostFormView {
        PostFormView {
            text: self.text.clone(),
            group: self.group_id().ok().flatten(),
        }
    }
}

/// What the post form template needs to re-render its fields.
#[derive(Debug, Default, Serialize)]
pub struct PostFormView {
    pub text: String,
    pub group: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[validate(schema(function = "passwords_match", skip_on_field_errors = false))]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    #[validate(custom(function = "valid_username"))]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "optional_email"))]
    pub email: String,
    #[serde(default, skip_serializing)]
    #[validate(length(min = 8, message = "This password is too short. It must contain at least 8 characters."))]
    pub password1: String,
    #[serde(default, skip_serializing)]
    pub password2: String,
}

fn passwords_match(form: &SignupForm) -> Result<(), ValidationError> {
    if form.password1 != form.password2 {
        return Err(invalid(
            "password_mismatch",
            "The two password fields didn't match.",
        ));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_comment_is_rejected() {
        let errs = form_errors(CommentForm { text: "  \n".into() }.validate());
        assert_eq!(errs["text"], vec![REQUIRED.to_string()]);
        assert!(form_errors(CommentForm { text: "hi".into() }.validate()).is_empty());
    }

    #[test]
    fn post_group_must_be_numeric() {
        let form = PostForm {
            text: "x".into(),
            group: Some("abc".into()),
            image: None,
        };
        assert!(form.group_id().is_err());
        let form = PostForm {
            group: Some("12".into()),
            ..form
        };
        assert_eq!(form.group_id(), Ok(Some(12)));
        assert_eq!(form.view().group, Some(12));
    }

    fn signup(username: &str, email: &str, p1: &str, p2: &str) -> SignupForm {
        SignupForm {
            username: username.into(),
            email: email.into(),
            password1: p1.into(),
            password2: p2.into(),
            ..Default::default()
        }
    }

    #[test]
    fn signup_validation() {
        assert!(signup("leo", "", "longenough", "longenough").validate().is_ok());
        assert!(signup("leo", "leo@example.com", "longenough", "longenough").validate().is_ok());

        let errs = form_errors(signup("bad name", "nope", "short", "other").validate());
        assert!(errs.contains_key("username"));
        assert!(errs.contains_key("email"));
        assert!(errs.contains_key("password1"));

        let mismatch = signup("leo", "", "longenough", "different").validate().unwrap_err();
        assert!(mismatch.errors().contains_key("__all__"));
    }
}
