use serde::{ Deserialize, Serialize };

use crate::errors::FieldErrors;
use crate::validation;

/// Identity record of a registry user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Successful login/registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Email + password
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// Shared demo account of the registry
    pub fn demo() -> Self {
        Self::new("demo@landregistry.com", "demo123456")
    }

    /// Login form schema
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = validation::email(&mut errors, "email", &self.email);
        if let Some(password) = validation::required(
            &mut errors,
            "password",
            &self.password,
            "Password is required"
        ) {
            validation::min_len(
                &mut errors,
                "password",
                &password,
                6,
                "Password must be at least 6 characters"
            );
        }
        errors.into_result(Credentials {
            email: email.unwrap_or_default(),
            password: self.password.clone(),
        })
    }
}

/// Raw account-registration form
#[derive(Debug, Clone, Default)]
pub struct AccountForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Validated account registration, as sent to `POST /auth/register`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl AccountForm {
    pub fn validate(&self) -> Result<NewAccount, FieldErrors> {
        let mut errors = FieldErrors::new();

        let first_name = name_field(&mut errors, "firstName", "First name", &self.first_name);
        let last_name = name_field(&mut errors, "lastName", "Last name", &self.last_name);

        let email = validation::email(&mut errors, "email", &self.email);
        if let Some(email) = &email {
            if email.to_lowercase() != *email {
                errors.add("email", "Email must be lowercase");
            }
        }

        if
            let Some(password) = validation::required(
                &mut errors,
                "password",
                &self.password,
                "Password is required"
            )
        {
            if
                validation::min_len(
                    &mut errors,
                    "password",
                    &password,
                    8,
                    "Password must be at least 8 characters"
                ) &&
                !validation::is_strong_password(&password)
            {
                errors.add(
                    "password",
                    "Password must contain at least one uppercase letter, one lowercase letter, one number and one special character"
                );
            }
        }

        if validation::present(&self.confirm_password).is_none() {
            errors.add("confirmPassword", "Confirm password is required");
        } else if self.confirm_password != self.password {
            errors.add("confirmPassword", "Passwords must match");
        }

        errors.into_result(NewAccount {
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            password: self.password.clone(),
        })
    }
}

fn name_field(errors: &mut FieldErrors, field: &str, label: &str, value: &str) -> Option<String> {
    let value = validation::required(errors, field, value, &format!("{} is required", label))?;
    if !validation::min_len(errors, field, &value, 2, &format!("{} must be at least 2 characters", label)) {
        return None;
    }
    if !validation::is_alphabetic_name(&value) {
        errors.add(field, format!("{} can only contain letters", label));
        return None;
    }
    Some(value)
}

/// Editable profile fields (`PUT /auth/profile`)
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<ProfileUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let first_name = validation::required(
            &mut errors,
            "firstName",
            &self.first_name,
            "First name is required"
        );
        let last_name = validation::required(
            &mut errors,
            "lastName",
            &self.last_name,
            "Last name is required"
        );
        let email = validation::email(&mut errors, "email", &self.email);
        errors.into_result(ProfileUpdate {
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            phone_number: self.phone_number
                .as_deref()
                .and_then(validation::present)
                .map(str::to_string),
        })
    }
}

/// Password change form (`POST /auth/change-password`)
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        validation::required(
            &mut errors,
            "currentPassword",
            &self.current_password,
            "Current password is required"
        );
        if
            let Some(new_password) = validation::required(
                &mut errors,
                "newPassword",
                &self.new_password,
                "New password is required"
            )
        {
            validation::min_len(
                &mut errors,
                "newPassword",
                &new_password,
                6,
                "Password must be at least 6 characters"
            );
        }
        if validation::present(&self.confirm_password).is_none() {
            errors.add("confirmPassword", "Please confirm your password");
        } else if self.confirm_password != self.new_password {
            errors.add("confirmPassword", "Passwords must match");
        }
        errors.into_result(())
    }
}

/// Plain `{message}` acknowledgements
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_schema() {
        assert!(Credentials::new("a@b.com", "secret1").validate().is_ok());

        let errors = Credentials::new("not-an-email", "123").validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Invalid email address"));
        assert_eq!(errors.get("password"), Some("Password must be at least 6 characters"));
    }

    #[test]
    fn account_schema_requires_matching_confirmation() {
        let form = AccountForm {
            first_name: "Aminata".into(),
            last_name: "Kamara".into(),
            email: "aminata@example.sl".into(),
            password: "Str0ng!pass".into(),
            confirm_password: "Str0ng!pas".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("confirmPassword"), Some("Passwords must match"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn user_accepts_mongo_style_id() {
        let user: User = serde_json
            ::from_str(r#"{"_id":"u1","firstName":"Ada","lastName":"Cole","email":"ada@x.io","role":"user"}"#)
            .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.full_name(), "Ada Cole");
    }
}
