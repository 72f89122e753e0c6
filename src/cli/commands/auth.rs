use anyhow::Result;

use landreg::errors::ErrorReport;
use landreg::models::user::{ AccountForm, Credentials, PasswordChange, ProfileUpdate };
use landreg::RegistryClient;

use crate::cli::ui;

/// Sign in, re-prompting while the input does not validate
pub async fn login(client: &RegistryClient, demo: bool, email: Option<&str>) -> Result<()> {
    ui::print_header("Sign In");

    let mut credentials = if demo {
        ui::print_info("Using the demo account");
        Credentials::demo()
    } else {
        Credentials::new(email.unwrap_or_default(), String::new())
    };

    loop {
        if !demo {
            credentials.email = ui::input_text("Email", &credentials.email)?;
            credentials.password = ui::input_password("Password")?;
        }

        let spinner = ui::spinner_with_message("Signing in...");
        let result = client.login(&credentials).await;
        spinner.finish_and_clear();

        match result {
            Ok(user) => {
                ui::print_success(&format!("Signed in as {}", user.full_name()));
                return Ok(());
            }
            Err(err) => {
                ui::print_report(&ErrorReport::from(&err));
                if demo || !ui::confirm_action("Try again?")? {
                    return Ok(());
                }
            }
        }
    }
}

pub async fn register(client: &RegistryClient) -> Result<()> {
    ui::print_header("Create Account");
    let mut form = AccountForm::default();

    loop {
        form.first_name = ui::input_text("First name", &form.first_name)?;
        form.last_name = ui::input_text("Last name", &form.last_name)?;
        form.email = ui::input_text("Email", &form.email)?;
        form.password = ui::input_password("Password")?;
        form.confirm_password = ui::input_password("Confirm password")?;

        let spinner = ui::spinner_with_message("Creating account...");
        let result = client.register(&form).await;
        spinner.finish_and_clear();

        match result {
            Ok(user) => {
                ui::print_success(&format!("Welcome, {}", user.full_name()));
                return Ok(());
            }
            Err(err) => {
                ui::print_report(&ErrorReport::from(&err));
                if !ui::confirm_action("Try again?")? {
                    return Ok(());
                }
            }
        }
    }
}

pub fn logout(client: &RegistryClient) {
    client.logout();
    ui::print_success("Signed out");
}

pub fn whoami(client: &RegistryClient) {
    match client.session().current() {
        Some(session) => {
            ui::print_user(&session.user);
            if let Some(expiry) = session.expires_at() {
                ui::print_result("Session expires", &expiry.format("%Y-%m-%d %H:%M UTC").to_string());
            }
        }
        None => ui::print_info("Not signed in"),
    }
}

pub async fn forgot_password(client: &RegistryClient, email: Option<&str>) -> Result<()> {
    let email = match email {
        Some(email) => email.to_string(),
        None => ui::input_text("Email", "")?,
    };
    match client.forgot_password(&email).await {
        Ok(message) if !message.is_empty() => ui::print_success(&message),
        Ok(_) => ui::print_success("Check your email for reset instructions"),
        Err(err) => ui::print_report(&ErrorReport::from(&err)),
    }
    Ok(())
}

pub async fn profile(client: &RegistryClient, edit: bool) -> Result<()> {
    ui::print_header("Profile");
    let spinner = ui::spinner_with_message("Loading profile...");
    let user = client.profile().await;
    spinner.finish_and_clear();
    let user = user?;
    ui::print_user(&user);

    if !edit {
        return Ok(());
    }

    let mut update = ProfileUpdate {
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
        phone_number: None,
    };
    loop {
        update.first_name = ui::input_text("First name", &update.first_name)?;
        update.last_name = ui::input_text("Last name", &update.last_name)?;
        update.email = ui::input_text("Email", &update.email)?;
        let phone = ui::input_text("Phone number", update.phone_number.as_deref().unwrap_or(""))?;
        update.phone_number = Some(phone);

        match client.update_profile(&update).await {
            Ok(user) => {
                ui::print_success("Profile updated");
                ui::print_user(&user);
                return Ok(());
            }
            Err(err) => {
                ui::print_report(&ErrorReport::from(&err));
                if err.is_unauthorized() || !ui::confirm_action("Try again?")? {
                    return Ok(());
                }
            }
        }
    }
}

pub async fn change_password(client: &RegistryClient) -> Result<()> {
    ui::print_header("Change Password");
    let change = PasswordChange {
        current_password: ui::input_password("Current password")?,
        new_password: ui::input_password("New password")?,
        confirm_password: ui::input_password("Confirm new password")?,
    };
    match client.change_password(&change).await {
        Ok(message) if !message.is_empty() => ui::print_success(&message),
        Ok(_) => ui::print_success("Password changed"),
        Err(err) => ui::print_report(&ErrorReport::from(&err)),
    }
    Ok(())
}
