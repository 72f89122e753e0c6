use colored::*;
use console::Term;
use dialoguer::{ theme::ColorfulTheme, Confirm, Input, Password, Select };
use indicatif::{ ProgressBar, ProgressStyle };
use std::time::Duration;
use textwrap::wrap;

use landreg::errors::ErrorReport;
use landreg::implementations::attachments::{ main_image_index, AttachmentSummary, Rejection };
use landreg::models::common::VerificationStatus;
use landreg::models::property::Property;
use landreg::models::user::User;
use landreg::traits::StepInfo;

/// UI theme for consistent appearance
pub fn get_theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

/// Print a section header
pub fn print_header(title: &str) {
    let title = format!(" {} ", title);
    println!("\n{}\n", title.bold().white().on_blue());
}

/// Print text with proper wrapping
pub fn print_text(text: &str) {
    let width = Term::stdout().size().1 as usize;
    for line in text.lines() {
        for wrapped_line in wrap(line, width.saturating_sub(10).max(20)) {
            println!("{}", wrapped_line);
        }
    }
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "ERROR:".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "WARNING:".yellow().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "SUCCESS:".green().bold(), message);
}

/// Print information
pub fn print_info(message: &str) {
    println!("{} {}", "INFO:".blue().bold(), message);
}

/// Print a formatted result
pub fn print_result(label: &str, value: &str) {
    println!("{}: {}", label.bold(), value);
}

/// Print a normalized failure: the message, then one line per field
pub fn print_report(report: &ErrorReport) {
    print_error(&report.message);
    if let Some(fields) = &report.field_errors {
        for (field, message) in fields.iter() {
            eprintln!("  {} {}", format!("{}:", field).red(), message);
        }
    }
}

pub fn print_rejections(rejections: &[Rejection]) {
    for rejection in rejections {
        print_warning(&rejection.message);
    }
}

/// Wizard progress line, e.g. `[2/4] Documents`
pub fn print_step(steps: &[StepInfo], current: usize) {
    let labels: Vec<String> = steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            if index < current {
                format!("✓ {}", step.name).green().to_string()
            } else if index == current {
                step.name.bold().cyan().to_string()
            } else {
                step.name.dimmed().to_string()
            }
        })
        .collect();
    println!("{}", labels.join(" → "));
    if let Some(step) = steps.get(current) {
        print_header(&format!("[{}/{}] {}", current + 1, steps.len(), step.name));
        print_text(step.description);
    }
}

/// Print verification status with color
pub fn print_verification_status(status: &VerificationStatus) {
    match status {
        VerificationStatus::Verified => println!("{}", "✓ Verified".green().bold()),
        VerificationStatus::Pending => println!("{}", "⏱ Pending".yellow().bold()),
        VerificationStatus::Unverified => println!("{}", "? Unverified".red().bold()),
    }
}

fn status_badge(status: &VerificationStatus) -> ColoredString {
    match status {
        VerificationStatus::Verified => status.as_str().green(),
        VerificationStatus::Pending => status.as_str().yellow(),
        VerificationStatus::Unverified => status.as_str().red(),
    }
}

/// One line per property
pub fn print_property_row(property: &Property) {
    println!(
        "{}  {}  {}  {} m²  {:.2}  [{}]",
        property.id.dimmed(),
        property.title.bold(),
        property.property_type,
        property.size,
        property.price,
        status_badge(&property.verification_status)
    );
}

pub fn print_property(property: &Property) {
    print_header(&property.title);
    print_result("ID", &property.id);
    print_result("Type", property.property_type.as_str());
    print_result("Size", &format!("{} m²", property.size));
    print_result("Price", &format!("{:.2}", property.price));
    let location = &property.location;
    print_result("Location", &format!("{}, {}, {}", location.address, location.area, location.city));
    if let Some(coordinates) = location.coordinates {
        print_result("Coordinates", &coordinates.to_string());
    }
    if let Some(owner) = &property.owner {
        print_result("Owner", &owner.display_name());
    }
    if let Some(date) = property.registration_date {
        print_result("Registered", &date.format("%Y-%m-%d").to_string());
    }
    print!("{} ", "Status:".bold());
    print_verification_status(&property.verification_status);
    if !property.description.is_empty() {
        println!();
        print_text(&property.description);
    }
    if !property.documents.is_empty() {
        println!("\n{}", "Documents".bold());
        for document in &property.documents {
            println!("  - {} ({})", document.name, document.doc_type);
        }
    }
    if let Some(image) = property.main_image() {
        print_result("Main image", &image.url);
    }
}

pub fn print_user(user: &User) {
    print_result("Name", &user.full_name());
    print_result("Email", &user.email);
    if !user.role.is_empty() {
        print_result("Role", &user.role);
    }
}

pub fn print_attachments(attachments: &[AttachmentSummary]) {
    if attachments.is_empty() {
        print_info("No files attached");
        return;
    }
    let main_image = main_image_index(attachments);
    for (index, attachment) in attachments.iter().enumerate() {
        let marker = if Some(index) == main_image { format!(" {}", "[Main Image]".green()) } else { String::new() };
        println!(
            "  {}. {} ({}, {:.1} KB){}",
            index + 1,
            attachment.name,
            attachment.role.label(),
            (attachment.size as f64) / 1024.0,
            marker
        );
    }
}

/// Free-text prompt, prefilled with the current value
pub fn input_text(prompt: &str, current: &str) -> std::io::Result<String> {
    let theme = get_theme();
    let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt).allow_empty(true);
    if !current.is_empty() {
        input = input.with_initial_text(current);
    }
    input.interact_text().map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

pub fn input_password(prompt: &str) -> std::io::Result<String> {
    Password::with_theme(&get_theme())
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

/// Pick one of `items`, returning its index
pub fn select_index(prompt: &str, items: &[String], default: usize) -> std::io::Result<usize> {
    Select::with_theme(&get_theme())
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

/// Confirm an action with the user
pub fn confirm_action(prompt: &str) -> std::io::Result<bool> {
    Confirm::with_theme(&get_theme())
        .with_prompt(prompt)
        .default(true)
        .interact()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

/// Display a spinner while waiting for an operation to complete
pub fn spinner_with_message(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
