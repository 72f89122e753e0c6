use std::path::Path;

use anyhow::Result;

use landreg::implementations::attachments::FileCandidate;
use landreg::implementations::registration_flow::RegistrationFlow;
use landreg::implementations::wizard::Wizard;
use landreg::models::common::{ Coordinates, DocumentRole, PaymentMethod, PropertyType };
use landreg::models::registration::RegistrationForm;
use landreg::traits::LocationPicker;
use landreg::RegistryClient;

use crate::cli::capture::PromptLocationPicker;
use crate::cli::commands::{ choose_action, commit_current, report_wizard_error, StepAction };
use crate::cli::ui;

fn select_value(prompt: &str, options: &[&str], current: &str) -> Result<String> {
    let items: Vec<String> = options
        .iter()
        .map(|s| s.to_string())
        .collect();
    let default = options
        .iter()
        .position(|o| *o == current)
        .unwrap_or(0);
    let index = ui::select_index(prompt, &items, default)?;
    Ok(items[index].clone())
}

fn prompt_details(form: &mut RegistrationForm) -> Result<()> {
    form.title = ui::input_text("Property title", &form.title)?;
    let types: Vec<&str> = PropertyType::ALL.iter().map(PropertyType::as_str).collect();
    form.property_type = select_value("Property type", &types, &form.property_type)?;
    form.property_size = ui::input_text("Size (m²)", &form.property_size)?;
    form.price = ui::input_text("Price", &form.price)?;
    form.property_description = ui::input_text("Description", &form.property_description)?;
    Ok(())
}

/// Offer to attach files by role until the user is done
fn prompt_files(wizard: &Wizard<RegistrationFlow>) -> Result<()> {
    let mut items: Vec<String> = DocumentRole::ALL.iter()
        .map(|role| format!("Attach {}", role.label()))
        .collect();
    items.push("Remove a file".to_string());
    items.push("Done".to_string());

    loop {
        ui::print_attachments(&wizard.attachments());
        let index = ui::select_index("Files", &items, items.len() - 1)?;
        if index == items.len() - 1 {
            return Ok(());
        }
        if index == items.len() - 2 {
            let position = ui::input_text("Number of the file to remove", "")?;
            match position.trim().parse::<usize>() {
                Ok(n) if n >= 1 && wizard.remove_file(n - 1).is_some() => ui::print_info("File removed"),
                _ => ui::print_warning("No such file"),
            }
            continue;
        }

        let role = DocumentRole::ALL[index];
        let raw = ui::input_text("Path(s), separated by commas", "")?;
        let mut candidates = Vec::new();
        for path in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match FileCandidate::from_path(Path::new(path)) {
                Ok(candidate) => candidates.push(candidate),
                Err(err) => ui::print_warning(&err.to_string()),
            }
        }
        ui::print_rejections(&wizard.add_files(candidates, role));
    }
}

fn prompt_location(form: &mut RegistrationForm, picker: &dyn LocationPicker) -> Result<()> {
    form.street_address = ui::input_text("Street address", &form.street_address)?;
    form.city = ui::input_text("City", &form.city)?;
    form.district = ui::input_text("District", &form.district)?;

    let start = landreg::validation
        ::parse_coordinates(&form.coordinates)
        .map(|(lat, lng)| Coordinates { lat, lng })
        .unwrap_or(Coordinates::DEFAULT_CENTER);
    form.coordinates = picker
        .pick(start)?
        .map(|c| c.to_string())
        .unwrap_or_default();
    Ok(())
}

fn prompt_payment(form: &mut RegistrationForm) -> Result<()> {
    let methods: Vec<&str> = PaymentMethod::ALL.iter().map(PaymentMethod::as_str).collect();
    form.payment_method = select_value("Payment method", &methods, &form.payment_method)?;
    form.amount = ui::input_text("Amount", &form.amount)?;
    Ok(())
}

pub async fn execute(client: &RegistryClient) -> Result<()> {
    let wizard = client.registration_wizard();
    let picker = PromptLocationPicker;
    let mut form = RegistrationForm::default();

    loop {
        let step = wizard.current_step();
        ui::print_step(wizard.steps(), step);
        match step {
            0 => {
                prompt_details(&mut form)?;
                prompt_files(&wizard)?;
            }
            1 => prompt_location(&mut form, &picker)?,
            _ => prompt_payment(&mut form)?,
        }

        let submit_label = if wizard.is_last_step() { "Register property" } else { "Continue" };
        match choose_action(step > 0, submit_label)? {
            StepAction::Cancel => {
                ui::print_info("Registration cancelled; nothing was sent");
                return Ok(());
            }
            StepAction::Back => {
                wizard.previous_step();
            }
            StepAction::Submit if !wizard.is_last_step() => {
                commit_current(&wizard, &form).await?;
            }
            StepAction::Submit => {
                let spinner = ui::spinner_with_message("Submitting registration...");
                let result = wizard.finalize(&form, None).await;
                spinner.finish_and_clear();
                match result {
                    Ok(property) => {
                        ui::print_success(&format!("Property registered with id {}", property.id));
                        ui::print_property(&property);
                        return Ok(());
                    }
                    Err(err) => report_wizard_error(&err)?,
                }
            }
        }
    }
}
