use std::path::PathBuf;

use anyhow::Result;

use landreg::implementations::signature::capture_signature;
use landreg::models::verification::VerificationForm;
use landreg::RegistryClient;

use crate::cli::capture::FileSignaturePad;
use crate::cli::commands::{ choose_action, commit_current, report_wizard_error, StepAction };
use crate::cli::ui;

pub async fn execute(client: &RegistryClient, property_id: &str, signature: Option<PathBuf>) -> Result<()> {
    let property = client.property(property_id).await?;
    ui::print_header(&format!("Verify: {}", property.title));
    ui::print_verification_status(&property.verification_status);

    let wizard = client.verification_wizard(property_id);
    let pad = FileSignaturePad::new(signature);
    let mut form = VerificationForm::default();

    loop {
        let step = wizard.current_step();
        ui::print_step(wizard.steps(), step);
        if step == 0 {
            form.ls_number = ui::input_text("LS Number (e.g. LS1234/2024)", &form.ls_number)?;
            form.page_number = ui::input_text("Page number", &form.page_number)?;
            form.volume_number = ui::input_text("Volume number", &form.volume_number)?;
            form.lawyer_id = ui::input_text("Lawyer", &form.lawyer_id)?;
        }

        let submit_label = if wizard.is_last_step() { "Sign and approve" } else { "Submit for verification" };
        match choose_action(step > 0, submit_label)? {
            StepAction::Cancel => {
                return Ok(());
            }
            StepAction::Back => {
                wizard.previous_step();
            }
            StepAction::Submit if !wizard.is_last_step() => {
                if commit_current(&wizard, &form).await? {
                    ui::print_success("Verification successful! Please provide your signature.");
                }
            }
            StepAction::Submit => {
                let signature = match capture_signature(&pad).await? {
                    Some(signature) => signature,
                    None => {
                        ui::print_info("Signature cancelled");
                        continue;
                    }
                };
                let spinner = ui::spinner_with_message("Approving verification...");
                let result = wizard.finalize(&form, Some(signature)).await;
                spinner.finish_and_clear();
                match result {
                    Ok(_) => {
                        ui::print_success("Verification completed successfully!");
                        return Ok(());
                    }
                    Err(err) => report_wizard_error(&err)?,
                }
            }
        }
    }
}
