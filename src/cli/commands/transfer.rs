use std::path::{ Path, PathBuf };

use anyhow::Result;

use landreg::implementations::attachments::FileCandidate;
use landreg::implementations::search::UserLookup;
use landreg::implementations::signature::capture_signature;
use landreg::implementations::transfer_flow::TransferFlow;
use landreg::implementations::wizard::Wizard;
use landreg::models::common::DocumentRole;
use landreg::models::transfer::{ total_amount, TransferFees, TransferForm };
use landreg::RegistryClient;

use crate::cli::capture::FileSignaturePad;
use crate::cli::commands::{ choose_action, commit_current, report_wizard_error, StepAction };
use crate::cli::ui;

/// Search until the user picks someone or gives up
async fn pick_new_owner(lookup: &UserLookup, form: &mut TransferForm) -> Result<()> {
    if let Some(owner) = &form.new_owner {
        let keep = format!("Keep {} <{}>", owner.full_name(), owner.email);
        if ui::select_index("New owner", &[keep, "Search again".to_string()], 0)? == 0 {
            return Ok(());
        }
    }

    loop {
        let term = ui::input_text("Search users by name or email (empty to skip)", "")?;
        if term.trim().is_empty() {
            return Ok(());
        }
        lookup.type_term(&term);
        lookup.settle().await;

        let users = match lookup.results().map(|outcome| outcome.result) {
            Some(Ok(users)) => users,
            Some(Err(report)) => {
                ui::print_report(&report);
                continue;
            }
            None => Vec::new(),
        };
        if users.is_empty() {
            ui::print_info("No users found");
            continue;
        }

        let mut items: Vec<String> = users
            .iter()
            .map(|user| format!("{} <{}>", user.full_name(), user.email))
            .collect();
        items.push("Search again".to_string());
        let index = ui::select_index("Select new owner", &items, 0)?;
        if let Some(user) = users.get(index) {
            form.new_owner = Some(user.clone());
            return Ok(());
        }
    }
}

fn prompt_documents(wizard: &Wizard<TransferFlow>) -> Result<()> {
    loop {
        ui::print_attachments(&wizard.attachments());
        let items = vec!["Add files".to_string(), "Remove a file".to_string(), "Done".to_string()];
        match ui::select_index("Documents", &items, 0)? {
            0 => {
                let raw = ui::input_text("Path(s), separated by commas", "")?;
                let mut candidates = Vec::new();
                for path in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                    match FileCandidate::from_path(Path::new(path)) {
                        Ok(candidate) => candidates.push(candidate),
                        Err(err) => ui::print_warning(&err.to_string()),
                    }
                }
                ui::print_rejections(&wizard.add_files(candidates, DocumentRole::Other));
            }
            1 => {
                let position = ui::input_text("Number of the file to remove", "")?;
                match position.trim().parse::<usize>() {
                    Ok(n) if n >= 1 && wizard.remove_file(n - 1).is_some() => ui::print_info("File removed"),
                    _ => ui::print_warning("No such file"),
                }
            }
            _ => {
                return Ok(());
            }
        }
    }
}

fn print_summary(wizard: &Wizard<TransferFlow>, form: &TransferForm) {
    let draft = wizard.draft();
    ui::print_result("Property", &wizard.flow().property().title);
    if let Some(owner) = &form.new_owner {
        ui::print_result("New owner", &format!("{} <{}>", owner.full_name(), owner.email));
    }
    ui::print_result("Reason", &form.transfer_reason);
    ui::print_result("Agreement date", &form.agreement_date);
    ui::print_result("Documents", &draft.documents.len().to_string());
    if let Some(amount) = draft.transfer_amount {
        ui::print_result("Transfer amount", &format!("{:.2}", amount));
    }
    if let Some(total) = draft.total_amount {
        ui::print_result("Total", &format!("{:.2}", total));
    }
}

pub async fn execute(client: &RegistryClient, property_id: &str, signature: Option<PathBuf>) -> Result<()> {
    let spinner = ui::spinner_with_message("Loading property...");
    let wizard = client.transfer_wizard(property_id).await;
    spinner.finish_and_clear();
    let wizard = wizard?;

    ui::print_header(&format!("Transfer: {}", wizard.flow().property().title));
    let lookup = client.user_lookup(wizard.flow().excluded_owner_ids());
    let pad = FileSignaturePad::new(signature);
    let mut form = TransferForm::default();

    loop {
        let step = wizard.current_step();
        ui::print_step(wizard.steps(), step);
        match step {
            0 => {
                pick_new_owner(&lookup, &mut form).await?;
                form.transfer_reason = ui::input_text("Transfer reason", &form.transfer_reason)?;
                form.agreement_date = ui::input_text("Agreement date (YYYY-MM-DD)", &form.agreement_date)?;
            }
            1 => prompt_documents(&wizard)?,
            2 => {
                form.transfer_amount = ui::input_text("Transfer amount", &form.transfer_amount)?;
                let fees = TransferFees::STANDARD;
                ui::print_result("Registration fee", &format!("{:.2}", fees.registration));
                ui::print_result("Stamp duty", &format!("{:.2}", fees.stamp_duty));
                if let Ok(amount) = form.transfer_amount.trim().parse::<f64>() {
                    ui::print_result("Total", &format!("{:.2}", total_amount(amount)));
                }
            }
            _ => print_summary(&wizard, &form),
        }

        let submit_label = if wizard.is_last_step() { "Sign and complete" } else { "Continue" };
        match choose_action(step > 0, submit_label)? {
            StepAction::Cancel => {
                if wizard.draft_id().is_some() {
                    ui::print_warning("The transfer draft stays on the server until it is completed");
                }
                return Ok(());
            }
            StepAction::Back => {
                wizard.previous_step();
            }
            StepAction::Submit if !wizard.is_last_step() => {
                commit_current(&wizard, &form).await?;
            }
            StepAction::Submit => {
                let signature = match capture_signature(&pad).await? {
                    Some(signature) => signature,
                    None => {
                        ui::print_info("Signature cancelled");
                        continue;
                    }
                };
                let spinner = ui::spinner_with_message("Completing transfer...");
                let result = wizard.finalize(&form, Some(signature)).await;
                spinner.finish_and_clear();
                match result {
                    Ok(record) => {
                        ui::print_success(&format!("Transfer {} completed", record.id));
                        return Ok(());
                    }
                    Err(err) => report_wizard_error(&err)?,
                }
            }
        }
    }
}
