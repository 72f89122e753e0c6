use anyhow::Result;

use landreg::errors::{ ErrorReport, RegistryError };
use landreg::implementations::wizard::{ Wizard, WizardError };
use landreg::traits::WizardFlow;

use crate::cli::ui;

pub mod auth;
pub mod dashboard;
pub mod properties;
pub mod registration;
pub mod transfer;
pub mod verification;

/// What the user chose after filling in a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Submit,
    Back,
    Cancel,
}

pub fn choose_action(can_go_back: bool, submit_label: &str) -> Result<StepAction> {
    let mut items = vec![submit_label.to_string()];
    if can_go_back {
        items.push("Back".to_string());
    }
    items.push("Cancel".to_string());

    let index = ui::select_index("Next", &items, 0)?;
    Ok(match items[index].as_str() {
        "Back" => StepAction::Back,
        "Cancel" => StepAction::Cancel,
        _ => StepAction::Submit,
    })
}

/// Report a wizard failure. A rejected session ends the command; anything
/// else lets the user correct and resubmit the same step.
pub fn report_wizard_error(err: &WizardError) -> Result<()> {
    ui::print_report(&ErrorReport::from(err));
    if err.is_unauthorized() {
        return Err(RegistryError::Unauthorized.into());
    }
    Ok(())
}

/// Commit the current step behind a spinner. `Ok(true)` when it advanced.
pub async fn commit_current<F: WizardFlow>(wizard: &Wizard<F>, values: &F::Values) -> Result<bool> {
    let step = wizard.current_step();
    let name = wizard.steps()[step].name;
    let spinner = ui::spinner_with_message(&format!("Saving {}...", name.to_lowercase()));
    let result = wizard.commit_step(step, values).await;
    spinner.finish_and_clear();

    match result {
        Ok(_) => {
            ui::print_success(&format!("{} saved", name));
            Ok(true)
        }
        Err(err) => {
            report_wizard_error(&err)?;
            Ok(false)
        }
    }
}
