use anyhow::{ anyhow, Result };

use landreg::errors::ErrorReport;
use landreg::implementations::listing::ListFilter;
use landreg::models::common::{ PropertyType, VerificationStatus };
use landreg::models::property::{ PriceRange, SearchQuery };
use landreg::RegistryClient;

use crate::cli::ui;

fn parse_status(raw: Option<&str>) -> Result<Option<VerificationStatus>> {
    match raw {
        None | Some("all") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|e| anyhow!("{}", e)),
    }
}

fn parse_type(raw: Option<&str>) -> Result<Option<PropertyType>> {
    match raw {
        None | Some("all") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|e| anyhow!("{}", e)),
    }
}

/// Fetch once, then filter locally
pub async fn list(client: &RegistryClient, status: Option<&str>, property_type: Option<&str>) -> Result<()> {
    let filter = ListFilter {
        status: parse_status(status)?,
        property_type: parse_type(property_type)?,
    };

    let spinner = ui::spinner_with_message("Loading properties...");
    let list = client.properties().await;
    spinner.finish_and_clear();
    let mut list = list?;

    list.set_filter(filter);
    let visible = list.visible();
    ui::print_header(&format!("Properties ({} of {})", visible.len(), list.all().len()));
    if visible.is_empty() {
        ui::print_info("No properties match the selected filters");
    }
    for property in visible {
        ui::print_property_row(property);
    }
    Ok(())
}

pub async fn show(client: &RegistryClient, id: &str, with_verification: bool) -> Result<()> {
    let spinner = ui::spinner_with_message("Loading property...");
    let property = client.property(id).await;
    spinner.finish_and_clear();
    ui::print_property(&property?);

    if with_verification {
        match client.verification_details(id).await {
            Ok(record) => {
                ui::print_header("Verification");
                ui::print_result("LS Number", &record.ls_number);
                ui::print_result("Page", &record.page_number);
                ui::print_result("Volume", &record.volume_number);
                if let Some(date) = &record.verification_date {
                    ui::print_result("Verified on", date);
                }
                if !record.has_valid_ls_number() {
                    ui::print_warning("The stored LS number is not in the expected format");
                }
            }
            Err(err) => ui::print_report(&ErrorReport::from(&err)),
        }
    }
    Ok(())
}

fn print_results(results: Result<Vec<landreg::Property>, ErrorReport>) {
    match results {
        Ok(properties) if properties.is_empty() => ui::print_info("No properties found"),
        Ok(properties) => {
            for property in &properties {
                ui::print_property_row(property);
            }
        }
        Err(report) => ui::print_report(&report),
    }
}

/// Server-side search; every change of the query is a new request and only
/// the newest response is shown
pub async fn search(
    client: &RegistryClient,
    property_type: Option<&str>,
    status: Option<&str>,
    price: Option<&str>,
    text: Option<&str>,
    interactive: bool
) -> Result<()> {
    let mut query = SearchQuery {
        property_type: parse_type(property_type)?,
        verification_status: parse_status(status)?,
        price: match price {
            Some(raw) => PriceRange::parse(raw).ok_or_else(|| anyhow!("Unknown price range: {}", raw))?,
            None => PriceRange::All,
        },
        text: text.unwrap_or_default().to_string(),
    };

    let search = client.property_search();
    loop {
        search.update(query.clone());
        let spinner = ui::spinner_with_message("Searching...");
        search.settle().await;
        spinner.finish_and_clear();

        ui::print_header("Search Results");
        print_results(search.visible());

        if !interactive {
            return Ok(());
        }
        let refined = ui::input_text("Refine text (empty to finish)", "")?;
        if refined.trim().is_empty() {
            return Ok(());
        }
        query.text = refined;
    }
}

/// List transfers, or show one by id
pub async fn transfers(client: &RegistryClient, id: Option<&str>) -> Result<()> {
    let records = match id {
        Some(id) => vec![client.transfer(id).await?],
        None => client.transfers().await?,
    };
    ui::print_header(&format!("Transfers ({})", records.len()));
    for record in records {
        ui::print_result("Transfer", &record.id);
        if let Some(status) = &record.status {
            ui::print_result("  Status", status);
        }
        if let Some(total) = record.total_amount {
            ui::print_result("  Total", &format!("{:.2}", total));
        }
        ui::print_result("  Documents", &record.documents.len().to_string());
    }
    Ok(())
}
