//! List command

use anyhow::Result;
use chrono::Utc;
use mechanic_core::types::ExtensionRecord;
use mechanic_extensions::{CatalogFilter, SearchQuery};
use tabled::{settings::Style, Table, Tabled};

use super::session::Session;
use crate::cli::ListArgs;
use crate::output;
use crate::utils::truncate;

const DESCRIPTION_WIDTH: usize = 48;

#[derive(Tabled)]
struct ExtensionRow {
    name: String,
    developer: String,
    version: String,
    status: String,
    description: String,
}

impl From<&ExtensionRecord> for ExtensionRow {
    fn from(record: &ExtensionRecord) -> Self {
        let status = if record.is_from_store() && !record.is_installed {
            match &record.price {
                Some(price) => format!("store ({})", price),
                None => "store".to_string(),
            }
        } else {
            record.status_line()
        };

        Self {
            name: record.name.clone(),
            developer: record.developer.clone(),
            version: record
                .remote_version
                .as_ref()
                .map(|v| v.as_str().to_string())
                .unwrap_or_else(|| "-".to_string()),
            status,
            description: truncate(&record.description, DESCRIPTION_WIDTH),
        }
    }
}

pub async fn run(args: ListArgs) -> Result<()> {
    let mut session = Session::open()?;

    // Startup checks respect the recheck interval; --check always runs one
    let check = args.check
        || (session.settings.check_for_updates && !session.checked_recently(Utc::now()));
    let catalog = session.load_catalog(check).await?;

    let query = SearchQuery::new()
        .with_text(&args.terms.join(" "))
        .with_developers(&args.developers)
        .with_tags(&args.tags)
        .with_sources(&args.sources)
        .with_status(args.status);
    let matches = CatalogFilter::filter(&catalog, &query);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        if catalog.is_empty() {
            output::info("No extensions available");
        } else {
            output::info("No extensions match the search");
        }
        return Ok(());
    }

    let rows: Vec<ExtensionRow> = matches.iter().map(|r| ExtensionRow::from(*r)).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);

    let updates = matches.iter().filter(|r| r.needs_update).count();
    println!();
    output::info(&format!(
        "{} of {} extensions shown",
        matches.len(),
        catalog.len()
    ));
    if updates > 0 {
        output::info(&format!(
            "{} update(s) available, run 'mechanic update' to install them",
            updates
        ));
    }

    Ok(())
}
