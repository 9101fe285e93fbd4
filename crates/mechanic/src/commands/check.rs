//! Check command

use anyhow::Result;
use chrono::Utc;
use dialoguer::Confirm;
use mechanic_extensions::{UpdateChecker, UpdateReport};

use super::session::Session;
use crate::cli::CheckArgs;
use crate::output;
use crate::utils::format_age;

pub async fn run(args: CheckArgs) -> Result<()> {
    let mut session = Session::open()?;
    let now = Utc::now();

    if !args.yes && session.checked_recently(now) {
        let age = session
            .settings
            .last_update_check
            .map(|last| format_age(now.signed_duration_since(last)))
            .unwrap_or_default();
        let again = Confirm::new()
            .with_prompt(format!(
                "Extensions were checked for updates {} ago. Check again?",
                age
            ))
            .default(false)
            .interact()?;

        if !again {
            output::info("Check cancelled");
            return Ok(());
        }
    }

    let mut catalog = session.load_catalog(false).await?;
    let checker = UpdateChecker::new(session.host.clone());

    let pb = output::progress_bar(0, "Checking for updates");
    let progress = |current: usize, total: usize, name: &str| {
        pb.set_length(total as u64);
        pb.set_position(current as u64);
        pb.set_message(format!("Checking {}", name));
    };

    let report = if args.names.is_empty() {
        let report = checker.check_all(&mut catalog, args.force, Some(&progress)).await;
        session.remember_update_check(report.checked_at)?;
        report
    } else {
        let (keys, unknown) = catalog.resolve_names(&args.names);
        for name in &unknown {
            output::warning(&format!("Extension '{}' not found", name));
        }
        // Naming extensions explicitly always looks them up again
        checker.check_selected(&mut catalog, &keys, true, Some(&progress)).await
    };
    pb.finish_and_clear();

    print_report(&catalog, &report);
    Ok(())
}

fn print_report(catalog: &mechanic_extensions::Catalog, report: &UpdateReport) {
    if report.updates.is_empty() {
        output::success(&format!(
            "All {} checked extensions are up to date",
            report.checked
        ));
    } else {
        output::header("Updates available");
        for key in &report.updates {
            if let Some(record) = catalog.get(key) {
                output::kv(&record.name, &record.status_line());
            }
        }
        println!();
        output::info("Run 'mechanic update' to install them");
    }

    if !report.is_success() {
        output::warning(&format!(
            "Failed to check {} extension(s) (see log for details)",
            report.failed.len()
        ));
    }
}
