//! Install, update, uninstall and purchase commands

use anyhow::{bail, Result};
use dialoguer::Confirm as Prompt;
use mechanic_core::types::{LifecycleAction, RecordKey};
use mechanic_extensions::{ActionOrchestrator, ActionSummary, BatchResult, Catalog, UpdateChecker};
use tracing::{debug, error};

use super::session::Session;
use crate::cli::ActionArgs;
use crate::output;

pub async fn run(action: LifecycleAction, args: ActionArgs) -> Result<()> {
    let mut session = Session::open()?;
    let mut catalog = session.load_catalog(false).await?;

    let mut selection = select(&catalog, &args)?;

    if action == LifecycleAction::Update {
        let checker = UpdateChecker::new(session.host.clone());
        let report = checker
            .check_selected(&mut catalog, &selection, true, None)
            .await;
        if !report.is_success() {
            output::warning(&format!(
                "Failed to check {} extension(s) (see log for details)",
                report.failed.len()
            ));
        }
        if args.names.is_empty() {
            selection = report.updates;
        }
    }

    let summary = ActionSummary::for_selection(selection.iter().filter_map(|k| catalog.get(k)));
    if summary.count(action) == 0 {
        output::info(&format!("Nothing to {}", action));
        return Ok(());
    }
    debug!(
        "Selection allows install={} update={} uninstall={} purchase={}",
        summary.install, summary.update, summary.uninstall, summary.purchase
    );

    let assume_yes = args.yes;
    let confirm = move |title: &str, message: &str| -> bool {
        if assume_yes {
            return true;
        }
        Prompt::new()
            .with_prompt(format!("{}\n{}", title, message))
            .default(false)
            .interact()
            .unwrap_or(false)
    };

    let orchestrator = ActionOrchestrator::new(session.host.clone());
    let pb = output::progress_bar(summary.count(action) as u64, action.progress_message());
    let result = orchestrator
        .execute(
            &mut catalog,
            &selection,
            action,
            Some(&confirm),
            Some(&|current, _total, name| {
                pb.set_position(current as u64);
                pb.set_message(name.to_string());
            }),
        )
        .await;
    pb.finish_and_clear();

    report(&catalog, &result)
}

/// Resolve the named extensions, or every record when no name is given
fn select(catalog: &Catalog, args: &ActionArgs) -> Result<Vec<RecordKey>> {
    let mut keys = if args.names.is_empty() {
        catalog.records().iter().map(|r| r.key()).collect()
    } else {
        let (keys, unknown) = catalog.resolve_names(&args.names);
        for name in &unknown {
            output::warning(&format!("Extension '{}' not found", name));
        }
        if keys.is_empty() {
            bail!("No matching extensions");
        }
        keys
    };

    if let Some(source) = &args.source {
        keys.retain(|k| catalog.get(k).is_some_and(|r| &r.source_url == source));
    }

    Ok(keys)
}

fn report(catalog: &Catalog, result: &BatchResult) -> Result<()> {
    if result.cancelled {
        output::info(&format!("{} cancelled", capitalize(result.action)));
        return Ok(());
    }

    for key in &result.succeeded {
        let purchase_url = catalog.get(key).and_then(|r| r.purchase_url.as_deref());
        match (result.action, purchase_url) {
            (LifecycleAction::Purchase, Some(url)) => {
                output::success(&format!("Purchase {} at {}", key.name, url))
            }
            _ => output::success(&format!("{}: {}", past_tense(result.action), key.name)),
        }
    }
    for key in &result.skipped {
        debug!("Skipped {} for {}", result.action, key);
    }
    for failure in &result.failed {
        error!("{}", failure);
    }

    if result.is_success() {
        Ok(())
    } else if result.is_partial() {
        output::warning(&format!(
            "{} of {} extension(s) failed to {} (see log for details)",
            result.failed.len(),
            result.attempted(),
            result.action
        ));
        Ok(())
    } else {
        output::error(&format!(
            "Failed to {} {} extension(s) (see log for details)",
            result.action,
            result.failed.len()
        ));
        Ok(())
    }
}

fn past_tense(action: LifecycleAction) -> &'static str {
    match action {
        LifecycleAction::Install => "Installed",
        LifecycleAction::Update => "Updated",
        LifecycleAction::Uninstall => "Uninstalled",
        LifecycleAction::Purchase => "Opened purchase page",
    }
}

fn capitalize(action: LifecycleAction) -> String {
    let text = action.to_string();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => text,
    }
}
