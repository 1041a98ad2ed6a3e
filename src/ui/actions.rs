use std::time::Duration;

use dioxus::prelude::*;
use tracing::{info, warn};

use crate::io::csv_export::{self, CsvExportError};
use crate::state::data_model::{self, Record};
use crate::state::form::{self, ModalForm, Notice};
use crate::state::grid::{Grid, ServerQuery};
use crate::state::selection::{BulkAction, BulkRequest};
use crate::state::statement::{
    self, GenerateRequest, GenerateStatementDraft, Statement, StatementStatus,
};
use crate::state::view_state::SortDirection;

/// Properties the demo backend refuses to generate statements for.
const INACTIVE_PROPERTIES: [u64; 1] = [3];

/// In-process stand-in for `GET /statements`: applies the query the way the
/// server would and returns one page plus the total.
pub fn fetch_page(all: &[Statement], query: &ServerQuery) -> (Vec<Statement>, usize) {
    let needle = query.search.as_deref().unwrap_or("").to_lowercase();
    let statuses = query.filters.get("status");

    let mut matching: Vec<&Statement> = all
        .iter()
        .filter(|s| {
            needle.is_empty()
                || s.property_name.to_lowercase().contains(&needle)
                || s.owner_name.to_lowercase().contains(&needle)
                || s.group_name
                    .as_deref()
                    .map(|g| g.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .filter(|s| {
            statuses
                .map(|allowed| allowed.iter().any(|v| v == s.status.as_str()))
                .unwrap_or(true)
        })
        .filter(|s| match query.date_range {
            Some((start, end)) => s.period_start <= end && s.period_end >= start,
            None => true,
        })
        .collect();

    if let Some(sort) = &query.sort {
        let columns = statement::statement_columns();
        if let Some(column) = columns.iter().find(|c| c.id == sort.column && c.sortable) {
            matching.sort_by(|a, b| {
                let ord = data_model::compare_values(&column.value(a), &column.value(b));
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
    }

    let total = matching.len();
    let start = (query.page_index * query.page_size).min(total);
    let end = (start + query.page_size).min(total);
    let page = matching[start..end].iter().map(|s| (*s).clone()).collect();
    (page, total)
}

pub fn refresh(mut grid: Signal<Grid<Statement>>, backend: Signal<Vec<Statement>>) {
    let query = grid.read().query();
    grid.write().begin_loading();
    let (rows, total) = fetch_page(&backend.read(), &query);
    if grid.write().set_records(rows, total).is_some() {
        let query = grid.read().query();
        let (rows, total) = fetch_page(&backend.read(), &query);
        grid.write().set_records(rows, total);
    }
}

pub fn show_notice(mut notice: Signal<Option<Notice>>, next: Notice) {
    notice.set(Some(next.clone()));
    spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        if notice.read().as_ref() == Some(&next) {
            notice.set(None);
        }
    });
}

pub async fn run_bulk(
    mut grid: Signal<Grid<Statement>>,
    mut backend: Signal<Vec<Statement>>,
    notice: Signal<Option<Notice>>,
    request: BulkRequest<u64>,
) {
    let BulkRequest { ids, action } = request;
    info!(%action, count = ids.len(), "bulk action dispatched");

    let next = match action {
        BulkAction::Delete => {
            backend.write().retain(|s| !ids.contains(&s.id));
            Notice::success(format!("Deleted {} statements", ids.len()))
        }
        BulkAction::Finalize | BulkAction::RevertToDraft => {
            let status = if action == BulkAction::Finalize {
                StatementStatus::Final
            } else {
                StatementStatus::Draft
            };
            for s in backend.write().iter_mut().filter(|s| ids.contains(&s.id)) {
                s.status = status;
            }
            Notice::success(format!(
                "Updated {} statements to {}",
                ids.len(),
                status.as_str()
            ))
        }
        BulkAction::ExportCsv => {
            let selected: Vec<Statement> = grid
                .read()
                .filtered_records()
                .into_iter()
                .filter(|s| ids.contains(&s.record_id()))
                .cloned()
                .collect();
            match save_csv(&selected).await {
                Some(result) => export_notice(result),
                None => {
                    grid.write().set_bulk_processing(false);
                    return;
                }
            }
        }
        BulkAction::Download | BulkAction::Regenerate | BulkAction::SendEmail => {
            tokio::time::sleep(Duration::from_millis(400)).await;
            Notice::success(format!(
                "{} queued for {} statements",
                action.label(),
                ids.len()
            ))
        }
    };

    grid.write().set_bulk_processing(false);
    refresh(grid, backend);
    show_notice(notice, next);
}

/// Exports the grid's current filtered view.
pub async fn export_filtered(grid: Signal<Grid<Statement>>, notice: Signal<Option<Notice>>) {
    let records: Vec<Statement> = grid
        .read()
        .filtered_records()
        .into_iter()
        .cloned()
        .collect();
    if let Some(result) = save_csv(&records).await {
        show_notice(notice, export_notice(result));
    }
}

pub fn export_notice(result: Result<usize, CsvExportError>) -> Notice {
    match result {
        Ok(rows) => Notice::success(format!("Exported {rows} rows")),
        Err(err) => {
            warn!(%err, "csv export failed");
            Notice::error(format!("Export failed: {err}"))
        }
    }
}

/// `None` when the save dialog was dismissed.
async fn save_csv(records: &[Statement]) -> Option<Result<usize, CsvExportError>> {
    let handle = rfd::AsyncFileDialog::new()
        .set_file_name(csv_export::today_filename(statement::CSV_PREFIX))
        .add_filter("CSV", &["csv"])
        .save_file()
        .await?;

    let fields = statement::statement_csv_fields();
    Some(csv_export::write_csv(handle.path(), records, &fields))
}

pub async fn submit_generate(
    mut modal: Signal<ModalForm<GenerateStatementDraft>>,
    grid: Signal<Grid<Statement>>,
    backend: Signal<Vec<Statement>>,
    notice: Signal<Option<Notice>>,
) {
    let submission = match modal.write().begin_submit() {
        Ok(submission) => submission,
        Err(err) => {
            info!(%err, "generate blocked");
            return;
        }
    };

    let requests = submission.draft.requests();
    let report = form::run_sequential(
        requests,
        &submission.cancel,
        |progress| modal.write().set_progress(progress),
        |request| {
            let mut backend = backend;
            async move {
                tokio::time::sleep(Duration::from_millis(250)).await;
                generate_one(&mut backend, &request)
            }
        },
    )
    .await;

    // A closed modal may already hold a newer submission.
    if report.cancelled || submission.cancel.is_cancelled() {
        warn!(summary = %report.summary(), "generate cancelled");
        return;
    }

    let summary = report.summary();
    let result = if report.succeeded.is_empty() && !report.failed.is_empty() {
        Err(summary.clone())
    } else {
        Ok(())
    };
    if modal.write().finish(result) {
        refresh(grid, backend);
        let message = format!("Generated statements: {summary}");
        let next = if report.failed.is_empty() {
            Notice::success(message)
        } else {
            Notice::error(message)
        };
        show_notice(notice, next);
    }
}

fn generate_one(
    backend: &mut Signal<Vec<Statement>>,
    request: &GenerateRequest,
) -> Result<(), String> {
    if let Some(property_id) = request.property_id {
        if INACTIVE_PROPERTIES.contains(&property_id) {
            return Err(format!("property {property_id} has no active listing"));
        }
    }

    let mut all = backend.write();
    let template = all
        .iter()
        .find(|s| {
            request.property_id.map(|p| s.property_id == Some(p)).unwrap_or(true)
                && request.owner_id.map(|o| s.owner_id == o).unwrap_or(true)
        })
        .cloned()
        .ok_or_else(|| "no matching listing".to_string())?;
    let next_id = all.iter().map(|s| s.id).max().unwrap_or(0) + 1;
    all.push(Statement {
        id: next_id,
        period_start: request.start_date,
        period_end: request.end_date,
        status: StatementStatus::Draft,
        calculation_type: request.calculation_type,
        warnings: Vec::new(),
        ..template
    });
    Ok(())
}
