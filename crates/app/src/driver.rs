//! One generation run: load, group, render each group, package.
//!
//! A run owns all of its state through [`RunContext`]; nothing but the
//! archive outlives it. Failures inside one group are logged, recorded in
//! [`RunOutcome::failures`] and do not stop the remaining groups.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use releve_core::{sort_chronologically, ReportVariant, TransactionRow};
use releve_import::{
    group_rows, load_table, map_rows, summarize, validate_columns, GroupSummary, LoadError, Table,
};
use releve_pdf::{Branding, GroupReport, RenderError, Renderer};
use releve_storage::{artifact_file_name, write_archive, ArchiveError, WorkArea};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}

#[derive(Debug, Error)]
enum GroupError {
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("write failed: {0}")]
    Write(#[from] ArchiveError),
}

#[derive(Debug, Clone)]
pub struct RunContext {
    pub input: PathBuf,
    pub variant: ReportVariant,
    pub output_dir: PathBuf,
    pub branding: Branding,
    /// Stamp of every file name in the run and fallback period for groups
    /// without a valid date.
    pub started_at: NaiveDateTime,
}

/// Progress notifications, sent as the run advances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started { rows: usize, groups: usize },
    GroupDone { index: usize, total: usize, key: String, ok: bool },
    Archived { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum RunStatus {
    Archived(PathBuf),
    NothingGenerated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupFailure {
    pub key: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub summaries: Vec<GroupSummary>,
    pub generated: usize,
    pub failures: Vec<GroupFailure>,
}

fn notify(progress: Option<&UnboundedSender<RunEvent>>, event: RunEvent) {
    if let Some(tx) = progress {
        // A dropped receiver only means nobody is watching.
        let _ = tx.send(event);
    }
}

/// Loads the input spreadsheet and runs the whole pipeline.
pub fn run(
    ctx: &RunContext,
    renderer: &dyn Renderer,
    progress: Option<&UnboundedSender<RunEvent>>,
) -> Result<RunOutcome, RunError> {
    tracing::info!(
        variant = %ctx.variant.kind,
        input = %ctx.input.display(),
        "Starting run"
    );
    let table = load_table(&ctx.input, &ctx.variant.text_columns())?;
    run_table(ctx, &table, renderer, progress)
}

/// Runs the pipeline on an already loaded table.
pub fn run_table(
    ctx: &RunContext,
    table: &Table,
    renderer: &dyn Renderer,
    progress: Option<&UnboundedSender<RunEvent>>,
) -> Result<RunOutcome, RunError> {
    validate_columns(table, &ctx.variant)?;
    if table.is_empty() {
        tracing::warn!("Worksheet has a header but no data rows");
    }
    let groups = group_rows(map_rows(table, &ctx.variant));
    let total = groups.len();
    tracing::info!(rows = table.len(), groups = total, "Grouped transactions");
    notify(progress, RunEvent::Started { rows: table.len(), groups: total });

    let mut work = WorkArea::new()?;
    tracing::debug!(dir = %work.path().display(), "Work area ready");
    let mut summaries = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for (index, (key, mut rows)) in groups.into_iter().enumerate() {
        sort_chronologically(&mut rows);
        let summary = summarize(&key, &rows, &ctx.variant, ctx.started_at);

        let result = render_group(ctx, &summary, &rows, renderer, &mut work);
        let ok = match result {
            Ok(path) => {
                tracing::info!(
                    "[{}/{}] {}: {} transactions -> {}",
                    index + 1,
                    total,
                    key,
                    summary.count,
                    path.display()
                );
                true
            }
            Err(e) => {
                tracing::warn!(key = %key, "Group skipped: {e}");
                failures.push(GroupFailure { key: key.clone(), error: e.to_string() });
                false
            }
        };
        notify(progress, RunEvent::GroupDone { index: index + 1, total, key, ok });
        summaries.push(summary);
    }

    let generated = work.artifacts().len();
    let status = if work.is_empty() {
        tracing::warn!("No document generated");
        RunStatus::NothingGenerated
    } else {
        let path = write_archive(
            &ctx.output_dir,
            &ctx.variant.run_label,
            work.artifacts(),
            ctx.started_at,
        )?;
        notify(progress, RunEvent::Archived { path: path.clone() });
        RunStatus::Archived(path)
    };

    Ok(RunOutcome { status, summaries, generated, failures })
}

fn render_group(
    ctx: &RunContext,
    summary: &GroupSummary,
    rows: &[TransactionRow],
    renderer: &dyn Renderer,
    work: &mut WorkArea,
) -> Result<PathBuf, GroupError> {
    let report = GroupReport {
        variant: &ctx.variant,
        summary,
        rows,
        branding: &ctx.branding,
        generated_at: ctx.started_at,
    };
    let bytes = renderer.render(&report)?;
    let name = artifact_file_name(
        &ctx.variant.file_prefix,
        &summary.key,
        ctx.started_at,
        renderer.extension(),
    );
    Ok(work.write_artifact(&name, &bytes)?)
}

/// Per-group summaries without rendering anything.
pub fn inspect(
    path: &Path,
    variant: &ReportVariant,
    now: NaiveDateTime,
) -> Result<Vec<GroupSummary>, RunError> {
    let table = load_table(path, &variant.text_columns())?;
    inspect_table(&table, variant, now)
}

pub fn inspect_table(
    table: &Table,
    variant: &ReportVariant,
    now: NaiveDateTime,
) -> Result<Vec<GroupSummary>, RunError> {
    validate_columns(table, variant)?;
    Ok(group_rows(map_rows(table, variant))
        .into_iter()
        .map(|(key, rows)| summarize(&key, &rows, variant, now))
        .collect())
}
