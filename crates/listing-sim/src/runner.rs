//! Scenario replay

use crate::scenario::{Op, Scenario};
use listing_core::{
    DraftSession, InMemoryAssets, InMemoryCatalog, ListingConfig, ReconcileState, SessionError, Services,
    SubmissionCoordinator, SubmitError, SubmitState,
};
use listing_model::{AssetRecord, CatalogEntry};
use listing_staging::RejectionCode;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;

/// How a scenario ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Submission reached `DONE`
    Done,
    /// Submission reached `FAILED`
    Failed,
    /// Submission reached `PARTIAL_SUCCESS`
    PartialSuccess,
    /// Refused before any remote call
    Rejected,
}

impl Status {
    /// Process exit code: 0 done, 2 partial, 1 otherwise
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Done => 0,
            Self::PartialSuccess => 2,
            Self::Failed | Self::Rejected => 1,
        }
    }
}

/// Result of staging one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageResult {
    /// File name
    pub file: String,
    /// Ordinal when staged
    pub ordinal: Option<usize>,
    /// Gate rejection code
    pub code: Option<RejectionCode>,
    /// Failure message
    pub error: Option<String>,
}

/// Result of one staging-list operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpResult {
    /// Operation applied
    pub op: Op,
    /// Whether the list changed
    pub applied: bool,
    /// Failure message
    pub error: Option<String>,
}

/// Everything a scenario run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Scenario label
    pub scenario: Option<String>,
    /// `create` or `edit`
    pub mode: &'static str,
    /// Final reconciler state in edit mode
    pub reconcile: Option<ReconcileState>,
    /// Per-file staging results
    pub staged: Vec<StageResult>,
    /// Per-operation results
    pub ops: Vec<OpResult>,
    /// Terminal status
    pub status: Status,
    /// Coordinator states visited (terminal state only on failure)
    pub states: Vec<SubmitState>,
    /// Entry as stored remotely after the run
    pub entry: Option<CatalogEntry>,
    /// Assets uploaded and not linked
    pub orphaned: Vec<AssetRecord>,
    /// Submission error
    pub error: Option<String>,
    /// Actor-facing message
    pub message: String,
}

impl Outcome {
    /// Process exit code for this outcome
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }

    /// Human-readable report
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== {} ===", self.scenario.as_deref().unwrap_or("scenario"));
        let _ = writeln!(out, "Mode: {}", self.mode);
        if let Some(state) = self.reconcile {
            let _ = writeln!(out, "Reconcile: {state}");
        }

        if !self.staged.is_empty() {
            let _ = writeln!(out, "\nStaging:");
            for s in &self.staged {
                match (s.ordinal, &s.error) {
                    (Some(ordinal), _) => {
                        let _ = writeln!(out, "  {} -> #{ordinal}", s.file);
                    }
                    (None, Some(error)) => {
                        let _ = writeln!(out, "  {} rejected: {error}", s.file);
                    }
                    (None, None) => {
                        let _ = writeln!(out, "  {} skipped", s.file);
                    }
                }
            }
        }

        if !self.ops.is_empty() {
            let _ = writeln!(out, "\nOperations:");
            for op in &self.ops {
                let verdict = match (&op.error, op.applied) {
                    (Some(error), _) => error.clone(),
                    (None, true) => "applied".to_string(),
                    (None, false) => "no-op".to_string(),
                };
                let _ = writeln!(out, "  {:?}: {verdict}", op.op);
            }
        }

        let states: Vec<String> = self.states.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "\nStates: {}", states.join(" -> "));
        if let Some(entry) = &self.entry {
            let _ = writeln!(out, "Entry: {} ({} images)", entry.id, entry.image_urls.len());
            for url in &entry.image_urls {
                let _ = writeln!(out, "  {url}");
            }
        }
        if !self.orphaned.is_empty() {
            let _ = writeln!(out, "Orphaned assets:");
            for asset in &self.orphaned {
                let _ = writeln!(out, "  {} {}", asset.id, asset.url);
            }
        }
        if let Some(error) = &self.error {
            let _ = writeln!(out, "Error: {error}");
        }
        let _ = writeln!(out, "{}", self.message);
        let _ = writeln!(out, "\n=== Result: {:?} ===", self.status);
        out
    }
}

/// Replay `scenario` against fresh in-memory services
pub async fn run(scenario: &Scenario, config: &ListingConfig) -> Outcome {
    let catalog = Arc::new(InMemoryCatalog::new());
    let assets = Arc::new(InMemoryAssets::new(config.entry_limits(), config.avatar_limits()));
    let services = Services::new(catalog.clone(), assets.clone());
    let coordinator = SubmissionCoordinator::new(&services, config);

    let actor = scenario.actor.as_ref().map(|a| a.to_actor());
    let failures = &scenario.failures;
    assets.set_fail_list(failures.fail_list);
    assets.set_fail_delete(failures.fail_delete);
    for attempt in &failures.fail_upload_at {
        assets.fail_upload_at(*attempt);
    }

    let mut session = match &scenario.entry {
        Some(spec) => {
            let entry = spec.to_entry(actor.as_ref().map(|a| a.id.as_str()));
            catalog.insert(entry.clone());
            for record in spec.asset_records() {
                assets.seed(record);
            }
            DraftSession::edit(entry, &services, config).await
        }
        None => DraftSession::create(&services, config),
    };
    scenario.draft.apply(session.draft_mut());

    let staged = stage_files(&mut session, scenario).await;
    let ops = apply_ops(&mut session, scenario, actor.as_ref()).await;

    if failures.fail_create {
        catalog.fail_create();
    }
    if failures.fail_update {
        catalog.fail_update();
    }

    let mode = if session.edit_context().is_some() { "edit" } else { "create" };
    let reconcile = session.reconcile_state();
    let entry_id = session.edit_context().map(|e| e.id.clone());

    let submitted = coordinator.submit(&mut session, actor.as_ref()).await;
    tracing::info!(ok = submitted.is_ok(), "scenario submitted");

    let (status, states, entry, orphaned, error, message) = match submitted {
        Ok(report) => (
            Status::Done,
            report.states,
            Some(report.entry),
            Vec::new(),
            None,
            "Listing saved.".to_string(),
        ),
        Err(err) => {
            let status = match &err {
                SubmitError::Failed { .. } => Status::Failed,
                SubmitError::Partial { .. } => Status::PartialSuccess,
                _ => Status::Rejected,
            };
            let entry = match &err {
                SubmitError::Partial { entry, .. } => catalog.get(&entry.id),
                _ => entry_id.as_ref().and_then(|id| catalog.get(id)),
            };
            (
                status,
                err.terminal_state().into_iter().collect(),
                entry,
                err.orphaned().to_vec(),
                Some(err.to_string()),
                err.user_message(),
            )
        }
    };

    Outcome {
        scenario: scenario.name.clone(),
        mode,
        reconcile,
        staged,
        ops,
        status,
        states,
        entry,
        orphaned,
        error,
        message,
    }
}

async fn stage_files(session: &mut DraftSession, scenario: &Scenario) -> Vec<StageResult> {
    let files: Vec<_> = scenario.files.iter().map(|f| f.to_file()).collect();

    let verdicts = if scenario.batch {
        match session.stage_batch(files).await {
            Ok(verdicts) => verdicts,
            Err(e) => scenario.files.iter().map(|_| Err(e.clone())).collect(),
        }
    } else {
        let mut verdicts = Vec::with_capacity(files.len());
        for file in files {
            verdicts.push(session.stage(file).await);
        }
        verdicts
    };

    scenario
        .files
        .iter()
        .zip(verdicts)
        .map(|(spec, verdict)| match verdict {
            Ok(ordinal) => StageResult {
                file: spec.name.clone(),
                ordinal: Some(ordinal),
                code: None,
                error: None,
            },
            Err(e) => StageResult {
                file: spec.name.clone(),
                ordinal: None,
                code: match &e {
                    SessionError::Rejected(rejection) => Some(rejection.code()),
                    _ => None,
                },
                error: Some(e.to_string()),
            },
        })
        .collect()
}

async fn apply_ops(
    session: &mut DraftSession,
    scenario: &Scenario,
    actor: Option<&listing_model::Actor>,
) -> Vec<OpResult> {
    let mut results = Vec::with_capacity(scenario.ops.len());
    for op in &scenario.ops {
        let result = match *op {
            Op::MoveUp { index } => Ok(session.move_up(index)),
            Op::MoveDown { index } => Ok(session.move_down(index)),
            Op::Remove { index } => match session.remove(index, actor) {
                Ok(removal) => {
                    // wait so the report sees the delete's effect
                    if let Some(task) = removal.delete_task {
                        if let Err(e) = task.await {
                            tracing::warn!(error = %e, "asset delete task did not finish");
                        }
                    }
                    Ok(true)
                }
                Err(e) => Err(e.to_string()),
            },
        };
        results.push(match result {
            Ok(applied) => OpResult {
                op: *op,
                applied,
                error: None,
            },
            Err(error) => OpResult {
                op: *op,
                applied: false,
                error: Some(error),
            },
        });
    }
    results
}
