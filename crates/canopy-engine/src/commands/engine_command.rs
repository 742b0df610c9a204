//! Engine-level write commands.

#![allow(clippy::result_large_err)]

use canopy_core::errors::ExResult;
use canopy_core::lifecycle::RestoreMode;
use canopy_core::model::{PublishOutcome, Version, VersionContent};
use canopy_core_types::RequestContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info_span;

use crate::engine::Engine;

/// Lifecycle writes the engine accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EngineCommand {
    /// Start a draft, optionally copying an existing version of the page.
    CreateDraft {
        page_id: String,
        #[serde(default)]
        base_version_id: Option<String>,
    },
    /// Validate editor content and store it as a new draft.
    SaveDraft {
        page_id: String,
        content: VersionContent,
    },
    /// Make a draft the page's current version.
    Publish {
        version_id: String,
        /// Publish time; `None` means now.
        #[serde(default)]
        at: Option<DateTime<Utc>>,
    },
    /// Copy a historical version forward.
    Restore {
        page_id: String,
        version_id: String,
        /// Overrides the configured restore mode.
        #[serde(default)]
        mode: Option<RestoreMode>,
    },
}

/// Result of applying an engine command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EngineCommandResult {
    CreateDraft(Version),
    SaveDraft(Version),
    Publish(PublishOutcome),
    Restore(Version),
}

/// Apply an engine command on behalf of a request.
///
/// The request and trace ids are attached to the command's log span and to
/// any error it returns.
pub fn apply_engine_command(
    engine: &Engine,
    cmd: EngineCommand,
    ctx: &RequestContext,
) -> ExResult<EngineCommandResult> {
    let span = info_span!(
        "engine_command",
        request_id = %ctx.request_id,
        trace_id = ctx.trace_id.as_ref().map(|t| t.as_str()),
    );
    let _guard = span.enter();

    let result = match cmd {
        EngineCommand::CreateDraft {
            page_id,
            base_version_id,
        } => engine
            .create_draft(&page_id, base_version_id.as_deref())
            .map(EngineCommandResult::CreateDraft),
        EngineCommand::SaveDraft { page_id, content } => engine
            .save_draft(&page_id, content)
            .map(EngineCommandResult::SaveDraft),
        EngineCommand::Publish { version_id, at } => engine
            .publish_at(&version_id, at.unwrap_or_else(Utc::now))
            .map(EngineCommandResult::Publish),
        EngineCommand::Restore {
            page_id,
            version_id,
            mode,
        } => {
            let mode = mode.unwrap_or(engine.config().lifecycle.restore_mode);
            engine
                .restore_with_mode(&page_id, &version_id, mode)
                .map(EngineCommandResult::Restore)
        }
    };

    result.map_err(|e| {
        let e = e.with_request_id(ctx.request_id.clone());
        match &ctx.trace_id {
            Some(trace_id) => e.with_trace_id(trace_id.clone()),
            None => e,
        }
    })
}
