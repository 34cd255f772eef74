// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Renders the Event Bus's `RunEvent`s as human-readable lines.
//!
//! Default and `--plain` output render identically (no TUI framework is
//! in scope, per `SPEC_FULL.md` §3) — `--plain` only forces `NO_COLOR`
//! at the process boundary, in `main`.

use campers_core::{CleanupStatus, RunEvent, RunEventPayload, RunStatus};
use campers_orchestrator::EventBusReceiver;

use crate::color::{context, header, muted};

/// Format a single event as one line of output.
pub fn render_event(event: &RunEvent) -> String {
    match &event.payload {
        RunEventPayload::MergedConfig(config) => {
            format!("{} {}", header("config:"), context(&config.camp_name))
        }
        RunEventPayload::InstanceDetails(descriptor) => format!(
            "{} {} ({})",
            header("instance:"),
            descriptor.instance_id,
            descriptor.public_ip.as_deref().unwrap_or("no public ip yet")
        ),
        RunEventPayload::StatusUpdate { status } => {
            format!("{} {}", header("status:"), status_label(*status))
        }
        RunEventPayload::MutagenStatus { state, status_text, .. } => format!(
            "{} {}{}",
            header("sync:"),
            state,
            status_text.as_deref().map(|t| format!(" ({t})")).unwrap_or_default()
        ),
        RunEventPayload::CleanupEvent { step, status } => format!(
            "{} {step} {}",
            header("cleanup:"),
            cleanup_status_label(*status)
        ),
        RunEventPayload::Log(line) => muted(line),
    }
}

fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Launching => "launching",
        RunStatus::Running => "running",
        RunStatus::Stopping => "stopping",
        RunStatus::Terminating => "terminating",
        RunStatus::Error => "error",
    }
}

fn cleanup_status_label(status: CleanupStatus) -> &'static str {
    match status {
        CleanupStatus::InProgress => "in progress",
        CleanupStatus::Completed => "done",
        CleanupStatus::Failed => "failed",
    }
}

/// Drain the bus to completion, printing each event as it arrives.
///
/// `drain` blocks until new events are queued and returns an empty
/// batch only once every `EventBus` producer handle has been dropped —
/// the loop below relies on that to terminate without losing a final
/// batch of events emitted right before teardown finishes.
pub async fn print_events_until_closed(mut rx: EventBusReceiver) {
    loop {
        let batch = rx.drain(16).await;
        if batch.is_empty() {
            return;
        }
        for event in &batch {
            println!("{}", render_event(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_event_renders_its_text() {
        let event = RunEvent::new(0, RunEventPayload::Log("hello".into()));
        assert!(render_event(&event).contains("hello"));
    }

    #[test]
    fn status_update_renders_its_label() {
        let event = RunEvent::new(
            0,
            RunEventPayload::StatusUpdate {
                status: RunStatus::Launching,
            },
        );
        assert!(render_event(&event).contains("launching"));
    }
}
