//! TUI rendering traits for calfeed types.
//!
//! Extension traits that add colored terminal rendering to calfeed-core
//! types using owo_colors.

use calfeed_core::reconcile::{DiffKind, PlanEntry};
use calfeed_core::{DATETIME_FORMAT, FeedConfig, ReconcilePlan, SyncResult};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        let symbol = self.symbol();
        match self {
            DiffKind::Create => symbol.green().to_string(),
            DiffKind::Update => symbol.yellow().to_string(),
            DiffKind::Delete => symbol.red().to_string(),
        }
    }
}

/// Colorize text according to the diff kind
fn colorize_diff(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

impl Render for PlanEntry<'_> {
    fn render(&self) -> String {
        let record = self.record();
        let title = colorize_diff(self.kind(), &record.title);
        let time = format!(
            "{} - {}",
            record.start.format(DATETIME_FORMAT),
            record.end.format(DATETIME_FORMAT)
        );

        format!("{} {} {}", self.kind().render(), title, time.dimmed())
    }
}

impl Render for FeedConfig {
    fn render(&self) -> String {
        format!("📅 {}", self.category)
    }
}

impl Render for SyncResult {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        for e in &self.errors {
            let line = if e.is_fatal() {
                e.to_string().red().to_string()
            } else {
                e.to_string().yellow().to_string()
            };
            lines.push(format!("   {line}"));
        }

        if !self.failed() {
            lines.push(format!("   {}", self.render_summary()));
        }

        lines.join("\n")
    }
}

/// One-line rendering of a sync outcome, for the watch log.
pub trait SummaryRender {
    fn render_summary(&self) -> String;
}

impl SummaryRender for SyncResult {
    fn render_summary(&self) -> String {
        if self.failed() {
            let reason = self
                .errors
                .iter()
                .find(|e| e.is_fatal())
                .map(|e| e.to_string())
                .unwrap_or_default();
            return reason.red().to_string();
        }

        if !self.has_changes() && self.dropped == 0 {
            return "No changes".dimmed().to_string();
        }

        let mut parts = Vec::new();
        if self.created > 0 {
            parts.push(format!("+{}", self.created).green().to_string());
        }
        if self.updated > 0 {
            parts.push(format!("~{}", self.updated).yellow().to_string());
        }
        if self.deleted > 0 {
            parts.push(format!("-{}", self.deleted).red().to_string());
        }
        if self.dropped > 0 {
            parts.push(format!("({} skipped)", self.dropped).dimmed().to_string());
        }
        parts.join(" ")
    }
}

/// Threshold for compact view (show counts instead of individual events)
const COMPACT_THRESHOLD: usize = 5;

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Rendering for a dry-run plan
pub trait PlanRender {
    fn render(&self, verbose: bool) -> String;
}

impl PlanRender for ReconcilePlan {
    fn render(&self, verbose: bool) -> String {
        if self.is_empty() {
            return "   No changes".dimmed().to_string();
        }

        let entries = self.entries();
        let mut lines = Vec::new();

        if verbose || entries.len() <= COMPACT_THRESHOLD {
            for entry in &entries {
                lines.push(format!("   {}", entry.render()));
            }
        } else {
            let (creates, updates, deletes) = self.counts();

            if creates > 0 {
                let label = format!("({} new {})", creates, pluralize("event", creates));
                lines.push(format!("   {} {}", "+".green(), label.green()));
            }
            if updates > 0 {
                let label = format!("({} changed {})", updates, pluralize("event", updates));
                lines.push(format!("   {} {}", "~".yellow(), label.yellow()));
            }
            if deletes > 0 {
                let label = format!("({} stale {})", deletes, pluralize("event", deletes));
                lines.push(format!("   {} {}", "-".red(), label.red()));
            }
        }

        lines.join("\n")
    }
}
