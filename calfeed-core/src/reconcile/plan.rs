//! Reconcile plan computation.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::reconcile::DiffKind;
use crate::record::{EventRecord, StoredEvent};
use crate::signature::{Signature, signature};

/// What to do with a stored event whose signature matches a feed event but
/// whose other details (title text, description, location) changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdatePolicy {
    /// Leave matched events alone; only create and delete.
    #[default]
    CreateDelete,
    /// Rewrite matched events whose details changed.
    UpdateInPlace,
}

/// Changes needed to make a category's stored events match its feed.
#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    pub to_create: Vec<EventRecord>,
    /// Stored event paired with the feed record that replaces it
    pub to_update: Vec<(StoredEvent, EventRecord)>,
    pub to_delete: Vec<StoredEvent>,
}

/// A single planned change, borrowed from a [`ReconcilePlan`].
#[derive(Debug, Clone, Copy)]
pub enum PlanEntry<'a> {
    Create(&'a EventRecord),
    Update {
        old: &'a StoredEvent,
        new: &'a EventRecord,
    },
    Delete(&'a StoredEvent),
}

impl PlanEntry<'_> {
    pub fn kind(&self) -> DiffKind {
        match self {
            PlanEntry::Create(_) => DiffKind::Create,
            PlanEntry::Update { .. } => DiffKind::Update,
            PlanEntry::Delete(_) => DiffKind::Delete,
        }
    }

    /// The record this entry is about (the new version for updates).
    pub fn record(&self) -> &EventRecord {
        match self {
            PlanEntry::Create(record) => record,
            PlanEntry::Update { new, .. } => new,
            PlanEntry::Delete(stored) => &stored.record,
        }
    }
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// (created, updated, deleted)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.to_create.len(), self.to_update.len(), self.to_delete.len())
    }

    /// All planned changes, ordered by event start for display.
    pub fn entries(&self) -> Vec<PlanEntry<'_>> {
        let mut entries: Vec<PlanEntry<'_>> = self
            .to_create
            .iter()
            .map(PlanEntry::Create)
            .chain(
                self.to_update
                    .iter()
                    .map(|(old, new)| PlanEntry::Update { old, new }),
            )
            .chain(self.to_delete.iter().map(PlanEntry::Delete))
            .collect();

        entries.sort_by(|a, b| a.record().start.cmp(&b.record().start));
        entries
    }
}

/// Diff one category's feed records against its stored events.
///
/// - feed signatures missing from the store are created (first occurrence only)
/// - stored signatures missing from the feed are deleted
/// - matched signatures are left alone, or updated under
///   [`UpdatePolicy::UpdateInPlace`] when their details changed
pub fn reconcile(
    feed: &[EventRecord],
    stored: &[StoredEvent],
    policy: UpdatePolicy,
) -> ReconcilePlan {
    let stored_signatures: Vec<Signature> = stored.iter().map(|e| signature(&e.record)).collect();

    // First stored event wins when several share a signature
    let mut stored_by_signature: HashMap<&Signature, &StoredEvent> =
        HashMap::with_capacity(stored.len());
    for (event, sig) in stored.iter().zip(&stored_signatures) {
        stored_by_signature.entry(sig).or_insert(event);
    }

    let mut plan = ReconcilePlan::default();
    let mut seen: HashSet<Signature> = HashSet::with_capacity(feed.len());

    for record in feed {
        let sig = signature(record);

        match stored_by_signature.get(&sig) {
            _ if seen.contains(&sig) => {}
            None => plan.to_create.push(record.clone()),
            Some(existing) => {
                if policy == UpdatePolicy::UpdateInPlace && existing.record.details_differ(record)
                {
                    plan.to_update.push(((*existing).clone(), record.clone()));
                }
            }
        }

        seen.insert(sig);
    }

    for (event, sig) in stored.iter().zip(&stored_signatures) {
        if !seen.contains(sig) {
            plan.to_delete.push(event.clone());
        }
    }

    plan
}
