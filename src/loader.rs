use std::collections::HashMap;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::{DomainObject, LazyReference, RefKey, ReferenceKind, ResolutionState};

/// Backing store for referenced objects, one batched lookup per kind.
///
/// Implementations return a mapping from raw identifier to the object found
/// for it; identifiers absent from the mapping do not exist.
pub trait ObjectStore {
    fn find_many(
        &self,
        kind: ReferenceKind,
        ids: &[String],
    ) -> Result<HashMap<String, DomainObject>>;
}

/// Summary of one `resolve_all` step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Kinds whose batched fetch failed; their pending references were
    /// marked missing.
    pub failed_kinds: Vec<ReferenceKind>,
    /// Number of batched fetches issued (one per kind with pending entries).
    pub fetch_count: usize,
}

/// Accumulates lazy references across a document scan and resolves them with
/// one deduplicated fetch per kind.
///
/// Entries are keyed by (kind, raw id): repeated registrations of the same
/// pair share a single `LazyReference`, so a pass touches the backing store
/// O(distinct kinds) times no matter how often a reference occurs. Scoped to
/// one resolution pass; nothing is cached across passes.
#[derive(Debug, Default)]
pub struct BatchLoader {
    entries: HashMap<RefKey, LazyReference>,
}

impl BatchLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an identifier for batched loading and returns its key.
    ///
    /// Idempotent within a pass: registering the same (kind, raw id) twice
    /// returns the same key and creates no second entry. Registering after a
    /// `resolve_all` opens a new batch; already-resolved entries are left
    /// untouched.
    pub fn register(&mut self, kind: ReferenceKind, raw_id: &str) -> RefKey {
        let key: RefKey = (kind, raw_id.to_string());
        self.entries.entry(key.clone()).or_insert_with(|| {
            debug!(kind = kind.as_str(), raw_id, "registered lazy reference");
            LazyReference {
                kind,
                raw_id: raw_id.to_string(),
                state: ResolutionState::Pending,
            }
        });
        key
    }

    /// Returns the lazy reference for a key, if registered.
    pub fn get(&self, key: &RefKey) -> Option<&LazyReference> {
        self.entries.get(key)
    }

    /// Number of distinct registered references.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves every pending reference with one batched fetch per kind.
    ///
    /// Kinds are fetched in the fixed `ReferenceKind::ALL` order, each moving
    /// its pending entries to `Resolved` (found) or `Missing` (absent from
    /// the result mapping). A failing fetch marks that kind's pending entries
    /// `Missing` and is reported in the returned `LoadReport`; other kinds
    /// still resolve. States never transition backward.
    pub fn resolve_all(&mut self, store: &dyn ObjectStore) -> LoadReport {
        let mut report = LoadReport::default();

        for kind in ReferenceKind::ALL {
            let mut ids: Vec<String> = self
                .entries
                .values()
                .filter(|r| r.kind == kind && r.state == ResolutionState::Pending)
                .map(|r| r.raw_id.clone())
                .collect();
            if ids.is_empty() {
                continue;
            }
            ids.sort();

            report.fetch_count += 1;
            match store.find_many(kind, &ids) {
                Ok(mut found) => {
                    for id in &ids {
                        let entry = self
                            .entries
                            .get_mut(&(kind, id.clone()))
                            .filter(|r| r.state == ResolutionState::Pending);
                        if let Some(entry) = entry {
                            entry.state = match found.remove(id) {
                                Some(object) => ResolutionState::Resolved(object),
                                None => ResolutionState::Missing,
                            };
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        kind = kind.as_str(),
                        error = %e,
                        "batched fetch failed; marking pending references missing"
                    );
                    for id in &ids {
                        if let Some(entry) = self.entries.get_mut(&(kind, id.clone())) {
                            if entry.state == ResolutionState::Pending {
                                entry.state = ResolutionState::Missing;
                            }
                        }
                    }
                    report.failed_kinds.push(kind);
                }
            }
        }

        report
    }
}
