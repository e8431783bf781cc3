use std::time::Instant;

use tracing::{debug, warn};

use crate::document::Document;
use crate::loader::{BatchLoader, ObjectStore};
use crate::parser::ParserRegistry;
use crate::policy::PolicyEngine;
use crate::types::{
    ExcludedReference, ExclusionReason, RefKey, ResolutionOutcome, ResolutionState,
    ResolvedReference, Viewer,
};

/// Per-node outcome of the scanning phase.
enum ScanState {
    /// Dropped during scanning; no backing-store work is spent on it.
    Excluded(ExclusionReason),
    /// Registered with the batch loader, awaiting resolution.
    Registered(RefKey),
}

/// Coordinates one resolution pass: Scan -> Resolve -> Filter.
///
/// Each pass builds its own batch loader, so no state survives between
/// documents; resolving the same document twice against unchanged data
/// produces identical output and identical store traffic.
pub struct Coordinator<'a> {
    registry: &'a ParserRegistry,
    store: &'a dyn ObjectStore,
    policy: &'a dyn PolicyEngine,
}

impl<'a> Coordinator<'a> {
    pub fn new(
        registry: &'a ParserRegistry,
        store: &'a dyn ObjectStore,
        policy: &'a dyn PolicyEngine,
    ) -> Self {
        Self {
            registry,
            store,
            policy,
        }
    }

    /// Resolves a document for a viewer.
    ///
    /// Scanning visits every reference node once, in document order,
    /// registering identifiers with the batch loader; unknown-kind and
    /// malformed nodes are excluded immediately. Resolution then issues one
    /// batched fetch per kind. Filtering re-visits the surviving nodes:
    /// missing objects are excluded, resolved ones are kept only if the
    /// node's parser rules the viewer may see them. No error in one node or
    /// one kind aborts the rest of the pass.
    pub fn resolve(&self, document: &Document, viewer: &Viewer) -> ResolutionOutcome {
        let start = Instant::now();

        // Scan: one visit per node, no fetches yet.
        let mut loader = BatchLoader::new();
        let mut scanned = Vec::with_capacity(document.len());

        for node in document.nodes() {
            let parser = match self.registry.parser_for(&node.kind_tag) {
                Ok(parser) => parser,
                Err(e) => {
                    warn!(kind = node.kind_tag.as_str(), "skipping node: {}", e);
                    scanned.push(ScanState::Excluded(ExclusionReason::UnknownKind {
                        kind: node.kind_tag.clone(),
                    }));
                    continue;
                }
            };

            match parser.extract_id(node) {
                Ok(raw_id) => {
                    let key = parser.build_lazy_reference(&mut loader, &raw_id);
                    scanned.push(ScanState::Registered(key));
                }
                Err(e) => {
                    warn!(kind = node.kind_tag.as_str(), "skipping node: {}", e);
                    scanned.push(ScanState::Excluded(ExclusionReason::Malformed {
                        detail: e.to_string(),
                    }));
                }
            }
        }

        // Resolve: exactly one batched fetch per kind with pending entries.
        let report = loader.resolve_all(self.store);
        debug!(
            references = loader.len(),
            fetches = report.fetch_count,
            failed_kinds = report.failed_kinds.len(),
            "batch resolution complete"
        );

        // Filter: drop missing objects and everything the viewer may not see.
        let mut included = Vec::new();
        let mut excluded = Vec::new();

        for (node_index, state) in scanned.into_iter().enumerate() {
            let kind_tag = document.nodes()[node_index].kind_tag.clone();
            let key = match state {
                ScanState::Excluded(reason) => {
                    excluded.push(ExcludedReference {
                        node_index,
                        kind_tag,
                        reason,
                    });
                    continue;
                }
                ScanState::Registered(key) => key,
            };

            // Registered keys always have an entry; anything not resolved by
            // now (including an aborted fetch) counts as missing.
            let object = match loader.get(&key).map(|r| &r.state) {
                Some(ResolutionState::Resolved(object)) => object.clone(),
                _ => {
                    excluded.push(ExcludedReference {
                        node_index,
                        kind_tag,
                        reason: ExclusionReason::Missing,
                    });
                    continue;
                }
            };

            let parser = match self.registry.parser_for(&kind_tag) {
                Ok(parser) => parser,
                Err(_) => continue,
            };
            if parser.can_view(viewer, &object, self.policy) {
                included.push(ResolvedReference {
                    node_index,
                    kind: key.0,
                    raw_id: key.1,
                    object,
                });
            } else {
                excluded.push(ExcludedReference {
                    node_index,
                    kind_tag,
                    reason: ExclusionReason::Denied,
                });
            }
        }

        let included_count = included.len();
        ResolutionOutcome {
            included,
            excluded,
            degraded_kinds: report.failed_kinds,
            total: document.len(),
            included_count,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}
