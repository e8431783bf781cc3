/// Reference resolution module.
///
/// Walks a document's reference nodes, resolves each against the backing
/// store in per-kind batches, and filters the resolved objects by viewer
/// visibility.
mod coordinator;

pub use coordinator::Coordinator;
