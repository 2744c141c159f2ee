//! Pending work items.

use std::path::PathBuf;
use std::sync::Arc;

use super::item::{UploadContext, WorkItem};

/// Stack of items not yet handed to a worker.
///
/// Not synchronized on its own: the supervisor only touches it while holding
/// the coordination lock, or before any worker has started.
#[derive(Debug, Default)]
pub struct Backlog {
    items: Vec<WorkItem>,
}

impl Backlog {
    /// Builds a backlog from discovered paths, all sharing one upload context.
    pub fn new<I>(paths: I, context: UploadContext) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let context = Arc::new(context);
        let items = paths
            .into_iter()
            .map(|path| WorkItem::new(path, Arc::clone(&context)))
            .collect();
        Self { items }
    }

    /// Removes and returns one item. Last in, first out.
    pub fn take(&mut self) -> Option<WorkItem> {
        self.items.pop()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items still waiting, in the order they were supplied.
    pub fn pending(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.iter()
    }
}
