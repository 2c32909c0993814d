//! In-memory platform doubles shared by the unit tests

use crate::error::RemoteError;
use crate::remote::{MembershipSource, ProfileEraser};
use crate::storage::SnapshotFile;
use crate::types::{Cursor, Identifier, Page};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

pub fn ids(values: &[&str]) -> Vec<Identifier> {
    values.iter().copied().map(Identifier::from).collect()
}

/// Lists served page by page, with the offset as cursor
#[derive(Default)]
pub struct PagedLists {
    lists: HashMap<String, Vec<Identifier>>,
    failing_page: HashMap<String, usize>,
    cycling: HashMap<String, Vec<Cursor>>,
    requests: Mutex<usize>,
}

impl PagedLists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, list_id: &str, members: &[&str]) -> Self {
        self.lists.insert(list_id.to_string(), ids(members));
        self
    }

    /// Fail the given 1-based page of `list_id`
    pub fn failing_on_page(mut self, list_id: &str, page: usize) -> Self {
        self.failing_page.insert(list_id.to_string(), page);
        self
    }

    /// Hand out `cursors` for `list_id` in a loop, never reaching the end
    pub fn cycling(mut self, list_id: &str, cursors: &[&str]) -> Self {
        let cursors = cursors.iter().map(|c| Cursor(c.to_string())).collect();
        self.cycling.insert(list_id.to_string(), cursors);
        self
    }

    pub fn requests(&self) -> usize {
        *self.requests.lock()
    }
}

#[async_trait]
impl MembershipSource for PagedLists {
    async fn fetch_page(
        &self,
        list_id: &str,
        page_size: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page, RemoteError> {
        *self.requests.lock() += 1;

        let members = self
            .lists
            .get(list_id)
            .ok_or_else(|| RemoteError::NotFound(list_id.to_string()))?;
        let offset: usize = cursor.and_then(|c| c.as_str().parse().ok()).unwrap_or(0);

        if self.failing_page.get(list_id) == Some(&(offset / page_size + 1)) {
            return Err(RemoteError::Transport("connection reset".into()));
        }
        if let Some(cursors) = self.cycling.get(list_id) {
            let position = cursor.and_then(|c| cursors.iter().position(|known| known == c));
            let next = position.map_or(0, |i| (i + 1) % cursors.len());
            return Ok(Page {
                identifiers: members.iter().take(page_size).cloned().collect(),
                next_cursor: Some(cursors[next].clone()),
            });
        }

        let end = (offset + page_size).min(members.len());
        Ok(Page {
            identifiers: members[offset.min(end)..end].to_vec(),
            next_cursor: (end < members.len()).then(|| Cursor(end.to_string())),
        })
    }
}

/// Eraser with scripted failures that records every request
#[derive(Default)]
pub struct ScriptedEraser {
    failures: Mutex<HashMap<Identifier, usize>>,
    missing: HashSet<Identifier>,
    observed_queue: Option<SnapshotFile>,
    calls: Mutex<Vec<Identifier>>,
    snapshots: Mutex<Vec<Vec<Identifier>>>,
}

impl ScriptedEraser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the first `times` requests for `identifier`
    pub fn failing(self, identifier: &str, times: usize) -> Self {
        self.failures.lock().insert(Identifier::from(identifier), times);
        self
    }

    /// Answer `identifier` with not-found
    pub fn missing(mut self, identifier: &str) -> Self {
        self.missing.insert(Identifier::from(identifier));
        self
    }

    /// Capture the on-disk queue at the moment of each request
    pub fn observing(mut self, queue: SnapshotFile) -> Self {
        self.observed_queue = Some(queue);
        self
    }

    pub fn calls(&self) -> Vec<Identifier> {
        self.calls.lock().clone()
    }

    pub fn snapshots(&self) -> Vec<Vec<Identifier>> {
        self.snapshots.lock().clone()
    }
}

#[async_trait]
impl ProfileEraser for ScriptedEraser {
    async fn request_deletion(&self, identifier: &Identifier) -> Result<(), RemoteError> {
        self.calls.lock().push(identifier.clone());
        if let Some(queue) = &self.observed_queue {
            let snapshot = queue.read().unwrap_or_default();
            self.snapshots.lock().push(snapshot);
        }

        if self.missing.contains(identifier) {
            return Err(RemoteError::NotFound(identifier.to_string()));
        }
        let mut failures = self.failures.lock();
        if let Some(remaining) = failures.get_mut(identifier) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RemoteError::Rejected {
                    status: 503,
                    detail: "service unavailable".into(),
                });
            }
        }
        Ok(())
    }
}
