//! Cursor pagination of remote lists into membership sets

use crate::error::AggregateError;
use crate::remote::MembershipSource;
use crate::storage::SnapshotFile;
use crate::types::{Cursor, ListGroup, MembershipSet};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Records requested per page (platform maximum)
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Members of a single list plus fetch statistics
#[derive(Debug, Clone, Default)]
pub struct ListFetch {
    /// Unique members
    pub members: MembershipSet,
    /// Page requests issued
    pub pages: usize,
    /// Records seen, duplicates included
    pub records: usize,
}

/// Builds membership sets from paged list reads
pub struct Aggregator<'a, S: MembershipSource + ?Sized> {
    source: &'a S,
    page_size: usize,
}

impl<'a, S: MembershipSource + ?Sized> Aggregator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Walk every page of `list_id`.
    ///
    /// Any fetch error discards what was gathered so far.
    pub async fn fetch_list(&self, list_id: &str) -> Result<ListFetch, AggregateError> {
        if list_id.is_empty() {
            return Err(AggregateError::EmptyListId);
        }

        let mut fetch = ListFetch::default();
        let mut cursor: Option<Cursor> = None;
        let mut seen: HashSet<Cursor> = HashSet::new();

        loop {
            let page = self
                .source
                .fetch_page(list_id, self.page_size, cursor.as_ref())
                .await
                .map_err(|source| AggregateError::Fetch {
                    list_id: list_id.to_string(),
                    source,
                })?;
            fetch.pages += 1;
            fetch.records += page.identifiers.len();
            debug!(
                list_id,
                page = fetch.pages,
                records = page.identifiers.len(),
                "Fetched membership page"
            );
            fetch.members.extend(page.identifiers);

            // A cursor seen before means the remote is cycling.
            match page.next_cursor {
                None => break,
                Some(next) if !seen.insert(next.clone()) => {
                    return Err(AggregateError::CursorCycle {
                        list_id: list_id.to_string(),
                        cursor: next.0,
                    });
                }
                Some(next) => cursor = Some(next),
            }
        }

        Ok(fetch)
    }

    /// Fetch one list and replace its membership record on disk
    pub async fn collect_list(
        &self,
        list_id: &str,
        record: &SnapshotFile,
    ) -> Result<MembershipSet, AggregateError> {
        let fetch = self.fetch_list(list_id).await?;
        record.write(&fetch.members)?;

        info!(
            list_id,
            unique = fetch.members.len(),
            pages = fetch.pages,
            "Total profiles retrieved from list {}: {}",
            list_id,
            fetch.records
        );
        Ok(fetch.members)
    }

    /// Collect every list of a group into `data_dir` and return their union.
    ///
    /// Stops at the first list that fails; records already written for
    /// earlier lists in the group are left in place.
    pub async fn collect_group(
        &self,
        group: ListGroup,
        list_ids: &[String],
        data_dir: &Path,
    ) -> Result<MembershipSet, AggregateError> {
        let mut union = MembershipSet::new();
        for list_id in list_ids {
            let record = membership_record(data_dir, list_id, group);
            union.extend(self.collect_list(list_id, &record).await?);
        }
        info!(group = %group, lists = list_ids.len(), members = union.len(), "Collected group");
        Ok(union)
    }
}

/// Location of a list's membership record: `{list_id}_{group}_profiles.csv`
pub fn membership_record(data_dir: &Path, list_id: &str, group: ListGroup) -> SnapshotFile {
    SnapshotFile::new(data_dir.join(format!("{}_{}_profiles.csv", list_id, group.as_str())))
}
