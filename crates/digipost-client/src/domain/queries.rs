//! Paging and filter parameters of the read operations.

use super::errors::DigipostError;
use chrono::{DateTime, FixedOffset};

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_INBOX_PAGE_SIZE: u32 = 1000;

/// Document events in `[from, to)`, optionally for one organisation and part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentEventsQuery {
    pub organisation: Option<String>,
    pub part_id: Option<String>,
    pub from: DateTime<FixedOffset>,
    pub to: DateTime<FixedOffset>,
    pub offset: u32,
    pub max_results: u32,
}

impl DocumentEventsQuery {
    pub fn new(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> Self {
        Self {
            organisation: None,
            part_id: None,
            from,
            to,
            offset: 0,
            max_results: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn for_organisation(
        mut self,
        organisation: impl Into<String>,
        part_id: Option<String>,
    ) -> Self {
        self.organisation = Some(organisation.into());
        self.part_id = part_id;
        self
    }

    pub fn page(mut self, offset: u32, max_results: u32) -> Self {
        self.offset = offset;
        self.max_results = max_results;
        self
    }

    pub fn validate(&self) -> Result<(), DigipostError> {
        if self.from > self.to {
            return Err(DigipostError::InvalidArgument(format!(
                "event window starts after it ends ({} > {})",
                self.from, self.to
            )));
        }
        if self.max_results == 0 {
            return Err(DigipostError::InvalidArgument(
                "max_results must be positive".to_string(),
            ));
        }
        if self.part_id.is_some() && self.organisation.is_none() {
            return Err(DigipostError::InvalidArgument(
                "part id requires an organisation".to_string(),
            ));
        }
        Ok(())
    }

    /// Query pairs in wire order.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(6);
        if let Some(organisation) = &self.organisation {
            pairs.push(("org", organisation.clone()));
        }
        if let Some(part_id) = &self.part_id {
            pairs.push(("part", part_id.clone()));
        }
        pairs.push(("from", self.from.to_rfc3339()));
        pairs.push(("to", self.to.to_rfc3339()));
        pairs.push(("offset", self.offset.to_string()));
        pairs.push(("maxResults", self.max_results.to_string()));
        pairs
    }
}

/// Window into an inbox. At most [`MAX_INBOX_PAGE_SIZE`] documents per page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InboxPage {
    pub offset: u32,
    pub limit: u32,
}

impl Default for InboxPage {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl InboxPage {
    pub fn new(offset: u32, limit: u32) -> Result<Self, DigipostError> {
        if limit == 0 || limit > MAX_INBOX_PAGE_SIZE {
            return Err(DigipostError::InvalidArgument(format!(
                "inbox limit must be within 1..={MAX_INBOX_PAGE_SIZE}, got {limit}"
            )));
        }
        Ok(Self { offset, limit })
    }
}
