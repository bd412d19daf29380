use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 10;

/// Parameters of a catalog listing: free-text query plus 1-indexed paging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoListOp {
    query: String,
    page: u32,
    per_page: u32,
}

impl RepoListOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Page number, with 0 read as the first page.
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size, with 0 read as [`DEFAULT_PER_PAGE`].
    pub fn per_page(&self) -> u32 {
        match self.per_page {
            0 => DEFAULT_PER_PAGE,
            n => n,
        }
    }

    pub fn offset(&self) -> usize {
        (self.page() as usize - 1).saturating_mul(self.per_page() as usize)
    }

    /// Cuts the page out of the final ranked and filtered sequence.
    ///
    /// Returns `items[(page-1)*per_page .. min(page*per_page, len)]`, empty
    /// once the offset runs past the end.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = self.offset();
        if offset >= items.len() {
            return Vec::new();
        }
        items
            .into_iter()
            .skip(offset)
            .take(self.per_page() as usize)
            .collect()
    }
}
