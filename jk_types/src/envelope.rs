use serde::Deserialize;
use serde::Serialize;

/// Upstream success envelope for list endpoints: `{ "data": [...], "pagination"?: {...} }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ListResponse<T> {
    /// Last page number advertised by the upstream, 1 when unpaginated
    pub fn last_page(&self) -> u32 {
        self.pagination.as_ref().map(|p| p.last_visible_page.max(1)).unwrap_or(1)
    }

    /// Whether the upstream reports more pages after this one
    pub fn has_next_page(&self) -> bool {
        self.pagination.as_ref().is_some_and(|p| p.has_next_page)
    }

    /// Append another page's items, keeping this page's pagination block
    pub fn extend_from(&mut self, other: ListResponse<T>) {
        self.data.extend(other.data);
    }
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self { data: Vec::new(), pagination: None }
    }
}

/// Upstream success envelope for single-resource endpoints: `{ "data": {...} }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResponse<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub last_visible_page: u32,
    pub has_next_page: bool,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub items: Option<PaginationItems>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationItems {
    pub count: u32,
    pub total: u32,
    pub per_page: u32,
}
