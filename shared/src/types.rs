//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Pagination parameters accepted on list endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl Pagination {
    /// Row offset for a SQL OFFSET clause
    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.limit()
    }

    /// Row limit for a SQL LIMIT clause, clamped to 100
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, 100) as i64
    }
}

/// A page of results with the total row count
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page.max(1),
            per_page: pagination.limit() as u32,
        }
    }
}

/// Permitted search fields for contract listings
///
/// Client input selects a variant; arbitrary column names never reach SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractSearchField {
    Name,
    Note,
}

impl ContractSearchField {
    pub fn column(&self) -> &'static str {
        match self {
            ContractSearchField::Name => "name",
            ContractSearchField::Note => "note",
        }
    }
}

/// Permitted search fields for project listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSearchField {
    Name,
    Note,
}

impl ProjectSearchField {
    pub fn column(&self) -> &'static str {
        match self {
            ProjectSearchField::Name => "name",
            ProjectSearchField::Note => "note",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset() {
        let p = Pagination { page: 1, per_page: 20 };
        assert_eq!(p.offset(), 0);
        let p = Pagination { page: 3, per_page: 20 };
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination { page: 0, per_page: 1000 };
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 100);
        let p = Pagination { page: 2, per_page: 0 };
        assert_eq!(p.limit(), 1);
        assert_eq!(p.offset(), 1);
    }

    #[test]
    fn test_search_field_columns() {
        assert_eq!(ContractSearchField::Name.column(), "name");
        assert_eq!(ContractSearchField::Note.column(), "note");
        assert_eq!(ProjectSearchField::Name.column(), "name");
    }
}
