// src/models/pagination.rs
use serde::Serialize;

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;
/// Highest page whose offset still fits in an `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PER_PAGE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        let pages = if total <= 0 {
            0
        } else {
            (total + self.per_page - 1) / self.per_page
        };
        PageMeta {
            page: self.page,
            per_page: self.per_page,
            total,
            pages,
        }
    }
}

/// The `pagination` envelope attached to every list response.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PageMeta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let p = Pagination::new(None, None);
        assert_eq!(p, Pagination { page: 1, per_page: 20 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let p = Pagination::new(Some(0), Some(10_000));
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, MAX_PER_PAGE);

        let p = Pagination::new(Some(-3), Some(0));
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 1);
    }

    #[test]
    fn computes_offset_and_page_count() {
        let p = Pagination::new(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
        assert_eq!(p.meta(21).pages, 3);
        assert_eq!(p.meta(20).pages, 2);
        assert_eq!(p.meta(0).pages, 0);
        assert_eq!(p.meta(21).total, 21);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow_the_offset() {
        let p = Pagination::new(Some(i64::MAX), Some(MAX_PER_PAGE));
        assert_eq!(p.page, MAX_PAGE);
        assert!(p.offset() > 0);
        assert_eq!(p.offset(), (MAX_PAGE - 1) * MAX_PER_PAGE);

        let p = Pagination::new(Some(i64::MAX), None);
        assert!(p.offset() > 0);
    }
}
