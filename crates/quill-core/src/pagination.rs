//! Page-number pagination over newest-first listings.

use serde::Serialize;

use crate::error::DomainError;

/// Posts per listing page.
pub const PAGE_SIZE: u64 = 4;

/// Which page the client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRequest {
    #[default]
    First,
    Number(u64),
    Last,
}

impl PageRequest {
    /// Parse the raw `page` query value.
    ///
    /// Absent or empty means the first page, `last` the last one. Anything
    /// that is not a positive integer does not name a page.
    pub fn parse(raw: Option<&str>) -> Result<Self, DomainError> {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Ok(Self::First),
            Some(raw) => raw,
        };

        if raw == "last" {
            return Ok(Self::Last);
        }

        match raw.parse::<u64>() {
            Ok(number) if number >= 1 => Ok(Self::Number(number)),
            _ => Err(DomainError::not_found("page", raw)),
        }
    }
}

/// A resolved page: where to slice and how many pages exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Resolve a request against a collection of `total` items.
    ///
    /// An empty collection still has a single, empty first page.
    pub fn resolve(request: PageRequest, total: u64, per_page: u64) -> Result<Self, DomainError> {
        let num_pages = total.div_ceil(per_page).max(1);
        let number = match request {
            PageRequest::First => 1,
            PageRequest::Last => num_pages,
            PageRequest::Number(n) if n <= num_pages => n,
            PageRequest::Number(n) => return Err(DomainError::not_found("page", n)),
        };

        Ok(Self {
            number,
            num_pages,
            total,
            offset: (number - 1) * per_page,
            limit: per_page,
        })
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total: window.total,
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_request() {
        assert_eq!(PageRequest::parse(None).unwrap(), PageRequest::First);
        assert_eq!(PageRequest::parse(Some("")).unwrap(), PageRequest::First);
        assert_eq!(PageRequest::parse(Some("3")).unwrap(), PageRequest::Number(3));
        assert_eq!(PageRequest::parse(Some("last")).unwrap(), PageRequest::Last);
        assert!(PageRequest::parse(Some("0")).is_err());
        assert!(PageRequest::parse(Some("two")).is_err());
        assert!(PageRequest::parse(Some("-1")).is_err());
    }

    #[test]
    fn test_resolve_windows() {
        let window = PageWindow::resolve(PageRequest::Number(2), 9, PAGE_SIZE).unwrap();
        assert_eq!(window.num_pages, 3);
        assert_eq!(window.offset, 4);
        assert_eq!(window.limit, 4);

        let last = PageWindow::resolve(PageRequest::Last, 9, PAGE_SIZE).unwrap();
        assert_eq!(last.number, 3);
        assert_eq!(last.offset, 8);
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let window = PageWindow::resolve(PageRequest::First, 0, PAGE_SIZE).unwrap();
        assert_eq!(window.number, 1);
        assert_eq!(window.num_pages, 1);

        let page: Page<u8> = Page::new(vec![], window);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_page_past_the_end_is_not_found() {
        let result = PageWindow::resolve(PageRequest::Number(4), 9, PAGE_SIZE);
        assert!(matches!(result, Err(DomainError::NotFound { entity_type: "page", .. })));
    }
}
