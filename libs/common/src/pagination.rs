use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_PAGE_SIZE: i64 = 50;

/// Highest zero-based page index a request may ask for.
pub const MAX_PAGE_INDEX: i64 = 1_000_000;

/// Raw `page`/`size` query parameters. Resolve with [`PageParams::resolve`].
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageParams {
    /// Zero-based page clamped to `0..=MAX_PAGE_INDEX`, size clamped to `1..=max_size`.
    pub fn resolve(&self, default_size: i64, max_size: i64) -> PageRequest {
        let page = self.page.unwrap_or(0).clamp(0, MAX_PAGE_INDEX);
        let size = self.size.unwrap_or(default_size).clamp(1, max_size.max(1));
        PageRequest { page, size }
    }
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        let total_pages = if total_elements == 0 {
            0
        } else {
            total_elements.saturating_add(request.size - 1) / request.size
        };
        Page {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
            first: request.page == 0,
            last: request.page.saturating_add(1) >= total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let req = PageParams::default().resolve(20, 50);
        assert_eq!(req, PageRequest { page: 0, size: 20 });
    }

    #[test]
    fn test_resolve_caps_size() {
        let params = PageParams {
            page: Some(2),
            size: Some(500),
        };
        assert_eq!(params.resolve(20, 50), PageRequest { page: 2, size: 50 });
    }

    #[test]
    fn test_resolve_rejects_negative_and_zero() {
        let params = PageParams {
            page: Some(-3),
            size: Some(0),
        };
        assert_eq!(params.resolve(20, 50), PageRequest { page: 0, size: 1 });
    }

    #[test]
    fn test_page_totals() {
        let page = Page::new(vec![1, 2], PageRequest { page: 0, size: 2 }, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.first);
        assert!(!page.last);

        let page = Page::new(vec![5], PageRequest { page: 2, size: 2 }, 5);
        assert!(page.last);
    }

    #[test]
    fn test_empty_page() {
        let page: Page<i32> = Page::new(vec![], PageRequest { page: 0, size: 20 }, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.last);
    }

    #[test]
    fn test_map_preserves_metadata() {
        let page = Page::new(vec![1, 2], PageRequest { page: 1, size: 2 }, 4).map(|n| n * 10);
        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_elements, 4);
    }

    #[test]
    fn test_resolve_clamps_huge_page() {
        let params = PageParams {
            page: Some(i64::MAX),
            size: Some(20),
        };
        let req = params.resolve(20, 50);
        assert_eq!(req.page, MAX_PAGE_INDEX);
        assert_eq!(req.offset(), MAX_PAGE_INDEX * 20);
    }

    #[test]
    fn test_unresolved_extremes_do_not_overflow() {
        let req = PageRequest {
            page: i64::MAX,
            size: 50,
        };
        assert_eq!(req.offset(), i64::MAX);

        let page: Page<u8> = Page::new(vec![], req, i64::MAX);
        assert!(page.last);
        assert!(!page.first);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest { page: 3, size: 20 }.offset(), 60);
    }
}
