//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for, if page sizes are limited.
    pub max_page_size: Option<u64>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: None,
        }
    }
}

impl PaginationConfig {
    /// Resolve the raw `page_size` query value.
    ///
    /// Missing, unparsable and non-positive values fall back to the default page size.
    /// Values above [PaginationConfig::max_page_size] are capped when a maximum is set.
    pub fn page_size(&self, raw_page_size: Option<&str>) -> u64 {
        match (parse_positive(raw_page_size), self.max_page_size) {
            (Some(page_size), Some(max_page_size)) => page_size.min(max_page_size.max(1)),
            (Some(page_size), None) => page_size,
            (None, _) => self.default_page_size.max(1),
        }
    }

    /// Resolve the raw `page` query value.
    ///
    /// Missing and unparsable values fall back to the default page,
    /// non-positive values are treated as page 1.
    pub fn page(&self, raw_page: Option<&str>) -> u64 {
        match raw_page.map(|page| page.trim().parse::<i64>()) {
            Some(Ok(page)) if page < 1 => 1,
            Some(Ok(page)) => page as u64,
            _ => self.default_page.max(1),
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw?.trim()
        .parse::<i64>()
        .ok()
        .filter(|value| *value > 0)
        .map(|value| value as u64)
}

/// The position of a single page within a collection of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// The 1-indexed page that will be returned.
    pub current_page: u64,
    /// The total number of pages, at least 1.
    pub total_pages: u64,
    /// The number of items to skip.
    pub offset: u64,
    /// The maximum number of items on the page.
    pub limit: u64,
}

impl PageWindow {
    /// Compute the page window for `requested_page` over `total_items` items.
    ///
    /// Pages past the end are clamped to the last page. An empty collection
    /// still has a single, empty page.
    pub fn new(total_items: u64, page_size: u64, requested_page: u64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_items.div_ceil(page_size).max(1);
        let current_page = requested_page.clamp(1, total_pages);

        Self {
            current_page,
            total_pages,
            offset: (current_page - 1) * page_size,
            limit: page_size,
        }
    }
}
