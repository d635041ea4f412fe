use serde::{Serialize, Serializer};

use crate::error::AppError;

/// Marker shown between non-adjacent page numbers.
pub const ELLIPSIS: &str = "…";

/// One entry of an elided page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(i64),
    Ellipsis,
}

impl Serialize for PageLink {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageLink::Page(n) => serializer.serialize_i64(*n),
            PageLink::Ellipsis => serializer.serialize_str(ELLIPSIS),
        }
    }
}

/// Page-number pagination over `count` items.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    pub count: i64,
    pub per_page: i64,
}

impl Paginator {
    pub fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    /// Always at least one page, so an empty listing still renders page 1.
    pub fn num_pages(&self) -> i64 {
        ((self.count + self.per_page - 1) / self.per_page).max(1)
    }

    /// Resolves the `page` query value: missing means 1, `"last"` means the
    /// final page, anything else must be an integer in range.
    pub fn validate_page(&self, raw: Option<&str>) -> Result<i64, AppError> {
        let number = match raw.map(str::trim) {
            None | Some("") => 1,
            Some("last") => self.num_pages(),
            Some(value) => value
                .parse::<i64>()
                .map_err(|_| AppError::NotFound("That page number is not an integer".to_string()))?,
        };

        if number < 1 {
            return Err(AppError::NotFound(
                "That page number is less than 1".to_string(),
            ));
        }
        if number > self.num_pages() {
            return Err(AppError::NotFound("That page contains no results".to_string()));
        }
        Ok(number)
    }

    pub fn page(&self, raw: Option<&str>) -> Result<Page, AppError> {
        let number = self.validate_page(raw)?;
        Ok(Page {
            number,
            num_pages: self.num_pages(),
            count: self.count,
            per_page: self.per_page,
        })
    }

    /// Page links around `number` with long runs collapsed into
    /// [`PageLink::Ellipsis`].
    pub fn elided_page_range(&self, number: i64, on_each_side: i64, on_ends: i64) -> Vec<PageLink> {
        let num_pages = self.num_pages();
        let number = number.clamp(1, num_pages);

        if num_pages <= (on_each_side + on_ends) * 2 {
            return (1..=num_pages).map(PageLink::Page).collect();
        }

        let mut links = Vec::new();
        if number > 1 + on_each_side + on_ends + 1 {
            links.extend((1..=on_ends).map(PageLink::Page));
            links.push(PageLink::Ellipsis);
            links.extend((number - on_each_side..=number).map(PageLink::Page));
        } else {
            links.extend((1..=number).map(PageLink::Page));
        }

        if number < num_pages - on_each_side - on_ends - 1 {
            links.extend((number + 1..=number + on_each_side).map(PageLink::Page));
            links.push(PageLink::Ellipsis);
            links.extend((num_pages - on_ends + 1..=num_pages).map(PageLink::Page));
        } else {
            links.extend((number + 1..=num_pages).map(PageLink::Page));
        }

        links
    }
}

/// A validated page of a [`Paginator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// Listing envelope returned by the feed endpoints.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub num_pages: i64,
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub page_range: Vec<PageLink>,
}

impl<T> PageResponse<T> {
    /// Wraps `items` for `page`, using the feed's link layout (three pages on
    /// each side of the current one, one at each end).
    pub fn new(items: Vec<T>, page: Page) -> Self {
        let paginator = Paginator::new(page.count, page.per_page);
        Self {
            items,
            page: page.number,
            num_pages: page.num_pages,
            count: page.count,
            has_next: page.has_next(),
            has_previous: page.has_previous(),
            page_range: paginator.elided_page_range(page.number, 3, 1),
        }
    }
}
