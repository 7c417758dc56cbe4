use std::num::IntErrorKind;

pub(crate) const POSTS_PER_PAGE: u32 = 10;

/// LIMIT/OFFSET окно, которое репозиторий применяет к упорядоченной выборке.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub(crate) limit: i64,
    pub(crate) offset: i64,
}

/// Splits an ordered collection of `total` items into fixed-size pages.
///
/// An empty collection still has one (empty) page. Requested page numbers
/// are resolved leniently: a missing or non-numeric value means the first
/// page, anything outside `1..=num_pages` means the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Paginator {
    total: i64,
    per_page: u32,
}

impl Paginator {
    pub(crate) fn new(total: i64, per_page: u32) -> Self {
        Self {
            total: total.max(0),
            per_page: per_page.max(1),
        }
    }

    pub(crate) fn num_pages(&self) -> u32 {
        let per_page = i64::from(self.per_page);
        let pages = (self.total + per_page - 1) / per_page;
        u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
    }

    pub(crate) fn resolve(&self, raw: Option<&str>) -> u32 {
        let Some(raw) = raw.map(str::trim) else {
            return 1;
        };

        match raw.parse::<i64>() {
            Ok(number) if number >= 1 && number <= i64::from(self.num_pages()) => number as u32,
            Ok(_) => self.num_pages(),
            Err(err) => match err.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => self.num_pages(),
                _ => 1,
            },
        }
    }

    pub(crate) fn window(&self, number: u32) -> PageWindow {
        let limit = i64::from(self.per_page);
        let offset = i64::from(number.saturating_sub(1)) * limit;
        PageWindow { limit, offset }
    }

    pub(crate) fn page<T>(&self, number: u32, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number,
            num_pages: self.num_pages(),
            total: self.total,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) number: u32,
    pub(crate) num_pages: u32,
    pub(crate) total: i64,
    pub(crate) per_page: u32,
}

impl<T> Page<T> {
    pub(crate) fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub(crate) fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub(crate) fn next_page_number(&self) -> Option<u32> {
        self.has_next().then(|| self.number + 1)
    }

    pub(crate) fn previous_page_number(&self) -> Option<u32> {
        self.has_previous().then(|| self.number - 1)
    }

    pub(crate) fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            per_page: self.per_page,
        }
    }
}
