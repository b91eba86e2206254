//! Page slicing for ordered listings.

use serde::{Deserialize, Serialize};

/// Number of posts shown per page on every listing.
pub const PAGE_SIZE: usize = 10;

/// A bounded slice of an ordered sequence plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub number: usize,
    pub num_pages: usize,
    /// Length of the whole sequence.
    pub total: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next().then(|| self.number + 1)
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

/// Cut page `requested` out of `items`.
///
/// `requested` is the raw `page` query value. Missing or non-numeric values
/// serve page 1, values past the end serve the last page and values below 1
/// serve page 1. An empty sequence still has one (empty) page.
pub fn paginate<T>(items: Vec<T>, page_size: usize, requested: Option<&str>) -> Page<T> {
    let page_size = page_size.max(1);
    let total = items.len();
    let num_pages = total.div_ceil(page_size).max(1);

    let number = match requested.map(str::trim) {
        Some(s) => match s.parse::<i64>() {
            Ok(n) if n > num_pages as i64 => num_pages,
            Ok(n) if n < 1 => 1,
            Ok(n) => n as usize,
            // Too many digits for i64 is still a number past the end.
            Err(_) if is_unsigned_integer(s) => num_pages,
            Err(_) => 1,
        },
        None => 1,
    };

    let start = (number - 1) * page_size;
    let items = items.into_iter().skip(start).take(page_size).collect();

    Page {
        items,
        number,
        num_pages,
        total,
    }
}

fn is_unsigned_integer(s: &str) -> bool {
    let digits = s.strip_prefix('+').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
