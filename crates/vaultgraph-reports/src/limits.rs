//! Display limits. These truncate report output only, never the analysis.

use serde::{Deserialize, Serialize};

/// Default number of rows per report section
pub const DEFAULT_LIMIT: usize = 100;

/// Top-N truncation for report sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLimits {
    /// Rows per section; 0 means no limit
    pub limit: usize,
    /// Ignore `limit` and show everything
    pub show_all: bool,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            show_all: false,
        }
    }
}

impl ReportLimits {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            show_all: false,
        }
    }

    /// No truncation at all
    pub fn all() -> Self {
        Self {
            limit: 0,
            show_all: true,
        }
    }

    /// How many of `len` rows to show
    pub fn take(&self, len: usize) -> usize {
        if self.show_all || self.limit == 0 {
            len
        } else {
            self.limit.min(len)
        }
    }

    /// How many of `len` rows are hidden
    pub fn hidden(&self, len: usize) -> usize {
        len - self.take(len)
    }

    /// First rows of `items` within the limit
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.take(items.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_and_hidden() {
        let limits = ReportLimits::new(3);
        assert_eq!(limits.take(10), 3);
        assert_eq!(limits.hidden(10), 7);
        assert_eq!(limits.take(2), 2);
        assert_eq!(limits.hidden(2), 0);
    }

    #[test]
    fn test_unlimited() {
        assert_eq!(ReportLimits::new(0).take(10), 10);
        let all = ReportLimits {
            limit: 3,
            show_all: true,
        };
        assert_eq!(all.take(10), 10);
        assert_eq!(ReportLimits::all().hidden(10), 0);
    }

    #[test]
    fn test_slice() {
        let items = [1, 2, 3, 4];
        assert_eq!(ReportLimits::new(2).slice(&items), &[1, 2]);
        assert_eq!(ReportLimits::default().slice(&items), &items);
    }
}
