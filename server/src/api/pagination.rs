use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Limit/offset query parameters. Values that are missing or not positive
/// integers fall back to the defaults rather than failing the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageParams {
    /// Number of items to return (default: 10, max: 100)
    #[param(value_type = Option<i64>)]
    pub limit: Option<String>,
    /// Number of items to skip (default: 0)
    #[param(value_type = Option<i64>)]
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: i64,
    pub limit: i64,
}

impl PageParams {
    pub fn window(&self) -> Window {
        let parse = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|v| v.trim().parse::<i64>().ok())
        };

        let limit = match parse(&self.limit) {
            Some(limit) if limit > 0 => limit.min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };
        let offset = parse(&self.offset).filter(|o| *o > 0).unwrap_or(0);

        Window { offset, limit }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    /// Size of the whole collection
    pub count: i64,
    pub offset: i64,
    pub limit: i64,
    /// Relative URL of the following page
    pub next: Option<String>,
    /// Relative URL of the preceding page
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(path: &str, window: Window, count: i64, results: Vec<T>) -> Self {
        let Window { offset, limit } = window;

        // Offsets come straight from the query string and may sit near i64::MAX.
        let end = offset.saturating_add(limit);
        let next = (end < count).then(|| format!("{}?limit={}&offset={}", path, limit, end));
        let previous = (offset > 0).then(|| {
            if offset <= limit {
                format!("{}?limit={}", path, limit)
            } else {
                format!("{}?limit={}&offset={}", path, limit, offset - limit)
            }
        });

        Self {
            count,
            offset,
            limit,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(limit: Option<&str>, offset: Option<&str>) -> PageParams {
        PageParams {
            limit: limit.map(str::to_string),
            offset: offset.map(str::to_string),
        }
    }

    #[test]
    fn test_window_defaults_and_clamps() {
        assert_eq!(
            params(None, None).window(),
            Window {
                offset: 0,
                limit: DEFAULT_LIMIT
            }
        );
        assert_eq!(params(Some("5000"), Some("20")).window().limit, MAX_LIMIT);
        assert_eq!(params(Some("abc"), Some("-3")).window(), params(None, None).window());
        assert_eq!(params(Some("0"), None).window().limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_links_between_pages() {
        let window = Window {
            offset: 10,
            limit: 10,
        };
        let page = Paginated::new("/list-recipes/", window, 25, vec![(); 10]);
        assert_eq!(
            page.next.as_deref(),
            Some("/list-recipes/?limit=10&offset=20")
        );
        assert_eq!(page.previous.as_deref(), Some("/list-recipes/?limit=10"));

        let last = Paginated::new(
            "/list-recipes/",
            Window {
                offset: 20,
                limit: 10,
            },
            25,
            vec![(); 5],
        );
        assert!(last.next.is_none());
        assert_eq!(
            last.previous.as_deref(),
            Some("/list-recipes/?limit=10&offset=10")
        );
    }

    #[test]
    fn test_offset_near_max_has_no_next_link() {
        let window = params(None, Some("9223372036854775800")).window();
        assert_eq!(window.offset, 9_223_372_036_854_775_800);

        let page: Paginated<()> = Paginated::new("/cuisine-stats/", window, 3, vec![]);
        assert!(page.next.is_none());
        assert_eq!(
            page.previous.as_deref(),
            Some("/cuisine-stats/?limit=10&offset=9223372036854775790")
        );
    }

    #[test]
    fn test_single_page_has_no_links() {
        let page: Paginated<()> = Paginated::new(
            "/cuisine-stats/",
            Window {
                offset: 0,
                limit: 10,
            },
            3,
            vec![],
        );
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }
}
