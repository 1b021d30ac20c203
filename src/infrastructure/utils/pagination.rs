use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Normalized pagination parameters taken from a query string.
///
/// Invalid or missing values fall back to defaults instead of erroring:
/// `page` is clamped to >= 1 and `limit` to `[1, max_limit]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    pub fn from_query(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: i64,
        max_limit: i64,
    ) -> Self {
        let mut page = page
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(1);
        let mut limit = limit
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(default_limit);

        if page < 1 {
            page = 1;
        }
        if limit < 1 {
            limit = default_limit;
        }
        if limit > max_limit {
            limit = max_limit;
        }

        PageParams { page, limit }
    }

    /// Offset handed to the storage query.
    pub fn skip(&self) -> i64 {
        compute_skip(self.page, self.limit)
    }
}

pub fn compute_skip(page: i64, limit: i64) -> i64 {
    (page - 1) * limit
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_page: Option<i64>,
    pub prev_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PaginationLinks {
    #[serde(rename = "self")]
    pub self_link: Option<String>,
    pub first: Option<String>,
    pub last: Option<String>,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// Standard wrapper for paginated list responses.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
    pub links: PaginationLinks,
}

pub fn paginate<T: Serialize>(
    params: PageParams,
    total_items: i64,
    data: Vec<T>,
    base_url: &str,
) -> Paginated<T> {
    let PageParams { page, limit } = params;

    // ceil(total_items / limit); total_items = 0 gives zero pages and
    // neither navigation flag set, regardless of the requested page.
    let total_pages = (total_items + limit - 1) / limit;
    let has_next_page = page < total_pages;
    let has_prev_page = page > 1 && total_pages > 0;

    let link = |p: i64| {
        if base_url.is_empty() {
            None
        } else {
            Some(format!("{}?page={}&limit={}", base_url, p, limit))
        }
    };

    Paginated {
        success: true,
        data,
        pagination: PaginationMeta {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: limit,
            has_next_page,
            has_prev_page,
            next_page: has_next_page.then(|| page + 1),
            prev_page: has_prev_page.then(|| page - 1),
        },
        links: PaginationLinks {
            self_link: link(page),
            first: link(1),
            last: link(total_pages),
            next: has_next_page.then(|| link(page + 1)).flatten(),
            prev: has_prev_page.then(|| link(page - 1)).flatten(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_params_missing_or_invalid() {
        let p = PageParams::from_query(None, None, 10, 100);
        assert_eq!(p, PageParams { page: 1, limit: 10 });

        let p = PageParams::from_query(Some("abc"), Some("-3"), 10, 100);
        assert_eq!(p, PageParams { page: 1, limit: 10 });

        let p = PageParams::from_query(Some("0"), Some("0"), 10, 100);
        assert_eq!(p, PageParams { page: 1, limit: 10 });
    }

    #[test]
    fn limit_clamps_to_max() {
        let p = PageParams::from_query(Some("2"), Some("500"), 10, 50);
        assert_eq!(p, PageParams { page: 2, limit: 50 });
    }

    #[test]
    fn skip_math() {
        assert_eq!(compute_skip(1, 10), 0);
        assert_eq!(compute_skip(3, 10), 20);
        assert_eq!(PageParams { page: 4, limit: 25 }.skip(), 75);
    }

    #[test]
    fn envelope_flags_and_links() {
        let params = PageParams { page: 2, limit: 10 };
        let out = paginate::<i32>(params, 35, vec![], "http://x/projects");

        assert_eq!(out.pagination.total_pages, 4);
        assert!(out.pagination.has_next_page);
        assert!(out.pagination.has_prev_page);
        assert_eq!(out.pagination.next_page, Some(3));
        assert_eq!(out.pagination.prev_page, Some(1));
        assert_eq!(
            out.links.next.as_deref(),
            Some("http://x/projects?page=3&limit=10")
        );
        assert_eq!(
            out.links.last.as_deref(),
            Some("http://x/projects?page=4&limit=10")
        );
    }

    #[test]
    fn envelope_flags_match_page_position() {
        for (page, total, expect_next, expect_prev) in
            [(1, 30, true, false), (3, 30, false, true), (2, 30, true, true)]
        {
            let out = paginate::<i32>(
                PageParams { page, limit: 10 },
                total,
                vec![],
                "",
            );
            assert_eq!(out.pagination.has_next_page, expect_next);
            assert_eq!(out.pagination.has_prev_page, expect_prev);
        }
    }

    #[test]
    fn empty_result_set_has_zero_pages() {
        let out = paginate::<i32>(
            PageParams { page: 5, limit: 10 },
            0,
            vec![],
            "http://x/certifications",
        );
        assert_eq!(out.pagination.total_pages, 0);
        assert!(!out.pagination.has_next_page);
        assert!(!out.pagination.has_prev_page);
        assert_eq!(out.pagination.next_page, None);
        assert_eq!(out.pagination.prev_page, None);
        assert_eq!(out.links.next, None);
        assert_eq!(out.links.prev, None);
    }
}
