// src/common/pagination.rs

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// Query string `?page=&limit=`. Valores ausentes ou fora da faixa são normalizados.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * self.limit() as i64
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, params: PageParams, total: i64) -> Self {
        let limit = params.limit() as i64;
        Self {
            items,
            pagination: PageInfo {
                page: params.page(),
                limit: params.limit(),
                total,
                total_pages: (total + limit - 1) / limit,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_missing() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn limit_is_clamped_and_zero_is_ignored() {
        let params = PageParams { page: Some(0), limit: Some(500) };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 100);

        let params = PageParams { page: Some(3), limit: Some(0) };
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let params = PageParams { page: Some(2), limit: Some(10) };
        let page = Paginated::new(vec![1, 2, 3], params, 21);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.page, 2);

        let empty: Paginated<i32> = Paginated::new(vec![], params, 0);
        assert_eq!(empty.pagination.total_pages, 0);
    }
}
