pub mod auth;
pub mod categories;
pub mod tickets;

use serde::Deserialize;

/// Offset/limit pagination for listing endpoints.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(page.skip, 0);
        assert_eq!(page.limit, 100);

        let page: Pagination = serde_json::from_str("{\"skip\": 20, \"limit\": 5}").unwrap();
        assert_eq!(page.skip, 20);
        assert_eq!(page.limit, 5);
    }
}
