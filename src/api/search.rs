use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{SearchResult, SearchType};

impl ApiClient {
    /// Search the catalog. Only the collection matching `search_type` is
    /// populated in the result.
    pub async fn search(
        &self,
        query: &str,
        search_type: SearchType,
        limit: u32,
    ) -> Result<SearchResult, ApiError> {
        self.get(
            "/search",
            &[
                ("q", query.to_string()),
                ("type", search_type.as_str().to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}
