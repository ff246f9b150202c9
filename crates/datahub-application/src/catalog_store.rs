//! CatalogStore - paginated dataset/resource cache.
//!
//! Requests are never cancelled or de-duplicated: overlapping fetches each
//! reduce into the state when they resolve, so the last resolution wins.
//! Each reduction runs under a single write lock and never spans an await.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use datahub_core::catalog::pagination::{self, RESOURCE_PAGE_SIZE};
use datahub_core::catalog::{
    Dataset, FilterPatch, Filters, ListResponse, Pagination, Resource, Statistics,
    compute_statistics,
};
use datahub_core::config::Endpoints;
use datahub_core::error::{DatahubError, Result};
use datahub_core::http::{ApiRequest, HttpTransport};
use datahub_core::messages::{self, server_error_text, server_message};
use serde_json::{Value, json};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetsState {
    pub list: Vec<Dataset>,
    pub current_dataset: Option<Dataset>,
    pub pagination: Pagination,
    pub filters: Filters,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcesState {
    pub list: Vec<Resource>,
    pub pagination: Pagination,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsState {
    /// `None` until statistics are first computed.
    pub data: Option<Statistics>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Read model of the catalog store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub datasets: DatasetsState,
    pub resources: ResourcesState,
    pub statistics: StatisticsState,
}

pub struct CatalogStore {
    state: RwLock<CatalogState>,
    transport: Arc<dyn HttpTransport>,
    endpoints: Endpoints,
}

impl CatalogStore {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: Endpoints) -> Self {
        Self {
            state: RwLock::new(CatalogState::default()),
            transport,
            endpoints,
        }
    }

    pub fn snapshot(&self) -> CatalogState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================================================
    // Datasets
    // ============================================================================

    /// Fetches one page of datasets.
    ///
    /// `filters` is sent as given; the store's own `filters` are UI state and
    /// are not applied implicitly. Empty strings are omitted and each tag is
    /// sent as its own `tags` parameter.
    pub async fn fetch_datasets(
        &self,
        page: u32,
        search: Option<&str>,
        filters: Option<&Filters>,
    ) -> Result<()> {
        {
            let mut state = self.write();
            state.datasets.loading = true;
            state.datasets.error = None;
        }

        let request = datasets_request(&self.endpoints.datasets, page, search, filters);
        tracing::debug!("Fetching datasets page {}", page);

        let decoded = self
            .transport
            .send(request)
            .await
            .and_then(ListResponse::<Dataset>::from_value);

        let mut state = self.write();
        state.datasets.loading = false;
        match decoded {
            Ok(ListResponse::Paged(envelope)) => {
                if let Some(pagination) = pagination::dataset_pagination(&envelope) {
                    state.datasets.pagination = pagination;
                }
                state.datasets.list = envelope.results.unwrap_or_default();
                Ok(())
            }
            Ok(ListResponse::Plain(items)) => {
                state.datasets.pagination = pagination::single_page(items.len());
                state.datasets.list = items;
                Ok(())
            }
            Ok(ListResponse::Unrecognized) => {
                tracing::warn!("Unrecognized datasets response shape, treating as empty");
                state.datasets.list = Vec::new();
                Ok(())
            }
            Err(err) => {
                let message = server_error_text(&err);
                tracing::warn!("Failed to fetch datasets: {}", message);
                state.datasets.error = Some(message);
                Err(err)
            }
        }
    }

    /// Loads one dataset into `current_dataset`. On failure the previous
    /// dataset stays in place.
    pub async fn fetch_dataset_detail(&self, id: &str) -> Result<Dataset> {
        {
            let mut state = self.write();
            state.datasets.loading = true;
            state.datasets.error = None;
        }

        let request = ApiRequest::get(self.endpoints.dataset_detail(id));
        let decoded = self
            .transport
            .send(request)
            .await
            .and_then(|body| serde_json::from_value::<Dataset>(body).map_err(DatahubError::from));

        let mut state = self.write();
        state.datasets.loading = false;
        match decoded {
            Ok(dataset) => {
                state.datasets.current_dataset = Some(dataset.clone());
                Ok(dataset)
            }
            Err(err) => {
                let message = server_message(&err)
                    .unwrap_or_else(|| messages::DATASET_DETAIL_FAILED.to_string());
                tracing::warn!("Failed to fetch dataset {}: {}", id, err);
                state.datasets.error = Some(message);
                Err(err)
            }
        }
    }

    // ============================================================================
    // Resources
    // ============================================================================

    /// Fetches one page of resources (fixed page size of 10).
    pub async fn fetch_resources(&self, page: u32) -> Result<()> {
        {
            let mut state = self.write();
            state.resources.loading = true;
            state.resources.error = None;
        }

        let request =
            ApiRequest::get(&self.endpoints.resources).with_query("page", page.to_string());
        let decoded = self
            .transport
            .send(request)
            .await
            .and_then(ListResponse::<Resource>::from_value);

        let mut state = self.write();
        state.resources.loading = false;
        match decoded {
            Ok(ListResponse::Paged(envelope)) => {
                state.resources.pagination = pagination::resource_pagination(&envelope, page);
                state.resources.list = envelope.results.unwrap_or_default();
                Ok(())
            }
            Ok(ListResponse::Plain(items)) => {
                let count = items.len() as u64;
                state.resources.pagination = Pagination {
                    current_page: page,
                    total_pages: pagination::total_pages(count, RESOURCE_PAGE_SIZE),
                    total_items: count,
                    page_size: RESOURCE_PAGE_SIZE,
                };
                state.resources.list = items;
                Ok(())
            }
            Ok(ListResponse::Unrecognized) => {
                tracing::warn!("Unrecognized resources response shape, treating as empty");
                state.resources.pagination = Pagination {
                    current_page: page,
                    total_pages: 0,
                    total_items: 0,
                    page_size: RESOURCE_PAGE_SIZE,
                };
                state.resources.list = Vec::new();
                Ok(())
            }
            Err(err) => {
                let message = server_message(&err)
                    .unwrap_or_else(|| messages::RESOURCES_FAILED.to_string());
                tracing::warn!("Failed to fetch resources: {}", err);
                state.resources.error = Some(message);
                Err(err)
            }
        }
    }

    // ============================================================================
    // Statistics
    // ============================================================================

    /// Recomputes statistics from the datasets currently loaded.
    pub fn calculate_statistics(&self) -> Statistics {
        let mut state = self.write();
        let statistics = compute_statistics(&state.datasets.list);
        state.statistics = StatisticsState {
            data: Some(statistics),
            loading: false,
            error: None,
        };
        statistics
    }

    pub fn calculate_stats_from_loaded_data(&self) -> Statistics {
        self.calculate_statistics()
    }

    // ============================================================================
    // GraphQL
    // ============================================================================

    /// Posts a GraphQL query and returns the raw response body.
    pub async fn query_graphql(&self, query: &str) -> Result<Value> {
        let request = ApiRequest::post(&self.endpoints.graphql).with_body(json!({ "query": query }));
        self.transport.send(request).await
    }

    // ============================================================================
    // Synchronous setters (never fetch)
    // ============================================================================

    pub fn set_search(&self, search: impl Into<String>) {
        self.write().datasets.filters.search = search.into();
    }

    pub fn set_organization(&self, organization: impl Into<String>) {
        self.write().datasets.filters.organization = organization.into();
    }

    pub fn set_license(&self, license: impl Into<String>) {
        self.write().datasets.filters.license = license.into();
    }

    pub fn set_tags<I, S>(&self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.write().datasets.filters.tags = tags.into_iter().map(Into::into).collect();
    }

    pub fn merge_filters(&self, patch: FilterPatch) {
        self.write().datasets.filters.merge(patch);
    }

    pub fn clear_filters(&self) {
        self.write().datasets.filters = Filters::default();
    }

    pub fn clear_current_dataset(&self) {
        self.write().datasets.current_dataset = None;
    }

    /// Sets only `pagination.current_page` on the dataset list.
    pub fn set_page(&self, page: u32) {
        self.write().datasets.pagination.current_page = page;
    }
}

fn datasets_request(
    path: &str,
    page: u32,
    search: Option<&str>,
    filters: Option<&Filters>,
) -> ApiRequest {
    let mut request = ApiRequest::get(path).with_query("page", page.to_string());

    if let Some(search) = search.filter(|s| !s.is_empty()) {
        request = request.with_query("search", search);
    }
    if let Some(filters) = filters {
        if !filters.organization.is_empty() {
            request = request.with_query("organization", filters.organization.as_str());
        }
        if !filters.license.is_empty() {
            request = request.with_query("license", filters.license.as_str());
        }
        for tag in &filters.tags {
            request = request.with_query("tags", tag.as_str());
        }
    }

    request
}
