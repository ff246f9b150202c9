//! Application layer for DataHub.
//!
//! The two stateful stores that sit between the REST API and a UI: the
//! session (credentials and profile) and the catalog (datasets, resources,
//! statistics, filters). Both expose a synchronous read model and async
//! operations that reduce responses into it.

pub mod catalog_store;
pub mod debounce;
pub mod session_store;

pub use catalog_store::{
    CatalogState, CatalogStore, DatasetsState, ResourcesState, StatisticsState,
};
pub use debounce::SearchDebouncer;
pub use session_store::SessionStore;
