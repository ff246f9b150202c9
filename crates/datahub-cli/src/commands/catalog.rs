use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use datahub_application::{CatalogStore, SearchDebouncer};
use datahub_core::catalog::{Dataset, Filters};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use super::AppContext;

pub fn filters(organization: Option<String>, license: Option<String>, tags: Vec<String>) -> Filters {
    Filters {
        organization: organization.unwrap_or_default(),
        license: license.unwrap_or_default(),
        tags: tags.into_iter().collect(),
        ..Filters::default()
    }
}

fn print_datasets(catalog: &CatalogStore) {
    let datasets = catalog.snapshot().datasets;
    for dataset in &datasets.list {
        println!(
            "{}  {}  [{}]",
            dataset.id,
            dataset.title,
            dataset.organization_title.as_deref().unwrap_or("-")
        );
    }
    let pagination = datasets.pagination;
    println!(
        "page {}/{} ({} datasets)",
        pagination.current_page, pagination.total_pages, pagination.total_items
    );
}

fn print_dataset(dataset: &Dataset) {
    println!("{}", dataset.title);
    println!("  id:           {}", dataset.id);
    if let Some(organization) = &dataset.organization_title {
        println!("  organization: {}", organization);
    }
    if let Some(license) = &dataset.license_title {
        println!("  license:      {}", license);
    }
    if let Some(modified) = &dataset.modified_at {
        println!("  modified:     {}", modified);
    }
    if !dataset.tags.is_empty() {
        let tags: Vec<&str> = dataset.tags.iter().map(String::as_str).collect();
        println!("  tags:         {}", tags.join(", "));
    }
    if let Some(notes) = &dataset.notes {
        println!();
        println!("{}", notes);
    }
    for resource in &dataset.resources {
        println!(
            "  - {} ({}) {}",
            resource.name.as_deref().unwrap_or("sans nom"),
            resource.format.as_deref().unwrap_or("?"),
            resource.url.as_deref().unwrap_or("")
        );
    }
}

pub async fn datasets(
    ctx: &AppContext,
    page: u32,
    search: Option<&str>,
    filters: &Filters,
) -> Result<()> {
    if let Err(e) = ctx.catalog.fetch_datasets(page, search, Some(filters)).await {
        let message = ctx.catalog.snapshot().datasets.error;
        return Err(anyhow!(message.unwrap_or_else(|| e.to_string())));
    }
    print_datasets(&ctx.catalog);
    Ok(())
}

pub async fn dataset(ctx: &AppContext, id: &str) -> Result<()> {
    match ctx.catalog.fetch_dataset_detail(id).await {
        Ok(dataset) => {
            print_dataset(&dataset);
            Ok(())
        }
        Err(e) => {
            let message = ctx.catalog.snapshot().datasets.error;
            Err(anyhow!(message.unwrap_or_else(|| e.to_string())))
        }
    }
}

pub async fn resources(ctx: &AppContext, page: u32) -> Result<()> {
    if let Err(e) = ctx.catalog.fetch_resources(page).await {
        let message = ctx.catalog.snapshot().resources.error;
        return Err(anyhow!(message.unwrap_or_else(|| e.to_string())));
    }

    let resources = ctx.catalog.snapshot().resources;
    for resource in &resources.list {
        println!(
            "{:>6}  {:<8} {}",
            resource.id,
            resource.format.as_deref().unwrap_or("?"),
            resource.name.as_deref().unwrap_or("")
        );
    }
    println!(
        "page {}/{} ({} resources)",
        resources.pagination.current_page,
        resources.pagination.total_pages,
        resources.pagination.total_items
    );
    Ok(())
}

pub async fn stats(ctx: &AppContext, page: u32) -> Result<()> {
    datasets(ctx, page, None, &Filters::default()).await?;
    let statistics = ctx.catalog.calculate_statistics();
    println!();
    println!("datasets:      {}", statistics.total_datasets);
    println!("organizations: {}", statistics.organizations_count);
    println!("resources:     {}", statistics.total_resources);
    Ok(())
}

/// Reads queries from stdin; a fetch is issued once typing pauses.
pub async fn search(ctx: &AppContext) -> Result<()> {
    let delay = Duration::from_millis(ctx.config.search_debounce_ms);
    search_lines(Arc::clone(&ctx.catalog), delay, BufReader::new(tokio::io::stdin())).await
}

/// Debounces one search per input line and waits for every fetch that
/// started, so a slow earlier query still prints before exit.
async fn search_lines<R>(catalog: Arc<CatalogStore>, delay: Duration, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let debouncer = SearchDebouncer::new();
    let mut lines = input.lines();
    let mut handles: Vec<JoinHandle<()>> = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let query = line.trim().to_string();
        let catalog = Arc::clone(&catalog);
        handles.push(debouncer.schedule(delay, move || async move {
            match catalog.fetch_datasets(1, Some(query.as_str()), None).await {
                Ok(()) => print_datasets(&catalog),
                Err(e) => tracing::warn!("Search for {:?} failed: {}", query, e),
            }
        }));
    }

    for handle in handles {
        handle.await?;
    }
    Ok(())
}

pub async fn graphql(ctx: &AppContext, query: &str) -> Result<()> {
    let body = ctx.catalog.query_graphql(query).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use datahub_core::config::Endpoints;
    use datahub_core::http::{ApiRequest, HttpTransport};
    use serde_json::{Value, json};
    use tokio::io::AsyncWriteExt;

    /// Answers with one dataset named after the query; `slow` takes 5s.
    #[derive(Default)]
    struct EchoTransport {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl HttpTransport for EchoTransport {
        async fn send(&self, request: ApiRequest) -> datahub_core::error::Result<Value> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            let query = request
                .query_values("search")
                .first()
                .map(|q| q.to_string())
                .unwrap_or_default();
            if query == "slow" {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(json!([{"ckan_id": query, "title": query}]))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_waits_for_every_started_fetch() {
        let transport = Arc::new(EchoTransport::default());
        let catalog = Arc::new(CatalogStore::new(transport.clone(), Endpoints::default()));
        let (mut writer, reader) = tokio::io::duplex(64);

        tokio::spawn(async move {
            writer.write_all(b"slow\n").await.unwrap();
            // Long enough for the first timer to fire.
            tokio::time::sleep(Duration::from_millis(600)).await;
            writer.write_all(b"fast\n").await.unwrap();
        });

        search_lines(catalog.clone(), Duration::from_millis(500), BufReader::new(reader))
            .await
            .unwrap();

        assert_eq!(transport.sent.load(Ordering::SeqCst), 2);
        let datasets = catalog.snapshot().datasets;
        assert_eq!(datasets.list.len(), 1);
        assert_eq!(datasets.list[0].id, "slow");
        assert!(!datasets.loading);
    }
}
