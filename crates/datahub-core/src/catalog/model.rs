use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Page size assumed when a list response gives no better hint.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A harvested open-data dataset.
///
/// Always replaced wholesale from server responses, never patched locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(rename = "ckan_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub organization_title: Option<String>,
    #[serde(default)]
    pub license_title: Option<String>,
    #[serde(rename = "metadata_created", default)]
    pub created_at: Option<String>,
    #[serde(rename = "metadata_modified", default)]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(rename = "private", default)]
    pub is_private: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
}

/// The server stores tags/groups as nullable JSON.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Active dataset filters. An empty string means "not filtered".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub search: String,
    pub organization: String,
    pub license: String,
    pub tags: BTreeSet<String>,
}

impl Filters {
    /// Shallow merge: every field present in `patch` replaces the current one.
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(search) = patch.search {
            self.search = search;
        }
        if let Some(organization) = patch.organization {
            self.organization = organization;
        }
        if let Some(license) = patch.license {
            self.license = license;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
    }
}

/// Partial filter record for [`Filters::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub organization: Option<String>,
    pub license: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}

/// Derived view over the currently loaded dataset list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_datasets: u64,
    pub organizations_count: u64,
    pub total_resources: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_from_server_shape() {
        let dataset: Dataset = serde_json::from_value(json!({
            "ckan_id": "7f1c",
            "name": "qualite-eau",
            "title": "Qualité de l'eau",
            "notes": null,
            "organization_title": "Ville de Québec",
            "metadata_created": "2023-04-01T12:00:00Z",
            "private": false,
            "tags": ["eau", "environnement", "eau"],
            "groups": null,
            "resources": [{"id": 1, "name": "CSV", "format": "CSV", "url": "https://x/y.csv"}]
        }))
        .unwrap();

        assert_eq!(dataset.id, "7f1c");
        assert_eq!(dataset.created_at.as_deref(), Some("2023-04-01T12:00:00Z"));
        assert_eq!(dataset.tags.len(), 2);
        assert!(dataset.groups.is_empty());
        assert_eq!(dataset.resources[0].format.as_deref(), Some("CSV"));
    }

    #[test]
    fn test_merge_only_touches_present_fields() {
        let mut filters = Filters {
            search: "eau".to_string(),
            organization: "MELCC".to_string(),
            ..Filters::default()
        };

        filters.merge(FilterPatch {
            organization: Some("Ville de Laval".to_string()),
            tags: Some(BTreeSet::from(["climat".to_string()])),
            ..FilterPatch::default()
        });

        assert_eq!(filters.search, "eau");
        assert_eq!(filters.organization, "Ville de Laval");
        assert!(filters.tags.contains("climat"));
    }
}
