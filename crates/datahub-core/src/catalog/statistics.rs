//! Statistics over the loaded dataset list.

use std::collections::HashSet;

use super::model::{Dataset, Statistics};

/// Counts datasets, distinct non-empty organizations and resources.
///
/// Works on whatever page is loaded, not on the server's totals.
pub fn compute_statistics(datasets: &[Dataset]) -> Statistics {
    if datasets.is_empty() {
        return Statistics::default();
    }

    let organizations: HashSet<&str> = datasets
        .iter()
        .filter_map(|dataset| dataset.organization_title.as_deref())
        .filter(|title| !title.is_empty())
        .collect();

    let total_resources: usize = datasets.iter().map(|dataset| dataset.resources.len()).sum();

    Statistics {
        total_datasets: datasets.len() as u64,
        organizations_count: organizations.len() as u64,
        total_resources: total_resources as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Resource;
    use std::collections::BTreeSet;

    fn dataset(id: &str, organization: Option<&str>, resources: usize) -> Dataset {
        Dataset {
            id: id.to_string(),
            name: id.to_string(),
            title: id.to_string(),
            notes: None,
            author: None,
            organization_title: organization.map(str::to_string),
            license_title: None,
            created_at: None,
            modified_at: None,
            state: None,
            is_private: false,
            tags: BTreeSet::new(),
            groups: BTreeSet::new(),
            resources: (0..resources)
                .map(|i| Resource {
                    id: i as i64,
                    name: None,
                    description: None,
                    format: None,
                    url: None,
                    resource_type: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(compute_statistics(&[]), Statistics::default());
    }

    #[test]
    fn test_distinct_organizations_and_resource_sum() {
        let datasets = vec![
            dataset("a", Some("A"), 2),
            dataset("b", Some("A"), 0),
            dataset("c", Some("B"), 3),
        ];

        assert_eq!(
            compute_statistics(&datasets),
            Statistics {
                total_datasets: 3,
                organizations_count: 2,
                total_resources: 5,
            }
        );
    }

    #[test]
    fn test_blank_organizations_are_not_counted() {
        let datasets = vec![dataset("a", Some(""), 1), dataset("b", None, 1)];

        let stats = compute_statistics(&datasets);
        assert_eq!(stats.total_datasets, 2);
        assert_eq!(stats.organizations_count, 0);
        assert_eq!(stats.total_resources, 2);
    }
}
