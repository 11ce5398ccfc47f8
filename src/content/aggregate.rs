use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::content::ContentItem;

/// Newest first by `date` string; undated items after all dated ones.
/// Stable, so ties keep discovery order.
pub fn sort_items(items: &mut [ContentItem]) {
    items.sort_by(|a, b| match (a.date.is_empty(), b.date.is_empty()) {
        (false, false) => b.date.cmp(&a.date),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    });
}

/// Items sharing one category, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<ContentItem>,
}

/// Group by category in first-seen order. Items with an empty category fall
/// under `default_category`.
pub fn group_by_category(items: Vec<ContentItem>, default_category: &str) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = if item.category.is_empty() {
            default_category.to_string()
        } else {
            item.category.clone()
        };
        match index.get(&key) {
            Some(&i) => groups[i].items.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(CategoryGroup {
                    category: key,
                    items: vec![item],
                });
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(path: &str, date: &str, category: &str) -> ContentItem {
        ContentItem {
            path: path.into(),
            title: path.trim_start_matches('/').into(),
            date: date.into(),
            tags: vec![],
            category: category.into(),
        }
    }

    fn paths(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn newest_first_with_undated_last() {
        let mut items = vec![
            item("/undated-1", "", "General"),
            item("/old", "2024-01-01", "General"),
            item("/new", "2025-08-16", "General"),
            item("/undated-2", "", "General"),
        ];
        sort_items(&mut items);
        assert_eq!(paths(&items), vec!["/new", "/old", "/undated-1", "/undated-2"]);
    }

    #[test]
    fn equal_dates_keep_discovery_order() {
        let mut items = vec![
            item("/b", "2025-01-01", "General"),
            item("/a", "2025-01-01", "General"),
            item("/c", "2025-01-01", "General"),
        ];
        sort_items(&mut items);
        assert_eq!(paths(&items), vec!["/b", "/a", "/c"]);
    }

    #[test]
    fn groups_follow_first_seen_category_order() {
        let items = vec![
            item("/s1", "2025-03-01", "Security"),
            item("/s2", "2025-02-01", "Security"),
            item("/g1", "2025-01-01", "General"),
        ];
        let groups = group_by_category(items, "General");
        let order: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(order, vec!["Security", "General"]);
        assert_eq!(paths(&groups[0].items), vec!["/s1", "/s2"]);
    }

    #[test]
    fn interleaved_categories_and_empty_category() {
        let items = vec![
            item("/a", "", "Rust"),
            item("/b", "", ""),
            item("/c", "", "Rust"),
            item("/d", "", "General"),
        ];
        let groups = group_by_category(items, "General");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Rust");
        assert_eq!(paths(&groups[0].items), vec!["/a", "/c"]);
        assert_eq!(paths(&groups[1].items), vec!["/b", "/d"]);
    }
}
