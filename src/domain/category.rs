use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORIES: [&str; 11] = [
    "Food",
    "Groceries",
    "Bills",
    "Transport",
    "Load/Data",
    "School",
    "Health",
    "Shopping",
    "Savings",
    "Emergency",
    "Others",
];

/// Ordered, user-extensible set of category names.
///
/// Records keep their category as plain text, so removing a name here
/// leaves existing records untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryList(Vec<String>);

impl CategoryList {
    pub fn new(names: Vec<String>) -> Self {
        let mut list = Self(Vec::with_capacity(names.len()));
        for name in names {
            list.add(&name);
        }
        list
    }

    /// Add a category at the end. Returns false for blank or duplicate names.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    /// Remove a category. Returns false if it was not in the list.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c != name.trim());
        self.0.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    /// First category, used to preselect the form field.
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CategoryList {
    fn default() -> Self {
        Self(DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let list = CategoryList::default();
        assert_eq!(list.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(list.first(), Some("Food"));
        assert!(list.contains("Load/Data"));
    }

    #[test]
    fn test_add_rejects_blank_and_duplicates() {
        let mut list = CategoryList::default();
        assert!(list.add("Pets"));
        assert!(!list.add("Pets"));
        assert!(!list.add(" Food "));
        assert!(!list.add("   "));
        assert_eq!(list.iter().last(), Some("Pets"));
    }

    #[test]
    fn test_remove() {
        let mut list = CategoryList::default();
        assert!(list.remove("Bills"));
        assert!(!list.remove("Bills"));
        assert!(!list.contains("Bills"));
    }

    #[test]
    fn test_new_dedupes() {
        let list = CategoryList::new(vec!["A".into(), "B".into(), "A".into(), "".into()]);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let list = CategoryList::new(vec!["Food".into(), "Rent".into()]);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["Food","Rent"]"#);
    }
}
