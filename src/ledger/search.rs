use crate::storage::models::Sweet;

/// Optional, conjunctive search filters.
///
/// Absent criteria impose no constraint; with no criteria every sweet
/// matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    /// Exact, case-sensitive match
    pub category: Option<String>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
}

impl SearchCriteria {
    /// Treat empty text filters as absent
    pub fn normalized(self) -> Self {
        Self {
            category: self.category.filter(|c| !c.is_empty()),
            max_price: self.max_price,
            min_price: self.min_price,
            name: self.name.filter(|n| !n.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    pub fn matches(&self, sweet: &Sweet) -> bool {
        if let Some(ref name) = self.name {
            if !sweet.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if &sweet.category != category {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if sweet.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if sweet.price > max {
                return false;
            }
        }
        true
    }

    /// Keep matching sweets, preserving their order
    pub fn apply(&self, sweets: Vec<Sweet>) -> Vec<Sweet> {
        if self.is_empty() {
            return sweets;
        }
        sweets.into_iter().filter(|s| self.matches(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweet(id: u64, name: &str, category: &str, price: f64) -> Sweet {
        Sweet {
            category: category.to_string(),
            id,
            name: name.to_string(),
            price,
            quantity: 1,
        }
    }

    fn catalog() -> Vec<Sweet> {
        vec![
            sweet(1, "Rasgulla", "Bengali", 1.5),
            sweet(2, "Jalebi", "North Indian", 4.0),
            sweet(3, "Sandesh", "Bengali", 3.0),
            sweet(4, "Kaju Katli", "North Indian", 6.0),
        ]
    }

    fn ids(sweets: &[Sweet]) -> Vec<u64> {
        sweets.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_no_criteria_returns_everything() {
        let criteria = SearchCriteria::default();
        assert!(criteria.is_empty());
        assert_eq!(criteria.apply(catalog()), catalog());
    }

    #[test]
    fn test_name_is_case_insensitive_substring() {
        let criteria = SearchCriteria {
            name: Some("KAT".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&criteria.apply(catalog())), vec![4]);
    }

    #[test]
    fn test_category_is_exact() {
        let criteria = SearchCriteria {
            category: Some("Bengali".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&criteria.apply(catalog())), vec![1, 3]);

        let lower = SearchCriteria {
            category: Some("bengali".to_string()),
            ..Default::default()
        };
        assert!(lower.apply(catalog()).is_empty());
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let criteria = SearchCriteria {
            max_price: Some(4.0),
            min_price: Some(3.0),
            ..Default::default()
        };
        assert_eq!(ids(&criteria.apply(catalog())), vec![2, 3]);
    }

    #[test]
    fn test_criteria_are_conjunctive() {
        let criteria = SearchCriteria {
            category: Some("North Indian".to_string()),
            max_price: Some(5.0),
            ..Default::default()
        };
        assert_eq!(ids(&criteria.apply(catalog())), vec![2]);

        let none = SearchCriteria {
            category: Some("Bengali".to_string()),
            name: Some("jalebi".to_string()),
            ..Default::default()
        };
        assert!(none.apply(catalog()).is_empty());
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let criteria = SearchCriteria {
            category: Some(String::new()),
            name: Some(String::new()),
            ..Default::default()
        }
        .normalized();
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let criteria = SearchCriteria {
            max_price: Some(1.0),
            min_price: Some(5.0),
            ..Default::default()
        };
        assert!(criteria.apply(catalog()).is_empty());
    }
}
