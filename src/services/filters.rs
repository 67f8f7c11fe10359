//! View filter policies
//!
//! The public listing, the featured carousel and the owner overview all
//! consume the same derived `CauseView` sequence; the only thing that differs
//! is the policy applied here.

use rust_decimal::Decimal;

use crate::models::cause::CauseView;

/// Category value that matches every category
pub const ALL_CATEGORIES: &str = "All";

/// Filter policy applied to a derived view set
#[derive(Debug, Clone)]
pub enum ViewFilter {
    /// Active causes matching a free-text query and category, featured first
    PublicListing { query: String, category: String },
    /// Active causes with the featured flag, in discovery order
    FeaturedOnly,
    /// Everything, regardless of flags
    OwnerOverview,
}

impl ViewFilter {
    /// Apply the policy. Order within equal keys always follows the input
    /// (discovery) order.
    pub fn apply(&self, causes: &[CauseView]) -> Vec<CauseView> {
        match self {
            ViewFilter::PublicListing { query, category } => {
                let query = query.to_lowercase();
                let mut out: Vec<CauseView> = causes
                    .iter()
                    .filter(|c| {
                        let matches_search = c.name.to_lowercase().contains(&query)
                            || c.description.to_lowercase().contains(&query);
                        let matches_category =
                            category == ALL_CATEGORIES || &c.category == category;
                        c.is_active && matches_search && matches_category
                    })
                    .cloned()
                    .collect();
                // Featured causes first; std sort is stable so ties keep
                // their relative order.
                out.sort_by_key(|c| !c.featured);
                out
            }
            ViewFilter::FeaturedOnly => causes
                .iter()
                .filter(|c| c.is_active && c.featured)
                .cloned()
                .collect(),
            ViewFilter::OwnerOverview => causes.to_vec(),
        }
    }
}

/// Dashboard aggregates over the full cause set
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewStats {
    pub total_raised_eth: Decimal,
    pub total_donors: u64,
    pub total_causes: usize,
}

/// Simple reductions for the owner overview
pub fn overview_stats(causes: &[CauseView]) -> OverviewStats {
    OverviewStats {
        total_raised_eth: causes.iter().map(|c| c.raised_eth).sum::<Decimal>().normalize(),
        total_donors: causes.iter().map(|c| c.donors_count).sum(),
        total_causes: causes.len(),
    }
}

/// Distinct categories in discovery order, preceded by the "All" sentinel.
/// Feeds the category dropdown on the public listing.
pub fn categories(causes: &[CauseView]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for cause in causes {
        if !out.contains(&cause.category) {
            out.push(cause.category.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn view(id: u64, name: &str, category: &str, active: bool, featured: bool) -> CauseView {
        CauseView {
            id,
            name: name.to_string(),
            description: format!("{} description", name),
            long_description: String::new(),
            image_src: String::new(),
            category: category.to_string(),
            website: String::new(),
            goal_eth: dec!(10),
            raised_eth: dec!(1),
            donors_count: 1,
            wallet_address: String::new(),
            is_active: active,
            featured,
            funded_percentage: 10,
        }
    }

    #[test]
    fn test_public_listing_excludes_inactive() {
        let causes = vec![
            view(1, "Alpha", "Health", true, false),
            view(2, "Beta", "Health", false, true),
        ];
        let filter = ViewFilter::PublicListing {
            query: String::new(),
            category: ALL_CATEGORIES.to_string(),
        };
        let out = filter.apply(&causes);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 1);
    }

    #[test]
    fn test_public_listing_featured_first_is_stable() {
        // [A(featured), B(not), C(featured), D(not)] -> [A, C, B, D]
        let causes = vec![
            view(1, "A", "Other", true, true),
            view(2, "B", "Other", true, false),
            view(3, "C", "Other", true, true),
            view(4, "D", "Other", true, false),
        ];
        let filter = ViewFilter::PublicListing {
            query: String::new(),
            category: ALL_CATEGORIES.to_string(),
        };
        let order: Vec<u64> = filter.apply(&causes).iter().map(|c| c.id).collect();
        assert_eq!(order, vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_description() {
        let mut a = view(1, "Clean Rivers", "Water", true, false);
        a.description = "Bringing Water wells to remote areas".to_string();
        let b = view(2, "Forest Fund", "Environment", true, false);
        let filter = ViewFilter::PublicListing {
            query: "water".to_string(),
            category: ALL_CATEGORIES.to_string(),
        };
        let out = filter.apply(&[a, b]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 1);
    }

    #[test]
    fn test_category_filter_with_all_sentinel() {
        let causes = vec![
            view(1, "Alpha", "Health", true, false),
            view(2, "Beta", "Water", true, false),
        ];
        let all = ViewFilter::PublicListing {
            query: String::new(),
            category: ALL_CATEGORIES.to_string(),
        };
        assert_eq!(all.apply(&causes).len(), 2);

        let water = ViewFilter::PublicListing {
            query: String::new(),
            category: "Water".to_string(),
        };
        let out = water.apply(&causes);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 2);
    }

    #[test]
    fn test_featured_only_requires_both_flags() {
        let causes = vec![
            view(1, "A", "Other", true, true),
            view(2, "B", "Other", true, false),
            view(3, "C", "Other", false, true),
        ];
        let out = ViewFilter::FeaturedOnly.apply(&causes);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 1);
    }

    #[test]
    fn test_owner_overview_keeps_everything() {
        let causes = vec![
            view(1, "A", "Other", false, false),
            view(2, "B", "Other", true, true),
        ];
        assert_eq!(ViewFilter::OwnerOverview.apply(&causes).len(), 2);
    }

    #[test]
    fn test_overview_stats_sums() {
        let mut a = view(1, "A", "Other", true, false);
        a.raised_eth = dec!(1.5);
        a.donors_count = 3;
        let mut b = view(2, "B", "Other", true, false);
        b.raised_eth = dec!(2.0);
        b.donors_count = 2;
        let mut c = view(3, "C", "Other", false, false);
        c.raised_eth = dec!(0);
        c.donors_count = 0;

        let stats = overview_stats(&[a, b, c]);
        assert_eq!(stats.total_raised_eth, dec!(3.5));
        assert_eq!(stats.total_donors, 5);
        assert_eq!(stats.total_causes, 3);
    }

    #[test]
    fn test_categories_deduplicated_with_sentinel_first() {
        let causes = vec![
            view(1, "A", "Health", true, false),
            view(2, "B", "Water", true, false),
            view(3, "C", "Health", true, false),
        ];
        assert_eq!(categories(&causes), vec!["All", "Health", "Water"]);
    }
}
