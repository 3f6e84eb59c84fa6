use crate::domain::model::{Listing, ListingKind};

/// Narrows the collection before ranking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub kind: Option<ListingKind>,
    pub category: Option<String>,
}

impl ListingFilter {
    pub fn new(kind: Option<ListingKind>, category: Option<&str>) -> Self {
        Self {
            kind,
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.kind.is_none() && self.category.is_none()
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(kind) = self.kind {
            if listing.kind != kind {
                return false;
            }
        }

        match (&self.category, &listing.category) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => actual.trim().eq_ignore_ascii_case(wanted),
            (Some(_), None) => false,
        }
    }

    pub fn apply(&self, listings: Vec<Listing>) -> Vec<Listing> {
        if self.is_noop() {
            return listings;
        }

        let before = listings.len();
        let kept: Vec<Listing> = listings.into_iter().filter(|l| self.matches(l)).collect();
        tracing::debug!("Filter kept {} of {} listings", kept.len(), before);
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, kind: ListingKind, category: Option<&str>) -> Listing {
        let mut listing = Listing::new(id, kind);
        listing.category = category.map(str::to_string);
        listing
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = ListingFilter::new(None, Some("   "));
        assert!(filter.is_noop());

        let input = vec![listing("1", ListingKind::Product, None)];
        assert_eq!(filter.apply(input).len(), 1);
    }

    #[test]
    fn test_category_match_is_case_insensitive() {
        let filter = ListingFilter::new(None, Some(" shoes "));
        let input = vec![
            listing("1", ListingKind::Product, Some("Shoes")),
            listing("2", ListingKind::Product, Some("Bags")),
            listing("3", ListingKind::Product, None),
        ];

        let kept = filter.apply(input);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "1");
    }

    #[test]
    fn test_kind_filter() {
        let filter = ListingFilter::new(Some(ListingKind::Event), None);
        let input = vec![
            listing("p", ListingKind::Product, None),
            listing("e", ListingKind::Event, None),
        ];

        let kept = filter.apply(input);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "e");
    }
}
