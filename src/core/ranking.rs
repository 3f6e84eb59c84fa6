//! Boosted-first listing ranking.
//!
//! Boosted listings form a deterministic prefix ordered by priority, then
//! recency, then id. Everything else follows in a fresh random order on every
//! call so organic listings rotate instead of always favouring the oldest shops.

use crate::core::shuffle::shuffle;
use crate::domain::model::{Listing, RankedFeed};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;

/// The fields ranking looks at.
pub trait Rankable {
    fn id(&self) -> &str;
    fn is_boosted(&self) -> bool;
    fn boost_priority(&self) -> Option<i64>;
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

impl Rankable for Listing {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_boosted(&self) -> bool {
        self.is_boosted
    }

    fn boost_priority(&self) -> Option<i64> {
        self.boost_priority
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// Comparator for the boosted prefix.
///
/// Higher priority first, then newer first, then ascending id. `None` compares
/// below every `Some`, so a missing priority sorts last and a missing
/// timestamp counts as oldest.
pub fn boosted_order<T: Rankable>(a: &T, b: &T) -> Ordering {
    b.boost_priority()
        .cmp(&a.boost_priority())
        .then_with(|| b.created_at().cmp(&a.created_at()))
        .then_with(|| a.id().cmp(b.id()))
}

/// Boosted items sorted by [`boosted_order`], followed by the rest shuffled.
///
/// Length is preserved and `items` is not modified.
pub fn rank<T, R>(items: &[T], rng: &mut R) -> Vec<T>
where
    T: Rankable + Clone,
    R: Rng + ?Sized,
{
    let (mut boosted, normal): (Vec<T>, Vec<T>) =
        items.iter().cloned().partition(|item| item.is_boosted());

    boosted.sort_by(boosted_order);

    let mut ranked = boosted;
    ranked.extend(shuffle(&normal, rng));
    ranked
}

/// 依 seed 建立亂數來源再排序；沒有 seed 時使用系統熵
pub fn rank_with_seed<T: Rankable + Clone>(items: &[T], seed: Option<u64>) -> Vec<T> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    rank(items, &mut rng)
}

impl RankedFeed {
    pub fn build<R: Rng + ?Sized>(listings: &[Listing], rng: &mut R) -> Self {
        let listings = rank(listings, rng);
        let boosted_count = listings.iter().take_while(|l| l.is_boosted).count();

        tracing::debug!(
            "Ranked {} listings ({} boosted, {} organic)",
            listings.len(),
            boosted_count,
            listings.len() - boosted_count
        );

        Self {
            listings,
            boosted_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ListingKind;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()
    }

    fn organic(id: &str) -> Listing {
        Listing::new(id, ListingKind::Product)
    }

    fn boosted(id: &str, priority: i64, day: u32) -> Listing {
        Listing::new(id, ListingKind::Product)
            .boosted(priority)
            .created(at(day))
    }

    fn ids(listings: &[Listing]) -> Vec<&str> {
        listings.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn test_rank_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let ranked = rank::<Listing, _>(&[], &mut rng);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_concrete_marketplace_scenario() {
        let input = vec![
            organic("1"),
            boosted("2", 5, 1),
            boosted("3", 9, 2),
            organic("4"),
        ];

        let mut seen_tails = HashSet::new();
        for seed in 0..64 {
            let ranked = rank(&input, &mut StdRng::seed_from_u64(seed));
            let ids = ids(&ranked);

            assert_eq!(&ids[..2], &["3", "2"]);
            assert!(ids[2..] == ["1", "4"] || ids[2..] == ["4", "1"]);
            seen_tails.insert(ids[2..].join(","));
        }

        // 兩種排列都應該出現過
        assert_eq!(seen_tails.len(), 2);
    }

    #[test]
    fn test_priority_ties_break_on_recency_then_id() {
        let input = vec![
            boosted("old", 5, 1),
            boosted("new", 5, 20),
            boosted("b-same", 5, 10),
            boosted("a-same", 5, 10),
            boosted("top", 8, 1),
        ];

        let ranked = rank(&input, &mut StdRng::seed_from_u64(3));

        assert_eq!(ids(&ranked), vec!["top", "new", "a-same", "b-same", "old"]);
    }

    #[test]
    fn test_missing_priority_and_timestamp_sort_last() {
        let mut no_priority = organic("no-priority");
        no_priority.is_boosted = true;
        let mut no_date = organic("no-date").boosted(2);
        no_date.created_at = None;

        let input = vec![
            no_priority,
            no_date,
            boosted("dated", 2, 3),
            boosted("negative", -4, 3),
        ];

        let ranked = rank(&input, &mut StdRng::seed_from_u64(5));

        assert_eq!(
            ids(&ranked),
            vec!["dated", "no-date", "negative", "no-priority"]
        );
    }

    #[test]
    fn test_all_boosted_is_pure_sort() {
        let input = vec![boosted("a", 1, 1), boosted("b", 3, 1), boosted("c", 2, 1)];

        let first = rank(&input, &mut StdRng::seed_from_u64(10));
        let second = rank(&input, &mut StdRng::seed_from_u64(11));

        assert_eq!(ids(&first), vec!["b", "c", "a"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_all_organic_is_pure_shuffle() {
        let input: Vec<Listing> = (0..20).map(|i| organic(&i.to_string())).collect();

        let ranked = rank(&input, &mut StdRng::seed_from_u64(12));

        let mut got: Vec<String> = ranked.iter().map(|l| l.id.clone()).collect();
        let mut expected: Vec<String> = input.iter().map(|l| l.id.clone()).collect();
        got.sort();
        expected.sort();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_ranked_feed_records_boosted_prefix() {
        let input = vec![
            organic("1"),
            boosted("2", 1, 1),
            organic("3"),
            boosted("4", 2, 1),
        ];

        let feed = RankedFeed::build(&input, &mut StdRng::seed_from_u64(0));

        assert_eq!(feed.len(), 4);
        assert_eq!(feed.boosted_count, 2);
        assert_eq!(ids(feed.boosted()), vec!["4", "2"]);
        assert!(feed.organic().iter().all(|l| !l.is_boosted));
    }

    #[test]
    fn test_rank_with_seed_is_reproducible() {
        let input: Vec<Listing> = (0..10).map(|i| organic(&i.to_string())).collect();

        assert_eq!(
            rank_with_seed(&input, Some(77)),
            rank_with_seed(&input, Some(77))
        );
        assert_eq!(rank_with_seed(&input, None).len(), input.len());
    }
}
