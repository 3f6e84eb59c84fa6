use crate::domain::model::{FeedPage, Listing};
use crate::utils::error::{FeedError, Result};

fn check_page_size(page_size: usize) -> Result<()> {
    if page_size == 0 {
        return Err(FeedError::ValidationError {
            message: "page size must be at least 1".to_string(),
        });
    }
    Ok(())
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// 切成 1-based 頁面，空 feed 沒有任何頁
pub fn paginate(listings: &[Listing], page_size: usize) -> Result<Vec<FeedPage>> {
    check_page_size(page_size)?;
    let total = total_pages(listings.len(), page_size);

    Ok(listings
        .chunks(page_size)
        .enumerate()
        .map(|(index, chunk)| FeedPage {
            number: index + 1,
            total_pages: total,
            page_size,
            items: chunk.to_vec(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ListingKind;

    fn listings(n: usize) -> Vec<Listing> {
        (0..n)
            .map(|i| Listing::new(i.to_string(), ListingKind::Product))
            .collect()
    }

    #[test]
    fn test_paginate_splits_into_full_and_partial_pages() {
        let pages = paginate(&listings(120), 50).unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].items.len(), 50);
        assert_eq!(pages[2].items.len(), 20);
        assert_eq!(pages[2].number, 3);
        assert!(pages.iter().all(|p| p.total_pages == 3));
        assert_eq!(pages[1].items[0].id, "50");
    }

    #[test]
    fn test_paginate_empty_feed() {
        assert!(paginate(&[], 50).unwrap().is_empty());
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        assert!(paginate(&listings(3), 0).is_err());
    }
}
