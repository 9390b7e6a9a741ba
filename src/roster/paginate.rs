/// Zero-based offset of the first row on a 1-based page
pub fn page_offset(page: u32, page_size: u32) -> usize {
    let offset = u64::from(page.saturating_sub(1)).saturating_mul(u64::from(page_size));
    usize::try_from(offset).unwrap_or(usize::MAX)
}

/// Rows `[(page-1)*page_size, page*page_size)` of `rows`, clipped to its
/// bounds. Pages past the end are empty.
///
/// Callers validate `page >= 1` and `page_size >= 1` beforehand.
pub fn paginate<T>(rows: Vec<T>, page: u32, page_size: u32) -> Vec<T> {
    rows.into_iter()
        .skip(page_offset(page, page_size))
        .take(page_size as usize)
        .collect()
}

/// Number of pages needed for `total` rows
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_and_last_pages() {
        let rows: Vec<u32> = (1..=7).collect();

        assert_eq!(paginate(rows.clone(), 1, 3), vec![1, 2, 3]);
        assert_eq!(paginate(rows.clone(), 2, 3), vec![4, 5, 6]);
        assert_eq!(paginate(rows, 3, 3), vec![7]);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let rows: Vec<u32> = (1..=7).collect();

        assert!(paginate(rows.clone(), 4, 3).is_empty());
        assert!(paginate(rows, u32::MAX, u32::MAX).is_empty());
        assert!(paginate(Vec::<u32>::new(), 1, 10).is_empty());
    }

    #[test]
    fn test_pages_concatenate_to_input() {
        let rows: Vec<u32> = (0..23).collect();

        for page_size in 1..=25 {
            let pages = total_pages(rows.len() as u64, page_size);
            let mut joined = Vec::new();
            for page in 1..=pages as u32 {
                let slice = paginate(rows.clone(), page, page_size);
                assert!(slice.len() <= page_size as usize);
                joined.extend(slice);
            }
            assert_eq!(joined, rows, "page_size {}", page_size);
        }
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_page_offset_saturates() {
        assert_eq!(page_offset(1, 50), 0);
        assert_eq!(page_offset(3, 50), 100);
        assert_eq!(page_offset(0, 50), 0);
        assert!(page_offset(u32::MAX, u32::MAX) > 0);
    }
}
