use crate::models::{DonorId, DonorProfile, DonorRow};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Attach pledge statistics to each profile.
///
/// Output has the same length and order as `profiles`. Donors missing from a
/// statistic map get zero for that statistic.
pub fn merge_statistics(
    profiles: Vec<DonorProfile>,
    counts: &HashMap<DonorId, u64>,
    totals: &HashMap<DonorId, Decimal>,
) -> Vec<DonorRow> {
    profiles
        .into_iter()
        .map(|profile| {
            let pledge_count = counts.get(&profile.id).copied().unwrap_or(0);
            let total_donated = totals.get(&profile.id).copied().unwrap_or(Decimal::ZERO);

            DonorRow {
                profile,
                pledge_count,
                total_donated,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles() -> Vec<DonorProfile> {
        vec![
            DonorProfile::with_id("a", "a@x.com"),
            DonorProfile::with_id("b", "b@x.com"),
            DonorProfile::with_id("c", "c@x.com"),
        ]
    }

    #[test]
    fn test_merge_applies_values_and_defaults() {
        let counts = HashMap::from([("b".to_string(), 2), ("c".to_string(), 5)]);
        let totals = HashMap::from([
            ("b".to_string(), Decimal::new(15000, 2)),
            ("c".to_string(), Decimal::new(7550, 2)),
        ]);

        let rows = merge_statistics(profiles(), &counts, &totals);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].id(), "a");
        assert_eq!(rows[0].pledge_count, 0);
        assert_eq!(rows[0].total_donated, Decimal::ZERO);
        assert_eq!(rows[1].pledge_count, 2);
        assert_eq!(rows[1].total_donated, Decimal::new(15000, 2));
        assert_eq!(rows[2].pledge_count, 5);
        assert_eq!(rows[2].total_donated, Decimal::new(7550, 2));
    }

    #[test]
    fn test_merge_with_empty_maps_keeps_every_profile() {
        let rows = merge_statistics(profiles(), &HashMap::new(), &HashMap::new());

        let ids: Vec<&str> = rows.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(rows.iter().all(|r| r.pledge_count == 0 && r.total_donated.is_zero()));
    }

    #[test]
    fn test_merge_ignores_unknown_ids() {
        let counts = HashMap::from([("zzz".to_string(), 9)]);
        let rows = merge_statistics(profiles(), &counts, &HashMap::new());

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.pledge_count == 0));
    }

    #[test]
    fn test_merge_empty_input() {
        let rows = merge_statistics(Vec::new(), &HashMap::new(), &HashMap::new());
        assert!(rows.is_empty());
    }
}
