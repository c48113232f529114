/// Aggregation of per-record outcomes into a sweep result.
///
/// A sweep combines outcomes in whatever order pages and records arrive, so
/// the aggregate must not depend on that order.
use mailstore_core::MigrationResult::{self, Completed, Partial};

fn permutations(items: &[MigrationResult]) -> Vec<Vec<MigrationResult>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

#[test]
fn test_aggregate_is_order_independent() {
    let outcomes = [Completed, Partial, Completed, Completed];
    for order in permutations(&outcomes) {
        let folded = order
            .iter()
            .fold(MigrationResult::default(), |acc, r| acc.combine(*r));
        assert_eq!(folded, Partial, "order {:?}", order);
    }
}

#[test]
fn test_paged_aggregate_matches_flat_aggregate() {
    let outcomes = [Completed, Completed, Partial, Completed, Completed];
    let flat: MigrationResult = outcomes.iter().copied().sum();

    for page_size in 1..=outcomes.len() {
        let paged: MigrationResult = outcomes
            .chunks(page_size)
            .map(|page| page.iter().copied().sum::<MigrationResult>())
            .collect();
        assert_eq!(paged, flat, "page size {}", page_size);
    }
}

#[test]
fn test_empty_sweep_is_completed() {
    let none: Vec<MigrationResult> = Vec::new();
    assert_eq!(none.into_iter().sum::<MigrationResult>(), Completed);
}

#[test]
fn test_all_completed_is_completed() {
    assert!([Completed; 8]
        .into_iter()
        .collect::<MigrationResult>()
        .is_completed());
}
