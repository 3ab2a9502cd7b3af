// ── Aggregate statistics ──
//
// Pure reducers over a full collection. Counts are seeded with the kind's
// category set so zero-valued categories still appear, in seed order.

use indexmap::IndexMap;
use serde::Serialize;

use crate::resource::Resource;

/// Ordered category → count.
pub type CategoryCounts = IndexMap<String, usize>;

/// What to do with a category value outside the seed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountPolicy {
    /// Ignore it. List screens use this so their panels stay fixed.
    #[default]
    DropUnknown,
    /// Append it after the seeded categories, in first-seen order.
    KeepUnknown,
}

/// Count records per category. Records without a category are skipped.
pub fn count_by<'a, T, I, F>(
    records: I,
    seed: &[&str],
    category: F,
    policy: CountPolicy,
) -> CategoryCounts
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&'a T) -> Option<&'a str>,
{
    let mut counts: CategoryCounts = seed.iter().map(|s| ((*s).to_owned(), 0)).collect();

    for record in records {
        let Some(value) = category(record) else {
            continue;
        };
        if let Some(n) = counts.get_mut(value) {
            *n += 1;
        } else if policy == CountPolicy::KeepUnknown {
            counts.insert(value.to_owned(), 1);
        }
    }

    counts
}

/// Sum a numeric field. Missing or non-finite values count as zero.
pub fn sum<'a, T, I, F>(records: I, value: F) -> f64
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&'a T) -> Option<f64>,
{
    records
        .into_iter()
        .filter_map(value)
        .filter(|v| v.is_finite())
        .sum()
}

/// Total plus per-category counts for one list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub counts: CategoryCounts,
}

/// Summarize a collection by its kind's category field.
pub fn summarize<R: Resource>(records: &[R], policy: CountPolicy) -> Summary {
    Summary {
        total: records.len(),
        counts: count_by(
            records,
            R::KIND.category_seed(),
            R::category,
            policy,
        ),
    }
}
