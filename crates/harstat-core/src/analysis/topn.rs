use std::cmp::Ordering;

/// The `n` items with the largest keys, in descending key order.
///
/// Items with equal keys keep their input order. Shorter inputs come back
/// whole, never an error.
pub fn top_n<T, K, F>(items: &[T], n: usize, key: F) -> Vec<&T>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let mut keyed: Vec<(K, &T)> = items.iter().map(|item| (key(item), item)).collect();

    // sort_by is stable, which gives the tie-break on input order.
    keyed.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    keyed.truncate(n);

    keyed.into_iter().map(|(_, item)| item).collect()
}
