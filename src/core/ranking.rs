//! Deterministic top-N selection and positional truncation.
//!
//! Two distinct operations that must not be confused:
//!
//! - [`top_n`] ranks: the `n` records with the largest key, descending,
//!   ties keeping their original relative order (stable sort).
//! - [`head`] truncates: the first `n` records in supplied order. The
//!   high-risk device lists use this; they are filtered, never ranked.

/// Return the `n` records with the largest `key` value, descending.
///
/// The sort is stable, so records with equal keys keep their original
/// relative order. If fewer than `n` records exist, all are returned.
pub fn top_n<T, F>(records: &[T], key: F, n: usize) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> f64,
{
    let mut ranked: Vec<T> = records.to_vec();
    ranked.sort_by(|a, b| key(b).total_cmp(&key(a)));
    ranked.truncate(n);
    ranked
}

/// Return the first `n` records in their supplied order.
pub fn head<T: Clone>(records: &[T], n: usize) -> Vec<T> {
    records.iter().take(n).cloned().collect()
}
