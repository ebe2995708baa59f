use std::collections::HashSet;

/// Jaccard index of the case-folded, whitespace-split word sets of `a` and `b`.
///
/// Returns 0.0 when either side has no words.
pub fn lexical_overlap(a: &str, b: &str) -> f64 {
    let left = word_set(a);
    let right = word_set(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.union(&right).count();
    shared as f64 / union as f64
}

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}
