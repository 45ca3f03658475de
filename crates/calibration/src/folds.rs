//! Stratified Fold Assignment

/// Assign each sample index to one of `k` folds, preserving label balance
///
/// Indices are grouped by label and each group is dealt round-robin across
/// the folds, so per-fold label ratios match the dataset as closely as
/// integer division allows. No shuffling: the assignment is deterministic
/// for a given dataset order.
pub fn stratified_folds(labels: &[bool], k: usize) -> Vec<usize> {
    let mut assignment = vec![0usize; labels.len()];
    for class in [false, true] {
        let mut slot = 0usize;
        for (idx, &label) in labels.iter().enumerate() {
            if label == class {
                assignment[idx] = slot % k;
                slot += 1;
            }
        }
    }
    assignment
}
