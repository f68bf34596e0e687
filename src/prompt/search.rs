use strsim::levenshtein;

/// Indices of keys containing `needle` (both already lowercase), in order.
pub fn substring_matches(keys: &[String], needle: &str) -> Vec<usize> {
    keys.iter()
        .enumerate()
        .filter(|(_, key)| key.contains(needle))
        .map(|(idx, _)| idx)
        .collect()
}

/// Fuzzy candidates for `needle`: keys containing every character of the
/// needle in order, ranked by edit distance (ties keep original order).
pub fn fuzzy_rank(keys: &[String], needle: &str) -> Vec<usize> {
    let mut ranked: Vec<(usize, usize)> = keys
        .iter()
        .enumerate()
        .filter(|(_, key)| is_subsequence(needle, key))
        .map(|(idx, key)| (levenshtein(needle, key), idx))
        .collect();
    ranked.sort();
    ranked.into_iter().map(|(_, idx)| idx).collect()
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut chars = haystack.chars();
    needle
        .chars()
        .filter(|c| !c.is_whitespace())
        .all(|n| chars.any(|h| h == n))
}
