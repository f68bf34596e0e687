/// Outcome of reading a prompt answer as a list of 1-based indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionParse {
    /// Not a pure index list; treat the answer as search text.
    NotIndices,
    /// An index list that must be rejected as a whole.
    Invalid(String),
    /// Distinct indices in first-seen order, each within `1..=limit`.
    Indices(Vec<usize>),
}

/// Parse a comma-separated index answer against a view of `limit` items.
///
/// Tokens are checked in order: a blank token or an out-of-range number
/// rejects the whole answer, a non-numeric token turns it into search text.
pub fn parse_selection(input: &str, limit: usize) -> SelectionParse {
    if input.trim().is_empty() {
        return SelectionParse::NotIndices;
    }

    let mut picked: Vec<usize> = Vec::new();
    for part in input.split(',') {
        let token = part.trim();
        if token.is_empty() {
            return SelectionParse::Invalid("selection cannot be empty".to_string());
        }
        let number: i64 = match token.parse() {
            Ok(n) => n,
            Err(_) => return SelectionParse::NotIndices,
        };
        if number < 1 || number as u64 > limit as u64 {
            return SelectionParse::Invalid(format!("selection must be between 1 and {}", limit));
        }
        let index = number as usize;
        if !picked.contains(&index) {
            picked.push(index);
        }
    }

    SelectionParse::Indices(picked)
}
