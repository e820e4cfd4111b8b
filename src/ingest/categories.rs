use crate::constants::UNCATEGORIZED;

/// Expands the raw semicolon-delimited category field into distinct labels.
///
/// Splits strictly on `;`, trims each segment, and drops segments that are
/// empty after trimming. Label case is preserved as-is. A blank source field
/// maps to the single default label so every business keeps at least one
/// category association.
pub fn split_categories(raw: &str) -> Vec<String> {
    let labels: Vec<String> = raw
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if labels.is_empty() {
        vec![UNCATEGORIZED.to_string()]
    } else {
        labels
    }
}
