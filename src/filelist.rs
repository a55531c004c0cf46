//! Filename generation from naming components.
//!
//! Builds the full cartesian product of component lists (for example region
//! codes × dates × suffixes), joined into file names. Component 1 is repeated
//! block-wise and later components cycle fastest, so
//! `[["a","b"], ["1","2","3"]]` with extension `nc` and join `_` yields
//! `a_1.nc a_2.nc a_3.nc b_1.nc b_2.nc b_3.nc`. Pure and deterministic, no
//! I/O.

use itertools::Itertools;

/// Build a file-name list from the cartesian product of `components`.
///
/// `join` separates components within a name; `extension`, when non-empty,
/// is appended as `.extension`. An empty `components` slice yields an empty
/// list, as does any empty component (an empty axis has no products).
pub fn from_components(components: &[Vec<String>], extension: &str, join: &str) -> Vec<String> {
    if components.is_empty() {
        return Vec::new();
    }
    components
        .iter()
        .map(|component| component.iter())
        .multi_cartesian_product()
        .map(|parts| {
            let stem = parts.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(join);
            if extension.is_empty() {
                stem
            } else {
                format!("{stem}.{extension}")
            }
        })
        .collect()
}
