//! Color combinations for emblem pregeneration

use super::signature::color_component;
use crate::store::Tag;
use std::collections::HashSet;

/// Tag colors in display order with repeats removed
///
/// Colors that differ only in case or a leading `#` count as repeats.
#[must_use]
pub fn distinct_colors(tags: &[Tag]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .filter(|tag| seen.insert(color_component(&tag.color)))
        .map(|tag| tag.color.clone())
        .collect()
}

/// Every combination of 1..=`max_size` colors, order-preserving
///
/// Sizes are emitted smallest first; within a size, combinations come in
/// lexicographic index order.
#[must_use]
pub fn combinations(colors: &[String], max_size: usize) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    for size in 1..=max_size.min(colors.len()) {
        let mut indices: Vec<usize> = (0..size).collect();
        loop {
            out.push(indices.iter().map(|&i| colors[i].clone()).collect());

            // Rightmost index that can still move forward
            let Some(pos) = (0..size).rev().find(|&i| indices[i] != i + colors.len() - size) else {
                break;
            };
            indices[pos] += 1;
            for next in pos + 1..size {
                indices[next] = indices[next - 1] + 1;
            }
        }
    }
    out
}
