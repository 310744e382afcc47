//! Frequency counting and ranking variants, shared by the criterion benches.

use std::cmp::Reverse;
use std::collections::HashMap;

/// Counts in first-seen order, slot lookup through a `HashMap`
pub fn count_first_seen_indexed(numbers: &[u32]) -> Vec<(u32, u64)> {
    let mut counts: Vec<(u32, u64)> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();
    for &number in numbers {
        match index.get(&number) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(number, counts.len());
                counts.push((number, 1));
            }
        }
    }
    counts
}

/// Counts in first-seen order, slot lookup by scanning; pick games have at most 58 distinct numbers
pub fn count_first_seen_scan(numbers: &[u32]) -> Vec<(u32, u64)> {
    let mut counts: Vec<(u32, u64)> = Vec::new();
    for &number in numbers {
        match counts.iter_mut().find(|(seen, _)| *seen == number) {
            Some((_, count)) => *count += 1,
            None => counts.push((number, 1)),
        }
    }
    counts
}

/// Most frequent first, relying on `sort_by_key` being stable for ties
pub fn rank_stable(counts: &[(u32, u64)]) -> Vec<(u32, u64)> {
    let mut ranked = counts.to_vec();
    ranked.sort_by_key(|&(_, count)| Reverse(count));
    ranked
}

/// Most frequent first, ties broken by an explicit first-seen index
pub fn rank_indexed(counts: &[(u32, u64)]) -> Vec<(u32, u64)> {
    let mut ranked: Vec<(usize, (u32, u64))> = counts.iter().copied().enumerate().collect();
    ranked.sort_unstable_by_key(|&(seen, (_, count))| (Reverse(count), seen));
    ranked.into_iter().map(|(_, entry)| entry).collect()
}
