use std::collections::HashMap;
use std::hash::Hash;

use chrono::NaiveTime;

pub mod summary;

pub use summary::SummaryFormatter;

/// Longest title shown before it is cut
pub const MAX_TITLE_CHARS: usize = 100;

/// Cut titles longer than [`MAX_TITLE_CHARS`] characters and mark them with `...`
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let mut short: String = title.chars().take(MAX_TITLE_CHARS).collect();
        short.push_str("...");
        short
    } else {
        title.to_string()
    }
}

/// 12-hour clock with AM/PM, e.g. `09:30 AM`
pub fn format_clock_time(time: &NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}

/// Distinct values with their counts, most frequent first.
///
/// Ties keep the order in which values were first seen.
pub fn rank_by_frequency<T, I>(items: I, limit: usize) -> Vec<(T, usize)>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (index, item) in items.into_iter().enumerate() {
        counts.entry(item).or_insert((0, index)).0 += 1;
    }

    let mut ranked: Vec<(T, usize, usize)> = counts
        .into_iter()
        .map(|(item, (count, first_seen))| (item, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(item, count, _)| (item, count))
        .collect()
}
