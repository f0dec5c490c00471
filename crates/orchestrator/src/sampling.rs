//! Fair cross-dataset sampling for bounded-size summarization.
//!
//! Each dataset gets an equal per-dataset quota under a hard global item
//! budget, so no single dataset can consume the summarizer's context at
//! the expense of the others. Leftover budget from an under-filled dataset
//! is not redistributed to later datasets.

use feedchat_protocol::Record;
use std::fmt::Write as _;

const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// One named, ordered dataset handed to the summarizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub records: Vec<Record>,
}

impl Dataset {
    #[must_use]
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// Bounded textual preview over several datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub text: String,
    pub count: usize,
    /// Items taken per dataset, in dataset order.
    pub per_dataset: Vec<usize>,
}

/// Build a preview of at most `max_items` records across `datasets`.
///
/// `quota = max(1, max_items / n)` (integer division). Each dataset in
/// order contributes up to `quota` records, bounded by the global
/// remaining budget; iteration proceeds to the next dataset whether or not
/// the current one reached its quota.
#[must_use]
pub fn sample_preview(datasets: &[Dataset], max_items: usize) -> Preview {
    if datasets.is_empty() {
        return Preview {
            text: String::new(),
            count: 0,
            per_dataset: Vec::new(),
        };
    }

    let quota = (max_items / datasets.len()).max(1);
    let mut remaining = max_items;
    let mut text = String::new();
    let mut count = 0;
    let mut per_dataset = Vec::with_capacity(datasets.len());

    for dataset in datasets {
        let take = quota.min(remaining).min(dataset.records.len());
        if take > 0 {
            let _ = writeln!(
                text,
                "## {} ({take} of {} items)",
                dataset.name,
                dataset.records.len()
            );
            for record in &dataset.records[..take] {
                text.push_str(&format_record(record));
                text.push('\n');
            }
            text.push('\n');
        }
        per_dataset.push(take);
        count += take;
        remaining -= take;
    }

    Preview {
        text,
        count,
        per_dataset,
    }
}

fn format_record(record: &Record) -> String {
    let mut description = record.description.trim().to_string();
    if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        description = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        description.push('…');
    }
    if description.is_empty() {
        format!("- {} ({})", record.title, record.link)
    } else {
        format!("- {}: {} ({})", record.title, description, record.link)
    }
}
