//! Console summary of a completed run.
//!
//! Prints acceptance counts, hourly and weekday distributions as scaled
//! text histograms, sorted per-category counts, and the gang-related
//! share of the aggregate.

use crate::models::AggregateState;
use colored::Colorize;
use std::collections::BTreeMap;

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Widest histogram bar, in characters
const HISTOGRAM_WIDTH: usize = 40;

/// Print the full post-run summary to stdout
pub fn print_summary(aggregate: &AggregateState) {
    println!();
    println!(
        "{} {} {}",
        "Valid incidents processed:".bold(),
        aggregate.len().to_string().green().bold(),
        format!("(out of {} rows)", aggregate.rows_read).dimmed()
    );

    let mut hours: BTreeMap<u8, usize> = BTreeMap::new();
    let mut weekdays: BTreeMap<u8, usize> = BTreeMap::new();
    let mut categories: BTreeMap<String, usize> = BTreeMap::new();
    let mut gang_related = 0usize;

    for record in &aggregate.records {
        *hours.entry(record.hour).or_default() += 1;
        *weekdays.entry(record.weekday).or_default() += 1;
        *categories.entry(record.category.clone()).or_default() += 1;
        if record.gang_related {
            gang_related += 1;
        }
    }

    println!();
    println!("{}", "Hourly distribution:".bold());
    for (hour, count) in &hours {
        println!("  {:02}: {}", hour, histogram_bar(*count, &hours));
    }

    println!();
    println!("{}", "Weekday distribution:".bold());
    for (weekday, count) in &weekdays {
        let name = WEEKDAY_NAMES
            .get(usize::from(*weekday))
            .copied()
            .unwrap_or("???");
        println!("  {name}: {}", histogram_bar(*count, &weekdays));
    }

    println!();
    println!(
        "{}",
        format!("Category counts ({}):", categories.len()).bold()
    );
    for (category, count) in &categories {
        println!("  {category}: {count}");
    }

    println!();
    println!(
        "{} {} {}",
        "Gang related:".bold(),
        gang_related.to_string().yellow(),
        format!("(out of {})", aggregate.len()).dimmed()
    );
}

/// Render one histogram bar scaled so the largest bucket fills the width
fn histogram_bar<K: Ord>(count: usize, buckets: &BTreeMap<K, usize>) -> String {
    let largest = buckets.values().copied().max().unwrap_or(0);
    if largest == 0 {
        return String::new();
    }
    let width = (count * HISTOGRAM_WIDTH + largest / 2) / largest;
    format!("{} {}", "#".repeat(width.max(1)), count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, FileResult, IncidentRecord};

    fn record(hour: u8, weekday: u8, category: &str, gang: bool) -> IncidentRecord {
        IncidentRecord {
            hour,
            weekday,
            category: category.to_string(),
            detail_code: String::new(),
            weight: 1,
            gang_related: gang,
            location: Coordinate {
                x: 6_000_000.0,
                y: 1_800_000.0,
            },
        }
    }

    #[test]
    fn test_histogram_bar_scaling() {
        let buckets = BTreeMap::from([(0u8, 10usize), (1, 5), (2, 1)]);

        assert_eq!(histogram_bar(10, &buckets), format!("{} 10", "#".repeat(40)));
        assert_eq!(histogram_bar(5, &buckets), format!("{} 5", "#".repeat(20)));
        // small buckets never round down to an empty bar
        assert!(histogram_bar(1, &buckets).starts_with('#'));
    }

    #[test]
    fn test_histogram_bar_empty_buckets() {
        let buckets: BTreeMap<u8, usize> = BTreeMap::new();
        assert_eq!(histogram_bar(0, &buckets), "");
    }

    #[test]
    fn test_print_summary_does_not_panic() {
        let mut aggregate = AggregateState::default();
        aggregate.fold(FileResult {
            records: vec![
                record(1, 0, "BURG", true),
                record(1, 6, "BURG", false),
                record(23, 3, "THEFT", false),
            ],
            rows_read: 5,
            rows_malformed: 0,
        });

        print_summary(&aggregate);
        print_summary(&AggregateState::default());
    }
}
