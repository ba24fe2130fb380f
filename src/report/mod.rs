//! Run summary rendering

use crate::scheduler::RunStats;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Prints the end-of-run summary to stdout.
pub fn print_summary(stats: &RunStats) {
    println!();
    println!("=== Clone summary ===");
    println!("Started:             {}", format_timestamp(stats.started_at));
    println!("Output directory:    {}", stats.output_dir.display());
    println!("Discovered URLs:     {}", stats.discovered);
    println!("Pages downloaded:    {}", stats.pages_downloaded);
    println!("Pages skipped:       {}", stats.pages_skipped);
    println!("Assets downloaded:   {}", stats.assets_downloaded);
    if stats.assets_failed > 0 {
        println!("Assets failed:       {}", stats.assets_failed);
    }
    println!("Pages now on disk:   {}", stats.total_pages_on_disk);
    println!("Elapsed:             {}", format_duration(stats.duration));

    if stats.discovered == 0 {
        println!();
        println!("No URLs were discovered. The site may block automated access,");
        println!("or the target may not expose a sitemap or REST API.");
    }

    if !stats.failures.is_empty() {
        println!();
        println!("Failures ({}):", stats.failures.len());
        for failure in stats.failures.iter().take(10) {
            println!("  {}: {}", failure.url, failure.message);
        }
        if stats.failures.len() > 10 {
            println!("  ... and {} more", stats.failures.len() - 10);
        }
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    if total_secs >= 60 {
        format!("{}m {}s", total_secs / 60, total_secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        use chrono::TimeZone;
        let at = Utc.with_ymd_and_hms(2026, 8, 24, 9, 30, 0).unwrap();
        assert_eq!(format_timestamp(at), "2026-08-24 09:30:00 UTC");
    }

    #[test]
    fn test_format_duration_seconds() {
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }
}
