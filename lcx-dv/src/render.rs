//! Plain-text rendering of a dashboard summary

use std::fmt::Write;

use lcx_common::aggregate::Tally;
use lcx_common::DashboardSummary;

use crate::refresh::Snapshot;

/// Render one dashboard frame
pub fn render_summary(summary: &DashboardSummary, snapshot: &Snapshot) -> String {
    let mut out = String::new();

    let fetched = snapshot
        .fetched_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    let _ = writeln!(
        out,
        "=== LCX attendee dashboard ({} responses, refreshed {}) ===",
        summary.total_responses, fetched
    );

    if summary.total_responses == 0 {
        let _ = writeln!(out, "No responses yet.");
        return out;
    }

    render_distribution(&mut out, "Sectors", &summary.sectors, summary.total_responses);
    render_distribution(
        &mut out,
        "Networking interests",
        &summary.networking_interests,
        summary.total_responses,
    );

    let _ = writeln!(out, "\nTop skills");
    for (rank, tally) in summary.top_skills.iter().enumerate() {
        let _ = writeln!(out, "  {}. {} ({})", rank + 1, tally.label, tally.count);
    }

    let _ = writeln!(out, "\nRecent profiles");
    for profile in &summary.recent_profiles {
        let _ = writeln!(out, "  #{} {}: {}", profile.id, profile.name, profile.profile_description);
        let _ = writeln!(out, "      looking for: {}", profile.desired_connections);
        let _ = writeln!(out, "      offers: {}", profile.offer_to_others);
    }

    out
}

fn render_distribution(out: &mut String, title: &str, tallies: &[Tally], total: usize) {
    let _ = writeln!(out, "\n{}", title);
    for tally in tallies {
        let percent = tally.count as f64 * 100.0 / total as f64;
        let _ = writeln!(out, "  {:<24} {:>4}  {:>5.1}%", tally.label, tally.count, percent);
    }
}
