use chrono::DateTime;
use chrono_tz::Tz;

use super::{format_clock_time, rank_by_frequency, truncate_title};
use crate::analysis::{Meeting, MeetingStats};
use crate::timezone::{is_dst, zone_abbreviation};

/// Shown instead of a report when nothing matched
pub const NO_MEETINGS_MESSAGE: &str = "No meetings found in the specified time period.";

/// Averages are per calendar year, independent of the observed date span
const DAYS_PER_YEAR: f64 = 365.0;

/// Plain-text meeting summary
pub struct SummaryFormatter {
    pub top_titles: usize,
    pub top_times: usize,
}

impl SummaryFormatter {
    pub fn new(top_titles: usize, top_times: usize) -> Self {
        Self { top_titles, top_times }
    }

    /// Render the report. `now` decides the PDT/PST label in the headings.
    pub fn format(&self, meetings: &[Meeting], stats: &MeetingStats, now: DateTime<Tz>) -> String {
        let dates = meetings.iter().map(|m| m.date);
        let (Some(first_date), Some(last_date)) = (dates.clone().min(), dates.max()) else {
            return self.format_empty();
        };

        let dst = is_dst(&now);
        let zone = zone_abbreviation(dst);
        let zone_long = if dst { "Daylight" } else { "Standard" };

        let span_days = (last_date - first_date).num_days();

        let avg_per_day = stats.total_meetings as f64 / DAYS_PER_YEAR;
        let avg_duration = if stats.total_meetings > 0 {
            stats.total_hours / stats.total_meetings as f64
        } else {
            0.0
        };

        let mut lines = vec![
            format!("📅 Calendar Analysis Summary (All times in Pacific Time - Currently {})", zone),
            "=".repeat(70),
            "\nDate Range:".to_string(),
            format!("- From: {}", first_date.format("%B %d, %Y")),
            format!("- To:   {}", last_date.format("%B %d, %Y")),
            format!("- Span: {} days", span_days),
            "\nTimezone Information:".to_string(),
            format!("- Currently using {} (Pacific {} Time)", zone, zone_long),
            "- All times are automatically adjusted for DST transitions".to_string(),
            "- Meetings during DST periods are shown in PDT".to_string(),
            "- Meetings during standard time are shown in PST".to_string(),
            "\nMeeting Statistics:".to_string(),
            format!("- Total Meetings: {}", stats.total_meetings),
            format!("- Total Meeting Hours: {:.1}", stats.total_hours),
            format!("- Average Meetings per Day: {:.1}", avg_per_day),
            format!("- Average Meeting Duration: {:.1} hours", avg_duration),
            format!("\nTop {} Most Common Meeting Times ({}):", self.top_times, zone),
        ];

        for (time, count) in rank_by_frequency(meetings.iter().map(|m| m.time), self.top_times) {
            lines.push(format!("- {}: {} meetings", format_clock_time(&time), count));
        }

        lines.push(format!("\nTop {} Most Frequent Meeting Titles:", self.top_titles));
        lines.push("-".repeat(30));

        for (title, count) in rank_by_frequency(meetings.iter().map(|m| m.title.as_str()), self.top_titles) {
            lines.push(format!("{:4} | {}", count, truncate_title(title)));
        }

        lines.join("\n")
    }

    pub fn format_empty(&self) -> String {
        NO_MEETINGS_MESSAGE.to_string()
    }
}

impl Default for SummaryFormatter {
    fn default() -> Self {
        Self::new(50, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timezone::PACIFIC;
    use chrono::{NaiveDate, NaiveTime, TimeZone};

    fn meeting(day: u32, hour: u32, title: &str, hours: f64) -> Meeting {
        Meeting {
            date: NaiveDate::from_ymd_opt(2023, 7, day).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            title: title.to_string(),
            duration_hours: hours,
        }
    }

    fn stats_for(meetings: &[Meeting]) -> MeetingStats {
        MeetingStats {
            total_meetings: meetings.len(),
            total_hours: meetings.iter().map(|m| m.duration_hours).sum(),
        }
    }

    fn summer_now() -> DateTime<Tz> {
        PACIFIC.with_ymd_and_hms(2023, 7, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_input_gives_fixed_message() {
        let formatter = SummaryFormatter::default();
        let result = formatter.format(&[], &MeetingStats::default(), summer_now());
        assert_eq!(result, "No meetings found in the specified time period.");
    }

    #[test]
    fn test_report_statistics() {
        let meetings = vec![meeting(1, 3, "Test Meeting", 1.0), meeting(2, 8, "Project Sync", 2.0)];
        let result = SummaryFormatter::new(10, 5).format(&meetings, &stats_for(&meetings), summer_now());

        assert!(result.starts_with("📅 Calendar Analysis Summary (All times in Pacific Time - Currently PDT)"));
        assert!(result.contains("- From: July 01, 2023"));
        assert!(result.contains("- To:   July 02, 2023"));
        assert!(result.contains("- Span: 1 days"));
        assert!(result.contains("- Currently using PDT (Pacific Daylight Time)"));
        assert!(result.contains("Total Meetings: 2"));
        assert!(result.contains("Total Meeting Hours: 3.0"));
        assert!(result.contains("- Average Meetings per Day: 0.0"));
        assert!(result.contains("- Average Meeting Duration: 1.5 hours"));
        assert!(result.contains("Top 10 Most Frequent Meeting Titles:"));
        assert!(result.contains("   1 | Test Meeting"));
        assert!(result.contains("   1 | Project Sync"));
    }

    #[test]
    fn test_sections_are_separated_by_blank_lines() {
        let meetings = vec![meeting(1, 10, "Standup", 0.25)];
        let result = SummaryFormatter::default().format(&meetings, &stats_for(&meetings), summer_now());

        assert!(result.contains(&format!("{}\n\nDate Range:", "=".repeat(70))));
        assert!(result.contains("\n\nTimezone Information:\n"));
        assert!(result.contains("\n\nMeeting Statistics:\n"));
        assert!(result.contains("\n\nTop 5 Most Common Meeting Times (PDT):\n"));
        assert!(result.ends_with(&format!("Titles:\n{}\n   1 | Standup", "-".repeat(30))));
    }

    #[test]
    fn test_standard_time_label_follows_now() {
        let meetings = vec![meeting(1, 10, "Standup", 1.0)];
        let winter_now = PACIFIC.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let result = SummaryFormatter::default().format(&meetings, &stats_for(&meetings), winter_now);

        assert!(result.contains("Currently PST"));
        assert!(result.contains("- Currently using PST (Pacific Standard Time)"));
        assert!(result.contains("Top 5 Most Common Meeting Times (PST):"));
    }

    #[test]
    fn test_top_times_are_ranked_and_limited() {
        let mut meetings = Vec::new();
        for hour in [9, 9, 9, 10, 10, 11, 12, 13, 14, 15] {
            meetings.push(meeting(3, hour, "Sync", 1.0));
        }
        let result = SummaryFormatter::default().format(&meetings, &stats_for(&meetings), summer_now());

        let nine = result.find("- 09:00 AM: 3 meetings").unwrap();
        let ten = result.find("- 10:00 AM: 2 meetings").unwrap();
        assert!(nine < ten);
        assert!(result.contains("- 11:00 AM: 1 meetings"));
        assert!(result.contains("- 01:00 PM: 1 meetings"));
        // Only five times are listed
        assert!(!result.contains("- 02:00 PM"));
        assert!(!result.contains("- 03:00 PM"));
    }

    #[test]
    fn test_long_titles_are_truncated_in_report() {
        let long_title = "A".repeat(150);
        let meetings = vec![meeting(1, 10, &long_title, 1.0), meeting(1, 14, "Short title", 1.0)];
        let result = SummaryFormatter::new(5, 5).format(&meetings, &stats_for(&meetings), summer_now());

        assert!(result.contains(&format!("{}...", "A".repeat(100))));
        assert!(!result.contains(&"A".repeat(101)));
        assert!(result.contains("Short title"));
        assert!(result.contains("Total Meetings: 2"));
    }

    #[test]
    fn test_title_counts_are_right_aligned() {
        let meetings: Vec<_> = (0..12).map(|_| meeting(5, 10, "Weekly", 1.0)).collect();
        let result = SummaryFormatter::default().format(&meetings, &stats_for(&meetings), summer_now());

        assert!(result.contains("  12 | Weekly"));
    }
}
