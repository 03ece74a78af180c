use crate::components::google_calendar::CalendarEvent;
use chrono::NaiveDate;

/// Render the daily note for `date`
pub fn render_markdown(events: &[CalendarEvent], date: NaiveDate) -> String {
    let mut markdown = format!("# 📅 Events for {}\n\n", date.format("%a %b %d %Y"));

    for event in events {
        let summary = event.summary.as_deref().unwrap_or("Unnamed event");
        let start = event.start().unwrap_or("Time unknown");

        markdown.push_str(&format!("## {}\n📅 {}\n", summary, start));
        if let Some(link) = &event.html_link {
            markdown.push_str(&format!("🔗 [Event Link]({})\n", link));
        }
        markdown.push('\n');
    }

    markdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn event(summary: &str, start: &str, link: &str) -> CalendarEvent {
        CalendarEvent {
            id: summary.to_lowercase(),
            summary: Some(summary.to_string()),
            start_date_time: Some(start.to_string()),
            html_link: Some(link.to_string()),
            ..Default::default()
        }
    }

    fn subsection_count(markdown: &str) -> usize {
        markdown.lines().filter(|line| line.starts_with("## ")).count()
    }

    #[test]
    fn test_empty_list_renders_heading_only() {
        let markdown = render_markdown(&[], date());
        assert_eq!(markdown, "# 📅 Events for Wed Jan 10 2024\n\n");
        assert_eq!(subsection_count(&markdown), 0);
    }

    #[test]
    fn test_standup_scenario() {
        let markdown = render_markdown(
            &[event("Standup", "2024-01-10T09:00:00Z", "https://x/1")],
            date(),
        );

        assert!(markdown.contains("## Standup"));
        assert!(markdown.contains("2024-01-10T09:00:00Z"));
        assert!(markdown.contains("[Event Link](https://x/1)"));
        assert_eq!(
            markdown,
            "# 📅 Events for Wed Jan 10 2024\n\n\
             ## Standup\n📅 2024-01-10T09:00:00Z\n🔗 [Event Link](https://x/1)\n\n"
        );
    }

    #[test]
    fn test_one_subsection_per_event() {
        let events = vec![
            event("Standup", "2024-01-10T09:00:00Z", "https://x/1"),
            event("Design review", "2024-01-10T13:30:00+02:00", "https://x/2"),
            event("Retro", "2024-01-12T15:00:00Z", "https://x/3"),
        ];
        let markdown = render_markdown(&events, date());

        assert_eq!(subsection_count(&markdown), events.len());
        for e in &events {
            assert!(markdown.contains(&format!("## {}\n", e.summary.as_deref().unwrap())));
            assert!(markdown.contains(&format!("({})", e.html_link.as_deref().unwrap())));
        }
    }

    #[test]
    fn test_all_day_event_uses_date() {
        let all_day = CalendarEvent {
            summary: Some("Holiday".to_string()),
            start_date: Some("2024-01-11".to_string()),
            html_link: Some("https://x/4".to_string()),
            ..Default::default()
        };
        let markdown = render_markdown(&[all_day], date());
        assert!(markdown.contains("## Holiday\n📅 2024-01-11\n"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let events = vec![event("Standup", "2024-01-10T09:00:00Z", "https://x/1")];
        assert_eq!(render_markdown(&events, date()), render_markdown(&events, date()));
    }
}
