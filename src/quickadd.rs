/// Quick-add parser
///
/// Deterministic, pure transformation of one free-text line into a task
/// draft. The parser knows nothing about storage or users; "now" is passed
/// in so relative dates resolve the same way in tests and production.
///
/// # Markers
///
/// - `#word` — tag name, lowercased, deduplicated; any number of them
/// - `!high` / `!h` / `!medium` / `!m` / `!low` / `!l` — priority, first
///   match wins, absence leaves the default (medium)
/// - date phrase — `today`, `tomorrow`, a weekday name, `in N day(s)`,
///   `MM/DD[/YYYY]`, or `YYYY-MM-DD`, optionally followed by a clock time
///   `HH:MM[am|pm]`; the first unambiguous match is consumed
///
/// Markers may appear anywhere and in any order. Everything the parser does
/// not recognize stays in the title — unresolvable fragments are preserved,
/// never guessed at or dropped. An input consumed entirely by markers fails
/// validation (empty title).
///
/// # Example
///
/// ```
/// use taskdeck::models::Priority;
/// use taskdeck::quickadd::parse;
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
/// let draft = parse("Buy milk #errands !high tomorrow", now).unwrap();
///
/// assert_eq!(draft.title, "Buy milk");
/// assert_eq!(draft.priority, Priority::High);
/// assert!(draft.tags.contains("errands"));
/// assert_eq!(draft.due_date.unwrap().to_rfc3339(), "2024-01-16T00:00:00+00:00");
/// ```

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::models::Priority;

/// Sigil introducing a tag marker
pub const TAG_SIGIL: char = '#';

/// Sigil introducing a priority marker
pub const PRIORITY_SIGIL: char = '!';

/// Structured output of the parser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDraft {
    /// Leftover text with whitespace collapsed
    pub title: String,

    /// Resolved due instant, if a date phrase was recognized
    pub due_date: Option<DateTime<Utc>>,

    /// Priority, defaults to medium
    pub priority: Priority,

    /// Tag names, lowercased and deduplicated
    pub tags: BTreeSet<String>,
}

/// Parses a free-text task description into a draft
///
/// # Errors
///
/// `Error::Validation` on an empty input or one consumed entirely by
/// markers.
pub fn parse(text: &str, now: DateTime<Utc>) -> Result<TaskDraft> {
    let today = now.date_naive();
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut consumed = vec![false; tokens.len()];

    // Tags: every #word token, anywhere in the input.
    let mut tags = BTreeSet::new();
    for (i, token) in tokens.iter().enumerate() {
        if let Some(name) = parse_tag_marker(token) {
            tags.insert(name);
            consumed[i] = true;
        }
    }

    // Priority: first marker wins; later ones stay in the title.
    let mut priority = Priority::default();
    for (i, token) in tokens.iter().enumerate() {
        if consumed[i] {
            continue;
        }
        if let Some(p) = parse_priority_marker(token) {
            priority = p;
            consumed[i] = true;
            break;
        }
    }

    // Date: first unambiguous phrase wins, optionally followed by a time.
    let mut due_date = None;
    let mut i = 0;
    while i < tokens.len() {
        if consumed[i] {
            i += 1;
            continue;
        }
        if let Some((date, width)) = parse_date_phrase(&tokens, &consumed, i, today) {
            for offset in 0..width {
                consumed[i + offset] = true;
            }

            // Optional trailing clock time.
            let mut time = NaiveTime::MIN;
            let next = i + width;
            if next < tokens.len() && !consumed[next] {
                if let Some(t) = parse_clock_time(tokens[next]) {
                    time = t;
                    consumed[next] = true;
                }
            }

            due_date = Some(Utc.from_utc_datetime(&date.and_time(time)));
            break;
        }
        i += 1;
    }

    // Whatever is left, in original order, is the title.
    let title = tokens
        .iter()
        .zip(&consumed)
        .filter(|(_, used)| !**used)
        .map(|(token, _)| *token)
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        return Err(Error::validation(
            "title",
            "title is empty after removing markers",
        ));
    }

    Ok(TaskDraft {
        title,
        due_date,
        priority,
        tags,
    })
}

/// Recognizes `#word` where word is one or more word characters
fn parse_tag_marker(token: &str) -> Option<String> {
    let name = token.strip_prefix(TAG_SIGIL)?;
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(name.to_lowercase())
}

/// Recognizes `!high`, `!h`, `!medium`, `!m`, `!low`, `!l`
fn parse_priority_marker(token: &str) -> Option<Priority> {
    let word = token.strip_prefix(PRIORITY_SIGIL)?;
    match word.to_ascii_lowercase().as_str() {
        "high" | "h" => Some(Priority::High),
        "medium" | "m" => Some(Priority::Medium),
        "low" | "l" => Some(Priority::Low),
        _ => None,
    }
}

/// Tries to recognize a date phrase starting at `start`
///
/// Returns the resolved date and how many tokens the phrase spans.
fn parse_date_phrase(
    tokens: &[&str],
    consumed: &[bool],
    start: usize,
    today: NaiveDate,
) -> Option<(NaiveDate, usize)> {
    let token = tokens[start];
    let lower = token.to_ascii_lowercase();

    match lower.as_str() {
        "today" => return Some((today, 1)),
        "tomorrow" => return Some((today + Duration::days(1), 1)),
        _ => {}
    }

    if let Some(weekday) = parse_weekday(&lower) {
        return Some((next_weekday(today, weekday), 1));
    }

    // "in N day(s)" spans three tokens, none of which may be consumed yet.
    if lower == "in" && start + 2 < tokens.len() && !consumed[start + 1] && !consumed[start + 2] {
        let n: i64 = tokens[start + 1].parse().ok()?;
        let unit = tokens[start + 2].to_ascii_lowercase();
        if n >= 0 && (unit == "day" || unit == "days") {
            // An offset past the calendar's range is unresolvable; the
            // phrase stays in the title like any other fragment.
            let ahead = Duration::try_days(n)?;
            let date = today.checked_add_signed(ahead)?;
            return Some((date, 3));
        }
        return None;
    }

    parse_absolute_date(token, today).map(|date| (date, 1))
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    match word {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Next strictly-future occurrence of a weekday
///
/// Naming today's weekday means next week, not today.
fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let ahead = (target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let ahead = if ahead == 0 { 7 } else { ahead };
    today + Duration::days(ahead)
}

/// Recognizes `YYYY-MM-DD`, `MM/DD`, and `MM/DD/YYYY`
///
/// Impossible dates (e.g. `13/45`) are rejected so the fragment stays in
/// the title. A missing year means the current year, as written.
fn parse_absolute_date(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        return Some(date);
    }

    let parts: Vec<&str> = token.split('/').collect();
    let (month, day, year) = match parts.as_slice() {
        [m, d] => (m.parse().ok()?, d.parse().ok()?, today.year()),
        [m, d, y] => (m.parse().ok()?, d.parse().ok()?, y.parse().ok()?),
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Recognizes `HH:MM`, `HH:MMam`, `HH:MMpm` (case-insensitive)
fn parse_clock_time(token: &str) -> Option<NaiveTime> {
    let lower = token.to_ascii_lowercase();

    let (body, meridiem) = if let Some(rest) = lower.strip_suffix("am") {
        (rest, Some("am"))
    } else if let Some(rest) = lower.strip_suffix("pm") {
        (rest, Some("pm"))
    } else {
        (lower.as_str(), None)
    };

    let (hours, minutes) = body.split_once(':')?;
    let mut hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;

    match meridiem {
        Some("pm") if hours < 12 => hours += 12,
        Some("am") if hours == 12 => hours = 0,
        Some(_) if hours > 12 => return None,
        _ => {}
    }

    NaiveTime::from_hms_opt(hours, minutes, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    // 2024-01-15 is a Monday.
    const Y: i32 = 2024;

    #[test]
    fn test_plain_title_passes_through() {
        let draft = parse("Just a plain title", at(Y, 1, 15)).unwrap();
        assert_eq!(draft.title, "Just a plain title");
        assert_eq!(draft.priority, Priority::Medium);
        assert!(draft.due_date.is_none());
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn test_full_marker_set() {
        let draft = parse("Buy milk #errands !high tomorrow", at(Y, 1, 15)).unwrap();
        assert_eq!(draft.title, "Buy milk");
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.tags, BTreeSet::from(["errands".to_string()]));
        assert_eq!(draft.due_date, Some(date(Y, 1, 16)));
    }

    #[test]
    fn test_order_independence() {
        let a = parse("Buy milk #errands !high tomorrow", at(Y, 1, 15)).unwrap();
        let b = parse("tomorrow !high Buy milk #errands", at(Y, 1, 15)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_markers_only_fails_empty_title() {
        let err = parse("#tag !high", at(Y, 1, 15)).unwrap_err();
        assert!(err.touches_field("title"));

        let err = parse("", at(Y, 1, 15)).unwrap_err();
        assert!(err.touches_field("title"));

        let err = parse("   ", at(Y, 1, 15)).unwrap_err();
        assert!(err.touches_field("title"));
    }

    #[test]
    fn test_tags_deduplicated_case_insensitively() {
        let draft = parse("Pack bags #Travel #travel #TRAVEL #packing", at(Y, 1, 15)).unwrap();
        assert_eq!(
            draft.tags,
            BTreeSet::from(["travel".to_string(), "packing".to_string()])
        );
        assert_eq!(draft.title, "Pack bags");
    }

    #[test]
    fn test_bare_sigil_stays_in_title() {
        let draft = parse("Review PR #", at(Y, 1, 15)).unwrap();
        assert_eq!(draft.title, "Review PR #");
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn test_priority_short_forms() {
        assert_eq!(parse("x !h", at(Y, 1, 15)).unwrap().priority, Priority::High);
        assert_eq!(parse("x !M", at(Y, 1, 15)).unwrap().priority, Priority::Medium);
        assert_eq!(parse("x !low", at(Y, 1, 15)).unwrap().priority, Priority::Low);
    }

    #[test]
    fn test_first_priority_marker_wins() {
        let draft = parse("Ship it !low !high", at(Y, 1, 15)).unwrap();
        assert_eq!(draft.priority, Priority::Low);
        // The second marker is preserved, not silently dropped.
        assert_eq!(draft.title, "Ship it !high");
    }

    #[test]
    fn test_unknown_priority_word_stays_in_title() {
        let draft = parse("Deploy !urgent", at(Y, 1, 15)).unwrap();
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.title, "Deploy !urgent");
    }

    #[test]
    fn test_today_and_tomorrow() {
        let now = at(Y, 1, 15);
        assert_eq!(parse("x today", now).unwrap().due_date, Some(date(Y, 1, 15)));
        assert_eq!(parse("x Tomorrow", now).unwrap().due_date, Some(date(Y, 1, 16)));
    }

    #[test]
    fn test_weekday_resolves_to_next_occurrence() {
        // 2024-01-15 is a Monday.
        let now = at(Y, 1, 15);
        assert_eq!(parse("x friday", now).unwrap().due_date, Some(date(Y, 1, 19)));
        // Naming today's weekday means next week.
        assert_eq!(parse("x monday", now).unwrap().due_date, Some(date(Y, 1, 22)));
    }

    #[test]
    fn test_in_n_days() {
        let now = at(Y, 1, 15);
        let draft = parse("Follow up in 3 days", now).unwrap();
        assert_eq!(draft.due_date, Some(date(Y, 1, 18)));
        assert_eq!(draft.title, "Follow up");

        let draft = parse("Ping in 1 day", now).unwrap();
        assert_eq!(draft.due_date, Some(date(Y, 1, 16)));
    }

    #[test]
    fn test_out_of_range_day_offset_stays_in_title() {
        // Past NaiveDate's upper bound.
        let draft = parse("Remind me in 99999999 days", at(Y, 1, 15)).unwrap();
        assert!(draft.due_date.is_none());
        assert_eq!(draft.title, "Remind me in 99999999 days");

        // Large enough to overflow the duration itself.
        let draft = parse("Remind me in 99999999999999999 days", at(Y, 1, 15)).unwrap();
        assert!(draft.due_date.is_none());
        assert_eq!(draft.title, "Remind me in 99999999999999999 days");
    }

    #[test]
    fn test_in_without_number_is_just_a_word() {
        let draft = parse("Check in with the team", at(Y, 1, 15)).unwrap();
        assert_eq!(draft.title, "Check in with the team");
        assert!(draft.due_date.is_none());
    }

    #[test]
    fn test_iso_date() {
        let draft = parse("File taxes 2024-04-15", at(Y, 1, 15)).unwrap();
        assert_eq!(draft.due_date, Some(date(Y, 4, 15)));
        assert_eq!(draft.title, "File taxes");
    }

    #[test]
    fn test_slash_date_defaults_to_current_year() {
        let draft = parse("Dentist 03/20", at(Y, 1, 15)).unwrap();
        assert_eq!(draft.due_date, Some(date(Y, 3, 20)));

        let draft = parse("Renewal 06/01/2025", at(Y, 1, 15)).unwrap();
        assert_eq!(draft.due_date, Some(date(2025, 6, 1)));
    }

    #[test]
    fn test_impossible_date_stays_in_title() {
        let draft = parse("Score was 13/45 yesterday", at(Y, 1, 15)).unwrap();
        assert!(draft.due_date.is_none());
        assert_eq!(draft.title, "Score was 13/45 yesterday");
    }

    #[test]
    fn test_date_with_clock_time() {
        let draft = parse("Standup tomorrow 09:30", at(Y, 1, 15)).unwrap();
        assert_eq!(
            draft.due_date.unwrap(),
            Utc.with_ymd_and_hms(Y, 1, 16, 9, 30, 0).unwrap()
        );
        assert_eq!(draft.title, "Standup");
    }

    #[test]
    fn test_date_with_meridiem_time() {
        let draft = parse("Dinner friday 7:15pm", at(Y, 1, 15)).unwrap();
        assert_eq!(
            draft.due_date.unwrap(),
            Utc.with_ymd_and_hms(Y, 1, 19, 19, 15, 0).unwrap()
        );

        let draft = parse("Flight tomorrow 12:05am", at(Y, 1, 15)).unwrap();
        assert_eq!(
            draft.due_date.unwrap(),
            Utc.with_ymd_and_hms(Y, 1, 16, 0, 5, 0).unwrap()
        );
    }

    #[test]
    fn test_time_without_date_stays_in_title() {
        let draft = parse("Meeting at 10:30", at(Y, 1, 15)).unwrap();
        assert!(draft.due_date.is_none());
        assert_eq!(draft.title, "Meeting at 10:30");
    }

    #[test]
    fn test_first_date_wins_second_stays() {
        let draft = parse("Move today or tomorrow", at(Y, 1, 15)).unwrap();
        assert_eq!(draft.due_date, Some(date(Y, 1, 15)));
        assert_eq!(draft.title, "Move or tomorrow");
    }

    #[test]
    fn test_whitespace_collapsed() {
        let draft = parse("  Buy   milk   #errands  ", at(Y, 1, 15)).unwrap();
        assert_eq!(draft.title, "Buy milk");
    }

    #[test]
    fn test_embedded_words_do_not_trigger_dates() {
        // "Today's" is not the token "today".
        let draft = parse("Today's retro notes", at(Y, 1, 15)).unwrap();
        assert!(draft.due_date.is_none());
        assert_eq!(draft.title, "Today's retro notes");
    }

    #[test]
    fn test_next_weekday_math() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            next_weekday(monday, Weekday::Tue),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()
        );
        assert_eq!(
            next_weekday(monday, Weekday::Sun),
            NaiveDate::from_ymd_opt(2024, 1, 21).unwrap()
        );
        assert_eq!(
            next_weekday(monday, Weekday::Mon),
            NaiveDate::from_ymd_opt(2024, 1, 22).unwrap()
        );
    }

    #[test]
    fn test_parse_clock_time_bounds() {
        assert_eq!(
            parse_clock_time("23:59"),
            NaiveTime::from_hms_opt(23, 59, 0)
        );
        assert!(parse_clock_time("24:00").is_none());
        assert!(parse_clock_time("10:60").is_none());
        assert!(parse_clock_time("13:00pm").is_none());
        assert!(parse_clock_time("1030").is_none());
    }
}
