use super::*;
use chrono::NaiveDate;
use ical::parser::ical::{IcalParser, component::IcalEvent};

fn sample_event() -> CalendarEvent {
    let day = NaiveDate::from_ymd_opt(2024, 5, 13).unwrap();
    CalendarEvent {
        uid: "3f1c2a9e-0000-4000-8000-000000000001".to_string(),
        starts_at: day.and_hms_opt(9, 30, 0).unwrap(),
        ends_at: day.and_hms_opt(11, 5, 0).unwrap(),
        summary: "Lec Ope Sys Des A-101 CS-101".to_string(),
    }
}

fn event_property<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a str> {
    event
        .properties
        .iter()
        .find(|prop| prop.name == name)
        .and_then(|prop| prop.value.as_deref())
}

#[test]
fn test_floating_event() {
    let ics_content = IcsGenerator::default().generate(&sample_event());

    assert!(ics_content.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(ics_content.ends_with("END:VCALENDAR\r\n"));
    assert!(ics_content.contains("UID:3f1c2a9e-0000-4000-8000-000000000001\r\n"));
    assert!(ics_content.contains("DTSTART:20240513T093000\r\n"));
    assert!(ics_content.contains("DTEND:20240513T110500\r\n"));
    assert!(ics_content.contains("SUMMARY:Lec Ope Sys Des A-101 CS-101\r\n"));
    assert!(!ics_content.contains("VALARM"));
}

#[test]
fn test_timezone_and_reminder() {
    let generator = IcsGenerator::new(IcsOptions {
        timezone: Some("Europe/Moscow".to_string()),
        reminder_minutes: Some(10),
    });
    let ics_content = generator.generate(&sample_event());

    assert!(ics_content.contains("DTSTART;TZID=Europe/Moscow:20240513T093000\r\n"));
    assert!(ics_content.contains("DTEND;TZID=Europe/Moscow:20240513T110500\r\n"));
    assert!(ics_content.contains("BEGIN:VALARM\r\n"));
    assert!(ics_content.contains("TRIGGER:-PT10M\r\n"));
}

#[test]
fn test_output_parses_as_icalendar() {
    let mut event = sample_event();
    event.summary = "Sem Mat B-7; room, annex".to_string();
    let ics_content = IcsGenerator::default().generate(&event);

    let calendar = IcalParser::new(ics_content.as_bytes())
        .next()
        .expect("no calendar in output")
        .expect("generated ICS does not parse");

    assert_eq!(calendar.events.len(), 1);
    let parsed = &calendar.events[0];
    assert_eq!(
        event_property(parsed, "UID"),
        Some("3f1c2a9e-0000-4000-8000-000000000001")
    );
    assert_eq!(event_property(parsed, "DTSTART"), Some("20240513T093000"));
    assert_eq!(event_property(parsed, "DTEND"), Some("20240513T110500"));
    let summary = event_property(parsed, "SUMMARY").unwrap();
    assert!(summary.starts_with("Sem Mat B-7"));
    assert!(summary.ends_with("annex"));
}

#[test]
fn test_escape_text() {
    assert_eq!(escape_text("a,b;c"), "a\\,b\\;c");
    assert_eq!(escape_text("line1\nline2"), "line1\\nline2");
    assert_eq!(escape_text("back\\slash"), "back\\\\slash");
    assert_eq!(escape_text("Лек Мат 301"), "Лек Мат 301");
}
