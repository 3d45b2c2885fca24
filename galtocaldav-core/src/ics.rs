use chrono::{NaiveDateTime, Utc};

use crate::{CalendarEvent, IcsOptions};

const LOCAL_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// ICS日历生成器
pub struct IcsGenerator {
    options: IcsOptions,
}

impl IcsGenerator {
    pub fn new(options: IcsOptions) -> Self {
        Self { options }
    }

    /// 生成只包含一个事件的ICS日历内容
    pub fn generate(&self, event: &CalendarEvent) -> String {
        let mut ics_content = String::new();

        ics_content.push_str("BEGIN:VCALENDAR\r\n");
        ics_content.push_str("VERSION:2.0\r\n");
        ics_content.push_str("PRODID:-//galtocaldav//Galaktika Timetable//EN\r\n");
        ics_content.push_str("CALSCALE:GREGORIAN\r\n");

        self.add_event(&mut ics_content, event);

        ics_content.push_str("END:VCALENDAR\r\n");

        ics_content
    }

    fn add_event(&self, ics_content: &mut String, event: &CalendarEvent) {
        let dtstamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        ics_content.push_str("BEGIN:VEVENT\r\n");
        ics_content.push_str(&format!("UID:{}\r\n", event.uid));
        ics_content.push_str(&format!("DTSTAMP:{}\r\n", dtstamp));
        ics_content.push_str(&format!("{}\r\n", self.date_property("DTSTART", event.starts_at)));
        ics_content.push_str(&format!("{}\r\n", self.date_property("DTEND", event.ends_at)));
        ics_content.push_str(&format!("SUMMARY:{}\r\n", escape_text(&event.summary)));

        if let Some(reminder_minutes) = self.options.reminder_minutes {
            ics_content.push_str("BEGIN:VALARM\r\n");
            ics_content.push_str("ACTION:DISPLAY\r\n");
            ics_content.push_str(&format!("DESCRIPTION:{}\r\n", escape_text(&event.summary)));
            ics_content.push_str(&format!("TRIGGER:-PT{}M\r\n", reminder_minutes));
            ics_content.push_str("END:VALARM\r\n");
        }

        ics_content.push_str("END:VEVENT\r\n");
    }

    /// 无时区时写浮动时间（课表服务返回的是当地时间）
    fn date_property(&self, name: &str, value: NaiveDateTime) -> String {
        let formatted = value.format(LOCAL_DATETIME_FORMAT);
        match self.options.timezone.as_deref() {
            Some(tz) if !tz.is_empty() => format!("{};TZID={}:{}", name, tz, formatted),
            _ => format!("{}:{}", name, formatted),
        }
    }
}

impl Default for IcsGenerator {
    fn default() -> Self {
        Self::new(IcsOptions::default())
    }
}

/// 转义ICS文本内容
pub fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
        .replace('\r', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

#[cfg(test)]
mod tests;
