use chrono::NaiveDateTime;

use crate::{Error, Lesson, RawLesson, Result};

/// 记录中日期与时间拼接后的格式
pub const LESSON_TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M";

const ABBREVIATION_LEN: usize = 3;

/// 把一条原始课表记录规范化为 [`Lesson`]
///
/// 下课时间不晚于上课时间的记录会被拒绝
pub fn parse_lesson(record: &RawLesson) -> Result<Lesson> {
    let starts_at = parse_timestamp(&record.date, &record.begin_lesson)?;
    let ends_at = parse_timestamp(&record.date, &record.end_lesson)?;
    if ends_at <= starts_at {
        return Err(Error::InvalidLessonInterval {
            start: starts_at,
            end: ends_at,
        });
    }

    Ok(Lesson {
        starts_at,
        ends_at,
        title: abbreviate_title(&record.discipline),
        kind: truncate_chars(&record.kind_of_work, ABBREVIATION_LEN).to_string(),
        group: resolve_group(record),
        room: record.auditorium.clone().unwrap_or_default(),
    })
}

/// 批量解析，遇到第一条格式错误的记录即失败
pub fn parse_lessons(records: &[RawLesson]) -> Result<Vec<Lesson>> {
    records.iter().map(parse_lesson).collect()
}

fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime> {
    let value = format!("{} {}", date, time);
    NaiveDateTime::parse_from_str(&value, LESSON_TIMESTAMP_FORMAT)
        .map_err(|source| Error::MalformedTimestamp { value, source })
}

/// "Operating Systems Design" -> "Ope Sys Des"
pub fn abbreviate_title(discipline: &str) -> String {
    discipline
        .split_whitespace()
        .map(|word| truncate_chars(word, ABBREVIATION_LEN))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 按字符截断，避免切到多字节字符中间
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 班级优先级：第一个班级名，其次是流，最后是小组
fn resolve_group(record: &RawLesson) -> String {
    if let Some(first) = record.list_groups.first() {
        return first.group.clone();
    }

    [&record.stream, &record.sub_group]
        .into_iter()
        .flatten()
        .find(|label| !label.is_empty())
        .cloned()
        .unwrap_or_default()
}
