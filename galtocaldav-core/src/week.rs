use chrono::{Datelike, Duration, NaiveDate};

use crate::WeekSelector;

/// 一周的日期范围 [周一, 周日]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// 计算包含指定日期的那一周
    pub fn containing(reference: NaiveDate) -> Self {
        let days_since_monday = reference.weekday().num_days_from_monday();
        let start = reference - Duration::days(i64::from(days_since_monday));
        Self {
            start,
            end: start + Duration::days(6),
        }
    }
}

impl WeekSelector {
    /// 所选周的参考日期，`Next` 为今天加七天
    pub fn reference_date(self, today: NaiveDate) -> NaiveDate {
        match self {
            WeekSelector::Current => today,
            WeekSelector::Next => today + Duration::days(7),
        }
    }

    pub fn window(self, today: NaiveDate) -> WeekWindow {
        WeekWindow::containing(self.reference_date(today))
    }
}
