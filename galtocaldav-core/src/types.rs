use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::Error;

/// 课表接收方类型
///
/// 课表服务用 `1` 表示教师，`3` 表示班级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiverKind {
    Lecturer,
    Group,
}

impl ReceiverKind {
    /// 课表接口的 `receiverType` 数值
    pub fn code(self) -> u8 {
        match self {
            ReceiverKind::Lecturer => 1,
            ReceiverKind::Group => 3,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, Error> {
        match code {
            1 => Ok(ReceiverKind::Lecturer),
            3 => Ok(ReceiverKind::Group),
            other => Err(Error::InvalidReceiverKind(other.to_string())),
        }
    }
}

impl FromStr for ReceiverKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lecturer" => Ok(ReceiverKind::Lecturer),
            "group" => Ok(ReceiverKind::Group),
            other => other
                .parse::<i64>()
                .map_err(|_| Error::InvalidReceiverKind(s.to_string()))
                .and_then(Self::from_code),
        }
    }
}

impl fmt::Display for ReceiverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiverKind::Lecturer => write!(f, "lecturer"),
            ReceiverKind::Group => write!(f, "group"),
        }
    }
}

/// 要同步的周，相对于今天
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekSelector {
    Current,
    Next,
}

impl FromStr for WeekSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(WeekSelector::Current),
            "next" => Ok(WeekSelector::Next),
            other => Err(Error::Config(format!(
                "Unknown week '{}', expected 'current' or 'next'",
                other
            ))),
        }
    }
}

/// 课表查询请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    /// 讲师或班级的外部ID
    pub subject_id: i64,
    pub receiver_kind: ReceiverKind,
    /// 起始日期（含）
    pub from_date: NaiveDate,
    /// 结束日期（含）
    pub to_date: NaiveDate,
    /// 课表服务基础URL
    pub api_url: String,
}

/// 一节课，可以直接写入日历
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    /// 缩写后的课程名
    pub title: String,
    /// 缩写后的课程类型（讲座、研讨课等）
    pub kind: String,
    /// 班级/流/小组，可能为空
    pub group: String,
    pub room: String,
}

/// 课表服务返回的原始课程记录
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLesson {
    pub date: String,
    pub begin_lesson: String,
    pub end_lesson: String,
    pub discipline: String,
    pub kind_of_work: String,
    #[serde(default)]
    pub auditorium: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub list_groups: Vec<RawGroup>,
    #[serde(default)]
    pub stream: Option<String>,
    #[serde(default)]
    pub sub_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawGroup {
    pub group: String,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// CalDAV用户凭据
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// 课表服务配置
#[derive(Debug, Clone, Default)]
pub struct TimetableConfig {
    /// 请求超时（秒），None 表示不设超时
    pub timeout: Option<u64>,
}

/// 即将写入远程日历的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub summary: String,
}

/// 在CalDAV服务器上发现的日历集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCalendar {
    pub url: reqwest::Url,
    pub name: Option<String>,
}

impl fmt::Display for RemoteCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.url),
            None => write!(f, "<{}>", self.url),
        }
    }
}

/// ICS生成选项
#[derive(Debug, Clone, Default)]
pub struct IcsOptions {
    /// 时区 (TZID)，None 时写入浮动时间
    pub timezone: Option<String>,
    pub reminder_minutes: Option<u32>,
}
