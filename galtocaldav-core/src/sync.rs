use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    CalendarEvent, Error, Lesson, ReceiverKind, RemoteCalendar, RequestParams, Result,
    lesson::parse_lessons, timetable::TimetableFetcher,
};

/// 与日历服务器之间的一次会话
///
/// 值被丢弃时会话随之释放
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// 当前用户可用的日历，保持服务端顺序
    async fn calendars(&self) -> Result<Vec<RemoteCalendar>>;

    /// 在 `calendar` 中创建一个事件
    async fn create_event(&self, calendar: &RemoteCalendar, event: &CalendarEvent) -> Result<()>;
}

/// 打开 [`CalendarStore`] 会话，持有服务器地址与凭据
#[async_trait]
pub trait CalendarConnector: Send + Sync {
    type Store: CalendarStore;

    async fn connect(&self) -> Result<Self::Store>;
}

/// 同步结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Created {
        calendar: RemoteCalendar,
        events: usize,
    },
    /// 日历序号越界，没有写入任何事件
    CalendarNotFound { index: usize, available: usize },
}

impl SyncOutcome {
    pub fn events_created(&self) -> usize {
        match self {
            SyncOutcome::Created { events, .. } => *events,
            SyncOutcome::CalendarNotFound { .. } => 0,
        }
    }
}

/// 把课程写入远程日历，每节课一个事件
pub struct CalendarSynchronizer {
    receiver_kind: ReceiverKind,
}

impl CalendarSynchronizer {
    pub fn new(receiver_kind: ReceiverKind) -> Self {
        Self { receiver_kind }
    }

    /// 构建事件标题
    ///
    /// 教师的标题带上班级，班级课表不需要
    pub fn summary(&self, lesson: &Lesson) -> String {
        match self.receiver_kind {
            ReceiverKind::Lecturer => format!(
                "{} {} {} {}",
                lesson.kind, lesson.title, lesson.room, lesson.group
            ),
            ReceiverKind::Group => format!("{} {} {}", lesson.kind, lesson.title, lesson.room),
        }
    }

    pub fn event_for(&self, lesson: &Lesson) -> CalendarEvent {
        CalendarEvent {
            uid: Uuid::new_v4().to_string(),
            starts_at: lesson.starts_at,
            ends_at: lesson.ends_at,
            summary: self.summary(lesson),
        }
    }

    /// 把 `lessons` 写入序号为 `calendar_index` 的日历
    ///
    /// 失败前已创建的事件保留。序号越界时不写入任何内容，
    /// 返回 [`SyncOutcome::CalendarNotFound`] 而不是错误。
    pub async fn sync<C: CalendarConnector>(
        &self,
        connector: &C,
        lessons: &[Lesson],
        calendar_index: usize,
    ) -> Result<SyncOutcome> {
        if lessons.is_empty() {
            return Err(Error::EmptyTimetable);
        }

        let store = connector.connect().await?;
        let calendars = store.calendars().await?;
        tracing::debug!("Principal has {} calendars", calendars.len());

        let Some(calendar) = calendars.get(calendar_index) else {
            tracing::warn!(
                "Calendar index {} is out of range ({} calendars available), nothing was synced",
                calendar_index,
                calendars.len()
            );
            return Ok(SyncOutcome::CalendarNotFound {
                index: calendar_index,
                available: calendars.len(),
            });
        };

        tracing::info!("Syncing {} lessons into {}", lessons.len(), calendar);
        for lesson in lessons {
            let event = self.event_for(lesson);
            tracing::debug!("Creating event '{}' at {}", event.summary, event.starts_at);
            store.create_event(calendar, &event).await?;
        }

        Ok(SyncOutcome::Created {
            calendar: calendar.clone(),
            events: lessons.len(),
        })
    }
}

/// 完整的一次同步：获取课表、解析、写入日历
///
/// 任一阶段失败都会中止，之后的阶段不会执行
pub async fn run<C: CalendarConnector>(
    fetcher: &TimetableFetcher,
    request: &RequestParams,
    connector: &C,
    calendar_index: usize,
) -> Result<SyncOutcome> {
    let records = fetcher.fetch(request).await?;
    let lessons = parse_lessons(&records)?;
    tracing::info!("Parsed {} lessons", lessons.len());

    CalendarSynchronizer::new(request.receiver_kind)
        .sync(connector, &lessons, calendar_index)
        .await
}
