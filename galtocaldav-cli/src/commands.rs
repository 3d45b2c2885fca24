use anyhow::Result;
use chrono::Local;
use galtocaldav_core::{prelude::*, sync};

/// 同步命令参数
pub struct SyncParams {
    pub week: WeekSelector,
    pub subject_id: i64,
    pub receiver_kind: ReceiverKind,
    pub calendar_index: usize,
    pub api_url: String,
    pub caldav_url: String,
    pub login: String,
    pub password: String,
    pub timeout: Option<u64>,
    pub timezone: Option<String>,
    pub reminder_minutes: Option<u32>,
}

/// 同步命令
pub async fn sync_command(params: SyncParams) -> Result<()> {
    let week = params.week.window(Local::now().date_naive());
    tracing::info!("同步{:?}周: {} - {}", params.week, week.start, week.end);

    let request = RequestParams {
        subject_id: params.subject_id,
        receiver_kind: params.receiver_kind,
        from_date: week.start,
        to_date: week.end,
        api_url: params.api_url,
    };

    let fetcher = TimetableFetcher::new(&TimetableConfig {
        timeout: params.timeout,
    })?;
    let connector = caldav_connector(
        params.caldav_url,
        params.login,
        params.password,
        params.timeout,
    )
    .with_ics_options(IcsOptions {
        timezone: params.timezone,
        reminder_minutes: params.reminder_minutes,
    });

    let outcome = sync::run(&fetcher, &request, &connector, params.calendar_index).await?;
    match outcome {
        SyncOutcome::Created { calendar, events } => {
            println!("✓ 已在 {} 中创建 {} 个事件", calendar, events);
        }
        SyncOutcome::CalendarNotFound { index, available } => {
            println!("! 未找到第 {} 个日历（共 {} 个），没有写入任何事件", index, available);
        }
    }

    Ok(())
}

/// 列出日历命令
pub async fn calendars_command(
    caldav_url: String,
    login: String,
    password: String,
    timeout: Option<u64>,
) -> Result<()> {
    tracing::info!("列出 {} 上 {} 的日历", caldav_url, login);

    let client = caldav_connector(caldav_url, login, password, timeout)
        .connect()
        .await?;
    let calendars = client.calendars().await?;

    if calendars.is_empty() {
        println!("没有可用的日历");
    } else {
        println!("可用的日历:");
        for (index, calendar) in calendars.iter().enumerate() {
            println!("  {} - {}", index, calendar);
        }
    }

    Ok(())
}

fn caldav_connector(
    caldav_url: String,
    login: String,
    password: String,
    timeout: Option<u64>,
) -> CalDavConnector {
    CalDavConnector::new(
        caldav_url,
        Credentials {
            username: login,
            password,
        },
    )
    .with_timeout(timeout)
}
