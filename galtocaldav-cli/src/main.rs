mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use galtocaldav_core::{ReceiverKind, WeekSelector};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "galtocaldav")]
#[command(about = "把 Galaktika 课表同步到 CalDAV 日历")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 启用详细日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 获取一周课表并写入日历
    Sync {
        /// 要同步的周 (current, next)
        #[arg(short, long)]
        week: WeekSelector,

        /// 教师或班级的ID
        #[arg(short, long)]
        id: i64,

        /// 课表接收方类型：1 (教师) 或 3 (班级)
        #[arg(short = 't', long = "type")]
        receiver_kind: ReceiverKind,

        /// 要同步的日历序号
        #[arg(short = 'n', long, default_value_t = 0)]
        number: usize,

        /// 课表服务基础URL
        #[arg(long, env = "API_URL")]
        api_url: String,

        #[command(flatten)]
        caldav: CalDavArgs,

        /// 写入事件的时区 (TZID)，不指定时使用浮动时间
        #[arg(long)]
        timezone: Option<String>,

        /// 提醒时间（分钟）
        #[arg(long)]
        reminder_minutes: Option<u32>,
    },

    /// 列出CalDAV服务器上可用的日历
    Calendars {
        #[command(flatten)]
        caldav: CalDavArgs,
    },
}

#[derive(Args)]
struct CalDavArgs {
    /// CalDAV服务器URL
    #[arg(long, env = "CALDAV_URL")]
    caldav_url: String,

    /// CalDAV用户名
    #[arg(long, env = "LOGIN")]
    login: String,

    /// CalDAV密码
    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    password: String,

    /// 请求超时（秒），默认不设超时
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 设置日志级别
    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("galtocaldav_cli={0},galtocaldav_core={0}", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Sync {
            week,
            id,
            receiver_kind,
            number,
            api_url,
            caldav,
            timezone,
            reminder_minutes,
        } => {
            commands::sync_command(commands::SyncParams {
                week,
                subject_id: id,
                receiver_kind,
                calendar_index: number,
                api_url,
                caldav_url: caldav.caldav_url,
                login: caldav.login,
                password: caldav.password,
                timeout: caldav.timeout,
                timezone,
                reminder_minutes,
            })
            .await
        }

        Commands::Calendars { caldav } => {
            commands::calendars_command(
                caldav.caldav_url,
                caldav.login,
                caldav.password,
                caldav.timeout,
            )
            .await
        }
    }
}
