use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::utils::time::date_time_to_millis;

/// 服务器配置 - 预订引擎的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_PATH | reserva.db | SQLite 数据库文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | TIMEZONE | Europe/Madrid | 业务时区 (IANA) |
/// | BOOKING_DURATION_MINUTES | 90 | 默认用餐时长 |
/// | SLOT_GRANULARITY_MINUTES | 30 | 扫描步长 |
/// | SERVICE_WINDOWS | 13:00-16:00,20:00-23:30 | 营业时段 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 日志文件目录 |
///
/// # 示例
///
/// ```ignore
/// DATABASE_PATH=/data/reserva.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 业务时区 - 所有日期/时刻输入按此时区换算为绝对时间戳
    pub timezone: Tz,
    /// 默认预订时长 (分钟)
    pub booking_duration_minutes: i64,
    /// 空位扫描步长 (分钟)
    pub slot_granularity_minutes: i64,
    /// 营业时段 (午市/晚市)
    pub service_windows: Vec<ServiceWindow>,
    /// 日志级别: trace | debug | info | warn | error
    pub log_level: String,
    /// 日志文件目录 (未设置则仅输出到 stdout)
    pub log_dir: Option<String>,
}

/// One span of the day during which bookings are offered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "reserva.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|tz| parse_timezone(&tz))
                .unwrap_or(chrono_tz::Europe::Madrid),
            booking_duration_minutes: positive_minutes("BOOKING_DURATION_MINUTES", 90),
            slot_granularity_minutes: positive_minutes("SLOT_GRANULARITY_MINUTES", 30),
            service_windows: std::env::var("SERVICE_WINDOWS")
                .ok()
                .map(|v| parse_service_windows(&v))
                .unwrap_or_else(default_service_windows),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    pub fn booking_duration_ms(&self) -> i64 {
        self.booking_duration_minutes * 60_000
    }

    pub fn slot_granularity_ms(&self) -> i64 {
        self.slot_granularity_minutes * 60_000
    }

    /// 某日期的营业时段 → 绝对毫秒区间 (业务时区)
    ///
    /// 结束时刻不晚于开始时刻的时段视为跨午夜，顺延到次日。
    pub fn service_windows_millis(&self, date: NaiveDate) -> Vec<(i64, i64)> {
        self.service_windows
            .iter()
            .map(|w| {
                let start = date_time_to_millis(date, w.start, self.timezone);
                let end_date = if w.end <= w.start {
                    date.succ_opt().unwrap_or(date)
                } else {
                    date
                };
                let end = date_time_to_millis(end_date, w.end, self.timezone);
                (start, end)
            })
            .collect()
    }
}

/// 分钟数环境变量；非正数或无法解析时回退默认值 (扫描步长必须前进)
fn positive_minutes(var: &str, default: i64) -> i64 {
    match std::env::var(var).ok().and_then(|v| v.parse::<i64>().ok()) {
        Some(minutes) if minutes > 0 => minutes,
        Some(minutes) => {
            tracing::warn!("{var}={minutes} is not positive, using default {default}");
            default
        }
        None => default,
    }
}

fn parse_timezone(name: &str) -> Option<Tz> {
    match name.parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            tracing::warn!("Unknown TIMEZONE '{}', falling back to Europe/Madrid", name);
            None
        }
    }
}

fn default_service_windows() -> Vec<ServiceWindow> {
    parse_service_windows("13:00-16:00,20:00-23:30")
}

/// 解析营业时段串 "HH:MM-HH:MM,HH:MM-HH:MM"，无法解析的片段跳过并警告
pub fn parse_service_windows(spec: &str) -> Vec<ServiceWindow> {
    spec.split(',')
        .filter_map(|span| {
            let span = span.trim();
            if span.is_empty() {
                return None;
            }
            let (start, end) = span.split_once('-')?;
            let parse = |s: &str| NaiveTime::parse_from_str(s.trim(), "%H:%M").ok();
            match (parse(start), parse(end)) {
                (Some(start), Some(end)) => Some(ServiceWindow { start, end }),
                _ => {
                    tracing::warn!("Skipping unparsable service window '{}'", span);
                    None
                }
            }
        })
        .collect()
}
