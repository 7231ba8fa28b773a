//! Reserva Server - 餐厅桌台预订引擎
//!
//! # 架构概述
//!
//! Table availability & booking assignment engine. Given a date, a time
//! window and a party size, it decides whether a table (or a legal
//! combination of tables) is free, selects the best assignment and commits
//! it as one atomic reservation.
//!
//! # 模块结构
//!
//! ```text
//! reserva-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── booking/       # 引擎: catalog / conflict / matcher / scanner / coordinator
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # SQLite 连接池、迁移、repository
//! └── utils/         # 错误、日志、时间工具
//! ```

pub mod api;
pub mod booking;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use booking::{EngineError, RejectReason};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;
