//! Shared server state

use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppError;

/// 服务器状态 - 持有配置与数据库连接池
///
/// 引擎不在请求之间缓存任何日历状态：Calendar Store (SQLite) 是唯一的
/// 共享可变资源，并发正确性由 coordinator 的事务边界保证。
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置 (不可变)
    pub config: Config,
    /// 数据库服务
    pub db: DbService,
}

impl ServerState {
    /// Initialize state: open the database and run migrations
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;
        Ok(Self {
            config: config.clone(),
            db,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }
}
