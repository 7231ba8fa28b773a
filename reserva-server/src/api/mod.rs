//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`tables`] - 桌台目录管理接口 (引擎只读，管理端维护)
//! - [`bookings`] - 预订创建/取消/查询接口
//! - [`availability`] - 按天扫描可预订时段接口

use axum::Router;

use crate::core::ServerState;

pub mod availability;
pub mod bookings;
pub mod health;
pub mod tables;

/// Assemble all routes
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(tables::router())
        .merge(bookings::router())
        .merge(availability::router())
}
