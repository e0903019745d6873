//! HTTP 接口层（Sink 服务器）

pub mod services;
