//! CourseGen - AI 辅助课程生成服务
//!
//! 基于 Actix Web 构建，调用大模型生成课程结构、章节正文、测验和闪卡，
//! 并对生成内容做可读性、偏见和教学质量评估。
//!
//! # 架构
//! - `ai`: 大模型提供方（OpenAI/Anthropic）与主备切换客户端
//! - `cache`: 缓存层（Moka/Redis）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `generation`: 课程生成流水线与任务队列
//! - `middlewares`: 限流与请求日志中间件
//! - `models`: 数据模型定义
//! - `quality`: 内容质量评估
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数
//! - `vector`: 向量存储（Chroma/Pinecone/内存）

#[macro_use]
pub mod models;

pub mod ai;
pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod generation;
pub mod middlewares;
pub mod quality;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
pub mod vector;
