pub mod api;
pub mod config;
pub mod entities;
pub mod ingest;
pub mod jwt;
pub mod likes;
pub mod meals;
pub mod menus;
pub mod metrics;
pub mod migrator;
pub mod mnd;
pub mod page;
pub mod reviews;
pub mod telemetry;
pub mod week;
pub mod worker;

pub use redis;
pub use sea_orm;
