//! Infrastructure layer: row reads, SQL executor requests, config, and the
//! release cascade orchestrator that composes them.

pub mod config;
pub mod read_model;
pub mod release_caller;
pub mod sql_executor;

pub use config::{ConfigError, ServiceConfig};
pub use read_model::{InMemoryRowReader, PostgresRowReader, RowReader, RowReaderError};
pub use release_caller::ReleaseCaller;
pub use sql_executor::{
    check_result, ScriptedReply, ScriptedSqlExecutor, SqlExecutor, SqlExecutorError,
    SqlUpdateRequest,
};
#[cfg(feature = "redis")]
pub use sql_executor::RedisSqlExecutor;
