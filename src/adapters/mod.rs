// Adapters
// データベース、DDL生成、メタデータ取得へのアクセスを抽象化

pub mod connection_string;
pub mod database;
pub mod ddl_executor;
pub mod materializer;
pub mod metadata_source;
pub mod sql_generator;
pub mod sql_quote;
