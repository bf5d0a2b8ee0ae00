// Core Domain
// 型解決、スキーマモデル、設定、応答エンベロープの純粋なドメイン定義

pub mod config;
pub mod ddl;
pub mod error;
pub mod field_type;
pub mod preferences;
pub mod response;
pub mod schema;
