// Services Layer
// ドメインロジックを実行するサービス層

pub mod org_features;
pub mod schema_builder;
pub mod schema_serializer;
pub mod session;
pub mod table_planner;
