// セッションサービス
//
// 接続済みのメタデータソース、設定、現在のスキーマ案を保持し、
// 各操作の結果を {status, message, response, request} 形式の応答として返します。
// 失敗はプロセスを終了させず、status=false の応答として報告されます。

use crate::adapters::database::DatabaseConnectionService;
use crate::adapters::ddl_executor::{DdlExecutor, PoolExecutor};
use crate::adapters::materializer::{BuildEvent, BuildReport, TableMaterializer};
use crate::adapters::metadata_source::{fetch_describes, MetadataSource};
use crate::adapters::sql_generator::generator_for;
use crate::core::config::{ConnectionSettings, Dialect};
use crate::core::ddl::TableDefinition;
use crate::core::error::{DatabaseError, IoError, RemoteError};
use crate::core::preferences::PreferenceSet;
use crate::core::response::Response;
use crate::core::schema::NormalizedSchema;
use crate::services::org_features::{recommend_objects, sniff_features};
use crate::services::schema_builder::SchemaBuilder;
use crate::services::schema_serializer::SchemaSerializerService;
use crate::services::table_planner::TablePlanner;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

/// セッション
pub struct Session {
    preferences: PreferenceSet,
    sources: HashMap<String, Arc<dyn MetadataSource>>,
    schema: Option<NormalizedSchema>,
    all_text: bool,
    serializer: SchemaSerializerService,
    connections: DatabaseConnectionService,
}

impl Session {
    /// 新しいSessionを作成
    pub fn new(preferences: PreferenceSet) -> Self {
        Self {
            preferences,
            sources: HashMap::new(),
            schema: None,
            all_text: false,
            serializer: SchemaSerializerService::new(),
            connections: DatabaseConnectionService::new(),
        }
    }

    /// 全ての文字列フィールドをTEXTとして構築する
    pub fn with_all_text(mut self, all_text: bool) -> Self {
        self.all_text = all_text;
        self
    }

    pub fn preferences(&self) -> &PreferenceSet {
        &self.preferences
    }

    /// 現在のスキーマ案
    pub fn schema(&self) -> Option<&NormalizedSchema> {
        self.schema.as_ref()
    }

    /// 接続ハンドルを登録
    pub fn login(&mut self, org: &str, source: Arc<dyn MetadataSource>) -> Response {
        let request = json!({ "org": org });
        if self.sources.insert(org.to_string(), source).is_some() {
            info!(org = %org, "Replacing existing connection");
        }
        info!(org = %org, "Connected org");
        Response::success("Login Successful", json!({ "organizationId": org }), request)
    }

    /// 接続ハンドルを破棄
    pub fn logout(&mut self, org: &str) -> Response {
        let request = json!({ "org": org });
        match self.sources.remove(org) {
            Some(_) => Response::success("Logout Successful", json!({}), request),
            None => {
                let err = RemoteError::NotConnected {
                    org: org.to_string(),
                };
                warn!(error = %err, "Logout failed");
                Response::failure("Logout Failed", json!(err.to_string()), request)
            }
        }
    }

    fn source(&self, org: &str) -> Result<Arc<dyn MetadataSource>, RemoteError> {
        self.sources
            .get(org)
            .cloned()
            .ok_or_else(|| RemoteError::NotConnected {
                org: org.to_string(),
            })
    }

    /// 作成可能なオブジェクトの一覧と推奨オブジェクトを取得
    pub async fn list_objects(&self, org: &str) -> Response {
        let request = json!({ "org": org });
        let summaries = match self.source(org) {
            Ok(source) => source.describe_global().await,
            Err(e) => Err(e),
        };

        match summaries {
            Ok(summaries) => {
                let objects: Vec<_> = summaries.into_iter().filter(|s| s.createable).collect();
                let names: Vec<&str> = objects.iter().map(|s| s.name.as_str()).collect();
                let features = sniff_features(&names);
                let recommended = recommend_objects(&names);
                info!(objects = objects.len(), recommended = recommended.len(), "Listed objects");
                Response::success(
                    "Describe Global Successful",
                    json!({
                        "sobjects": objects,
                        "features": features,
                        "recommended": recommended,
                    }),
                    request,
                )
            }
            Err(e) => {
                error!(error = %e, "Describe global failed");
                Response::failure("Describe Global Failed", json!(e.to_string()), request)
            }
        }
    }

    /// 指定オブジェクトの describe からスキーマ案を構築
    ///
    /// describe に失敗したオブジェクトは読み飛ばされ、応答の `skipped` に列挙されます。
    pub async fn build_schema(&mut self, org: &str, objects: &[String]) -> Response {
        let request = json!({ "org": org, "objects": objects });
        let source = match self.source(org) {
            Ok(source) => source,
            Err(e) => return Response::failure("Schema Build Failed", json!(e.to_string()), request),
        };

        info!(objects = objects.len(), "Fetching describes");
        let describes = fetch_describes(source, objects).await;
        let skipped: Vec<&String> = objects
            .iter()
            .filter(|name| !describes.contains_key(name.as_str()))
            .collect();

        let schema = SchemaBuilder::new(&self.preferences)
            .with_all_text(self.all_text)
            .build_schema(&describes);
        let response = json!({
            "objects": describes.keys().collect::<Vec<_>>(),
            "skipped": skipped,
            "schema": schema,
        });
        info!(tables = schema.table_count(), "Built schema");
        self.schema = Some(schema);

        Response::success("Processed Objects", response, request)
    }

    /// 現在のスキーマ案からテーブル定義を生成
    pub fn plan_tables(&self) -> Option<Vec<TableDefinition>> {
        self.schema
            .as_ref()
            .map(|schema| TablePlanner::new(&self.preferences).plan_schema(schema))
    }

    /// 現在のスキーマ案をデータベースに作成
    pub async fn build_database(
        &self,
        settings: &ConnectionSettings,
        progress: Option<UnboundedSender<BuildEvent>>,
    ) -> Response {
        let request = json!(settings.scrubbed());
        let Some(tables) = self.plan_tables() else {
            return Response::failure("No schema to build", Value::Null, request);
        };

        let pool = match self.connections.create_pool(settings, tables.len()).await {
            Ok(pool) => pool,
            Err(e) => {
                error!(error = %e, "Database connection failed");
                return Response::failure("Database Connection Failed", json!(e.to_string()), request);
            }
        };

        let executor = Arc::new(PoolExecutor::new(pool.clone()));
        let result = self
            .materialize_with(executor, settings.dialect, settings.overwrite, tables, progress)
            .await;
        self.connections.close_pool(pool).await;

        build_response(result, request)
    }

    /// 任意の実行器でテーブル定義を作成
    pub async fn materialize_with(
        &self,
        executor: Arc<dyn DdlExecutor>,
        dialect: Dialect,
        overwrite: bool,
        tables: Vec<TableDefinition>,
        progress: Option<UnboundedSender<BuildEvent>>,
    ) -> Result<BuildReport, DatabaseError> {
        let mut materializer = TableMaterializer::new(generator_for(dialect), overwrite);
        if let Some(progress) = progress {
            materializer = materializer.with_progress(progress);
        }
        materializer.materialize(executor, tables).await
    }

    /// スキーマ案をJSONファイルへ保存
    pub fn save_schema(&self, path: &Path) -> Response {
        let request = json!({ "path": path.display().to_string() });
        let Some(schema) = &self.schema else {
            return Response::failure("No schema to save", Value::Null, request);
        };

        match self.serializer.save(schema, path) {
            Ok(written) => {
                info!(path = %written.display(), "Saved schema");
                Response::success(
                    "Schema Saved",
                    json!({ "path": written.display().to_string() }),
                    request,
                )
            }
            Err(e) => {
                error!(error = %e, "Failed to save schema");
                Response::failure("Schema Save Failed", json!(e.to_string()), request)
            }
        }
    }

    /// JSONファイルからスキーマ案を読み込む
    ///
    /// 読み込みや検証に失敗した場合、現在のスキーマ案は変更されません。
    pub fn load_schema(&mut self, path: &Path) -> Response {
        let request = json!({ "path": path.display().to_string() });
        match self.serializer.load(path) {
            Ok(schema) => {
                info!(path = %path.display(), tables = schema.table_count(), "Loaded schema");
                let response = json!({ "tables": schema.table_names() });
                self.schema = Some(schema);
                Response::success("Schema Loaded", response, request)
            }
            Err(e) => {
                error!(error = %e, "Failed to load schema");
                Response::failure("Schema Load Failed", json!(e.to_string()), request)
            }
        }
    }

    /// DDLテキストを書き出す
    pub fn export_ddl<W: Write>(
        &self,
        settings: &ConnectionSettings,
        writer: &mut W,
    ) -> Result<usize, std::io::Error> {
        let tables = self.plan_tables().unwrap_or_default();
        TableMaterializer::new(generator_for(settings.dialect), settings.overwrite)
            .export(&tables, writer)
    }

    /// DDLテキストをファイルへ保存
    pub fn save_ddl(&self, path: &Path, settings: &ConnectionSettings) -> Response {
        let request = json!({
            "path": path.display().to_string(),
            "settings": settings.scrubbed(),
        });
        if self.schema.is_none() {
            return Response::failure("No schema to export", Value::Null, request);
        }

        let result = File::create(path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            self.export_ddl(settings, &mut writer)
        });

        match result {
            Ok(statements) => {
                info!(path = %path.display(), statements, "Saved DDL");
                Response::success(
                    "DDL Saved",
                    json!({ "path": path.display().to_string(), "statements": statements }),
                    request,
                )
            }
            Err(e) => {
                let err = IoError::FileWrite {
                    path: path.display().to_string(),
                    cause: e.to_string(),
                };
                error!(error = %err, "Failed to save DDL");
                Response::failure("DDL Save Failed", json!(err.to_string()), request)
            }
        }
    }

    /// 以降の構築で使う設定を差し替える
    pub fn set_preferences(&mut self, preferences: PreferenceSet) -> Response {
        let request = json!(preferences);
        self.preferences = preferences;
        Response::success("Preferences Updated", json!(self.preferences), request)
    }
}

fn build_response(result: Result<BuildReport, DatabaseError>, request: Value) -> Response {
    match result {
        Ok(report) => {
            let message = if report.is_success() {
                format!("Created {} table(s)", report.total())
            } else {
                format!(
                    "{} of {} table(s) failed",
                    report.failed_count(),
                    report.total()
                )
            };
            let status = report.is_success();
            let response = json!(report);
            if status {
                Response::success(message, response, request)
            } else {
                Response::failure(message, response, request)
            }
        }
        Err(e) => {
            error!(error = %e, "Database build aborted");
            Response::failure("Database Connection Failed", json!(e.to_string()), request)
        }
    }
}
