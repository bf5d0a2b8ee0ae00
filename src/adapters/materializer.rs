// テーブルマテリアライザー
//
// テーブル定義をデータベースへ作成するアダプター。
// 全テーブルのCREATEを順序保証なしで並行に発行し、テーブルごとに独立して成功・失敗を確定させます。
// テーブル間のトランザクションは持たず、1テーブルの失敗が他のテーブルを中断させることはありません。

use crate::adapters::ddl_executor::{DdlExecutor, FailureClass, StatementFailure};
use crate::adapters::sql_generator::SqlGenerator;
use crate::core::ddl::TableDefinition;
use crate::core::error::DatabaseError;
use crate::services::table_planner::degrade_wide_strings;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// テーブルの終端状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    /// 作成成功
    Succeeded,
    /// 文字列カラムをTEXTへ縮退して作成成功
    Degraded {
        converted_columns: Vec<String>,
        missing_indexes: Vec<String>,
    },
    /// テーブルは作成済みだが一部のインデックスが欠落
    PartialIndexes { missing_indexes: Vec<String> },
    /// 恒久的な失敗
    Failed {
        code: Option<String>,
        message: String,
        sql: String,
    },
}

impl TableStatus {
    fn failed(failure: StatementFailure, sql: &str) -> Self {
        TableStatus::Failed {
            code: failure.code,
            message: failure.message,
            sql: sql.to_string(),
        }
    }

    /// テーブルが存在する状態で終わったかどうか
    pub fn is_success(&self) -> bool {
        !self.is_failed()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TableStatus::Failed { .. })
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableStatus::Succeeded => write!(f, "succeeded"),
            TableStatus::Degraded {
                converted_columns, ..
            } => write!(f, "succeeded ({} column(s) converted to text)", converted_columns.len()),
            TableStatus::PartialIndexes { missing_indexes } => {
                write!(f, "succeeded ({} index(es) missing)", missing_indexes.len())
            }
            TableStatus::Failed { message, .. } => write!(f, "failed: {}", message),
        }
    }
}

/// テーブルの処理段階（ログ用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TablePhase {
    Dropping,
    Creating,
    RetryingDegraded,
    Indexing,
}

impl fmt::Display for TablePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TablePhase::Dropping => "dropping",
            TablePhase::Creating => "creating",
            TablePhase::RetryingDegraded => "retrying-degraded",
            TablePhase::Indexing => "indexing",
        };
        write!(f, "{}", name)
    }
}

/// ビルド結果の集計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// テーブル名ごとの終端状態（入力順）
    pub tables: IndexMap<String, TableStatus>,
}

impl BuildReport {
    pub fn total(&self) -> usize {
        self.tables.len()
    }

    pub fn succeeded_count(&self) -> usize {
        self.tables.values().filter(|s| s.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.tables.values().filter(|s| s.is_failed()).count()
    }

    /// 全テーブルが作成されたかどうか
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

/// ビルドの進捗イベント
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    /// 1テーブルが終端状態に達した
    Progress {
        completed: usize,
        total: usize,
        table: String,
        status: TableStatus,
    },
    /// 全テーブルが終端状態に達した
    Completed(BuildReport),
}

impl BuildEvent {
    /// 表示用メッセージ
    pub fn message(&self) -> String {
        match self {
            BuildEvent::Progress {
                completed,
                total,
                table,
                status,
            } => format!("{} of {} complete: {} {}", completed, total, table, status),
            BuildEvent::Completed(report) => format!(
                "Build complete: {} of {} table(s) created, {} failed",
                report.succeeded_count(),
                report.total(),
                report.failed_count()
            ),
        }
    }
}

/// テーブルマテリアライザー
#[derive(Clone)]
pub struct TableMaterializer {
    generator: Arc<dyn SqlGenerator>,
    overwrite: bool,
    progress: Option<UnboundedSender<BuildEvent>>,
}

impl TableMaterializer {
    /// 新しいTableMaterializerを作成
    ///
    /// # Arguments
    ///
    /// * `generator` - 方言のSQLジェネレーター
    /// * `overwrite` - 既存テーブルを削除してから作成するかどうか
    pub fn new(generator: Arc<dyn SqlGenerator>, overwrite: bool) -> Self {
        Self {
            generator,
            overwrite,
            progress: None,
        }
    }

    /// 進捗イベントの送信先を設定
    pub fn with_progress(mut self, progress: UnboundedSender<BuildEvent>) -> Self {
        self.progress = Some(progress);
        self
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(progress) = &self.progress {
            // 受信側が閉じていても処理は続行する
            let _ = progress.send(event);
        }
    }

    /// テーブル群をデータベースに作成
    ///
    /// 作成前に疎通確認を行い、失敗した場合は1件も作成せずに接続エラーを返します。
    ///
    /// # Returns
    ///
    /// 全テーブルの終端状態を含むビルド結果
    pub async fn materialize(
        &self,
        executor: Arc<dyn DdlExecutor>,
        tables: Vec<TableDefinition>,
    ) -> Result<BuildReport, DatabaseError> {
        let started_at = Utc::now();

        executor.probe().await.map_err(|failure| {
            error!(error = %failure, "Connection probe failed, aborting build");
            DatabaseError::Connection {
                message: "Database connection probe failed".to_string(),
                cause: failure.to_string(),
            }
        })?;

        let total = tables.len();
        let order: Vec<String> = tables.iter().map(|t| t.name.clone()).collect();
        info!(tables = total, overwrite = self.overwrite, "Starting table creation");

        let mut join_set = JoinSet::new();
        for table in tables {
            let executor = Arc::clone(&executor);
            let generator = Arc::clone(&self.generator);
            let overwrite = self.overwrite;
            join_set.spawn(async move {
                let status = create_table(executor.as_ref(), generator.as_ref(), &table, overwrite).await;
                (table.name, status)
            });
        }

        let mut results: HashMap<String, TableStatus> = HashMap::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((table, status)) => {
                    self.emit(BuildEvent::Progress {
                        completed: results.len() + 1,
                        total,
                        table: table.clone(),
                        status: status.clone(),
                    });
                    results.insert(table, status);
                }
                Err(e) => error!(error = %e, "Table creation task aborted"),
            }
        }

        let tables = order
            .into_iter()
            .map(|name| {
                let status = results.remove(&name).unwrap_or_else(|| TableStatus::Failed {
                    code: None,
                    message: "table creation task did not complete".to_string(),
                    sql: String::new(),
                });
                (name, status)
            })
            .collect();

        let report = BuildReport {
            started_at,
            finished_at: Utc::now(),
            tables,
        };
        info!(
            succeeded = report.succeeded_count(),
            failed = report.failed_count(),
            "Table creation finished"
        );
        self.emit(BuildEvent::Completed(report.clone()));
        Ok(report)
    }

    /// DDLテキストを書き出す
    ///
    /// 接続せずに同じ定義からDDL文を生成し、1行1文（`;\n` 終端）で順に書き込みます。
    ///
    /// # Returns
    ///
    /// 書き込んだ文の数
    pub fn export<W: Write>(&self, tables: &[TableDefinition], writer: &mut W) -> io::Result<usize> {
        let mut count = 0;
        for table in tables {
            for statement in self.generator.generate_table_statements(table, self.overwrite) {
                writer.write_all(statement.as_bytes())?;
                writer.write_all(b";\n")?;
                count += 1;
            }
        }
        writer.flush()?;
        Ok(count)
    }
}

/// 1テーブル分の作成処理（削除 → 作成 → 縮退再試行 → インデックス）
async fn create_table(
    executor: &dyn DdlExecutor,
    generator: &dyn SqlGenerator,
    table: &TableDefinition,
    overwrite: bool,
) -> TableStatus {
    if overwrite {
        debug!(table = %table.name, phase = %TablePhase::Dropping, "Table phase");
        let sql = generator.generate_drop_table_if_exists(table);
        if let Err(failure) = executor.execute(&sql).await {
            error!(table = %table.name, error = %failure, "Failed to drop existing table");
            return TableStatus::failed(failure, &sql);
        }
    }

    debug!(table = %table.name, phase = %TablePhase::Creating, "Table phase");
    let sql = generator.generate_create_table(table);
    let failure = match executor.execute(&sql).await {
        Ok(()) => {
            return match create_indexes(executor, generator, table).await {
                Ok(missing) if missing.is_empty() => TableStatus::Succeeded,
                Ok(missing) => TableStatus::PartialIndexes {
                    missing_indexes: missing,
                },
                Err(status) => status,
            };
        }
        Err(failure) => failure,
    };

    // キー数超過を許容するのはインデックス作成時のみ。CREATE TABLE が失敗すればテーブルは存在しない
    match failure.classify() {
        FailureClass::RowTooWide => retry_degraded(executor, generator, table, failure, &sql).await,
        FailureClass::TooManyKeys | FailureClass::Other => {
            error!(table = %table.name, error = %failure, "Failed to create table");
            TableStatus::failed(failure, &sql)
        }
    }
}

/// 文字列カラムをTEXTへ縮退した複製で1回だけ再作成
async fn retry_degraded(
    executor: &dyn DdlExecutor,
    generator: &dyn SqlGenerator,
    table: &TableDefinition,
    failure: StatementFailure,
    sql: &str,
) -> TableStatus {
    let Some((degraded, converted)) = degrade_wide_strings(table) else {
        error!(table = %table.name, error = %failure, "Row too wide and no string columns to convert");
        return TableStatus::failed(failure, sql);
    };

    warn!(
        table = %table.name,
        phase = %TablePhase::RetryingDegraded,
        columns = converted.len(),
        "Row too wide, retrying with string columns converted to text"
    );

    let retry_sql = generator.generate_create_table(&degraded);
    if let Err(retry_failure) = executor.execute(&retry_sql).await {
        error!(table = %table.name, error = %retry_failure, "Degraded retry failed");
        return TableStatus::failed(retry_failure, &retry_sql);
    }

    match create_indexes(executor, generator, &degraded).await {
        Ok(missing) => TableStatus::Degraded {
            converted_columns: converted,
            missing_indexes: missing,
        },
        Err(status) => status,
    }
}

/// インデックスを作成し、キー数超過で作れなかったインデックス名を返す
async fn create_indexes(
    executor: &dyn DdlExecutor,
    generator: &dyn SqlGenerator,
    table: &TableDefinition,
) -> Result<Vec<String>, TableStatus> {
    let mut missing = Vec::new();
    for index in &table.indexes {
        debug!(table = %table.name, phase = %TablePhase::Indexing, index = %index.name, "Table phase");
        let sql = generator.generate_create_index(table, index);
        if let Err(failure) = executor.execute(&sql).await {
            match failure.classify() {
                FailureClass::TooManyKeys => {
                    warn!(table = %table.name, index = %index.name, "Too many keys, skipping index");
                    missing.push(index.name.clone());
                }
                _ => {
                    error!(table = %table.name, index = %index.name, error = %failure, "Failed to create index");
                    return Err(TableStatus::failed(failure, &sql));
                }
            }
        }
    }
    Ok(missing)
}
