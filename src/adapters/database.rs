// データベース接続アダプター
//
// SQLxを使用したデータベース接続プールの管理を行います。
// 作成するテーブル数に応じてプールサイズを決め、テーブル作成が接続待ちで直列化しないようにします。

use crate::adapters::connection_string::build_connection_string;
use crate::core::config::ConnectionSettings;
use crate::core::error::DatabaseError;
use sqlx::pool::PoolOptions;
use sqlx::{Any, AnyPool};
use std::time::Duration;
use tracing::{debug, info};

/// プールサイズの既定上限
pub const DEFAULT_POOL_MAX: u32 = 20;

const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// データベース接続サービス
///
/// データベース接続プールの初期化と疎通確認を行います。
#[derive(Debug, Clone, Default)]
pub struct DatabaseConnectionService {}

impl DatabaseConnectionService {
    /// 新しいDatabaseConnectionServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// プールサイズを計算
    ///
    /// テーブルごとに1接続、加えて疎通確認用に1接続を見込み、上限で切り詰めます。
    /// SQLiteは書き込みが単一接続に直列化されるため常に1です。
    pub fn pool_size(&self, settings: &ConnectionSettings, table_count: usize) -> u32 {
        if settings.dialect.is_embedded() {
            return 1;
        }

        let max = settings.pool_max.unwrap_or(DEFAULT_POOL_MAX).max(1);
        let wanted = u32::try_from(table_count.saturating_add(1)).unwrap_or(u32::MAX);
        wanted.clamp(1, max)
    }

    /// プールオプションを作成
    pub fn create_pool_options(
        &self,
        settings: &ConnectionSettings,
        table_count: usize,
    ) -> PoolOptions<Any> {
        let timeout = settings.timeout.unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS);
        PoolOptions::new()
            .max_connections(self.pool_size(settings, table_count))
            .acquire_timeout(Duration::from_secs(timeout))
    }

    /// データベース接続プールを作成
    ///
    /// # Arguments
    ///
    /// * `settings` - 接続設定
    /// * `table_count` - 作成予定のテーブル数
    ///
    /// # Returns
    ///
    /// 接続プールまたはエラー
    pub async fn create_pool(
        &self,
        settings: &ConnectionSettings,
        table_count: usize,
    ) -> Result<AnyPool, DatabaseError> {
        settings.validate().map_err(|e| DatabaseError::Settings {
            message: e.to_string(),
        })?;

        sqlx::any::install_default_drivers();

        let connection_string = build_connection_string(settings);
        let options = self.create_pool_options(settings, table_count);
        debug!(
            dialect = %settings.dialect,
            pool_size = self.pool_size(settings, table_count),
            "Creating connection pool"
        );

        let pool = options
            .connect(&connection_string)
            .await
            .map_err(|e| DatabaseError::Connection {
                message: format!("Failed to create connection pool for {}", settings.dialect),
                cause: e.to_string(),
            })?;

        info!(dialect = %settings.dialect, "Connection pool ready");
        Ok(pool)
    }

    /// 接続テストを実行
    ///
    /// 軽量なクエリを1往復させて疎通を確認します。
    pub async fn test_connection(&self, pool: &AnyPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::Connection {
                message: "Database connection probe failed".to_string(),
                cause: e.to_string(),
            })
    }

    /// 接続プールを閉じる
    pub async fn close_pool(&self, pool: AnyPool) {
        pool.close().await;
    }
}
