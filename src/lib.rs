// sf2sqlライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメイン（型解決、スキーマモデル、設定、エラー）
// - services: ドメインロジック（スキーマ構築、機能検出、スキーマファイル、テーブル計画、セッション）
// - adapters: データベース、DDL生成、メタデータ取得へのアクセスを抽象化

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
