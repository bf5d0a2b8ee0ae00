// SQLクォートユーティリティ
//
// 各データベース方言用の識別子・文字列リテラルのクォート関数を提供します。
// スキーマ内の文字列値はバックスラッシュとシングルクォートがバックスラッシュでエスケープされた形で保持されます。

use crate::core::config::Dialect;

/// ダブルクォートによる識別子クォート（PostgreSQL、SQLite）
///
/// 識別子内のダブルクォートは二重にエスケープします。
pub fn quote_identifier_ansi(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// MySQL用識別子クォート（バッククォート）
///
/// 識別子内のバッククォートは二重にエスケープします。
pub fn quote_identifier_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// 方言に応じた識別子クォート
pub fn quote_identifier(dialect: Dialect, name: &str) -> String {
    match dialect {
        Dialect::MySQL => quote_identifier_mysql(name),
        Dialect::PostgreSQL | Dialect::SQLite => quote_identifier_ansi(name),
    }
}

/// 値をスキーマ保存用の形式にエスケープ
///
/// バックスラッシュを `\\`、シングルクォートを `\'` に置き換えます。
/// 元の値とエスケープ後の値は一対一に対応するため、`It's` と `It\'s` は別の値として残ります。
pub fn escape_literal_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 保存形式の値を元の値に戻す
///
/// `\\` と `\'` 以外のバックスラッシュ（末尾の単独バックスラッシュを含む）は文字そのものとして扱います。
pub fn unescape_literal_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '\\' || next == '\'' {
                    chars.next();
                    unescaped.push(next);
                    continue;
                }
            }
        }
        unescaped.push(c);
    }
    unescaped
}

/// MySQL用文字列リテラル
///
/// 保存形式を一度元に戻してから再エスケープするため、手書きのスキーマファイルでもリテラルが閉じます。
pub fn quote_literal_mysql(value: &str) -> String {
    format!("'{}'", escape_literal_value(&unescape_literal_value(value)))
}

/// 標準SQLの文字列リテラル（PostgreSQL、SQLite）
///
/// バックスラッシュは文字そのもの、シングルクォートは `''` で表します。
pub fn quote_literal_ansi(value: &str) -> String {
    format!("'{}'", unescape_literal_value(value).replace('\'', "''"))
}

/// 方言に応じた文字列リテラル
pub fn quote_literal(dialect: Dialect, value: &str) -> String {
    match dialect {
        Dialect::MySQL => quote_literal_mysql(value),
        Dialect::PostgreSQL | Dialect::SQLite => quote_literal_ansi(value),
    }
}

/// 値リストをリテラル化してカンマ区切りで結合
pub fn quote_literal_list(dialect: Dialect, values: &[String]) -> String {
    values
        .iter()
        .map(|v| quote_literal(dialect, v))
        .collect::<Vec<_>>()
        .join(", ")
}
