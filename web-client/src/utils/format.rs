//! フォーマットユーティリティ
//!
//! 表示用に日時やJSON値を整形します。

use picam_panel_common::protocol::CaptureGroup;

/// キャプチャ時刻の表示形式
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// キャプチャグループのタイムスタンプを表示用に整形
///
/// 解釈できない場合は元の文字列をそのまま返す。
pub fn format_capture_time(group: &CaptureGroup) -> String {
    match group.captured_at() {
        Some(at) => at.format(DISPLAY_FORMAT).to_string(),
        None => group.timestamp.clone(),
    }
}

/// メタデータの値を1行で表示
pub fn format_metadata_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() => format!("{:.3}", f),
            _ => n.to_string(),
        },
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(format_metadata_value).collect();
            format!("[{}]", parts.join(", "))
        }
        other => other.to_string(),
    }
}
