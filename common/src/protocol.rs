//! 通信プロトコル定義
//!
//! カメラ制御REST APIで送受信されるデータ型とエンドポイントのパスを定義します。
//! サーバー側（Picamera2バックエンド）は別コンポーネントであり、
//! ここではクライアントが必要とする形だけを扱います。

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// オートフォーカスモードの選択肢
pub const AF_MODES: &[&str] = &["manual", "auto", "continuous"];

/// ホワイトバランスモードの選択肢
pub const AWB_MODES: &[&str] = &["Auto", "Tungsten", "Fluorescent", "Indoor", "Daylight", "Cloudy"];

/// ノイズリダクションモードの選択肢
pub const NOISE_REDUCTION_MODES: &[&str] = &["off", "fast", "high_quality"];

/// キャプチャ履歴のタイムスタンプ形式
pub const CAPTURE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

/// カメラ記述子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    /// カメラID（パスに使われる）
    pub id: String,
    /// 表示名
    pub label: String,
    /// バックエンド側のカメラ番号
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl CameraDescriptor {
    /// 新しいカメラ記述子を作成
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            index: None,
        }
    }
}

/// `GET /api/cameras` のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraList {
    pub cameras: Vec<CameraDescriptor>,
}

/// 値の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// 整数
    Integer,
    /// 浮動小数点
    Float,
    /// 真偽値
    Bool,
    /// 列挙値（名前またはバックエンドの列挙番号）
    Choice,
}

/// コントロールキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKey {
    /// 自動露出
    AeEnable,
    /// 露光時間（マイクロ秒）
    ExposureTime,
    /// アナログゲイン
    AnalogueGain,
    /// オートホワイトバランス
    AwbEnable,
    /// ホワイトバランスモード
    AwbMode,
    /// 露出補正
    Ev,
    /// オートフォーカスモード
    AfMode,
    /// レンズ位置（ディオプター）
    LensPosition,
    /// 明るさ
    Brightness,
    /// コントラスト
    Contrast,
    /// 彩度
    Saturation,
    /// シャープネス
    Sharpness,
    /// ノイズリダクションモード
    NoiseReductionMode,
}

impl ControlKey {
    /// すべてのコントロールキー
    pub const ALL: [ControlKey; 13] = [
        ControlKey::AeEnable,
        ControlKey::ExposureTime,
        ControlKey::AnalogueGain,
        ControlKey::AwbEnable,
        ControlKey::AwbMode,
        ControlKey::Ev,
        ControlKey::AfMode,
        ControlKey::LensPosition,
        ControlKey::Brightness,
        ControlKey::Contrast,
        ControlKey::Saturation,
        ControlKey::Sharpness,
        ControlKey::NoiseReductionMode,
    ];

    /// JSONキー名を取得
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlKey::AeEnable => "ae_enable",
            ControlKey::ExposureTime => "exposure_time",
            ControlKey::AnalogueGain => "analogue_gain",
            ControlKey::AwbEnable => "awb_enable",
            ControlKey::AwbMode => "awb_mode",
            ControlKey::Ev => "ev",
            ControlKey::AfMode => "af_mode",
            ControlKey::LensPosition => "lens_position",
            ControlKey::Brightness => "brightness",
            ControlKey::Contrast => "contrast",
            ControlKey::Saturation => "saturation",
            ControlKey::Sharpness => "sharpness",
            ControlKey::NoiseReductionMode => "noise_reduction_mode",
        }
    }

    /// このキーが受け取る値の種類
    pub fn value_kind(&self) -> ValueKind {
        match self {
            ControlKey::AeEnable | ControlKey::AwbEnable => ValueKind::Bool,
            ControlKey::ExposureTime => ValueKind::Integer,
            ControlKey::AwbMode | ControlKey::AfMode | ControlKey::NoiseReductionMode => ValueKind::Choice,
            _ => ValueKind::Float,
        }
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControlKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown control key '{}'", s))
    }
}

/// コントロール値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    /// 真偽値
    Bool(bool),
    /// 整数
    Int(i64),
    /// 浮動小数点
    Float(f64),
    /// 列挙文字列
    Text(String),
}

impl ControlValue {
    /// 指定された種類に値を変換する（変換できなければ `None`）
    pub fn coerce(&self, kind: ValueKind) -> Option<ControlValue> {
        match (kind, self) {
            (ValueKind::Bool, ControlValue::Bool(b)) => Some(ControlValue::Bool(*b)),
            (ValueKind::Integer, ControlValue::Int(i)) => Some(ControlValue::Int(*i)),
            (ValueKind::Integer, ControlValue::Float(f)) => Some(ControlValue::Int(f.round() as i64)),
            (ValueKind::Float, ControlValue::Float(f)) => Some(ControlValue::Float(*f)),
            (ValueKind::Float, ControlValue::Int(i)) => Some(ControlValue::Float(*i as f64)),
            (ValueKind::Choice, ControlValue::Text(s)) => Some(ControlValue::Text(s.clone())),
            (ValueKind::Choice, ControlValue::Int(i)) => Some(ControlValue::Int(*i)),
            _ => None,
        }
    }

    /// 表示用の文字列
    pub fn display_text(&self) -> String {
        match self {
            ControlValue::Bool(b) => if *b { "on".to_string() } else { "off".to_string() },
            ControlValue::Int(i) => i.to_string(),
            ControlValue::Float(f) => format!("{}", f),
            ControlValue::Text(s) => s.clone(),
        }
    }
}

/// 単一キーのコントロール更新（`{ "<key>": <value> }` としてシリアライズされる）
#[derive(Debug, Clone, PartialEq)]
pub struct ControlUpdate {
    pub key: ControlKey,
    pub value: ControlValue,
}

impl ControlUpdate {
    pub fn new(key: ControlKey, value: ControlValue) -> Self {
        Self { key, value }
    }
}

impl Serialize for ControlUpdate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key.as_str(), &self.value)?;
        map.end()
    }
}

/// オートフォーカストリガー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AfTrigger {
    Start,
    Cancel,
}

/// `POST /api/{id}/af_trigger` の本文
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfTriggerRequest {
    pub trigger: AfTrigger,
}

/// 単純な応答（`{"status": "ok"}`）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub status: Option<String>,
}

/// 静止画キャプチャの結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureResult {
    /// 保存されたファイルのURL（サーバー相対）
    pub url: String,
    /// ファイル名
    pub filename: String,
    /// サーバー上のパス
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// `GET /api/{id}/controls` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlMetadata {
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// プリセット一式（プリセット名 → コントロールキー → 値）
///
/// 未知のキーも保持できるように、内側のキーは文字列のまま扱う。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetDocument {
    #[serde(default)]
    pub presets: BTreeMap<String, BTreeMap<String, ControlValue>>,
}

/// キャプチャファイルの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Phone,
    Pi,
}

/// キャプチャ履歴のファイル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFile {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: CaptureKind,
    #[serde(default)]
    pub label: Option<String>,
}

/// 同じタイムスタンプを持つキャプチャのグループ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureGroup {
    pub timestamp: String,
    pub files: Vec<CaptureFile>,
}

impl CaptureGroup {
    /// タイムスタンプを日時として解釈
    pub fn captured_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, CAPTURE_TIMESTAMP_FORMAT).ok()
    }
}

/// `GET /api/history` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureHistory {
    #[serde(default)]
    pub groups: Vec<CaptureGroup>,
}

/// エンドポイントのパス
pub mod endpoints {
    pub fn cameras() -> String {
        "/api/cameras".to_string()
    }

    pub fn controls(camera_id: &str) -> String {
        format!("/api/{}/controls", camera_id)
    }

    pub fn af_trigger(camera_id: &str) -> String {
        format!("/api/{}/af_trigger", camera_id)
    }

    pub fn capture(camera_id: &str) -> String {
        format!("/api/{}/capture", camera_id)
    }

    /// MJPEGストリーム（画像ソースとして参照するだけ）
    pub fn stream(camera_id: &str) -> String {
        format!("/stream/{}.mjpg", camera_id)
    }

    pub fn presets() -> String {
        "/api/presets".to_string()
    }

    pub fn history() -> String {
        "/api/history".to_string()
    }

    pub fn zip_all() -> String {
        "/api/zip_all".to_string()
    }

    pub fn zip_set(timestamp: &str) -> String {
        format!("/api/zip_set/{}", timestamp)
    }
}
