//! 設定管理
//!
//! コントロールパネルの設定（APIの接続先、ログレベル、スライダーの範囲）を
//! TOMLまたはJSONから読み込む機能を提供します。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::{ControlKey, ValueKind};

/// 設定エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    /// JSON エラー
    #[error("JSONの解析に失敗しました: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML デシリアライズエラー
    #[error("TOMLの解析に失敗しました: {0}")]
    TomlDeError(#[from] toml::de::Error),

    /// 範囲指定の誤り
    #[error("コントロール '{0}' の範囲が不正です: {1}")]
    InvalidRange(String, String),
}

/// 設定形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    /// JSON 形式
    Json,
    /// TOML 形式
    #[default]
    Toml,
}

/// スライダーの範囲
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// 初期表示値
    pub initial: f64,
}

impl RangeConfig {
    pub const fn new(min: f64, max: f64, step: f64, initial: f64) -> Self {
        Self { min, max, step, initial }
    }
}

/// パネル設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// APIのベースURL（空なら同一オリジン）
    pub api_base: String,
    /// ログレベル（trace/debug/info/warn/error）
    pub log_level: String,
    /// 数値コントロールごとのスライダー範囲（キーはコントロール名）
    pub ranges: BTreeMap<String, RangeConfig>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            log_level: "info".to_string(),
            ranges: default_ranges(),
        }
    }
}

/// 既定のスライダー範囲（Picamera2のコントロール範囲に合わせる）
fn default_ranges() -> BTreeMap<String, RangeConfig> {
    [
        (ControlKey::ExposureTime, RangeConfig::new(100.0, 200_000.0, 100.0, 10_000.0)),
        (ControlKey::AnalogueGain, RangeConfig::new(1.0, 16.0, 0.1, 1.0)),
        (ControlKey::Ev, RangeConfig::new(-8.0, 8.0, 0.1, 0.0)),
        (ControlKey::LensPosition, RangeConfig::new(0.0, 10.0, 0.05, 1.0)),
        (ControlKey::Brightness, RangeConfig::new(-1.0, 1.0, 0.05, 0.0)),
        (ControlKey::Contrast, RangeConfig::new(0.0, 4.0, 0.05, 1.0)),
        (ControlKey::Saturation, RangeConfig::new(0.0, 4.0, 0.05, 1.0)),
        (ControlKey::Sharpness, RangeConfig::new(0.0, 16.0, 0.1, 1.0)),
    ]
    .into_iter()
    .map(|(key, range)| (key.as_str().to_string(), range))
    .collect()
}

impl PanelConfig {
    /// 文字列から設定を読み込む
    ///
    /// 記載のないスライダー範囲は既定値で補う。
    pub fn from_str(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let mut config: PanelConfig = match format {
            ConfigFormat::Json => serde_json::from_str(text)?,
            ConfigFormat::Toml => toml::from_str(text)?,
        };

        for (key, range) in default_ranges() {
            config.ranges.entry(key).or_insert(range);
        }
        config.validate()?;

        Ok(config)
    }

    /// 指定コントロールの範囲を取得
    pub fn range(&self, key: ControlKey) -> RangeConfig {
        self.ranges
            .get(key.as_str())
            .copied()
            .or_else(|| default_ranges().get(key.as_str()).copied())
            .unwrap_or(RangeConfig::new(0.0, 1.0, 0.01, 0.0))
    }

    /// 範囲の整合性を検査
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, range) in &self.ranges {
            let key: ControlKey = name
                .parse()
                .map_err(|e: String| ConfigError::InvalidRange(name.clone(), e))?;
            if !matches!(key.value_kind(), ValueKind::Integer | ValueKind::Float) {
                return Err(ConfigError::InvalidRange(
                    name.clone(),
                    "スライダーを持たないコントロールです".to_string(),
                ));
            }
            if range.min >= range.max || range.step <= 0.0 {
                return Err(ConfigError::InvalidRange(
                    name.clone(),
                    format!("min={} max={} step={}", range.min, range.max, range.step),
                ));
            }
        }
        Ok(())
    }
}
