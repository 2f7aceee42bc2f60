//! アプリケーション状態管理
//!
//! ページ全体の読み込み状態と、パネルごとのローカル状態を定義します。
//! プロセス全体で共有するグローバル状態は持ちません。

use std::collections::BTreeMap;

use picam_panel_common::{CameraDescriptor, CaptureResult, ControlKey, ControlValue};

/// ページの状態
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PageState {
    /// カメラ一覧の読み込み中
    #[default]
    Loading,
    /// 読み込み完了
    Ready(Vec<CameraDescriptor>),
    /// 読み込み失敗（カメラグリッドの代わりに表示する文言）
    Failed(String),
}

impl PageState {
    /// パネルを作るべきカメラ（`Ready` 以外では空）
    pub fn cameras(&self) -> &[CameraDescriptor] {
        match self {
            PageState::Ready(cameras) => cameras,
            _ => &[],
        }
    }

    /// エラーメッセージ
    pub fn error(&self) -> Option<&str> {
        match self {
            PageState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// パネルごとのローカル状態
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelState {
    /// キャプチャ要求が処理中か（ボタンを無効化する）
    pub capture_busy: bool,
    /// 最後のキャプチャ結果（リンクURLは絶対化済み）
    pub last_capture: Option<CaptureResult>,
    /// 送信に成功した最後の値（プリセット保存用、リロードで消える）
    pub last_sent: BTreeMap<ControlKey, ControlValue>,
    /// パネル内に表示するエラー
    pub status: Option<String>,
    /// 最新のメタデータ
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
    /// サーバーに保存されているプリセット名
    pub preset_names: Vec<String>,
}
