//! エラー型定義
//!
//! カメラコントロールパネルで使用する共通エラー型を定義します。
//! UIから見たエラーは「リクエスト失敗」の一種類のみで、
//! どのバリアントも `Error: <詳細>` として表示されます。

use thiserror::Error;

/// APIエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 成功範囲外のHTTPステータス（レスポンス本文をそのまま保持）
    #[error("Error: {0}")]
    RequestFailed(String),

    /// 通信そのものの失敗
    #[error("Error: {0}")]
    Transport(String),

    /// JSONのエンコード・デコード失敗
    #[error("Error: {0}")]
    Decode(String),

    /// 送信前にクライアント側で弾いた操作
    #[error("Error: {0}")]
    Invalid(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::Decode(value.to_string())
    }
}

/// 結果型のエイリアス
pub type Result<T> = std::result::Result<T, ApiError>;
