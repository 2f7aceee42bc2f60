//! カメラコントロールパネル共通ライブラリ
//!
//! このクレートは、Raspberry Piカメラのコントロールパネルで使用される
//! 共通の機能（通信プロトコル、エラー型、設定、APIクライアント）を提供します。
//! DOMに依存しないため、ネイティブ環境でもテストできます。

pub mod api;
pub mod config;
pub mod error;
pub mod protocol;

// 主要コンポーネントを再エクスポート
pub use api::{ApiRequest, ApiResponse, ControlClient, HttpTransport, Method};
pub use config::{ConfigError, ConfigFormat, PanelConfig, RangeConfig};
pub use error::{ApiError, Result};
pub use protocol::{
    AfTrigger, CameraDescriptor, CaptureResult, ControlKey, ControlUpdate, ControlValue, ValueKind,
};

/// ライブラリのバージョン
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
