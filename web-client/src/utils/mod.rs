//! ユーティリティモジュール
//!
//! HTTPトランスポート、ロギング、表示用の整形を含みます。

pub mod format;
pub mod logging;
pub mod network;

pub use logging::{init_logging, install_panic_hook};
