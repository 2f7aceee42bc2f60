//! Webクライアントのコンポーネントモジュール
//!
//! カメラパネルと、それを構成するウィジェット・補助コンポーネントです。

pub mod bindings;
pub mod capture;
pub mod history;
pub mod metadata;
pub mod panel;
pub mod presets;
pub mod widgets;

// 主要コンポーネントをre-export
pub use history::HistoryPanel;
pub use panel::CameraPanel;
