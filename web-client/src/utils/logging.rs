//! ロギングユーティリティ
//!
//! `log` クレートの出力をブラウザのコンソールへ送る設定を行います。

use picam_panel_common::PanelConfig;

/// ログレベル名を解釈（不明な名前は `Info`）
pub fn parse_level(name: &str) -> log::Level {
    let name = name.trim();
    if name.eq_ignore_ascii_case("warning") {
        return log::Level::Warn;
    }
    name.parse().unwrap_or(log::Level::Info)
}

/// パニックをコンソールに出す
pub fn install_panic_hook() {
    #[cfg(feature = "development")]
    console_error_panic_hook::set_once();
}

/// ロガーを初期化
pub fn init_logging(config: &PanelConfig) {
    let level = parse_level(&config.log_level);
    wasm_logger::init(wasm_logger::Config::new(level));
    log::debug!("ログレベル: {}", level);
}
