//! Webクライアントエントリポイント
//!
//! Raspberry Piカメラの操作パネルをブラウザ上で動かします。
//! WebAssemblyにコンパイルされ、ページ読み込み時に `initialize` が呼ばれます。

mod app;
mod components;
mod state;
mod utils;

use std::rc::Rc;

use picam_panel_common::{ConfigFormat, PanelConfig};
use wasm_bindgen::prelude::*;
use web_sys::window;

/// 埋め込みのパネル設定
const PANEL_CONFIG: &str = include_str!("../panel.toml");

/// 埋め込み設定を読み込む（壊れていれば既定値）
fn load_config() -> (PanelConfig, Option<String>) {
    match PanelConfig::from_str(PANEL_CONFIG, ConfigFormat::Toml) {
        Ok(config) => (config, None),
        Err(e) => (PanelConfig::default(), Some(e.to_string())),
    }
}

/// Webクライアントの初期化
#[wasm_bindgen]
pub fn initialize() -> Result<(), JsValue> {
    utils::install_panic_hook();

    let (config, config_error) = load_config();
    utils::init_logging(&config);
    if let Some(e) = config_error {
        log::warn!("パネル設定を読み込めないため既定値を使います: {}", e);
    }

    log::info!("カメラパネルを初期化中 (version {})", picam_panel_common::VERSION);

    let document = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("ドキュメントが見つかりません"))?;

    let root = match document.get_element_by_id("app") {
        Some(root) => root,
        None => {
            log::warn!("アプリケーションコンテナが見つかりません。新しく作成します。");
            let body = document
                .body()
                .ok_or_else(|| JsValue::from_str("ドキュメントのボディが見つかりません"))?;
            let root = document.create_element("div")?;
            root.set_id("app");
            body.append_child(&root)?;
            root
        }
    };

    let props = app::AppProps {
        config: Rc::new(config),
    };
    yew::Renderer::<app::App>::with_root_and_props(root, props).render();
    log::info!("アプリケーションをマウントしました");
    Ok(())
}
