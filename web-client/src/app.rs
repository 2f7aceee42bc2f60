//! Webクライアントアプリケーション
//!
//! 起動時にカメラ一覧を一度だけ取得し、カメラごとにパネルを並べます。

use std::rc::Rc;

use picam_panel_common::{ControlClient, HttpTransport, PanelConfig};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::{CameraPanel, HistoryPanel};
use crate::state::PageState;
use crate::utils::network::ClientHandle;

/// カメラ一覧を取得してページの状態を決める
pub async fn load_page<T: HttpTransport>(client: &ControlClient<T>) -> PageState {
    match client.list_cameras().await {
        Ok(cameras) => {
            log::info!("{} 台のカメラを検出しました", cameras.len());
            PageState::Ready(cameras)
        }
        Err(err) => {
            log::error!("カメラ一覧の取得に失敗しました: {}", err);
            PageState::Failed(format!("Failed to load cameras: {}", err))
        }
    }
}

/// アプリケーションのプロパティ
#[derive(Properties, Clone, PartialEq)]
pub struct AppProps {
    pub config: Rc<PanelConfig>,
}

/// メインアプリケーション
#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let page = use_state(PageState::default);
    let client = use_memo(|base: &String| ClientHandle::new(base), props.config.api_base.clone());

    {
        let page = page.clone();
        let client = client.clone();
        use_effect_with_deps(
            move |_| {
                spawn_local(async move {
                    page.set(load_page(&*client.0).await);
                });
                || ()
            },
            (),
        );
    }

    let body = if let Some(message) = page.error() {
        html! { <p class="error">{message.to_string()}</p> }
    } else if *page == PageState::Loading {
        html! { <p class="loading">{"Loading cameras..."}</p> }
    } else if page.cameras().is_empty() {
        html! { <p>{"No cameras found"}</p> }
    } else {
        html! {
            <div class="camera-grid">
                { for page.cameras().iter().map(|camera| html! {
                    <CameraPanel
                        key={camera.id.clone()}
                        camera={camera.clone()}
                        client={(*client).clone()}
                        config={props.config.clone()}
                    />
                }) }
            </div>
        }
    };

    html! {
        <main class="picam-panel">
            <h1>{"Camera control"}</h1>
            {body}
            <HistoryPanel client={(*client).clone()} />
        </main>
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use picam_panel_common::api::testing::RecordingTransport;
    use picam_panel_common::CameraDescriptor;

    use super::*;

    #[test]
    fn test_cameras_become_ready_state() {
        let transport = RecordingTransport::new();
        transport.respond(
            200,
            r#"{"cameras":[{"id":"0","label":"imx708"},{"id":"1","label":"imx477","index":1}]}"#,
        );
        let client = ControlClient::new(transport.clone(), "");

        let state = block_on(load_page(&client));

        assert_eq!(transport.requests()[0].url, "/api/cameras");
        assert_eq!(state.cameras().len(), 2);
        assert_eq!(state.cameras()[0], CameraDescriptor::new("0", "imx708"));
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_failed_listing_shows_error_and_no_panels() {
        let transport = RecordingTransport::new();
        transport.respond(503, "camera service down");
        let client = ControlClient::new(transport, "");

        let state = block_on(load_page(&client));

        assert!(state.cameras().is_empty());
        assert_eq!(state.error(), Some("Failed to load cameras: Error: camera service down"));
    }

    #[test]
    fn test_unreachable_backend_is_reported() {
        let transport = RecordingTransport::new();
        transport.fail("NetworkError when attempting to fetch resource.");
        let client = ControlClient::new(transport, "");

        let state = block_on(load_page(&client));
        assert!(matches!(state, PageState::Failed(ref m) if m.starts_with("Failed to load cameras: Error: NetworkError")));
    }
}
