//! カメラパネル
//!
//! カメラ1台分のプレビューとコントロールを表示するUIコンポーネントです。
//! 実際の処理は [`PanelController`] が持ち、バインディング表に従って
//! ウィジェットの操作をAPIリクエストに変換します。

use std::cell::RefCell;
use std::rc::Rc;

use picam_panel_common::protocol::PresetDocument;
use picam_panel_common::{
    AfTrigger, ApiError, CameraDescriptor, ControlClient, ControlKey, ControlUpdate, ControlValue,
    HttpTransport, PanelConfig, Result,
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::bindings::{PanelAction, PanelLayout, CAPTURE};
use super::capture::{Alerter, BrowserAlerter, BusyGuard};
use super::metadata::MetadataView;
use super::presets::PresetBar;
use super::widgets::ControlWidget;
use crate::state::PanelState;
use crate::utils::network::{ClientHandle, FetchTransport};

type Observer = Box<dyn Fn(&PanelState)>;

/// パネルのコントローラー
///
/// パネルのローカル状態を所有し、変更のたびにオブザーバーへ通知する。
pub struct PanelController<T> {
    client: Rc<ControlClient<T>>,
    layout: PanelLayout,
    state: RefCell<PanelState>,
    observer: RefCell<Option<Observer>>,
}

impl<T: HttpTransport> PanelController<T> {
    /// 新しいコントローラーを作成
    pub fn new(camera: &CameraDescriptor, client: Rc<ControlClient<T>>, config: &PanelConfig) -> Self {
        let layout = PanelLayout::build(camera, client.stream_url(&camera.id), config);
        Self {
            client,
            layout,
            state: RefCell::new(PanelState::default()),
            observer: RefCell::new(None),
        }
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    pub fn camera_id(&self) -> &str {
        &self.layout.camera.id
    }

    /// 状態変化の通知先を設定
    pub fn observe(&self, observer: impl Fn(&PanelState) + 'static) {
        *self.observer.borrow_mut() = Some(Box::new(observer));
    }

    fn update(&self, f: impl FnOnce(&mut PanelState)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            f(&mut state);
            state.clone()
        };
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer(&snapshot);
        }
    }

    /// バインディング表に従ってウィジェット操作を処理する
    pub async fn dispatch(&self, name: &str, value: ControlValue, alerter: &dyn Alerter) -> Result<()> {
        match self.layout.bindings.action(name) {
            Some(PanelAction::SetControl(key)) => self.set_control(key, value).await,
            Some(PanelAction::TriggerAutofocus(trigger)) => self.trigger_autofocus(trigger).await,
            Some(PanelAction::Capture) => {
                self.capture(alerter).await;
                Ok(())
            }
            None => {
                log::warn!("カメラ {} に未登録のウィジェット '{}' が操作されました", self.camera_id(), name);
                Ok(())
            }
        }
    }

    /// コントロールを1つ送信する
    pub async fn set_control(&self, key: ControlKey, value: ControlValue) -> Result<()> {
        let update = ControlUpdate::new(key, value);
        match self.client.set_control(self.camera_id(), &update).await {
            Ok(_) => {
                self.update(|state| {
                    state.last_sent.insert(key, update.value);
                    state.status = None;
                });
                Ok(())
            }
            Err(err) => {
                log::error!("{} の設定に失敗しました: {}", key, err);
                self.update(|state| state.status = Some(format!("{} failed: {}", key, err)));
                Err(err)
            }
        }
    }

    /// オートフォーカスの開始・取り消し
    pub async fn trigger_autofocus(&self, trigger: AfTrigger) -> Result<()> {
        if let Err(err) = self.client.trigger_autofocus(self.camera_id(), trigger).await {
            log::error!("AFトリガー {:?} に失敗しました: {}", trigger, err);
            self.update(|state| state.status = Some(format!("Autofocus failed: {}", err)));
            return Err(err);
        }
        Ok(())
    }

    /// 静止画をキャプチャする
    ///
    /// 処理中は再入を無視し、結果にかかわらず処理中フラグを戻す。
    pub async fn capture(&self, alerter: &dyn Alerter) {
        if self.state.borrow().capture_busy {
            log::debug!("カメラ {} はキャプチャ中のため無視します", self.camera_id());
            return;
        }

        let _busy = BusyGuard::engage(|busy| self.update(|state| state.capture_busy = busy));
        match self.client.capture(self.camera_id()).await {
            Ok(mut result) => {
                log::info!("カメラ {} をキャプチャしました: {}", self.camera_id(), result.filename);
                result.url = self.client.absolute_url(&result.url);
                self.update(|state| state.last_capture = Some(result));
            }
            Err(err) => {
                log::error!("カメラ {} のキャプチャに失敗しました: {}", self.camera_id(), err);
                alerter.alert(&format!("Capture failed: {}", err));
            }
        }
    }

    /// メタデータを再取得する
    pub async fn refresh_metadata(&self) {
        match self.client.metadata(self.camera_id()).await {
            Ok(metadata) => self.update(|state| {
                state.metadata = Some(metadata.metadata);
                state.status = None;
            }),
            Err(err) => {
                log::warn!("メタデータの取得に失敗しました: {}", err);
                self.update(|state| state.status = Some(format!("Metadata failed: {}", err)));
            }
        }
    }

    /// プリセット名の一覧を再取得する
    pub async fn reload_presets(&self) -> Result<()> {
        let document = self.client.presets().await?;
        self.update(|state| state.preset_names = document.presets.keys().cloned().collect());
        Ok(())
    }

    /// 最後に送った値をプリセットとして保存する
    pub async fn save_preset(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Invalid("preset name is empty".to_string()));
        }

        let values = self
            .state
            .borrow()
            .last_sent
            .iter()
            .map(|(key, value)| (key.as_str().to_string(), value.clone()))
            .collect();

        let mut document: PresetDocument = self.client.presets().await?;
        document.presets.insert(name.to_string(), values);
        self.client.save_presets(&document).await?;

        log::info!("プリセット '{}' を保存しました", name);
        self.update(|state| state.preset_names = document.presets.keys().cloned().collect());
        Ok(())
    }

    /// プリセットを適用する
    ///
    /// 各値を個別の単一キー更新としてキー順に送り、最初の失敗で中断する。
    pub async fn apply_preset(&self, name: &str, alerter: &dyn Alerter) {
        if let Err(err) = self.try_apply_preset(name).await {
            alerter.alert(&format!("Preset failed: {}", err));
        }
    }

    async fn try_apply_preset(&self, name: &str) -> Result<()> {
        let document = self.client.presets().await?;
        let values = document
            .presets
            .get(name)
            .ok_or_else(|| ApiError::Invalid(format!("unknown preset '{}'", name)))?;

        for (raw_key, raw_value) in values {
            let key = match raw_key.parse::<ControlKey>() {
                Ok(key) => key,
                Err(e) => {
                    log::warn!("プリセット '{}' の項目を無視します: {}", name, e);
                    continue;
                }
            };
            let Some(value) = raw_value.coerce(key.value_kind()) else {
                log::warn!("プリセット '{}' の {} の値 {:?} を無視します", name, key, raw_value);
                continue;
            };
            self.set_control(key, value).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl<T> PanelController<T> {
    /// 現在の状態のスナップショット
    pub fn state(&self) -> PanelState {
        self.state.borrow().clone()
    }
}

fn spawn_reload_presets(controller: Rc<PanelController<FetchTransport>>) {
    spawn_local(async move {
        if let Err(err) = controller.reload_presets().await {
            log::warn!("プリセット一覧の取得に失敗しました: {}", err);
        }
    });
}

/// カメラパネルのプロパティ
#[derive(Properties, Clone, PartialEq)]
pub struct CameraPanelProps {
    pub camera: CameraDescriptor,
    pub client: ClientHandle,
    pub config: Rc<PanelConfig>,
}

/// カメラパネルコンポーネント
#[function_component(CameraPanel)]
pub fn camera_panel(props: &CameraPanelProps) -> Html {
    let view = use_state(PanelState::default);

    let controller = {
        let view = view.clone();
        let client = props.client.0.clone();
        let config = props.config.clone();
        use_memo(
            move |camera: &CameraDescriptor| {
                let controller = PanelController::<FetchTransport>::new(camera, client, &config);
                controller.observe(move |state| view.set(state.clone()));
                controller
            },
            props.camera.clone(),
        )
    };

    // ウィジェット名ごとのハンドラー
    let on_widget = |name: String| {
        let controller = controller.clone();
        Callback::from(move |value: ControlValue| {
            let controller = controller.clone();
            let name = name.clone();
            spawn_local(async move {
                if let Err(err) = controller.dispatch(&name, value, &BrowserAlerter).await {
                    log::debug!("'{}' の処理がエラーで終了しました: {}", name, err);
                }
            });
        })
    };

    let on_refresh_metadata = {
        let controller = controller.clone();
        Callback::from(move |_: ()| {
            let controller = controller.clone();
            spawn_local(async move { controller.refresh_metadata().await });
        })
    };

    let on_reload_presets = {
        let controller = controller.clone();
        Callback::from(move |_: ()| spawn_reload_presets(controller.clone()))
    };

    // マウント時にプリセット一覧を一度だけ取得する
    {
        let controller = controller.clone();
        use_effect_with_deps(
            move |_| {
                spawn_reload_presets(controller);
                || ()
            },
            (),
        );
    }

    let on_save_preset = {
        let controller = controller.clone();
        Callback::from(move |name: String| {
            let controller = controller.clone();
            spawn_local(async move {
                if let Err(err) = controller.save_preset(&name).await {
                    BrowserAlerter.alert(&format!("Preset failed: {}", err));
                }
            });
        })
    };

    let on_apply_preset = {
        let controller = controller.clone();
        Callback::from(move |name: String| {
            let controller = controller.clone();
            spawn_local(async move { controller.apply_preset(&name, &BrowserAlerter).await });
        })
    };

    let layout = controller.layout();

    html! {
        <section class="camera-panel" id={format!("camera-{}", layout.camera.id)}>
            <h2>{layout.camera.label.clone()}</h2>
            <img class="preview" src={layout.preview.src.clone()} alt={layout.preview.alt.clone()} />

            <div class="controls">
                { for layout.widgets.iter().map(|def| html! {
                    <ControlWidget
                        key={def.name.clone()}
                        def={def.clone()}
                        on_change={on_widget(def.name.clone())}
                        disabled={def.name == CAPTURE && view.capture_busy}
                    />
                }) }
            </div>

            if let Some(capture) = &view.last_capture {
                <p class="capture-result">
                    {"Saved: "}
                    <a href={capture.url.clone()} target="_blank">{capture.filename.clone()}</a>
                </p>
            }

            if let Some(status) = &view.status {
                <p class="panel-status error">{status.clone()}</p>
            }

            <PresetBar
                names={view.preset_names.clone()}
                on_reload={on_reload_presets}
                on_save={on_save_preset}
                on_apply={on_apply_preset}
            />

            <MetadataView metadata={view.metadata.clone()} on_refresh={on_refresh_metadata} />
        </section>
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::executor::block_on;
    use picam_panel_common::api::testing::RecordingTransport;
    use picam_panel_common::Method;

    use super::*;
    use crate::components::bindings::{AF_CANCEL, AF_START};

    #[derive(Default)]
    struct RecordingAlerter {
        messages: RefCell<Vec<String>>,
    }

    impl Alerter for RecordingAlerter {
        fn alert(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }

    fn sent_bodies(transport: &RecordingTransport) -> Vec<String> {
        transport
            .requests()
            .iter()
            .skip(1)
            .map(|r| r.body.clone().unwrap())
            .collect()
    }

    fn controller(transport: &RecordingTransport) -> Rc<PanelController<RecordingTransport>> {
        let client = Rc::new(ControlClient::new(transport.clone(), ""));
        let camera = CameraDescriptor::new("0", "imx708");
        Rc::new(PanelController::new(&camera, client, &PanelConfig::default()))
    }

    #[test]
    fn test_exposure_handler_posts_single_key_body() {
        let transport = RecordingTransport::new();
        let controller = controller(&transport);
        let alerter = RecordingAlerter::default();

        block_on(controller.dispatch("exposure_time", ControlValue::Int(5000), &alerter)).unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].url, "/api/0/controls");
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"exposure_time":5000}"#));
        assert_eq!(
            controller.state().last_sent.get(&ControlKey::ExposureTime),
            Some(&ControlValue::Int(5000))
        );
    }

    #[test]
    fn test_every_control_widget_sends_exactly_one_request() {
        let transport = RecordingTransport::new();
        let controller = controller(&transport);
        let alerter = RecordingAlerter::default();

        let controls: Vec<(String, ControlKey)> = controller
            .layout()
            .bindings
            .controls()
            .map(|(name, key)| (name.to_string(), key))
            .collect();

        for (i, (name, key)) in controls.iter().enumerate() {
            let value = controller.layout().widget(name).unwrap().spec.initial_value();
            block_on(controller.dispatch(name, value.clone(), &alerter)).unwrap();

            let requests = transport.requests();
            assert_eq!(requests.len(), i + 1, "{} sent more than one request", name);
            let body: serde_json::Value =
                serde_json::from_str(requests[i].body.as_deref().unwrap()).unwrap();
            let expected = serde_json::json!({ key.as_str(): value });
            assert_eq!(body, expected);
        }
        assert!(alerter.messages.borrow().is_empty());
    }

    #[test]
    fn test_autofocus_buttons_post_trigger() {
        let transport = RecordingTransport::new();
        let controller = controller(&transport);
        let alerter = RecordingAlerter::default();

        block_on(controller.dispatch(AF_START, ControlValue::Bool(true), &alerter)).unwrap();
        block_on(controller.dispatch(AF_CANCEL, ControlValue::Bool(true), &alerter)).unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url, "/api/0/af_trigger");
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"trigger":"start"}"#));
        assert_eq!(requests[1].body.as_deref(), Some(r#"{"trigger":"cancel"}"#));
    }

    #[test]
    fn test_capture_disables_trigger_until_success() {
        let transport = RecordingTransport::new();
        transport.respond(200, r#"{"status":"ok","url":"/captures/imx708_1.jpg","filename":"imx708_1.jpg"}"#);
        let controller = controller(&transport);
        let alerter = RecordingAlerter::default();

        let seen_busy = Rc::new(RefCell::new(Vec::new()));
        {
            let weak = Rc::downgrade(&controller);
            let seen_busy = seen_busy.clone();
            transport.on_send(move |_| {
                if let Some(controller) = weak.upgrade() {
                    seen_busy.borrow_mut().push(controller.state().capture_busy);
                }
            });
        }

        block_on(controller.dispatch(CAPTURE, ControlValue::Bool(true), &alerter)).unwrap();

        assert_eq!(*seen_busy.borrow(), vec![true]);
        let state = controller.state();
        assert!(!state.capture_busy);
        let capture = state.last_capture.unwrap();
        assert_eq!(capture.url, "/captures/imx708_1.jpg");
        assert_eq!(capture.filename, "imx708_1.jpg");
        assert!(alerter.messages.borrow().is_empty());
    }

    #[test]
    fn test_failed_capture_alerts_and_reenables_trigger() {
        let transport = RecordingTransport::new();
        transport.respond(500, "boom");
        let controller = controller(&transport);
        let alerter = RecordingAlerter::default();

        let observed = Rc::new(RefCell::new(Vec::new()));
        {
            let observed = observed.clone();
            controller.observe(move |state| observed.borrow_mut().push(state.capture_busy));
        }

        block_on(controller.capture(&alerter));

        assert_eq!(transport.requests()[0].url, "/api/0/capture");
        let messages = alerter.messages.borrow();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Capture failed: Error: boom"));
        assert_eq!(*observed.borrow(), vec![true, false]);
        assert!(!controller.state().capture_busy);
        assert!(controller.state().last_capture.is_none());
    }

    #[test]
    fn test_capture_is_ignored_while_in_flight() {
        let transport = RecordingTransport::new();
        let controller = controller(&transport);
        let alerter = RecordingAlerter::default();

        controller.update(|state| state.capture_busy = true);
        block_on(controller.capture(&alerter));

        assert!(transport.requests().is_empty());
        assert!(controller.state().capture_busy);
    }

    #[test]
    fn test_capture_link_is_joined_to_api_base() {
        let transport = RecordingTransport::new();
        transport.respond(200, r#"{"url":"/captures/a.jpg","filename":"a.jpg"}"#);
        let client = Rc::new(ControlClient::new(transport.clone(), "http://pi.local:8000"));
        let controller = PanelController::new(&CameraDescriptor::new("1", "imx477"), client, &PanelConfig::default());

        assert_eq!(controller.layout().preview.src, "http://pi.local:8000/stream/1.mjpg");
        block_on(controller.capture(&RecordingAlerter::default()));
        assert_eq!(
            controller.state().last_capture.unwrap().url,
            "http://pi.local:8000/captures/a.jpg"
        );
    }

    #[test]
    fn test_failed_control_sets_inline_status() {
        let transport = RecordingTransport::new();
        transport.respond(404, "Camera not found");
        let controller = controller(&transport);

        let err = block_on(controller.set_control(ControlKey::Ev, ControlValue::Float(1.5))).unwrap_err();
        assert_eq!(err.to_string(), "Error: Camera not found");
        assert_eq!(controller.state().status.as_deref(), Some("ev failed: Error: Camera not found"));
        assert!(controller.state().last_sent.is_empty());
    }

    #[test]
    fn test_unknown_widget_sends_nothing() {
        let transport = RecordingTransport::new();
        let controller = controller(&transport);
        block_on(controller.dispatch("gamma", ControlValue::Float(1.0), &RecordingAlerter::default())).unwrap();
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_refresh_metadata_stores_map() {
        let transport = RecordingTransport::new();
        transport.respond(200, r#"{"metadata":{"ExposureTime":9990,"Lux":312.5}}"#);
        let controller = controller(&transport);

        block_on(controller.refresh_metadata());

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url, "/api/0/controls");
        let metadata = controller.state().metadata.unwrap();
        assert_eq!(metadata["ExposureTime"], serde_json::json!(9990));
    }

    #[test]
    fn test_save_preset_stores_last_sent_values() {
        let transport = RecordingTransport::new();
        let controller = controller(&transport);

        block_on(controller.set_control(ControlKey::AnalogueGain, ControlValue::Float(2.5))).unwrap();
        transport.respond(200, r#"{"presets":{"night":{"exposure_time":100000}}}"#);
        transport.respond(200, r#"{"status":"ok"}"#);
        block_on(controller.save_preset("studio")).unwrap();

        let requests = transport.requests();
        assert_eq!(requests[1].method, Method::Get);
        assert_eq!(requests[2].method, Method::Post);
        assert_eq!(requests[2].url, "/api/presets");
        let saved: serde_json::Value = serde_json::from_str(requests[2].body.as_deref().unwrap()).unwrap();
        assert_eq!(
            saved,
            serde_json::json!({
                "presets": {
                    "night": {"exposure_time": 100000},
                    "studio": {"analogue_gain": 2.5}
                }
            })
        );
        assert_eq!(controller.state().preset_names, vec!["night", "studio"]);
    }

    #[test]
    fn test_reload_presets_lists_names() {
        let transport = RecordingTransport::new();
        transport.respond(200, r#"{"presets":{"scan":{},"night":{"ev":-1.0}}}"#);
        let controller = controller(&transport);

        block_on(controller.reload_presets()).unwrap();

        assert_eq!(transport.requests()[0].url, "/api/presets");
        assert_eq!(controller.state().preset_names, vec!["night", "scan"]);
    }

    #[test]
    fn test_save_preset_rejects_blank_name() {
        let transport = RecordingTransport::new();
        let controller = controller(&transport);
        let err = block_on(controller.save_preset("  ")).unwrap_err();
        assert!(matches!(err, ApiError::Invalid(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_apply_preset_sends_each_known_key_in_order() {
        let transport = RecordingTransport::new();
        transport.respond(
            200,
            r#"{"presets":{"night":{"exposure_time":100000.0,"analogue_gain":8,"gamma":2.2,"ae_enable":false}}}"#,
        );
        let controller = controller(&transport);
        let alerter = RecordingAlerter::default();

        block_on(controller.apply_preset("night", &alerter));

        assert_eq!(
            sent_bodies(&transport),
            vec![
                r#"{"ae_enable":false}"#.to_string(),
                r#"{"analogue_gain":8.0}"#.to_string(),
                r#"{"exposure_time":100000}"#.to_string(),
            ]
        );
        assert!(alerter.messages.borrow().is_empty());
    }

    #[test]
    fn test_apply_preset_keeps_noise_reduction_and_numeric_awb_mode() {
        let transport = RecordingTransport::new();
        transport.respond(
            200,
            r#"{"presets":{"scan":{"noise_reduction_mode":"fast","awb_mode":1,"brightness":0.2}}}"#,
        );
        let controller = controller(&transport);
        let alerter = RecordingAlerter::default();

        block_on(controller.apply_preset("scan", &alerter));

        assert_eq!(
            sent_bodies(&transport),
            vec![
                r#"{"awb_mode":1}"#.to_string(),
                r#"{"brightness":0.2}"#.to_string(),
                r#"{"noise_reduction_mode":"fast"}"#.to_string(),
            ]
        );
        assert!(alerter.messages.borrow().is_empty());
        assert_eq!(
            controller.state().last_sent.get(&ControlKey::AwbMode),
            Some(&ControlValue::Int(1))
        );
    }

    #[test]
    fn test_unknown_preset_is_alerted_without_requests_beyond_lookup() {
        let transport = RecordingTransport::new();
        transport.respond(200, r#"{"presets":{}}"#);
        let controller = controller(&transport);
        let alerter = RecordingAlerter::default();

        block_on(controller.apply_preset("missing", &alerter));

        assert_eq!(transport.requests().len(), 1);
        assert_eq!(*alerter.messages.borrow(), vec!["Preset failed: Error: unknown preset 'missing'".to_string()]);
    }

    #[test]
    fn test_apply_preset_stops_at_first_failure() {
        let transport = RecordingTransport::new();
        transport.respond(200, r#"{"presets":{"p":{"brightness":0.1,"contrast":1.2}}}"#);
        transport.respond(500, "camera busy");
        let controller = controller(&transport);
        let alerter = RecordingAlerter::default();

        block_on(controller.apply_preset("p", &alerter));

        assert_eq!(transport.requests().len(), 2);
        assert_eq!(*alerter.messages.borrow(), vec!["Preset failed: Error: camera busy".to_string()]);
    }
}
