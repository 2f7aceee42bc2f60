//! パネルのレイアウトとイベントバインディング表
//!
//! カメラ1台分のパネルを宣言的に組み立て、ウィジェット名から
//! 実行するアクションへの対応表を作ります。DOMなしで検査できるように、
//! 描画とは分離しています。

use std::collections::BTreeMap;

use picam_panel_common::protocol::{AF_MODES, AWB_MODES, NOISE_REDUCTION_MODES};
use picam_panel_common::{AfTrigger, CameraDescriptor, ControlKey, PanelConfig, ValueKind};

use super::widgets::{WidgetDef, WidgetSpec};

/// ウィジェット操作で実行するアクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// コントロールを1つ更新する
    SetControl(ControlKey),
    /// オートフォーカスの開始・取り消し
    TriggerAutofocus(AfTrigger),
    /// 静止画キャプチャ
    Capture,
}

/// バインディング表（ウィジェット名 → アクション）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlBindings {
    table: BTreeMap<String, PanelAction>,
}

impl ControlBindings {
    pub fn bind(&mut self, name: impl Into<String>, action: PanelAction) {
        self.table.insert(name.into(), action);
    }

    pub fn action(&self, name: &str) -> Option<PanelAction> {
        self.table.get(name).copied()
    }

}

#[cfg(test)]
impl ControlBindings {
    /// `SetControl` に束縛されたウィジェット名とキー
    pub fn controls(&self) -> impl Iterator<Item = (&str, ControlKey)> {
        self.table.iter().filter_map(|(name, action)| match action {
            PanelAction::SetControl(key) => Some((name.as_str(), *key)),
            _ => None,
        })
    }
}

/// プレビュー画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    /// MJPEGストリームのURL
    pub src: String,
    pub alt: String,
}

/// 名前付きウィジェット名
pub const AF_START: &str = "af_start";
pub const AF_CANCEL: &str = "af_cancel";
pub const CAPTURE: &str = "capture";

/// カメラ1台分のパネル
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    pub camera: CameraDescriptor,
    pub preview: PreviewImage,
    /// 表示順のウィジェット
    pub widgets: Vec<WidgetDef>,
    pub bindings: ControlBindings,
}

impl PanelLayout {
    /// カメラ記述子からパネルを組み立てる
    pub fn build(camera: &CameraDescriptor, stream_url: String, config: &PanelConfig) -> Self {
        let mut builder = LayoutBuilder {
            camera_id: &camera.id,
            widgets: Vec::new(),
            bindings: ControlBindings::default(),
        };

        builder.control(ControlKey::AeEnable, "Auto exposure", WidgetSpec::Checkbox { checked: true });
        builder.slider(config, ControlKey::ExposureTime, "Exposure time (µs)");
        builder.slider(config, ControlKey::AnalogueGain, "Analogue gain");
        builder.control(ControlKey::AwbEnable, "Auto white balance", WidgetSpec::Checkbox { checked: true });
        builder.control(ControlKey::AwbMode, "White balance mode", WidgetSpec::select(AWB_MODES, "Auto"));
        builder.slider(config, ControlKey::Ev, "Exposure compensation (EV)");
        builder.control(ControlKey::AfMode, "Autofocus mode", WidgetSpec::select(AF_MODES, "continuous"));
        builder.slider(config, ControlKey::LensPosition, "Lens position (dioptres)");
        builder.action(AF_START, "Start autofocus", "AF start", PanelAction::TriggerAutofocus(AfTrigger::Start));
        builder.action(AF_CANCEL, "Cancel autofocus", "AF cancel", PanelAction::TriggerAutofocus(AfTrigger::Cancel));
        builder.slider(config, ControlKey::Brightness, "Brightness");
        builder.slider(config, ControlKey::Contrast, "Contrast");
        builder.slider(config, ControlKey::Saturation, "Saturation");
        builder.slider(config, ControlKey::Sharpness, "Sharpness");
        builder.control(
            ControlKey::NoiseReductionMode,
            "Noise reduction",
            WidgetSpec::select(NOISE_REDUCTION_MODES, "fast"),
        );
        builder.action(CAPTURE, "Capture still", "Capture", PanelAction::Capture);

        let LayoutBuilder { widgets, bindings, .. } = builder;
        Self {
            camera: camera.clone(),
            preview: PreviewImage {
                src: stream_url,
                alt: format!("{} preview", camera.label),
            },
            widgets,
            bindings,
        }
    }

}

#[cfg(test)]
impl PanelLayout {
    /// 名前でウィジェットを探す
    pub fn widget(&self, name: &str) -> Option<&WidgetDef> {
        self.widgets.iter().find(|w| w.name == name)
    }
}

struct LayoutBuilder<'a> {
    camera_id: &'a str,
    widgets: Vec<WidgetDef>,
    bindings: ControlBindings,
}

impl LayoutBuilder<'_> {
    fn push(&mut self, name: &str, label: &str, spec: WidgetSpec, action: PanelAction) {
        self.widgets.push(WidgetDef {
            name: name.to_string(),
            dom_id: format!("cam{}-{}", self.camera_id, name.replace('_', "-")),
            label: label.to_string(),
            spec,
        });
        self.bindings.bind(name, action);
    }

    fn control(&mut self, key: ControlKey, label: &str, spec: WidgetSpec) {
        self.push(key.as_str(), label, spec, PanelAction::SetControl(key));
    }

    fn slider(&mut self, config: &PanelConfig, key: ControlKey, label: &str) {
        let integer = key.value_kind() == ValueKind::Integer;
        self.control(key, label, WidgetSpec::range(config.range(key), integer));
    }

    fn action(&mut self, name: &str, label: &str, caption: &str, action: PanelAction) {
        let spec = WidgetSpec::Button {
            caption: caption.to_string(),
        };
        self.push(name, label, spec, action);
    }
}
