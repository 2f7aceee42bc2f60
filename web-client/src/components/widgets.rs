//! ウィジェットファクトリ
//!
//! ラベル付きのスライダー・チェックボックス・セレクト・ボタンを
//! 宣言的な [`WidgetSpec`] から生成し、操作のたびに解釈済みの値で
//! コールバックを呼び出します。範囲外の値のクランプは行いません。

use picam_panel_common::{ControlValue, RangeConfig};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

/// ウィジェットの種類と値域
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetSpec {
    /// 範囲スライダー
    Range {
        min: f64,
        max: f64,
        step: f64,
        value: f64,
        /// 整数値として送るかどうか
        integer: bool,
    },
    /// チェックボックス
    Checkbox { checked: bool },
    /// セレクト
    Select { options: Vec<String>, selected: String },
    /// アクションボタン
    Button { caption: String },
}

impl WidgetSpec {
    /// 設定の範囲からスライダーを作成
    pub fn range(range: RangeConfig, integer: bool) -> Self {
        WidgetSpec::Range {
            min: range.min,
            max: range.max,
            step: range.step,
            value: range.initial,
            integer,
        }
    }

    /// 文字列の選択肢からセレクトを作成
    pub fn select(options: &[&str], selected: &str) -> Self {
        WidgetSpec::Select {
            options: options.iter().map(|o| o.to_string()).collect(),
            selected: selected.to_string(),
        }
    }

    /// DOMから得た生の値を解釈する
    ///
    /// チェックボックスは `"true"`/`"false"`、ボタンは常に `true` を返す。
    pub fn parse(&self, raw: &str) -> Option<ControlValue> {
        match self {
            WidgetSpec::Range { integer, .. } => {
                let value = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
                if *integer {
                    Some(ControlValue::Int(value.round() as i64))
                } else {
                    Some(ControlValue::Float(value))
                }
            }
            WidgetSpec::Checkbox { .. } => raw.trim().parse::<bool>().ok().map(ControlValue::Bool),
            WidgetSpec::Select { options, .. } => options
                .iter()
                .find(|o| o.as_str() == raw)
                .map(|o| ControlValue::Text(o.clone())),
            WidgetSpec::Button { .. } => Some(ControlValue::Bool(true)),
        }
    }

    /// 初期値
    pub fn initial_value(&self) -> ControlValue {
        match self {
            WidgetSpec::Range { value, integer: true, .. } => ControlValue::Int(value.round() as i64),
            WidgetSpec::Range { value, .. } => ControlValue::Float(*value),
            WidgetSpec::Checkbox { checked } => ControlValue::Bool(*checked),
            WidgetSpec::Select { selected, .. } => ControlValue::Text(selected.clone()),
            WidgetSpec::Button { .. } => ControlValue::Bool(true),
        }
    }
}

/// パネル内の1つのウィジェット定義
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetDef {
    /// バインディング表のキー（パネル内で一意）
    pub name: String,
    /// DOM要素のID
    pub dom_id: String,
    /// ラベル
    pub label: String,
    pub spec: WidgetSpec,
}

/// ウィジェットのプロパティ
#[derive(Properties, Clone, PartialEq)]
pub struct ControlWidgetProps {
    pub def: WidgetDef,
    /// 値が変わるたびに呼ばれる
    pub on_change: Callback<ControlValue>,
    #[prop_or(false)]
    pub disabled: bool,
}

/// ウィジェットコンポーネント
#[function_component(ControlWidget)]
pub fn control_widget(props: &ControlWidgetProps) -> Html {
    // 数値ウィジェットの現在値ラベル
    let live = use_state(|| props.def.spec.initial_value());
    let def = &props.def;

    match &def.spec {
        WidgetSpec::Range { min, max, step, .. } => {
            let oninput = {
                let spec = def.spec.clone();
                let live = live.clone();
                let on_change = props.on_change.clone();
                Callback::from(move |e: InputEvent| {
                    let input: HtmlInputElement = e.target_unchecked_into();
                    if let Some(value) = spec.parse(&input.value()) {
                        live.set(value.clone());
                        on_change.emit(value);
                    }
                })
            };

            html! {
                <div class="control control-range">
                    <label>{def.label.clone()}</label>
                    <input
                        type="range"
                        id={def.dom_id.clone()}
                        min={min.to_string()}
                        max={max.to_string()}
                        step={step.to_string()}
                        value={live.display_text()}
                        disabled={props.disabled}
                        {oninput}
                    />
                    <span class="control-value">{live.display_text()}</span>
                </div>
            }
        }
        WidgetSpec::Checkbox { checked } => {
            let onchange = {
                let on_change = props.on_change.clone();
                Callback::from(move |e: Event| {
                    let input: HtmlInputElement = e.target_unchecked_into();
                    on_change.emit(ControlValue::Bool(input.checked()));
                })
            };

            html! {
                <div class="control control-checkbox">
                    <label>
                        <input
                            type="checkbox"
                            id={def.dom_id.clone()}
                            checked={*checked}
                            disabled={props.disabled}
                            {onchange}
                        />
                        {def.label.clone()}
                    </label>
                </div>
            }
        }
        WidgetSpec::Select { options, selected } => {
            let onchange = {
                let spec = def.spec.clone();
                let on_change = props.on_change.clone();
                Callback::from(move |e: Event| {
                    let select: HtmlSelectElement = e.target_unchecked_into();
                    if let Some(value) = spec.parse(&select.value()) {
                        on_change.emit(value);
                    }
                })
            };

            html! {
                <div class="control control-select">
                    <label>{def.label.clone()}</label>
                    <select id={def.dom_id.clone()} disabled={props.disabled} {onchange}>
                        { for options.iter().map(|option| html! {
                            <option value={option.clone()} selected={option == selected}>{option.clone()}</option>
                        }) }
                    </select>
                </div>
            }
        }
        WidgetSpec::Button { caption } => {
            let onclick = {
                let on_change = props.on_change.clone();
                Callback::from(move |_: MouseEvent| on_change.emit(ControlValue::Bool(true)))
            };

            html! {
                <button
                    id={def.dom_id.clone()}
                    class="control control-button"
                    title={def.label.clone()}
                    disabled={props.disabled}
                    {onclick}
                >
                    {caption.clone()}
                </button>
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_range_parses_to_int_without_clamping() {
        let spec = WidgetSpec::range(RangeConfig::new(100.0, 200_000.0, 100.0, 10_000.0), true);
        assert_eq!(spec.parse("5000"), Some(ControlValue::Int(5000)));
        assert_eq!(spec.parse("999999"), Some(ControlValue::Int(999_999)));
        assert_eq!(spec.parse("abc"), None);
        assert_eq!(spec.initial_value(), ControlValue::Int(10_000));
    }

    #[test]
    fn test_float_range_parses_to_float() {
        let spec = WidgetSpec::range(RangeConfig::new(1.0, 16.0, 0.1, 1.0), false);
        assert_eq!(spec.parse("2.5"), Some(ControlValue::Float(2.5)));
        assert_eq!(spec.parse("NaN"), None);
    }

    #[test]
    fn test_select_only_accepts_known_options() {
        let spec = WidgetSpec::select(&["manual", "auto", "continuous"], "auto");
        assert_eq!(spec.parse("continuous"), Some(ControlValue::Text("continuous".into())));
        assert_eq!(spec.parse("macro"), None);
        assert_eq!(spec.initial_value(), ControlValue::Text("auto".into()));
    }

    #[test]
    fn test_checkbox_and_button_values() {
        let checkbox = WidgetSpec::Checkbox { checked: true };
        assert_eq!(checkbox.parse("false"), Some(ControlValue::Bool(false)));

        let button = WidgetSpec::Button { caption: "Capture".into() };
        assert_eq!(button.parse(""), Some(ControlValue::Bool(true)));
    }
}
