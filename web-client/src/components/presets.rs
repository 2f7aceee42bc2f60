//! プリセット操作コンポーネント
//!
//! 名前を入力して保存、一覧から選んで適用します。実際の送信は
//! パネル側のコールバックに任せます。

use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

/// プリセット操作のプロパティ
#[derive(Properties, Clone, PartialEq)]
pub struct PresetBarProps {
    /// サーバーに保存されているプリセット名
    pub names: Vec<String>,
    pub on_reload: Callback<()>,
    pub on_save: Callback<String>,
    pub on_apply: Callback<String>,
}

/// プリセット操作コンポーネント
#[function_component(PresetBar)]
pub fn preset_bar(props: &PresetBarProps) -> Html {
    let name = use_state(String::new);
    let selected = use_state(|| None::<String>);

    let oninput = {
        let name = name.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            name.set(input.value());
        })
    };

    let onchange = {
        let selected = selected.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let value = select.value();
            selected.set(if value.is_empty() { None } else { Some(value) });
        })
    };

    let on_save = {
        let name = name.clone();
        let on_save = props.on_save.clone();
        Callback::from(move |_: MouseEvent| {
            if !name.trim().is_empty() {
                on_save.emit((*name).clone());
            }
        })
    };

    // 選択が無ければ先頭のプリセットを使う
    let target = (*selected).clone().or_else(|| props.names.first().cloned());
    let on_apply = {
        let on_apply = props.on_apply.clone();
        let target = target.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(target) = &target {
                on_apply.emit(target.clone());
            }
        })
    };

    let on_reload = {
        let on_reload = props.on_reload.clone();
        Callback::from(move |_: MouseEvent| on_reload.emit(()))
    };

    html! {
        <div class="presets">
            <input type="text" placeholder="Preset name" value={(*name).clone()} {oninput} />
            <button type="button" onclick={on_save}>{"Save preset"}</button>
            <select {onchange}>
                { for props.names.iter().map(|n| html! {
                    <option value={n.clone()} selected={target.as_deref() == Some(n.as_str())}>{n.clone()}</option>
                }) }
            </select>
            <button type="button" onclick={on_apply} disabled={target.is_none()}>{"Apply preset"}</button>
            <button type="button" onclick={on_reload}>{"Reload presets"}</button>
        </div>
    }
}
