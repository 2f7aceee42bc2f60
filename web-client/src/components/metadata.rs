//! メタデータ表示コンポーネント

use std::collections::BTreeMap;

use yew::prelude::*;

use crate::utils::format::format_metadata_value;

/// メタデータ表示のプロパティ
#[derive(Properties, Clone, PartialEq)]
pub struct MetadataViewProps {
    /// 最新のメタデータ（未取得なら `None`）
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
    pub on_refresh: Callback<()>,
}

/// メタデータ表示コンポーネント
#[function_component(MetadataView)]
pub fn metadata_view(props: &MetadataViewProps) -> Html {
    let onclick = {
        let on_refresh = props.on_refresh.clone();
        Callback::from(move |_: MouseEvent| on_refresh.emit(()))
    };

    html! {
        <div class="metadata">
            <button type="button" {onclick}>{"Refresh metadata"}</button>
            {
                match &props.metadata {
                    None => html! {},
                    Some(metadata) if metadata.is_empty() => html! {
                        <p class="metadata-empty">{"No metadata"}</p>
                    },
                    Some(metadata) => html! {
                        <dl class="metadata-list">
                            { for metadata.iter().map(|(name, value)| html! {
                                <>
                                    <dt>{name.clone()}</dt>
                                    <dd>{format_metadata_value(value)}</dd>
                                </>
                            }) }
                        </dl>
                    },
                }
            }
        </div>
    }
}
