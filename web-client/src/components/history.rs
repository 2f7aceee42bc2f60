//! キャプチャ履歴コンポーネント
//!
//! タイムスタンプごとにまとめられたキャプチャを新しい順に一覧表示し、
//! グループ単位と全体のzipダウンロードリンクを出します。

use picam_panel_common::protocol::{endpoints, CaptureHistory, CaptureKind};
use picam_panel_common::{ControlClient, HttpTransport};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::utils::format::format_capture_time;
use crate::utils::network::ClientHandle;

/// 履歴の1リンク
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLink {
    pub caption: String,
    pub href: String,
}

/// 履歴の1グループ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// 表示用の時刻
    pub title: String,
    pub files: Vec<HistoryLink>,
    /// このグループのzip
    pub zip: HistoryLink,
}

/// 履歴レスポンスを表示用のエントリに変換（新しい順）
pub fn build_entries<T: HttpTransport>(history: &CaptureHistory, client: &ControlClient<T>) -> Vec<HistoryEntry> {
    let mut groups: Vec<_> = history.groups.iter().collect();
    groups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    groups
        .into_iter()
        .map(|group| HistoryEntry {
            title: format_capture_time(group),
            files: group
                .files
                .iter()
                .map(|file| {
                    let source = match file.kind {
                        CaptureKind::Phone => "phone",
                        CaptureKind::Pi => file.label.as_deref().unwrap_or("pi"),
                    };
                    HistoryLink {
                        caption: format!("{} ({})", file.name, source),
                        href: client.absolute_url(&file.url),
                    }
                })
                .collect(),
            zip: HistoryLink {
                caption: "zip".to_string(),
                href: client.absolute_url(&endpoints::zip_set(&group.timestamp)),
            },
        })
        .collect()
}

/// 履歴を取得して表示用に変換
pub async fn load_history<T: HttpTransport>(client: &ControlClient<T>) -> Result<Vec<HistoryEntry>, String> {
    match client.history().await {
        Ok(history) => Ok(build_entries(&history, client)),
        Err(err) => {
            log::warn!("キャプチャ履歴の取得に失敗しました: {}", err);
            Err(format!("Failed to load history: {}", err))
        }
    }
}

/// 履歴コンポーネントのプロパティ
#[derive(Properties, Clone, PartialEq)]
pub struct HistoryPanelProps {
    pub client: ClientHandle,
}

/// キャプチャ履歴コンポーネント
#[function_component(HistoryPanel)]
pub fn history_panel(props: &HistoryPanelProps) -> Html {
    let entries = use_state(|| None::<Result<Vec<HistoryEntry>, String>>);

    let onclick = {
        let entries = entries.clone();
        let client = props.client.0.clone();
        Callback::from(move |_: MouseEvent| {
            let entries = entries.clone();
            let client = client.clone();
            spawn_local(async move {
                entries.set(Some(load_history(&*client).await));
            });
        })
    };

    let zip_all = props.client.0.absolute_url(&endpoints::zip_all());

    html! {
        <section class="history">
            <h2>{"Capture history"}</h2>
            <button type="button" {onclick}>{"Refresh history"}</button>
            <a class="zip-all" href={zip_all}>{"Download all"}</a>
            {
                match &*entries {
                    None => html! {},
                    Some(Err(message)) => html! { <p class="error">{message.clone()}</p> },
                    Some(Ok(list)) if list.is_empty() => html! { <p>{"No captures yet"}</p> },
                    Some(Ok(list)) => html! {
                        <ul class="history-list">
                            { for list.iter().map(|entry| html! {
                                <li key={entry.title.clone()}>
                                    <span class="history-time">{entry.title.clone()}</span>
                                    { for entry.files.iter().map(|link| html! {
                                        <a href={link.href.clone()} target="_blank">{link.caption.clone()}</a>
                                    }) }
                                    <a class="zip" href={entry.zip.href.clone()}>{entry.zip.caption.clone()}</a>
                                </li>
                            }) }
                        </ul>
                    },
                }
            }
        </section>
    }
}
