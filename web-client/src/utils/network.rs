//! ネットワークユーティリティ
//!
//! ブラウザの `fetch` を使ったHTTPトランスポートを提供します。

use std::rc::Rc;

use async_trait::async_trait;
use gloo::net::http::{Request, RequestBuilder};
use picam_panel_common::{ApiError, ApiRequest, ApiResponse, ControlClient, HttpTransport, Method, Result};

/// `fetch` によるトランスポート
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

/// メソッドとヘッダーを設定したビルダー
fn builder(request: &ApiRequest) -> RequestBuilder {
    match request.method {
        Method::Get => Request::get(&request.url),
        Method::Post => Request::post(&request.url),
    }
    .header("Content-Type", "application/json")
}

/// JSON本文付きのリクエストを組み立てる
fn with_body(builder: RequestBuilder, body: String) -> Result<Request> {
    builder.body(body).map_err(|e| ApiError::Transport(e.to_string()))
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let builder = builder(&request);
        let sent = match request.body {
            Some(body) => with_body(builder, body)?.send().await,
            None => builder.send().await,
        };

        let response = sent.map_err(|e| {
            log::error!("{} {} の送信に失敗しました: {}", request.method.as_str(), request.url, e);
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(ApiResponse { status, body })
    }
}

/// ブラウザで使うクライアント
pub type BrowserClient = ControlClient<FetchTransport>;

/// コンポーネント間で共有するクライアントハンドル（同一性で比較する）
#[derive(Debug, Clone)]
pub struct ClientHandle(pub Rc<BrowserClient>);

impl ClientHandle {
    pub fn new(base_url: &str) -> Self {
        Self(Rc::new(ControlClient::new(FetchTransport, base_url)))
    }
}

impl PartialEq for ClientHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
