//! リモートコントロールクライアント
//!
//! JSONでREST APIを呼び出すクライアントです。HTTPの送受信そのものは
//! [`HttpTransport`] に任せるため、ブラウザの`fetch`でもテスト用の
//! 記録トランスポートでも同じコードが動きます。
//!
//! UI全体のエラーはすべてここを通って表面化します。ステータスが
//! 200〜299以外の場合はレスポンス本文をそのまま [`ApiError::RequestFailed`] にします。

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, Result};
use crate::protocol::{
    endpoints, Acknowledgement, AfTrigger, AfTriggerRequest, CameraDescriptor, CameraList,
    CaptureHistory, CaptureResult, ControlMetadata, ControlUpdate, PresetDocument,
};

/// HTTPメソッド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// 送信するリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// ベースURLを含む完全なURL
    pub url: String,
    /// JSON本文
    pub body: Option<String>,
}

/// 受信したレスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 成功ステータスかどうか
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTPトランスポート
///
/// ブラウザのUIスレッドで動くため `Send` を要求しない。
#[async_trait(?Send)]
pub trait HttpTransport {
    /// リクエストを送信し、ステータスと本文を返す
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// コントロールクライアント
#[derive(Debug, Clone)]
pub struct ControlClient<T> {
    transport: T,
    base_url: String,
}

impl<T: HttpTransport> ControlClient<T> {
    /// 新しいクライアントを作成
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { transport, base_url }
    }

    /// サーバー相対パスを絶対URLに変換（既に絶対URLならそのまま）
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}{}", self.base_url, path)
    }

    /// プレビュー画像に使うMJPEGストリームのURL
    pub fn stream_url(&self, camera_id: &str) -> String {
        self.absolute_url(&endpoints::stream(camera_id))
    }

    /// JSONリクエストを実行してレスポンスをデコードする
    pub async fn request<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = body.map(serde_json::to_string).transpose()?;
        let request = ApiRequest {
            method,
            url: self.absolute_url(path),
            body,
        };
        log::debug!("{} {} {:?}", request.method.as_str(), request.url, request.body);

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            log::error!("{} が失敗しました (status {}): {}", path, response.status, response.body);
            return Err(ApiError::RequestFailed(response.body));
        }

        Ok(serde_json::from_str(&response.body)?)
    }

    /// カメラ一覧を取得
    pub async fn list_cameras(&self) -> Result<Vec<CameraDescriptor>> {
        let list: CameraList = self.request::<(), _>(Method::Get, &endpoints::cameras(), None).await?;
        Ok(list.cameras)
    }

    /// コントロールを1つ更新
    pub async fn set_control(&self, camera_id: &str, update: &ControlUpdate) -> Result<Acknowledgement> {
        self.request(Method::Post, &endpoints::controls(camera_id), Some(update))
            .await
    }

    /// オートフォーカスを開始・取り消し
    pub async fn trigger_autofocus(&self, camera_id: &str, trigger: AfTrigger) -> Result<Acknowledgement> {
        let body = AfTriggerRequest { trigger };
        self.request(Method::Post, &endpoints::af_trigger(camera_id), Some(&body))
            .await
    }

    /// 静止画をキャプチャ
    pub async fn capture(&self, camera_id: &str) -> Result<CaptureResult> {
        self.request::<(), _>(Method::Post, &endpoints::capture(camera_id), None)
            .await
    }

    /// 最新のメタデータを取得
    pub async fn metadata(&self, camera_id: &str) -> Result<ControlMetadata> {
        self.request::<(), _>(Method::Get, &endpoints::controls(camera_id), None)
            .await
    }

    /// プリセット一式を取得
    pub async fn presets(&self) -> Result<PresetDocument> {
        self.request::<(), _>(Method::Get, &endpoints::presets(), None).await
    }

    /// プリセット一式を保存
    pub async fn save_presets(&self, document: &PresetDocument) -> Result<Acknowledgement> {
        self.request(Method::Post, &endpoints::presets(), Some(document))
            .await
    }

    /// キャプチャ履歴を取得
    pub async fn history(&self) -> Result<CaptureHistory> {
        self.request::<(), _>(Method::Get, &endpoints::history(), None).await
    }
}

/// テスト用の記録トランスポート
///
/// 送信されたリクエストを記録し、あらかじめ積んだレスポンスを順に返す。
#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;

    type Hook = Box<dyn Fn(&ApiRequest)>;

    /// 記録トランスポート（クローンは同じ記録を共有する）
    #[derive(Clone, Default)]
    pub struct RecordingTransport {
        inner: Rc<Inner>,
    }

    #[derive(Default)]
    struct Inner {
        requests: RefCell<Vec<ApiRequest>>,
        responses: RefCell<VecDeque<Result<ApiResponse>>>,
        hook: RefCell<Option<Hook>>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// 成功レスポンスを積む
        pub fn respond(&self, status: u16, body: &str) -> &Self {
            self.inner
                .responses
                .borrow_mut()
                .push_back(Ok(ApiResponse::new(status, body)));
            self
        }

        /// 通信エラーを積む
        pub fn fail(&self, detail: &str) -> &Self {
            self.inner
                .responses
                .borrow_mut()
                .push_back(Err(ApiError::Transport(detail.to_string())));
            self
        }

        /// 送信時に呼ばれるフックを設定
        pub fn on_send(&self, hook: impl Fn(&ApiRequest) + 'static) {
            *self.inner.hook.borrow_mut() = Some(Box::new(hook));
        }

        /// 記録されたリクエスト
        pub fn requests(&self) -> Vec<ApiRequest> {
            self.inner.requests.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl HttpTransport for RecordingTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            if let Some(hook) = self.inner.hook.borrow().as_ref() {
                hook(&request);
            }
            self.inner.requests.borrow_mut().push(request);
            self.inner
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(ApiResponse::new(200, r#"{"status":"ok"}"#)))
        }
    }
}
