//! キャプチャ補助
//!
//! 処理中フラグを確実に戻すためのガードと、アラート表示の抽象化です。

/// ユーザーへのアラート表示
pub trait Alerter {
    fn alert(&self, message: &str);
}

/// ブラウザの `alert()` を使う実装
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserAlerter;

impl Alerter for BrowserAlerter {
    fn alert(&self, message: &str) {
        gloo::dialogs::alert(message);
    }
}

/// 処理中フラグのガード
///
/// 作成時に `set(true)`、破棄時（成功・失敗・パニックのいずれでも）に `set(false)` を呼ぶ。
pub struct BusyGuard<F: FnMut(bool)> {
    set: F,
}

impl<F: FnMut(bool)> BusyGuard<F> {
    pub fn engage(mut set: F) -> Self {
        set(true);
        Self { set }
    }
}

impl<F: FnMut(bool)> Drop for BusyGuard<F> {
    fn drop(&mut self) {
        (self.set)(false);
    }
}
