use std::fmt::Write as _;

use thiserror::Error;

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误状态枚举
/// 区分传输层失败、后端返回的失败以及本地错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopErrorStatus {
    /// 网络不可达、请求无法发出
    Transport,
    /// 后端返回非 2xx（401/404 以外）
    Backend(u16),
    /// 401: 凭据无效或会话过期
    Unauthorized,
    /// 404: 资源未找到
    NotFound,
    /// JSON 解析或序列化失败
    Serialization,
    /// 本地输入无效，请求未发送
    InvalidInput,
    /// 本地存储读写失败
    Storage,
}

impl ShopErrorStatus {
    /// 根据 HTTP 状态码映射
    pub fn from_http(status: u16) -> Self {
        match status {
            401 => ShopErrorStatus::Unauthorized,
            404 => ShopErrorStatus::NotFound,
            other => ShopErrorStatus::Backend(other),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ShopErrorStatus::Transport => "TRANSPORT_ERROR",
            ShopErrorStatus::Backend(_) => "BACKEND_ERROR",
            ShopErrorStatus::Unauthorized => "UNAUTHORIZED",
            ShopErrorStatus::NotFound => "RESOURCE_NOT_FOUND",
            ShopErrorStatus::Serialization => "JSON_PARSE_ERROR",
            ShopErrorStatus::InvalidInput => "INVALID_INPUT",
            ShopErrorStatus::Storage => "STORAGE_ERROR",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpan {
    /// 操作名称，如 "auth.token", "cart.add"
    pub operation: String,
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

fn render_spans(spans: &[ErrorSpan]) -> String {
    if spans.is_empty() {
        return String::new();
    }
    let mut out = String::from(" | trace: ");
    for (i, span) in spans.iter().enumerate() {
        if i > 0 {
            out.push_str(" -> ");
        }
        out.push_str(&span.operation);
        if let Some(detail) = &span.detail {
            let _ = write!(out, "({})", detail);
        }
    }
    out
}

// =========================================================
// 核心错误类型
// =========================================================

/// 客户端错误
///
/// - status: 错误类型/语义
/// - message: 面向用户的消息（后端 payload 中的 message 优先）
/// - source: 原始错误（可选）
/// - spans: 结构化的调用追踪栈
#[derive(Debug, Error)]
#[error("[{}] {}{}", .status.error_code(), .message, render_spans(.spans))]
pub struct ShopError {
    pub status: ShopErrorStatus,
    message: String,
    /// 消息是否来自后端返回的错误 payload
    remote: bool,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    spans: Vec<ErrorSpan>,
}

impl ShopError {
    pub fn new(status: ShopErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            remote: false,
            source: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ShopErrorStatus::Transport, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ShopErrorStatus::Unauthorized, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ShopErrorStatus::Serialization, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ShopErrorStatus::InvalidInput, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ShopErrorStatus::Storage, message)
    }

    /// 从非 2xx 响应构造错误
    ///
    /// 后端 payload 中带有 message 时直接使用，否则退回到状态码描述。
    pub fn from_response(status: u16, payload_message: Option<String>) -> Self {
        let kind = ShopErrorStatus::from_http(status);
        match payload_message.filter(|m| !m.trim().is_empty()) {
            Some(message) => Self {
                remote: true,
                ..Self::new(kind, message)
            },
            None => Self::new(kind, format!("Request failed with status code {}", status)),
        }
    }

    // --- Context builders (Builder Pattern) ---

    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    /// 面向用户的消息
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 后端 payload 提供的消息（如有）
    pub fn remote_message(&self) -> Option<&str> {
        self.remote.then_some(self.message.as_str())
    }

    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }
}

pub type ShopResult<T> = std::result::Result<T, ShopError>;

// =========================================================
// 类型转换实现
// =========================================================

impl From<serde_json::Error> for ShopError {
    fn from(e: serde_json::Error) -> Self {
        ShopError::serialization(e.to_string()).with_source(e)
    }
}

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for ShopError {
    fn from(e: reqwest::Error) -> Self {
        ShopError::transport(e.to_string()).with_source(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_message_wins() {
        let err = ShopError::from_response(400, Some("Email already taken".into()));
        assert_eq!(err.status, ShopErrorStatus::Backend(400));
        assert_eq!(err.message(), "Email already taken");
        assert_eq!(err.remote_message(), Some("Email already taken"));
    }

    #[test]
    fn missing_payload_falls_back_to_status() {
        let err = ShopError::from_response(401, None);
        assert_eq!(err.status, ShopErrorStatus::Unauthorized);
        assert_eq!(err.message(), "Request failed with status code 401");
        assert!(err.remote_message().is_none());

        let blank = ShopError::from_response(500, Some("  ".into()));
        assert!(blank.remote_message().is_none());
    }

    #[test]
    fn display_includes_trace() {
        let err = ShopError::transport("connection refused")
            .in_op("http.send")
            .in_op_with("cart.add", "product 5");
        assert_eq!(
            err.to_string(),
            "[TRANSPORT_ERROR] connection refused | trace: http.send -> cart.add(product 5)"
        );
        assert_eq!(err.spans().len(), 2);
    }

    #[test]
    fn serde_errors_become_serialization() {
        let err: ShopError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.status, ShopErrorStatus::Serialization);
        assert!(std::error::Error::source(&err).is_some());
    }
}
