use crate::error::{ShopError, ShopResult};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

pub use oeffi_shop_shared::protocol::HttpMethod;

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 待上传的二进制文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpBody {
    /// 已序列化的 JSON 文本
    Json(String),
    /// 单文件 multipart 表单
    Multipart { field: String, file: FileUpload },
}

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_json(mut self, body: String) -> Self {
        self.body = Some(HttpBody::Json(body));
        self
    }

    pub fn with_file(mut self, field: &str, file: FileUpload) -> Self {
        self.body = Some(HttpBody::Multipart {
            field: field.to_string(),
            file,
        });
        self
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 解析 JSON 响应体；空响应体按 `null` 处理
    pub fn json<T: DeserializeOwned>(&self) -> ShopResult<T> {
        let body = self.body.trim();
        let body = if body.is_empty() { "null" } else { body };
        serde_json::from_str(body).map_err(ShopError::from)
    }
}

/// HTTP 客户端特性 (Trait)
/// (?Send) 因为浏览器环境下的 fetch future 不是 Send 的
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> ShopResult<HttpResponse>;
}

// =========================================================
// 实现层: reqwest 客户端
// =========================================================

#[cfg(feature = "reqwest-client")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

#[cfg(feature = "reqwest-client")]
impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "reqwest-client")]
#[async_trait::async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, req: HttpRequest) -> ShopResult<HttpResponse> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &req.url);

        for (k, v) in &req.headers {
            builder = builder.header(k, v);
        }

        match req.body {
            Some(HttpBody::Json(body)) => {
                builder = builder.body(body);
            }
            Some(HttpBody::Multipart { field, file }) => {
                let part = reqwest::multipart::Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)?;
                builder = builder.multipart(reqwest::multipart::Form::new().part(field, part));
            }
            None => {}
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| ShopError::from(e).in_op("http.send"))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ShopError::from(e).in_op("http.body"))?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<HttpBody>,
}

#[cfg(test)]
impl RecordedRequest {
    /// 请求体解析为 JSON（仅 JSON 请求体）
    pub fn json(&self) -> Option<serde_json::Value> {
        match &self.body {
            Some(HttpBody::Json(s)) => serde_json::from_str(s).ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
enum MockReply {
    Response(u16, String),
    Failure(String),
}

#[cfg(test)]
pub struct MockHttpClient {
    // ("METHOD URL") -> reply
    replies: RefCell<HashMap<String, MockReply>>,
    pub requests: RefCell<Vec<RecordedRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            replies: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn key(method: HttpMethod, url: &str) -> String {
        format!("{} {}", method.as_str(), url)
    }

    pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.replies.borrow_mut().insert(
            Self::key(method, url),
            MockReply::Response(status, body.to_string()),
        );
    }

    /// 模拟网络层失败（请求无法发出）
    pub fn mock_failure(&self, method: HttpMethod, url: &str, message: &str) {
        self.replies
            .borrow_mut()
            .insert(Self::key(method, url), MockReply::Failure(message.to_string()));
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.borrow().last().cloned()
    }

    pub fn find(&self, method: HttpMethod, url: &str) -> Option<RecordedRequest> {
        self.requests
            .borrow()
            .iter()
            .find(|r| r.method == method && r.url == url)
            .cloned()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> ShopResult<HttpResponse> {
        let key = Self::key(req.method, &req.url);
        self.requests.borrow_mut().push(RecordedRequest {
            method: req.method,
            url: req.url,
            headers: req.headers,
            body: req.body,
        });

        match self.replies.borrow().get(&key) {
            Some(MockReply::Response(status, body)) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            Some(MockReply::Failure(message)) => Err(ShopError::transport(message.clone())),
            None => Ok(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_decodes_as_unit() {
        let resp = HttpResponse {
            status: 204,
            body: String::new(),
        };
        assert!(resp.ok());
        resp.json::<()>().unwrap();
        resp.json::<serde::de::IgnoredAny>().unwrap();
    }

    #[test]
    fn non_2xx_is_not_ok() {
        let resp = HttpResponse {
            status: 302,
            body: String::new(),
        };
        assert!(!resp.ok());
    }

    #[cfg(feature = "reqwest-client")]
    #[tokio::test]
    async fn reqwest_client_reports_unreachable_host_as_transport() {
        let client = ReqwestHttpClient::new();
        let req = HttpRequest::new("http://127.0.0.1:9/api/products", HttpMethod::Get);
        let err = client.send(req).await.unwrap_err();
        assert_eq!(err.status, crate::error::ShopErrorStatus::Transport);
        assert_eq!(err.spans()[0].operation, "http.send");
    }
}
