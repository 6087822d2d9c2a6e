use std::cell::RefCell;
use std::collections::BTreeMap;

use oeffi_shop_shared::protocol::{ApiRequest, ErrorPayload, UPLOAD_FIELD, UPLOAD_PATH, UploadResponse};
use oeffi_shop_shared::{FILES_PATH, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, bearer};

use crate::config::ClientConfig;
use crate::error::{ShopError, ShopResult};
use crate::http::{FileUpload, HttpClient, HttpMethod, HttpRequest, HttpResponse};

/// 根据存储键拼接文件的绝对地址
///
/// 纯函数：键缺失或为空白时返回空字符串。
pub fn image_url(origin: &str, key: Option<&str>) -> String {
    match key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => format!("{}{}/{}", origin, FILES_PATH, key),
        None => String::new(),
    }
}

// =========================================================
// API 客户端
// =========================================================

/// 后端 API 客户端
///
/// 持有基础地址和默认请求头。默认请求头会合并到每一个请求中，
/// 请求自身显式设置的同名头优先。
pub struct ApiClient<C: HttpClient> {
    client: C,
    base_url: String,
    default_headers: RefCell<BTreeMap<String, String>>,
}

impl<C: HttpClient> ApiClient<C> {
    pub fn new(client: C, config: &ClientConfig) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        Self {
            client,
            base_url: config.api_base_url.clone(),
            default_headers: RefCell::new(headers),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// 安装或移除默认的 Bearer 认证头
    pub fn set_bearer_token(&self, token: Option<&str>) {
        let mut headers = self.default_headers.borrow_mut();
        match token {
            Some(token) => {
                headers.insert(HEADER_AUTHORIZATION.to_string(), bearer(token));
            }
            None => {
                headers.remove(HEADER_AUTHORIZATION);
            }
        }
    }

    /// 当前安装的默认 token
    pub fn bearer_token(&self) -> Option<String> {
        self.default_headers
            .borrow()
            .get(HEADER_AUTHORIZATION)
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn file_url(&self, key: Option<&str>) -> String {
        image_url(&self.base_url, key)
    }

    fn build<R: ApiRequest>(&self, req: &R) -> ShopResult<HttpRequest> {
        let mut http = HttpRequest::new(&self.url(&req.path()), R::METHOD);
        if req.has_body() {
            let body = serde_json::to_string(req)?;
            http = http
                .with_header(HEADER_CONTENT_TYPE, "application/json")
                .with_json(body);
        }
        Ok(http)
    }

    /// 发送类型化请求，使用默认请求头
    pub async fn send<R: ApiRequest>(&self, req: &R) -> ShopResult<R::Response> {
        let http = self.build(req)?;
        self.execute(http).await?.json()
    }

    /// 发送类型化请求，显式携带给定的 token
    ///
    /// 用于默认认证头尚未安装的场景（登录后立即获取资料）。
    pub async fn send_authorized<R: ApiRequest>(
        &self,
        req: &R,
        token: &str,
    ) -> ShopResult<R::Response> {
        let http = self
            .build(req)?
            .with_header(HEADER_AUTHORIZATION, &bearer(token));
        self.execute(http).await?.json()
    }

    /// 上传文件，返回服务端的存储键
    pub async fn upload(&self, file: FileUpload) -> ShopResult<String> {
        let file_name = file.file_name.clone();
        let http =
            HttpRequest::new(&self.url(UPLOAD_PATH), HttpMethod::Post).with_file(UPLOAD_FIELD, file);
        let resp: UploadResponse = self
            .execute(http)
            .await
            .and_then(|r| r.json())
            .map_err(|e| e.in_op_with("api.upload", file_name))?;
        Ok(resp.path)
    }

    /// 合并默认请求头并发送；非 2xx 响应映射为 `ShopError`
    pub async fn execute(&self, mut req: HttpRequest) -> ShopResult<HttpResponse> {
        for (k, v) in self.default_headers.borrow().iter() {
            req.headers.entry(k.clone()).or_insert_with(|| v.clone());
        }

        let method = req.method.as_str();
        let url = req.url.clone();
        tracing::debug!(method, url = %url, "sending request");

        let resp = self.client.send(req).await.map_err(|e| {
            tracing::warn!(method, url = %url, "transport failure: {}", e);
            e.in_op_with("api.execute", format!("{} {}", method, url))
        })?;

        if resp.ok() {
            return Ok(resp);
        }

        let payload = serde_json::from_str::<ErrorPayload>(&resp.body)
            .ok()
            .and_then(|p| p.message);
        let err = ShopError::from_response(resp.status, payload)
            .in_op_with("api.execute", format!("{} {}", method, url));
        tracing::warn!(method, url = %url, status = resp.status, "request failed: {}", err.message());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShopErrorStatus;
    use crate::http::HttpBody;
    use crate::test_support::{BASE, api};
    use oeffi_shop_shared::protocol::{CurrentUserRequest, GetProductRequest, TokenRequest};
    use serde_json::json;

    #[test]
    fn image_url_is_pure() {
        assert_eq!(
            image_url("http://localhost:8081", Some("abc.png")),
            "http://localhost:8081/api/files/abc.png"
        );
        assert_eq!(image_url("http://localhost:8081", None), "");
        assert_eq!(image_url("http://localhost:8081", Some("  ")), "");
    }

    #[tokio::test]
    async fn default_header_is_merged_and_removable() {
        let api = api();
        api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/products/5", BASE),
            200,
            json!({ "id": 5, "name": "Widget", "price": 10.0 }),
        );

        api.set_bearer_token(Some("t-1"));
        assert_eq!(api.bearer_token().as_deref(), Some("t-1"));
        let product = api.send(&GetProductRequest { id: 5 }).await.unwrap();
        assert_eq!(product.name, "Widget");

        let sent = api.client().last_request().unwrap();
        assert_eq!(sent.headers.get("Authorization").unwrap(), "Bearer t-1");
        assert!(sent.body.is_none());

        api.set_bearer_token(None);
        api.send(&GetProductRequest { id: 5 }).await.unwrap();
        let sent = api.client().last_request().unwrap();
        assert!(sent.headers.get("Authorization").is_none());
    }

    #[tokio::test]
    async fn explicit_token_overrides_default() {
        let api = api();
        api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/users/me", BASE),
            200,
            json!({ "id": "u-1" }),
        );
        api.set_bearer_token(Some("old"));
        api.send_authorized(&CurrentUserRequest, "fresh").await.unwrap();
        let sent = api.client().last_request().unwrap();
        assert_eq!(sent.headers.get("Authorization").unwrap(), "Bearer fresh");
    }

    #[tokio::test]
    async fn json_body_and_error_payload() {
        let api = api();
        api.client().mock_response(
            HttpMethod::Post,
            &format!("{}/auth/token", BASE),
            401,
            json!({ "message": "Bad credentials" }),
        );
        let err = api
            .send(&TokenRequest {
                username: "ada".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status, ShopErrorStatus::Unauthorized);
        assert_eq!(err.remote_message(), Some("Bad credentials"));

        let sent = api.client().last_request().unwrap();
        assert_eq!(sent.json().unwrap(), json!({ "username": "ada", "password": "pw" }));
        assert_eq!(sent.headers.get("Content-Type").unwrap(), "application/json");
    }

    #[tokio::test]
    async fn transport_failure_is_traced() {
        let api = api();
        api.client()
            .mock_failure(HttpMethod::Get, &format!("{}/api/products/1", BASE), "offline");
        let err = api.send(&GetProductRequest { id: 1 }).await.unwrap_err();
        assert_eq!(err.status, ShopErrorStatus::Transport);
        assert_eq!(err.spans()[0].operation, "api.execute");
    }

    #[tokio::test]
    async fn upload_sends_multipart_file_field() {
        let api = api();
        api.client().mock_response(
            HttpMethod::Post,
            &format!("{}/api/files/upload", BASE),
            200,
            json!({ "path": "img/7.png" }),
        );
        let key = api
            .upload(FileUpload::new("7.png", "image/png", vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(key, "img/7.png");

        let sent = api.client().last_request().unwrap();
        match sent.body {
            Some(HttpBody::Multipart { field, file }) => {
                assert_eq!(field, "file");
                assert_eq!(file.bytes, vec![1, 2, 3]);
            }
            other => panic!("unexpected body: {:?}", other),
        }
        assert!(sent.headers.get("Content-Type").is_none());
    }
}
