//! 认证状态
//!
//! 持有会话 token 与当前用户资料，并负责在 API 客户端上安装默认认证头。

use std::rc::Rc;

use oeffi_shop_shared::User;
use oeffi_shop_shared::protocol::{CurrentUserRequest, TokenRequest};

use crate::api::ApiClient;
use crate::error::{ShopError, ShopResult};
use crate::http::HttpClient;
use crate::storage::{StorageTiers, TOKEN_KEY};

/// 会话快照
///
/// 要么既无 token 也无用户，要么有 token；
/// 有 token 而无用户是资料刷新前的过渡状态。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub(crate) token: Option<String>,
    pub(crate) user: Option<User>,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    /// 无用户资料时为空字符串
    pub fn full_name(&self) -> String {
        self.user.as_ref().map(User::full_name).unwrap_or_default()
    }

    /// 已加载的用户 ID；访客为 `None`
    pub fn user_id(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|u| u.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// 有 token 但资料尚未加载
    pub fn needs_profile(&self) -> bool {
        self.token.is_some() && self.user.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginCredentials {
    /// 邮箱或用户名
    pub identifier: String,
    pub password: String,
    /// true: 持久存储；false: 仅当前会话
    pub remember: bool,
}

pub struct AuthStore<C: HttpClient> {
    api: Rc<ApiClient<C>>,
    storage: StorageTiers,
    session: Session,
}

impl<C: HttpClient> AuthStore<C> {
    pub fn new(api: Rc<ApiClient<C>>, storage: StorageTiers) -> Self {
        Self {
            api,
            storage,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 登录
    ///
    /// 成功时 token、用户资料和默认认证头全部就位；
    /// 失败时会话被完整清除，返回可展示的错误消息。
    pub async fn login(&mut self, credentials: &LoginCredentials) -> Result<(), String> {
        self.session.loading = true;
        self.session.error = None;

        let result = self.authenticate(credentials).await;
        self.session.loading = false;

        match result {
            Ok((token, user)) => {
                if let Err(e) = self.persist_token(&token, credentials.remember) {
                    tracing::warn!("{}", e);
                }
                self.api.set_bearer_token(Some(&token));
                tracing::info!(user_id = %user.id, remember = credentials.remember, "logged in");
                self.session.token = Some(token);
                self.session.user = Some(user);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("login failed: {}", e);
                self.clear();
                let message = e.message().to_string();
                self.session.error = Some(message.clone());
                Err(message)
            }
        }
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> ShopResult<(String, User)> {
        let resp = self
            .api
            .send(&TokenRequest {
                username: credentials.identifier.clone(),
                password: credentials.password.clone(),
            })
            .await
            .map_err(|e| e.in_op("auth.token"))?;

        let token = resp
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ShopError::unauthorized("Token not found in response").in_op("auth.token"))?;

        let user = self
            .api
            .send_authorized(&CurrentUserRequest, &token)
            .await
            .map_err(|e| e.in_op("auth.me"))?;

        Ok((token, user))
    }

    /// 写入所选层级并清除另一层级；写入失败时会话仍只在内存中有效
    fn persist_token(&self, token: &str, remember: bool) -> ShopResult<()> {
        let (target, other) = if remember {
            (&self.storage.local, &self.storage.session)
        } else {
            (&self.storage.session, &self.storage.local)
        };
        other.delete(TOKEN_KEY);
        if !target.set(TOKEN_KEY, token) {
            let tier = if remember { "local" } else { "session" };
            return Err(ShopError::storage("Session token could not be stored")
                .in_op_with("auth.persist", tier));
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.session.token = None;
        self.session.user = None;
        self.session.error = None;
        self.api.set_bearer_token(None);
        self.storage.local.delete(TOKEN_KEY);
        self.storage.session.delete(TOKEN_KEY);
    }

    /// 登出：清除 token、资料、默认认证头以及两个存储层级
    pub fn logout(&mut self) {
        self.clear();
        tracing::info!("logged out");
    }

    /// 从存储恢复 token（local 优先，其次 session）
    ///
    /// 不校验 token，也不获取用户资料。
    pub fn restore_from_storage(&mut self) -> bool {
        let token = self
            .storage
            .local
            .get(TOKEN_KEY)
            .or_else(|| self.storage.session.get(TOKEN_KEY))
            .filter(|t| !t.is_empty());

        match token {
            Some(token) => {
                self.api.set_bearer_token(Some(&token));
                self.session.token = Some(token);
                tracing::debug!("session token restored");
                true
            }
            None => false,
        }
    }

    /// 使用当前 token 获取并覆盖用户资料；无 token 时不做任何事
    pub async fn fetch_me(&mut self) -> ShopResult<()> {
        let Some(token) = self.session.token.clone() else {
            return Ok(());
        };

        self.session.loading = true;
        let result = self.api.send_authorized(&CurrentUserRequest, &token).await;
        self.session.loading = false;

        let user = result.map_err(|e| e.in_op("auth.fetch_me"))?;
        tracing::debug!(user_id = %user.id, "profile refreshed");
        self.session.user = Some(user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShopErrorStatus;
    use crate::http::{HttpMethod, MockHttpClient};
    use crate::storage::MemoryStore;
    use crate::test_support::{BASE, FullStore, api, user_json};
    use serde_json::json;

    fn store() -> (AuthStore<MockHttpClient>, Rc<ApiClient<MockHttpClient>>, StorageTiers) {
        let api = api();
        let storage = StorageTiers::in_memory();
        (AuthStore::new(api.clone(), storage.clone()), api, storage)
    }

    fn credentials(remember: bool) -> LoginCredentials {
        LoginCredentials {
            identifier: "ada".into(),
            password: "secret".into(),
            remember,
        }
    }

    fn mock_login(api: &ApiClient<MockHttpClient>, token: &str, role: &str) {
        api.client().mock_response(
            HttpMethod::Post,
            &format!("{}/auth/token", BASE),
            200,
            json!({ "token": token }),
        );
        api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/users/me", BASE),
            200,
            user_json("u-1", role),
        );
    }

    #[tokio::test]
    async fn login_success_installs_everything() {
        let (mut auth, api, storage) = store();
        mock_login(&api, "t-1", "USER");

        auth.login(&credentials(true)).await.unwrap();

        let session = auth.session();
        assert_eq!(session.token(), Some("t-1"));
        assert_eq!(session.full_name(), "Ada Lovelace");
        assert!(session.is_authenticated());
        assert!(!session.is_admin());
        assert!(!session.loading());
        assert_eq!(api.bearer_token().as_deref(), Some("t-1"));
        assert_eq!(storage.local.get(TOKEN_KEY).as_deref(), Some("t-1"));
        assert!(storage.session.get(TOKEN_KEY).is_none());

        let sent = api.client().last_request().unwrap();
        assert_eq!(sent.url, format!("{}/api/users/me", BASE));
        assert_eq!(sent.headers.get("Authorization").unwrap(), "Bearer t-1");

        let token_req = api
            .client()
            .find(HttpMethod::Post, &format!("{}/auth/token", BASE))
            .unwrap();
        assert_eq!(
            token_req.json().unwrap(),
            json!({ "username": "ada", "password": "secret" })
        );
    }

    #[tokio::test]
    async fn login_without_remember_uses_session_tier() {
        let (mut auth, api, storage) = store();
        mock_login(&api, "t-2", "ADMIN");

        auth.login(&credentials(false)).await.unwrap();
        assert!(auth.session().is_admin());
        assert_eq!(storage.session.get(TOKEN_KEY).as_deref(), Some("t-2"));
        assert!(storage.local.get(TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn unwritable_tier_keeps_login_in_memory() {
        let api = api();
        let storage = StorageTiers::new(Rc::new(FullStore), Rc::new(MemoryStore::new()));
        storage.session.set(TOKEN_KEY, "old");
        let mut auth = AuthStore::new(api.clone(), storage.clone());
        mock_login(&api, "t-3", "USER");

        auth.login(&credentials(true)).await.unwrap();
        assert_eq!(auth.session().token(), Some("t-3"));
        assert!(storage.session.get(TOKEN_KEY).is_none());

        let err = auth.persist_token("t-3", true).unwrap_err();
        assert_eq!(err.status, ShopErrorStatus::Storage);
        assert_eq!(err.spans()[0].detail.as_deref(), Some("local"));
        assert!(auth.persist_token("t-3", false).is_ok());
    }

    #[tokio::test]
    async fn failed_profile_fetch_tears_down_session() {
        let (mut auth, api, storage) = store();
        storage.local.set(TOKEN_KEY, "stale");
        api.client().mock_response(
            HttpMethod::Post,
            &format!("{}/auth/token", BASE),
            200,
            json!({ "token": "t-1" }),
        );
        api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/users/me", BASE),
            403,
            json!({ "message": "Account banned" }),
        );

        let err = auth.login(&credentials(true)).await.unwrap_err();
        assert_eq!(err, "Account banned");

        let session = auth.session();
        assert!(session.token().is_none());
        assert!(session.user().is_none());
        assert_eq!(session.error(), Some("Account banned"));
        assert!(api.bearer_token().is_none());
        assert!(storage.local.get(TOKEN_KEY).is_none());
        assert!(storage.session.get(TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn missing_token_in_response_fails() {
        let (mut auth, api, _) = store();
        api.client()
            .mock_response(HttpMethod::Post, &format!("{}/auth/token", BASE), 200, json!({}));

        let err = auth.login(&credentials(true)).await.unwrap_err();
        assert_eq!(err, "Token not found in response");
        // 未获取到 token 时不请求用户资料
        assert_eq!(api.client().request_count(), 1);
    }

    #[tokio::test]
    async fn bad_credentials_without_payload_use_status_text() {
        let (mut auth, api, _) = store();
        api.client()
            .mock_response(HttpMethod::Post, &format!("{}/auth/token", BASE), 401, json!(null));

        let err = auth.login(&credentials(true)).await.unwrap_err();
        assert_eq!(err, "Request failed with status code 401");
    }

    #[test]
    fn restore_prefers_local_then_session() {
        let (mut auth, api, storage) = store();
        assert!(!auth.restore_from_storage());

        storage.session.set(TOKEN_KEY, "from-session");
        assert!(auth.restore_from_storage());
        assert_eq!(auth.session().token(), Some("from-session"));
        assert!(auth.session().needs_profile());

        storage.local.set(TOKEN_KEY, "from-local");
        assert!(auth.restore_from_storage());
        assert_eq!(api.bearer_token().as_deref(), Some("from-local"));
        // 恢复不会发起网络请求
        assert_eq!(api.client().request_count(), 0);
    }

    #[tokio::test]
    async fn fetch_me_propagates_errors() {
        let (mut auth, api, storage) = store();
        // 无 token: 无操作
        auth.fetch_me().await.unwrap();
        assert_eq!(api.client().request_count(), 0);

        storage.local.set(TOKEN_KEY, "t-1");
        auth.restore_from_storage();
        let me_url = format!("{}/api/users/me", BASE);
        api.client().mock_response(HttpMethod::Get, &me_url, 401, json!(null));
        let err = auth.fetch_me().await.unwrap_err();
        assert_eq!(err.status, ShopErrorStatus::Unauthorized);

        api.client()
            .mock_response(HttpMethod::Get, &me_url, 200, user_json("u-9", "USER"));
        auth.fetch_me().await.unwrap();
        assert_eq!(auth.session().user_id(), Some("u-9"));
    }

    #[test]
    fn logout_is_unconditional() {
        let (mut auth, api, storage) = store();
        storage.local.set(TOKEN_KEY, "t");
        storage.session.set(TOKEN_KEY, "t");
        auth.restore_from_storage();

        auth.logout();
        assert_eq!(auth.session(), &Session::default());
        assert!(api.bearer_token().is_none());
        assert!(storage.local.get(TOKEN_KEY).is_none());
        assert!(storage.session.get(TOKEN_KEY).is_none());

        // 重复登出同样安全
        auth.logout();
    }
}
