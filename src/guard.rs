//! 导航守卫
//!
//! 在页面显示前检查会话状态：
//! 1. 有 token 但无资料 -> 获取资料，失败则登出并跳转登录
//! 2. 需要认证但未认证 -> 登录页
//! 3. 需要管理员但不是管理员 -> 首页
//! 4. 仅限普通用户但是管理员 -> 首页

use crate::error::ShopResult;
use crate::http::HttpClient;
use crate::route::AppRoute;
use crate::stores::auth::{AuthStore, Session};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(AppRoute),
}

/// 守卫所需的会话能力
#[async_trait::async_trait(?Send)]
pub trait SessionGate {
    fn session(&self) -> &Session;

    /// 获取用户资料
    async fn refresh_profile(&mut self) -> ShopResult<()>;

    fn force_logout(&mut self);
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> SessionGate for AuthStore<C> {
    fn session(&self) -> &Session {
        AuthStore::session(self)
    }

    async fn refresh_profile(&mut self) -> ShopResult<()> {
        self.fetch_me().await
    }

    fn force_logout(&mut self) {
        self.logout();
    }
}

/// **核心方法：导航守卫**
pub async fn check_navigation<G: SessionGate + ?Sized>(
    gate: &mut G,
    target: &AppRoute,
) -> GuardDecision {
    if gate.session().needs_profile() {
        if let Err(e) = gate.refresh_profile().await {
            tracing::warn!(route = %target, "profile refresh failed, logging out: {}", e);
            gate.force_logout();
            return GuardDecision::Redirect(AppRoute::auth_failure_redirect());
        }
    }

    let session = gate.session();
    if target.requires_auth() && !session.is_authenticated() {
        tracing::debug!(route = %target, "access denied, redirecting to login");
        return GuardDecision::Redirect(AppRoute::auth_failure_redirect());
    }
    if target.requires_admin() && !session.is_admin() {
        tracing::debug!(route = %target, "admin only, redirecting home");
        return GuardDecision::Redirect(AppRoute::forbidden_redirect());
    }
    if target.requires_user() && session.is_admin() {
        tracing::debug!(route = %target, "not available for admins, redirecting home");
        return GuardDecision::Redirect(AppRoute::forbidden_redirect());
    }

    GuardDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::http::{HttpMethod, MockHttpClient};
    use crate::storage::{StorageTiers, TOKEN_KEY};
    use crate::test_support::{BASE, api, user_json};
    use serde_json::json;
    use std::rc::Rc;

    type Fixture = (AuthStore<MockHttpClient>, StorageTiers, Rc<ApiClient<MockHttpClient>>);

    /// 从存储恢复 token，资料请求按 `role` 成功或返回 401
    fn restored(role: Option<&str>) -> Fixture {
        let api = api();
        let storage = StorageTiers::in_memory();
        storage.local.set(TOKEN_KEY, "t-1");
        let me_url = format!("{}/api/users/me", BASE);
        match role {
            Some(role) => {
                api.client()
                    .mock_response(HttpMethod::Get, &me_url, 200, user_json("u-1", role));
            }
            None => {
                api.client()
                    .mock_response(HttpMethod::Get, &me_url, 401, json!(null));
            }
        }
        let mut auth = AuthStore::new(api.clone(), storage.clone());
        assert!(auth.restore_from_storage());
        (auth, storage, api)
    }

    #[tokio::test]
    async fn guest_is_sent_to_login_for_protected_routes() {
        let mut auth = AuthStore::new(api(), StorageTiers::in_memory());
        assert_eq!(check_navigation(&mut auth, &AppRoute::Cart).await, GuardDecision::Allow);
        assert_eq!(
            check_navigation(&mut auth, &AppRoute::Account).await,
            GuardDecision::Redirect(AppRoute::Login)
        );
        assert_eq!(
            check_navigation(&mut auth, &AppRoute::AdminOrders).await,
            GuardDecision::Redirect(AppRoute::Login)
        );
    }

    #[tokio::test]
    async fn failing_profile_fetch_logs_out() {
        let (mut auth, storage, api) = restored(None);

        let decision = check_navigation(&mut auth, &AppRoute::Home).await;
        assert_eq!(decision, GuardDecision::Redirect(AppRoute::Login));
        assert!(!auth.session().is_authenticated());
        assert!(storage.local.get(TOKEN_KEY).is_none());
        assert!(api.bearer_token().is_none());
    }

    #[tokio::test]
    async fn restored_token_loads_profile_once() {
        let (mut auth, _, api) = restored(Some("USER"));

        assert_eq!(check_navigation(&mut auth, &AppRoute::Orders).await, GuardDecision::Allow);
        assert_eq!(auth.session().user_id(), Some("u-1"));
        assert_eq!(check_navigation(&mut auth, &AppRoute::Account).await, GuardDecision::Allow);
        assert_eq!(api.client().request_count(), 1);
    }

    #[tokio::test]
    async fn role_rules() {
        let (mut user, _, _) = restored(Some("USER"));
        assert_eq!(
            check_navigation(&mut user, &AppRoute::AdminProducts).await,
            GuardDecision::Redirect(AppRoute::Home)
        );

        let (mut admin, _, _) = restored(Some("ADMIN"));
        assert_eq!(
            check_navigation(&mut admin, &AppRoute::AdminUserEdit("u-2".into())).await,
            GuardDecision::Allow
        );
        assert_eq!(
            check_navigation(&mut admin, &AppRoute::Orders).await,
            GuardDecision::Redirect(AppRoute::Home)
        );
    }
}
