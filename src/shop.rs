//! 应用上下文
//!
//! 把所有 store 组合在一起，并编排跨 store 的流程
//! （登录后初始化购物车、登出后回到访客购物车等）。

use std::rc::Rc;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::guard::{GuardDecision, check_navigation};
use crate::http::HttpClient;
use crate::route::AppRoute;
use crate::storage::StorageTiers;
use crate::stores::{AuthStore, CartStore, LoginCredentials, OrderStore, ProductStore, UserStore};

pub struct Shop<C: HttpClient> {
    pub api: Rc<ApiClient<C>>,
    pub auth: AuthStore<C>,
    pub catalog: ProductStore<C>,
    pub cart: CartStore<C>,
    pub orders: OrderStore<C>,
    pub users: UserStore<C>,
}

impl<C: HttpClient> Shop<C> {
    pub fn new(client: C, config: &ClientConfig, storage: StorageTiers) -> Self {
        let api = Rc::new(ApiClient::new(client, config));
        Self {
            auth: AuthStore::new(api.clone(), storage.clone()),
            catalog: ProductStore::new(api.clone()),
            cart: CartStore::new(api.clone(), storage.local.clone()),
            orders: OrderStore::new(api.clone()),
            users: UserStore::new(api.clone()),
            api,
        }
    }

    async fn init_cart(&mut self) {
        // 服务端购物车的条目需要目录数据补全
        if self.auth.session().user().is_some() && self.catalog.products().is_empty() {
            self.catalog.fetch_products().await;
        }
        self.cart.init_cart(self.auth.session(), &self.catalog).await;
    }

    /// 启动时恢复会话
    ///
    /// 恢复 token 后立即获取资料；资料获取失败视为会话失效。
    /// 最后按会话状态初始化购物车。
    pub async fn restore(&mut self) {
        if self.auth.restore_from_storage() {
            if let Err(e) = self.auth.fetch_me().await {
                tracing::warn!("stored session rejected: {}", e);
                self.auth.logout();
            }
        }
        self.init_cart().await;
    }

    /// 登录并切换到服务端购物车
    pub async fn login(&mut self, credentials: &LoginCredentials) -> Result<(), String> {
        self.auth.login(credentials).await?;
        self.init_cart().await;
        Ok(())
    }

    /// 登出并回到访客购物车
    pub async fn logout(&mut self) {
        self.auth.logout();
        self.cart.clear_cart(self.auth.session());
        self.init_cart().await;
    }

    /// 按 ID 加入购物车；商品不在已加载的目录中时先单独获取
    pub async fn add_to_cart(&mut self, product_id: u64) -> bool {
        let product = match self.catalog.find(product_id) {
            Some(product) => product.clone(),
            None => {
                self.catalog.fetch_product(product_id).await;
                match self.catalog.selected().filter(|p| p.id == product_id) {
                    Some(product) => product.clone(),
                    None => return false,
                }
            }
        };
        self.cart.add_item(self.auth.session(), &product).await;
        true
    }

    /// 运行导航守卫
    ///
    /// 守卫期间加载了用户资料时，购物车切换为服务端购物车。
    pub async fn navigate(&mut self, target: &AppRoute) -> GuardDecision {
        let had_profile = self.auth.session().user().is_some();
        let decision = check_navigation(&mut self.auth, target).await;
        if !had_profile && self.auth.session().user().is_some() {
            self.init_cart().await;
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, MockHttpClient};
    use crate::storage::{CART_KEY, TOKEN_KEY};
    use crate::test_support::{BASE, user_json};
    use serde_json::json;

    fn shop() -> (Shop<MockHttpClient>, StorageTiers) {
        let storage = StorageTiers::in_memory();
        let shop = Shop::new(MockHttpClient::new(), &ClientConfig::new(BASE), storage.clone());
        (shop, storage)
    }

    fn mock_catalog(shop: &Shop<MockHttpClient>) {
        shop.api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/products", BASE),
            200,
            json!([{ "id": 5, "name": "Widget", "description": "", "price": 10.0 }]),
        );
    }

    #[tokio::test]
    async fn guest_cart_survives_until_login() {
        let (mut shop, storage) = shop();
        mock_catalog(&shop);
        shop.catalog.fetch_products().await;

        assert!(shop.add_to_cart(5).await);
        assert!(shop.add_to_cart(5).await);
        assert_eq!(shop.cart.total_price(), 20.0);
        assert!(storage.local.get(CART_KEY).is_some());

        shop.api.client().mock_response(
            HttpMethod::Post,
            &format!("{}/auth/token", BASE),
            200,
            json!({ "token": "t-1" }),
        );
        shop.api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/users/me", BASE),
            200,
            user_json("u-1", "USER"),
        );
        shop.api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/cart/u-1", BASE),
            200,
            json!([{ "id": 1, "productId": 5, "quantity": 1 }]),
        );

        let credentials = LoginCredentials {
            identifier: "ada".into(),
            password: "secret".into(),
            remember: true,
        };
        shop.login(&credentials).await.unwrap();

        // 服务端购物车为准，访客购物车被丢弃而非合并
        assert_eq!(shop.cart.total_items(), 1);
        assert_eq!(shop.cart.items()[0].name.as_deref(), Some("Widget"));
        assert!(storage.local.get(CART_KEY).is_none());

        shop.logout().await;
        assert!(shop.cart.items().is_empty());
        assert!(!shop.auth.session().is_authenticated());
    }

    #[tokio::test]
    async fn unknown_product_is_not_added() {
        let (mut shop, _) = shop();
        assert!(!shop.add_to_cart(404).await);
        assert!(shop.cart.items().is_empty());
    }

    #[tokio::test]
    async fn add_to_cart_fetches_missing_product() {
        let (mut shop, _) = shop();
        shop.api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/products/9", BASE),
            200,
            json!({ "id": 9, "name": "Pass", "description": "", "price": 365.0 }),
        );
        assert!(shop.add_to_cart(9).await);
        assert_eq!(shop.cart.total_price(), 365.0);
    }

    #[tokio::test]
    async fn restore_with_rejected_token_falls_back_to_guest() {
        let (mut shop, storage) = shop();
        storage.session.set(TOKEN_KEY, "expired");
        storage.local.set(CART_KEY, r#"[{"productId":5,"quantity":2,"price":10.0}]"#);

        shop.restore().await;
        assert!(!shop.auth.session().is_authenticated());
        assert!(storage.session.get(TOKEN_KEY).is_none());
        assert_eq!(shop.cart.total_items(), 2);
    }

    #[tokio::test]
    async fn navigation_loads_server_cart_after_profile_fetch() {
        let (mut shop, storage) = shop();
        storage.local.set(TOKEN_KEY, "t-1");
        mock_catalog(&shop);
        shop.api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/users/me", BASE),
            200,
            user_json("u-1", "ADMIN"),
        );
        shop.api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/cart/u-1", BASE),
            200,
            json!([{ "id": 2, "productId": 5, "quantity": 3 }]),
        );

        assert!(shop.auth.restore_from_storage());
        let decision = shop.navigate(&AppRoute::AdminOrders).await;
        assert_eq!(decision, GuardDecision::Allow);
        assert_eq!(shop.cart.total_price(), 30.0);
    }
}
