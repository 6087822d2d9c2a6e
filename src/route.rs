//! 路由定义模块 - 领域模型
//!
//! 纯粹的业务逻辑层，不依赖于 DOM。
//! 定义了应用的所有路由及其访问要求。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 首页 (默认路由)
    #[default]
    Home,
    Login,
    Registration,
    /// 账户设置 (需要认证)
    Account,
    Products,
    ProductDetail(u64),
    Cart,
    /// 我的订单 (需要认证，管理员不可访问)
    Orders,
    AdminProducts,
    AdminProductNew,
    AdminProductEdit(u64),
    AdminUsers,
    AdminUserEdit(String),
    AdminOrders,
    Imprint,
    Help,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举；查询串与末尾斜杠被忽略
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["registration"] => Self::Registration,
            ["account"] => Self::Account,
            ["products"] => Self::Products,
            ["products", id] => id.parse().map_or(Self::NotFound, Self::ProductDetail),
            ["cart"] => Self::Cart,
            ["orders"] => Self::Orders,
            ["admin", "products"] => Self::AdminProducts,
            ["admin", "products", "new"] => Self::AdminProductNew,
            ["admin", "products", id] => id.parse().map_or(Self::NotFound, Self::AdminProductEdit),
            ["admin", "users"] => Self::AdminUsers,
            ["admin", "users", id] => Self::AdminUserEdit(id.to_string()),
            ["admin", "orders"] => Self::AdminOrders,
            ["imprint"] => Self::Imprint,
            ["help"] => Self::Help,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Registration => "/registration".to_string(),
            Self::Account => "/account".to_string(),
            Self::Products => "/products".to_string(),
            Self::ProductDetail(id) => format!("/products/{}", id),
            Self::Cart => "/cart".to_string(),
            Self::Orders => "/orders".to_string(),
            Self::AdminProducts => "/admin/products".to_string(),
            Self::AdminProductNew => "/admin/products/new".to_string(),
            Self::AdminProductEdit(id) => format!("/admin/products/{}", id),
            Self::AdminUsers => "/admin/users".to_string(),
            Self::AdminUserEdit(id) => format!("/admin/users/{}", id),
            Self::AdminOrders => "/admin/orders".to_string(),
            Self::Imprint => "/imprint".to_string(),
            Self::Help => "/help".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// 是否为管理页面
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::AdminProducts
                | Self::AdminProductNew
                | Self::AdminProductEdit(_)
                | Self::AdminUsers
                | Self::AdminUserEdit(_)
                | Self::AdminOrders
        )
    }

    /// 仅限非管理员用户
    pub fn requires_user(&self) -> bool {
        matches!(self, Self::Orders)
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Account) || self.requires_user() || self.requires_admin()
    }

    /// 已认证用户访问时应跳转离开
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Registration)
    }

    /// 未认证时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 权限不足时的重定向目标
    pub fn forbidden_redirect() -> Self {
        Self::Home
    }

    /// 登录成功后的跳转目标
    pub fn auth_success_redirect() -> Self {
        Self::Home
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_static_and_dynamic_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/login/"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/products/42"), AppRoute::ProductDetail(42));
        assert_eq!(AppRoute::from_path("/products/abc"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/admin/products/new"), AppRoute::AdminProductNew);
        assert_eq!(AppRoute::from_path("/admin/products/7"), AppRoute::AdminProductEdit(7));
        assert_eq!(
            AppRoute::from_path("/admin/users/u-3?tab=orders"),
            AppRoute::AdminUserEdit("u-3".into())
        );
        assert_eq!(AppRoute::from_path("/does/not/exist"), AppRoute::NotFound);
    }

    #[test]
    fn paths_round_trip() {
        for route in [
            AppRoute::Home,
            AppRoute::Cart,
            AppRoute::ProductDetail(3),
            AppRoute::AdminUserEdit("u-1".into()),
            AppRoute::Help,
        ] {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn access_flags() {
        assert!(!AppRoute::Home.requires_auth());
        assert!(!AppRoute::Cart.requires_auth());
        assert!(AppRoute::Account.requires_auth());
        assert!(!AppRoute::Account.requires_admin());

        assert!(AppRoute::Orders.requires_auth());
        assert!(AppRoute::Orders.requires_user());

        assert!(AppRoute::AdminOrders.requires_auth());
        assert!(AppRoute::AdminOrders.requires_admin());
        assert!(!AppRoute::AdminOrders.requires_user());

        assert!(AppRoute::Login.should_redirect_when_authenticated());
        assert!(AppRoute::Registration.should_redirect_when_authenticated());
        assert!(!AppRoute::Cart.should_redirect_when_authenticated());
    }
}
