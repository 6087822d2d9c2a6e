//! Oeffi Shop 前端应用
//!
//! 采用 Context-Driven 架构：
//! - `state`: 持有 `Shop` 的应用上下文与只读快照
//! - `web::router`: 路由服务（在 `Shop` 上执行导航守卫）
//! - `components`: UI 组件层

mod components {
    pub mod account;
    pub mod admin {
        pub mod orders;
        pub mod products;
        pub mod users;
    }
    pub mod cart;
    pub mod common;
    pub mod home;
    pub mod info;
    pub mod layout;
    pub mod login;
    pub mod orders;
    pub mod products;
    pub mod registration;
    pub mod user_form;
}
mod state;

// 原生 Web API 封装模块
pub mod web;

use crate::components::account::AccountPage;
use crate::components::admin::orders::AdminOrdersPage;
use crate::components::admin::products::{AdminProductEditPage, AdminProductsPage};
use crate::components::admin::users::{AdminUserEditPage, AdminUsersPage};
use crate::components::cart::CartPage;
use crate::components::home::HomePage;
use crate::components::info::{HelpPage, ImprintPage, NotFoundPage};
use crate::components::layout::Layout;
use crate::components::login::LoginPage;
use crate::components::orders::OrdersPage;
use crate::components::products::{ProductDetailPage, ProductsPage};
use crate::components::registration::RegistrationPage;

use leptos::prelude::*;
use oeffi_shop::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Registration => view! { <RegistrationPage /> }.into_any(),
        AppRoute::Account => view! { <AccountPage /> }.into_any(),
        AppRoute::Products => view! { <ProductsPage /> }.into_any(),
        AppRoute::ProductDetail(id) => view! { <ProductDetailPage id=id /> }.into_any(),
        AppRoute::Cart => view! { <CartPage /> }.into_any(),
        AppRoute::Orders => view! { <OrdersPage /> }.into_any(),
        AppRoute::AdminProducts => view! { <AdminProductsPage /> }.into_any(),
        AppRoute::AdminProductNew => view! { <AdminProductEditPage id=None /> }.into_any(),
        AppRoute::AdminProductEdit(id) => view! { <AdminProductEditPage id=Some(id) /> }.into_any(),
        AppRoute::AdminUsers => view! { <AdminUsersPage /> }.into_any(),
        AppRoute::AdminUserEdit(id) => view! { <AdminUserEditPage id=id /> }.into_any(),
        AppRoute::AdminOrders => view! { <AdminOrdersPage /> }.into_any(),
        AppRoute::Imprint => view! { <ImprintPage /> }.into_any(),
        AppRoute::Help => view! { <HelpPage /> }.into_any(),
        AppRoute::NotFound => view! { <NotFoundPage /> }.into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建应用上下文（会话恢复由路由器在首次守卫前执行）
    state::provide_shop();

    view! {
        // 2. 路由器组件：每次导航都经过守卫
        <Router>
            <Layout>
                <RouterOutlet matcher=route_matcher />
            </Layout>
        </Router>
    }
}
