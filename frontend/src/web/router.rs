//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 导航流程："请求 -> 守卫(在 Shop 上异步执行) -> 提交 History -> 渲染"。

use futures::FutureExt;
use leptos::prelude::*;
use leptos::task::spawn_local;
use oeffi_shop::{AppRoute, GuardDecision};
use wasm_bindgen::prelude::*;

use crate::state::{ShopContext, use_shop};

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（用于重定向与后退/前进）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
///
/// 守卫结果异步返回；每次导航领取一个序号，过期的结果被丢弃。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    /// 首次守卫完成前不渲染页面
    ready: RwSignal<bool>,
    ticket: StoredValue<u64>,
    shop: ShopContext,
}

impl RouterService {
    fn new(shop: ShopContext) -> Self {
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            ready: RwSignal::new(false),
            ticket: StoredValue::new(0),
            shop,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    pub fn is_ready(&self) -> ReadSignal<bool> {
        self.ready.read_only()
    }

    /// **核心方法：导航与守卫**
    pub fn navigate(&self, route: AppRoute) {
        self.navigate_to_route(route, true);
    }

    /// 导航到指定路由
    ///
    /// * `use_push` - true 使用 pushState, false 使用 replaceState
    fn navigate_to_route(&self, target: AppRoute, use_push: bool) {
        let this = *self;
        this.ticket.update_value(|t| *t += 1);
        let ticket = this.ticket.get_value();

        spawn_local(async move {
            let guarded = target.clone();
            let decision = this
                .shop
                .run(move |shop| async move { shop.navigate(&guarded).await }.boxed_local())
                .await;

            if this.ticket.get_value() != ticket {
                tracing::debug!(route = %target, "navigation superseded");
                return;
            }

            let authenticated = this
                .shop
                .snapshot()
                .with_untracked(|s| s.session.is_authenticated());

            match decision {
                GuardDecision::Redirect(redirect) => {
                    tracing::info!(from = %target, to = %redirect, "navigation redirected");
                    this.commit(redirect, use_push);
                }
                GuardDecision::Allow
                    if authenticated && target.should_redirect_when_authenticated() =>
                {
                    this.commit(AppRoute::auth_success_redirect(), use_push);
                }
                GuardDecision::Allow => this.commit(target, use_push),
            }
        });
    }

    fn commit(&self, route: AppRoute, use_push: bool) {
        let path = route.to_path();
        if use_push {
            push_history_state(&path);
        } else {
            replace_history_state(&path);
        }
        self.set_route.set(route);
        self.ready.set(true);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let this = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            // popstate 时也执行守卫逻辑
            this.navigate_to_route(AppRoute::from_path(&current_path()), false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 认证状态变化时重新守卫当前路由
    fn setup_auth_redirect(&self) {
        let this = *self;
        let snapshot = self.shop.snapshot();
        let is_authenticated = Memo::new(move |_| snapshot.with(|s| s.session.is_authenticated()));

        Effect::new(move |previous: Option<bool>| {
            let is_auth = is_authenticated.get();
            if previous.is_some_and(|was| was != is_auth) {
                let route = this.current_route.get_untracked();
                tracing::debug!(authenticated = is_auth, route = %route, "auth state changed");
                this.navigate_to_route(route, false);
            }
            is_auth
        });
    }
}

/// 提供路由服务到 Context 并初始化
///
/// 先恢复会话，再对初始 URL 执行守卫；两者在 Shop 的锁上按顺序执行。
fn provide_router(shop: ShopContext) -> RouterService {
    let router = RouterService::new(shop);

    shop.dispatch(|shop| async move { shop.restore().await }.boxed_local());
    router.navigate_to_route(router.current_route.get_untracked(), false);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    expect_context::<RouterService>()
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件，应在 App 根部使用
#[component]
pub fn Router(children: Children) -> impl IntoView {
    provide_router(use_shop());

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        if !router.is_ready().get() {
            return view! {
                <div class="flex items-center justify-center min-h-[50vh]">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
            .into_any();
        }
        matcher(router.current_route().get())
    }
}

/// 站内链接：拦截点击，交给路由服务导航
#[component]
pub fn Link(
    route: AppRoute,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let href = route.to_path();

    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(route.clone());
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}
