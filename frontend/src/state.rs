//! 应用状态上下文
//!
//! `Shop` 本身是单线程的可变状态，放在本地存储的 `StoredValue` 中，
//! 由异步互斥锁串行化所有操作。每次操作结束后捕获一份快照写入信号，
//! 组件只从快照读取并据此重新渲染。

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::lock::Mutex;
use leptos::prelude::*;
use leptos::task::spawn_local;
use oeffi_shop::config::API_BASE_URL_VAR;
use oeffi_shop::shared::{CartItem, Category, Order, Product, User};
use oeffi_shop::stores::Session;
use oeffi_shop::{ClientConfig, EnvSource, Shop};

use crate::web::{BrowserStorage, FetchHttpClient};

pub type AppShop = Shop<FetchHttpClient>;

/// 编译期注入的环境变量
struct BuildEnv;

impl EnvSource for BuildEnv {
    fn var(&self, key: &str) -> Option<String> {
        match key {
            API_BASE_URL_VAR => option_env!("API_BASE_URL").map(str::to_string),
            _ => None,
        }
    }
}

/// 各 store 在某次操作结束时的只读副本
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopSnapshot {
    pub api_base_url: String,
    pub session: Session,

    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub selected_product: Option<Product>,
    pub catalog_loading: bool,
    pub catalog_error: Option<String>,

    pub cart_items: Vec<CartItem>,
    pub cart_total: f64,
    pub cart_count: u32,
    pub cart_pending: usize,
    pub cart_error: Option<String>,

    pub orders: Vec<Order>,
    pub selected_order: Option<Order>,
    pub orders_loading: bool,
    pub orders_error: Option<String>,

    pub subject: User,
    pub other_salutation: String,
    pub profile_picture_url: String,
    pub users: Vec<User>,
    pub users_loading: bool,
    pub users_success: Option<String>,
    pub users_error: Option<String>,
}

impl ShopSnapshot {
    fn capture(shop: &AppShop) -> Self {
        Self {
            api_base_url: shop.api.base_url().to_string(),
            session: shop.auth.session().clone(),

            products: shop.catalog.products().to_vec(),
            categories: shop.catalog.categories().to_vec(),
            selected_product: shop.catalog.selected().cloned(),
            catalog_loading: shop.catalog.loading(),
            catalog_error: shop.catalog.error().map(str::to_string),

            cart_items: shop.cart.items().to_vec(),
            cart_total: shop.cart.total_price(),
            cart_count: shop.cart.total_items(),
            cart_pending: shop.cart.outbox().len(),
            cart_error: shop.cart.sync_error().map(str::to_string),

            orders: shop.orders.orders().to_vec(),
            selected_order: shop.orders.selected().cloned(),
            orders_loading: shop.orders.loading(),
            orders_error: shop.orders.error().map(str::to_string),

            subject: shop.users.subject().clone(),
            other_salutation: shop.users.other_salutation().to_string(),
            profile_picture_url: shop.users.profile_picture_url(),
            users: shop.users.users().to_vec(),
            users_loading: shop.users.loading(),
            users_success: shop.users.success_message().map(str::to_string),
            users_error: shop.users.error_message().map(str::to_string),
        }
    }

    /// 商品图片的绝对地址
    pub fn image_url(&self, key: Option<&str>) -> String {
        oeffi_shop::image_url(&self.api_base_url, key)
    }
}

/// 应用上下文
#[derive(Clone, Copy)]
pub struct ShopContext {
    shop: StoredValue<Rc<Mutex<AppShop>>, LocalStorage>,
    snapshot: RwSignal<ShopSnapshot>,
    busy: RwSignal<usize>,
}

impl ShopContext {
    pub fn new() -> Self {
        let config = ClientConfig::from_source(&BuildEnv);
        tracing::info!(api = %config.api_base_url, "shop context created");
        let shop = Shop::new(FetchHttpClient, &config, BrowserStorage::tiers());
        let snapshot = ShopSnapshot::capture(&shop);
        Self {
            shop: StoredValue::new_local(Rc::new(Mutex::new(shop))),
            snapshot: RwSignal::new(snapshot),
            busy: RwSignal::new(0),
        }
    }

    pub fn snapshot(&self) -> RwSignal<ShopSnapshot> {
        self.snapshot
    }

    /// 是否有操作正在进行
    pub fn is_busy(&self) -> Signal<bool> {
        let busy = self.busy;
        Signal::derive(move || busy.get() > 0)
    }

    /// 在独占的 `Shop` 上执行一个异步操作，结束后刷新快照
    pub async fn run<T>(
        self,
        action: impl for<'a> FnOnce(&'a mut AppShop) -> LocalBoxFuture<'a, T>,
    ) -> T {
        let shop = self.shop.get_value();
        self.busy.update(|n| *n += 1);
        let mut guard = shop.lock().await;
        let output = action(&mut guard).await;
        self.snapshot.set(ShopSnapshot::capture(&guard));
        drop(guard);
        self.busy.update(|n| *n = n.saturating_sub(1));
        output
    }

    /// 后台执行，不关心结果
    pub fn dispatch(
        self,
        action: impl for<'a> FnOnce(&'a mut AppShop) -> LocalBoxFuture<'a, ()> + 'static,
    ) {
        spawn_local(async move {
            self.run(action).await;
        });
    }
}

impl Default for ShopContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn provide_shop() -> ShopContext {
    let ctx = ShopContext::new();
    provide_context(ctx);
    ctx
}

pub fn use_shop() -> ShopContext {
    expect_context::<ShopContext>()
}
