//! Oeffi Shop 客户端核心
//!
//! - `http`: HTTP 抽象层（`HttpClient` 特性与请求/响应结构）
//! - `api`: 带默认请求头的后端 API 客户端
//! - `stores`: 认证、目录、购物车、订单、用户各领域的状态
//! - `route` / `guard`: 路由模型与导航守卫
//! - `shop`: 组合所有 store 的应用上下文

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod route;
pub mod shop;
pub mod storage;
pub mod stores;

pub use oeffi_shop_shared as shared;

pub use api::{ApiClient, image_url};
pub use config::{ClientConfig, EnvSource};
pub use error::{ShopError, ShopErrorStatus, ShopResult};
pub use guard::{GuardDecision, SessionGate, check_navigation};
pub use http::{FileUpload, HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use route::AppRoute;
pub use shop::Shop;
pub use storage::{KeyValueStore, MemoryStore, StorageTiers};

#[cfg(feature = "reqwest-client")]
pub use http::ReqwestHttpClient;
