//! 各业务领域的状态容器
//!
//! 每个 store 持有共享的 `ApiClient`，需要会话信息的操作显式接收 `&Session`。

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod users;

pub use auth::{AuthStore, LoginCredentials, Session};
pub use cart::{CartStore, CartSync};
pub use catalog::ProductStore;
pub use orders::OrderStore;
pub use users::{PasswordChange, SaveUserOptions, UserStore};
