//! 原生 Web API 封装模块
//!
//! 对浏览器原生 API 的轻量级封装，实现核心库的 HTTP 与存储抽象。

mod console;
mod file;
mod http;
pub mod router;
mod storage;

pub use console::init_logging;
pub use file::read_selected_file;
pub use http::FetchHttpClient;
pub use storage::BrowserStorage;
