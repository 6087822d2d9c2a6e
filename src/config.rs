//! 运行时配置
//!
//! 通过 `EnvSource` 抽象读取环境变量：原生环境使用进程环境（并加载 `.env`），
//! 浏览器端由 frontend 注入编译期常量。

pub const API_BASE_URL_VAR: &str = "API_BASE_URL";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8081";

/// 环境变量来源
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// 进程环境变量
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// 后端源地址，不带末尾斜杠
    pub api_base_url: String,
}

impl ClientConfig {
    pub fn new(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// 从任意来源读取；缺失或为空时使用默认值
    pub fn from_source(env: &impl EnvSource) -> Self {
        match env.var(API_BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            Some(url) => Self::new(&url),
            None => {
                tracing::debug!(
                    "{} not set, falling back to {}",
                    API_BASE_URL_VAR,
                    DEFAULT_API_BASE_URL
                );
                Self::default()
            }
        }
    }

    /// 加载 `.env`（如存在）后读取进程环境
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("no .env loaded: {}", e);
        }
        Self::from_source(&ProcessEnv)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}
