//! 键值存储抽象
//!
//! 对应浏览器的 localStorage / sessionStorage 两个存储层级。
//! 与浏览器 API 一致，所有操作不返回错误，只返回是否成功。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// 会话 token 的存储键
pub const TOKEN_KEY: &str = "auth_token";
/// 访客购物车的存储键（仅 local 层级）
pub const CART_KEY: &str = "cart";

/// 键值存储操作
pub trait KeyValueStore {
    /// 获取存储的字符串值，键不存在或出错时返回 `None`
    fn get(&self, key: &str) -> Option<String>;

    /// 设置存储值，返回是否成功
    fn set(&self, key: &str, value: &str) -> bool;

    /// 删除键值对，返回是否成功
    fn delete(&self, key: &str) -> bool;
}

/// 内存实现，用于原生环境和测试
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key);
        true
    }
}

/// 两个存储层级：持久 (local) 与会话 (session)
#[derive(Clone)]
pub struct StorageTiers {
    pub local: Rc<dyn KeyValueStore>,
    pub session: Rc<dyn KeyValueStore>,
}

impl StorageTiers {
    pub fn new(local: Rc<dyn KeyValueStore>, session: Rc<dyn KeyValueStore>) -> Self {
        Self { local, session }
    }

    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStore::new()), Rc::new(MemoryStore::new()))
    }
}
