//! 浏览器存储层级
//!
//! 以 `web_sys::Storage` 实现核心库的 `KeyValueStore`，
//! localStorage 与 sessionStorage 各对应一个层级。

use std::rc::Rc;

use oeffi_shop::{KeyValueStore, StorageTiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Local,
    Session,
}

/// 浏览器存储操作封装
pub struct BrowserStorage {
    area: StorageArea,
}

impl BrowserStorage {
    pub fn new(area: StorageArea) -> Self {
        Self { area }
    }

    /// 获取 Storage 实例；隐私模式等情况下可能不可用
    fn storage(&self) -> Option<web_sys::Storage> {
        let window = web_sys::window()?;
        match self.area {
            StorageArea::Local => window.local_storage().ok()?,
            StorageArea::Session => window.session_storage().ok()?,
        }
    }

    /// 两个层级组合为核心库使用的存储
    pub fn tiers() -> StorageTiers {
        StorageTiers::new(
            Rc::new(Self::new(StorageArea::Local)),
            Rc::new(Self::new(StorageArea::Session)),
        )
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        self.storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}
