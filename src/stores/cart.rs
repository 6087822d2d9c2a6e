//! 购物车
//!
//! 本地状态优先：每次变更先作用于内存中的条目，再同步到后端。
//! 访客购物车写入 local 存储；已登录用户以服务端购物车为准，
//! 同步失败的操作进入待同步队列，由 `reconcile` 重放。

use std::rc::Rc;

use oeffi_shop_shared::protocol::{
    AddCartItemRequest, GetCartRequest, RemoveCartItemRequest, UpdateCartItemRequest,
};
use oeffi_shop_shared::{CartItem, Product};

use crate::api::ApiClient;
use crate::error::{ShopError, ShopResult};
use crate::http::HttpClient;
use crate::storage::{CART_KEY, KeyValueStore};
use crate::stores::auth::Session;
use crate::stores::catalog::ProductStore;

/// 待同步到后端的购物车操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartSync {
    /// 新条目尚未在服务端创建；重放时使用当时的数量
    Create { product_id: u64 },
    Update { product_id: u64, quantity: u32 },
    Delete { product_id: u64 },
}

impl CartSync {
    pub fn product_id(&self) -> u64 {
        match self {
            CartSync::Create { product_id }
            | CartSync::Update { product_id, .. }
            | CartSync::Delete { product_id } => *product_id,
        }
    }
}

pub struct CartStore<C: HttpClient> {
    api: Rc<ApiClient<C>>,
    local: Rc<dyn KeyValueStore>,
    items: Vec<CartItem>,
    outbox: Vec<CartSync>,
    sync_error: Option<String>,
}

impl<C: HttpClient> CartStore<C> {
    pub fn new(api: Rc<ApiClient<C>>, local: Rc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            local,
            items: Vec::new(),
            outbox: Vec::new(),
            sync_error: None,
        }
    }

    // --- Accessors ---

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn outbox(&self) -> &[CartSync] {
        &self.outbox
    }

    /// 最近一次同步失败的消息
    pub fn sync_error(&self) -> Option<&str> {
        self.sync_error.as_deref()
    }

    /// 缺失价格按 0 计
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    // --- Lifecycle ---

    /// 初始化购物车
    ///
    /// 已加载用户：服务端购物车为准，从目录补全名称/价格/图片，
    /// 然后丢弃本地访客购物车（不合并）。访客：读取本地购物车。
    pub async fn init_cart(&mut self, session: &Session, catalog: &ProductStore<C>) {
        let Some(user_id) = session.user_id() else {
            self.load_local();
            return;
        };

        let req = GetCartRequest {
            user_id: user_id.to_string(),
        };
        match self.api.send(&req).await {
            Ok(items) => {
                self.items = items
                    .into_iter()
                    .map(|item| Self::enrich(item, catalog))
                    .collect();
                self.outbox.clear();
                self.sync_error = None;
                tracing::debug!(count = self.items.len(), "server cart loaded");
            }
            Err(e) => self.sync_failed(e.in_op("cart.init")),
        }

        if !self.local.delete(CART_KEY) {
            tracing::warn!("failed to remove guest cart");
        }
    }

    fn enrich(mut item: CartItem, catalog: &ProductStore<C>) -> CartItem {
        if let Some(product) = catalog.find(item.product_id) {
            item.name = Some(product.name.clone());
            item.price = Some(product.price);
            item.image_path = product.image_path.clone().or(item.image_path);
        }
        item
    }

    fn load_local(&mut self) {
        let Some(raw) = self.local.get(CART_KEY) else {
            return;
        };
        match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(items) => self.items = items,
            Err(e) => tracing::warn!("ignoring unreadable guest cart: {}", e),
        }
    }

    fn persist_guest(&self, session: &Session) {
        if let Err(e) = self.write_guest(session) {
            tracing::warn!("{}", e);
        }
    }

    /// 访客（未加载用户资料）时写入完整购物车
    fn write_guest(&self, session: &Session) -> ShopResult<()> {
        if session.user().is_some() {
            return Ok(());
        }
        let raw = serde_json::to_string(&self.items).map_err(|e| ShopError::from(e).in_op("cart.persist"))?;
        if !self.local.set(CART_KEY, &raw) {
            return Err(ShopError::storage("Cart could not be saved locally").in_op("cart.persist"));
        }
        Ok(())
    }

    fn sync_failed(&mut self, err: ShopError) {
        tracing::warn!("cart sync failed: {}", err);
        self.sync_error = Some(err.message().to_string());
    }

    fn enqueue(&mut self, op: CartSync) {
        // 同一商品的旧数量更新被新操作覆盖
        let product_id = op.product_id();
        self.outbox
            .retain(|o| !matches!(o, CartSync::Update { product_id: p, .. } if *p == product_id));
        self.outbox.push(op);
    }

    // --- Mutations ---

    /// 加入一件商品；已存在时数量加一
    pub async fn add_item(&mut self, session: &Session, product: &Product) {
        if let Some(existing) = self.items.iter().find(|i| i.product_id == product.id) {
            let quantity = existing.quantity + 1;
            self.update_quantity(session, product.id, quantity).await;
            return;
        }

        self.items.push(CartItem {
            id: None,
            product_id: product.id,
            quantity: 1,
            name: Some(product.name.clone()),
            price: Some(product.price),
            image_path: product.image_path.clone(),
        });

        if let Some(user_id) = session.user_id() {
            let req = AddCartItemRequest {
                user_id: user_id.to_string(),
                product_id: product.id,
                quantity: 1,
            };
            match self.create_remote(&req).await {
                Ok(()) => {
                    // 重新加入的条目已在服务端，之前排队的删除不能再重放
                    let product_id = product.id;
                    self.outbox.retain(
                        |o| !matches!(o, CartSync::Delete { product_id: p } if *p == product_id),
                    );
                }
                Err(e) => {
                    self.sync_failed(e.in_op_with("cart.add", product.id.to_string()));
                    self.enqueue(CartSync::Create {
                        product_id: product.id,
                    });
                }
            }
        }

        self.persist_guest(session);
    }

    async fn create_remote(&mut self, req: &AddCartItemRequest) -> ShopResult<()> {
        let created = self.api.send(req).await?;
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == req.product_id) {
            item.id = created.id;
        }
        Ok(())
    }

    /// 修改数量
    ///
    /// 数量为 0 或商品不在购物车中时不做任何修改，返回 `false`。
    pub async fn update_quantity(&mut self, session: &Session, product_id: u64, quantity: u32) -> bool {
        if let Err(e) = Self::check_quantity(product_id, quantity) {
            tracing::warn!("{}", e);
            return false;
        }
        let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) else {
            return false;
        };
        item.quantity = quantity;
        let synced = item.id.is_some();

        if let (Some(user_id), true) = (session.user_id(), synced) {
            let req = UpdateCartItemRequest {
                user_id: user_id.to_string(),
                product_id,
                quantity,
            };
            if let Err(e) = self.api.send(&req).await {
                self.sync_failed(e.in_op_with("cart.update", product_id.to_string()));
                self.enqueue(CartSync::Update {
                    product_id,
                    quantity,
                });
            }
        }

        self.persist_guest(session);
        true
    }

    fn check_quantity(product_id: u64, quantity: u32) -> ShopResult<()> {
        if quantity == 0 {
            return Err(ShopError::invalid_input("Quantity must be at least 1")
                .in_op_with("cart.update", product_id.to_string()));
        }
        Ok(())
    }

    pub async fn remove_item(&mut self, session: &Session, product_id: u64) {
        let Some(pos) = self.items.iter().position(|i| i.product_id == product_id) else {
            return;
        };
        let removed = self.items.remove(pos);

        if let Some(user_id) = session.user_id() {
            if removed.id.is_some() {
                let req = RemoveCartItemRequest {
                    user_id: user_id.to_string(),
                    product_id,
                };
                match self.api.send(&req).await {
                    // 服务端已无此条目，排队中的数量更新一并作废
                    Ok(_) => self.outbox.retain(|o| o.product_id() != product_id),
                    Err(e) => {
                        self.sync_failed(e.in_op_with("cart.remove", product_id.to_string()));
                        self.enqueue(CartSync::Delete { product_id });
                    }
                }
            } else {
                // 从未到达服务端，待同步的操作一并作废
                self.outbox.retain(|o| o.product_id() != product_id);
            }
        }

        self.persist_guest(session);
    }

    /// 仅清空本地状态（包括待同步队列）
    pub fn clear_cart(&mut self, session: &Session) {
        self.items.clear();
        self.outbox.clear();
        self.sync_error = None;
        self.persist_guest(session);
    }

    /// 按顺序重放待同步操作，遇到第一个失败即停止
    ///
    /// 返回队列是否已清空。访客会话没有可同步的目标，直接返回。
    pub async fn reconcile(&mut self, session: &Session) -> bool {
        let Some(user_id) = session.user_id().map(str::to_string) else {
            return self.outbox.is_empty();
        };

        while let Some(op) = self.outbox.first().cloned() {
            let result = match op {
                CartSync::Create { product_id } => {
                    let quantity = self
                        .items
                        .iter()
                        .find(|i| i.product_id == product_id)
                        .map(|i| i.quantity);
                    match quantity {
                        Some(quantity) => {
                            let req = AddCartItemRequest {
                                user_id: user_id.clone(),
                                product_id,
                                quantity,
                            };
                            self.create_remote(&req).await
                        }
                        None => Ok(()),
                    }
                }
                CartSync::Update {
                    product_id,
                    quantity,
                } => {
                    let req = UpdateCartItemRequest {
                        user_id: user_id.clone(),
                        product_id,
                        quantity,
                    };
                    self.api.send(&req).await.map(|_| ())
                }
                CartSync::Delete { product_id } => {
                    let req = RemoveCartItemRequest {
                        user_id: user_id.clone(),
                        product_id,
                    };
                    self.api.send(&req).await.map(|_| ())
                }
            };

            if let Err(e) = result {
                self.sync_failed(e.in_op("cart.reconcile"));
                return false;
            }
            self.outbox.remove(0);
        }

        self.sync_error = None;
        tracing::debug!("cart outbox drained");
        true
    }
}
