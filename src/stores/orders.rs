//! 订单
//!
//! 普通用户查看自己的订单；管理员查看全部订单并修改状态。
//! 权限不足时的调用是静默的空操作，不发出任何请求。

use std::rc::Rc;

use oeffi_shop_shared::protocol::{
    ApiRequest, GetOrderRequest, ListOrdersRequest, ListUserOrdersRequest,
    UpdateOrderStatusRequest,
};
use oeffi_shop_shared::{Order, OrderStatus};

use crate::api::ApiClient;
use crate::error::ShopError;
use crate::http::HttpClient;
use crate::stores::auth::Session;

pub struct OrderStore<C: HttpClient> {
    api: Rc<ApiClient<C>>,
    orders: Vec<Order>,
    selected: Option<Order>,
    loading: bool,
    error: Option<String>,
}

impl<C: HttpClient> OrderStore<C> {
    pub fn new(api: Rc<ApiClient<C>>) -> Self {
        Self {
            api,
            orders: Vec::new(),
            selected: None,
            loading: false,
            error: None,
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn selected(&self) -> Option<&Order> {
        self.selected.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn fail(&mut self, err: ShopError, message: &str) {
        tracing::warn!("{}", err);
        self.error = Some(message.to_string());
    }

    async fn load_list<R>(&mut self, req: R, op: &str)
    where
        R: ApiRequest<Response = Vec<Order>>,
    {
        self.loading = true;
        self.error = None;
        match self.api.send(&req).await {
            Ok(orders) => self.orders = orders,
            Err(e) => self.fail(e.in_op(op), "Orders could not be loaded."),
        }
        self.loading = false;
    }

    /// 全部订单（仅管理员）
    pub async fn fetch_all_orders(&mut self, session: &Session) {
        if !session.is_admin() {
            return;
        }
        self.load_list(ListOrdersRequest, "orders.all").await;
    }

    /// 当前用户的订单；未加载用户时不做任何事
    pub async fn fetch_user_orders(&mut self, session: &Session) {
        let Some(user_id) = session.user_id() else {
            return;
        };
        let req = ListUserOrdersRequest {
            user_id: user_id.to_string(),
        };
        self.load_list(req, "orders.mine").await;
    }

    pub async fn fetch_order_details(&mut self, id: u64) {
        self.loading = true;
        self.error = None;
        match self.api.send(&GetOrderRequest { id }).await {
            Ok(order) => self.selected = Some(order),
            Err(e) => self.fail(
                e.in_op_with("orders.get", id.to_string()),
                "Order details could not be loaded.",
            ),
        }
        self.loading = false;
    }

    /// 修改订单状态（仅管理员）
    ///
    /// 以服务端返回的状态更新列表中的条目和当前选中的订单。
    pub async fn update_order_status(
        &mut self,
        session: &Session,
        id: u64,
        status: OrderStatus,
    ) -> Option<OrderStatus> {
        if !session.is_admin() {
            return None;
        }

        self.loading = true;
        let result = self.api.send(&UpdateOrderStatusRequest { id, status }).await;
        self.loading = false;

        match result {
            Ok(resp) => {
                let confirmed = resp.status;
                if let Some(order) = self.orders.iter_mut().find(|o| o.id == id) {
                    order.status = confirmed;
                }
                if let Some(order) = self.selected.as_mut().filter(|o| o.id == id) {
                    order.status = confirmed;
                }
                tracing::info!(order_id = id, status = confirmed.as_str(), "order status updated");
                Some(confirmed)
            }
            Err(e) => {
                self.fail(
                    e.in_op_with("orders.status", id.to_string()),
                    "Status could not be updated.",
                );
                None
            }
        }
    }
}
