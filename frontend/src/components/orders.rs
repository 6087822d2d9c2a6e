//! 订单列表（自己的订单）与订单明细

use futures::FutureExt;
use leptos::prelude::*;
use oeffi_shop::shared::{Order, OrderStatus};

use super::common::{Notice, Spinner, format_price};
use crate::state::use_shop;

pub fn status_badge(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "badge badge-warning",
        OrderStatus::Completed => "badge badge-success",
        OrderStatus::Canceled => "badge badge-error",
    }
}

/// 创建时间；无法解析时原样显示
pub fn created_at_label(order: &Order) -> String {
    order
        .created_at_time()
        .map(|t| t.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|| order.created_at.clone())
}

/// 选中订单的条目
#[component]
pub fn OrderDetails(id: u64) -> impl IntoView {
    let snapshot = use_shop().snapshot();
    let order = Memo::new(move |_| snapshot.with(|s| s.selected_order.clone().filter(|o| o.id == id)));

    move || {
        order.get().map(|order| {
            view! {
                <table class="table table-sm">
                    <tbody>
                        {order
                            .items
                            .into_iter()
                            .map(|item| {
                                let name = item
                                    .name
                                    .clone()
                                    .unwrap_or_else(|| format!("Product #{}", item.product_id));
                                let total = item.price.unwrap_or(0.0) * f64::from(item.quantity);
                                view! {
                                    <tr>
                                        <td>{name}</td>
                                        <td>{item.quantity} " ×"</td>
                                        <td>{format_price(total)}</td>
                                    </tr>
                                }
                            })
                            .collect_view()}
                    </tbody>
                </table>
            }
        })
    }
}

#[component]
pub fn OrdersPage() -> impl IntoView {
    let shop = use_shop();
    let snapshot = shop.snapshot();
    let expanded = RwSignal::new(Option::<u64>::None);

    shop.dispatch(|s| async move { s.orders.fetch_user_orders(s.auth.session()).await }.boxed_local());

    let toggle = move |id: u64| {
        if expanded.get_untracked() == Some(id) {
            expanded.set(None);
            return;
        }
        expanded.set(Some(id));
        shop.dispatch(move |s| async move { s.orders.fetch_order_details(id).await }.boxed_local());
    };

    view! {
        <h1 class="text-3xl font-bold mb-6">"My orders"</h1>
        <Notice message=Signal::derive(move || snapshot.with(|s| s.orders_error.clone())) />
        <Show when=move || !snapshot.with(|s| s.orders_loading) fallback=|| view! { <Spinner /> }>
            <div class="flex flex-col gap-4">
                <For each=move || snapshot.with(|s| s.orders.clone()) key=|o| (o.id, o.status) let:order>
                    {
                        let id = order.id;
                        view! {
                            <div class="card bg-base-100 shadow">
                                <div class="card-body">
                                    <div class="flex flex-wrap justify-between items-center gap-2">
                                        <h2 class="card-title">
                                            {order
                                                .invoice_number
                                                .clone()
                                                .unwrap_or_else(|| format!("Order #{}", id))}
                                        </h2>
                                        <span class=status_badge(order.status)>{order.status.as_str()}</span>
                                    </div>
                                    <p class="text-sm">
                                        {created_at_label(&order)} " · " {order.payment_method.clone()}
                                        " · " {format_price(order.total_price)}
                                    </p>
                                    <div class="card-actions justify-end">
                                        <button class="btn btn-ghost btn-sm" on:click=move |_| toggle(id)>
                                            {move || if expanded.get() == Some(id) { "Hide" } else { "Details" }}
                                        </button>
                                    </div>
                                    <Show when=move || expanded.get() == Some(id)>
                                        <OrderDetails id=id />
                                    </Show>
                                </div>
                            </div>
                        }
                    }
                </For>
            </div>
        </Show>
    }
}
