//! 管理端：全部订单与状态修改

use futures::FutureExt;
use leptos::prelude::*;
use oeffi_shop::shared::OrderStatus;

use crate::components::common::{Notice, Spinner, format_price};
use crate::components::orders::{OrderDetails, created_at_label, status_badge};
use crate::state::use_shop;

#[component]
pub fn AdminOrdersPage() -> impl IntoView {
    let shop = use_shop();
    let snapshot = shop.snapshot();
    let expanded = RwSignal::new(Option::<u64>::None);

    shop.dispatch(|s| async move { s.orders.fetch_all_orders(s.auth.session()).await }.boxed_local());

    let change_status = move |id: u64, value: String| {
        let Some(status) = OrderStatus::parse(&value) else {
            return;
        };
        shop.dispatch(move |s| {
            async move {
                s.orders.update_order_status(s.auth.session(), id, status).await;
            }
            .boxed_local()
        });
    };
    let show_details = move |id: u64| {
        expanded.set(Some(id));
        shop.dispatch(move |s| async move { s.orders.fetch_order_details(id).await }.boxed_local());
    };

    view! {
        <h1 class="text-3xl font-bold mb-6">"All orders"</h1>
        <Notice message=Signal::derive(move || snapshot.with(|s| s.orders_error.clone())) />
        <Show when=move || !snapshot.with(|s| s.orders_loading) fallback=|| view! { <Spinner /> }>
            <div class="overflow-x-auto bg-base-100 rounded-box">
                <table class="table">
                    <thead>
                        <tr>
                            <th>"Order"</th>
                            <th>"Customer"</th>
                            <th>"Created"</th>
                            <th>"Total"</th>
                            <th>"Status"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For each=move || snapshot.with(|s| s.orders.clone()) key=|o| (o.id, o.status) let:order>
                            {
                                let id = order.id;
                                let current = order.status;
                                view! {
                                    <tr>
                                        <td>{order.invoice_number.clone().unwrap_or_else(|| format!("#{}", id))}</td>
                                        <td class="font-mono text-xs">{order.user_id.clone()}</td>
                                        <td>{created_at_label(&order)}</td>
                                        <td>{format_price(order.total_price)}</td>
                                        <td>
                                            <select
                                                class="select select-bordered select-sm"
                                                on:change=move |ev| change_status(id, event_target_value(&ev))
                                            >
                                                {OrderStatus::ALL
                                                    .into_iter()
                                                    .map(|status| {
                                                        view! {
                                                            <option value=status.as_str() selected={status == current}>
                                                                {status.as_str()}
                                                            </option>
                                                        }
                                                    })
                                                    .collect_view()}
                                            </select>
                                            <span class=format!("{} ml-2", status_badge(current))></span>
                                        </td>
                                        <td>
                                            <button class="btn btn-ghost btn-sm" on:click=move |_| show_details(id)>
                                                "Items"
                                            </button>
                                        </td>
                                    </tr>
                                    <Show when=move || expanded.get() == Some(id)>
                                        <tr>
                                            <td colspan="6">
                                                <OrderDetails id=id />
                                            </td>
                                        </tr>
                                    </Show>
                                }
                            }
                        </For>
                    </tbody>
                </table>
            </div>
        </Show>
    }
}
