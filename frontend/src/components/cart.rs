//! 购物车页面

use futures::FutureExt;
use leptos::prelude::*;
use oeffi_shop::AppRoute;
use oeffi_shop::shared::CartItem;

use super::common::format_price;
use crate::state::use_shop;
use crate::web::router::Link;

#[component]
fn CartRow(item: CartItem) -> impl IntoView {
    let shop = use_shop();
    let product_id = item.product_id;
    let quantity = item.quantity;
    let image = shop
        .snapshot()
        .with_untracked(|s| s.image_url(item.image_path.as_deref()));

    let set_quantity = move |quantity: u32| {
        shop.dispatch(move |s| {
            async move {
                s.cart
                    .update_quantity(s.auth.session(), product_id, quantity)
                    .await;
            }
            .boxed_local()
        })
    };
    let on_remove = move |_| {
        shop.dispatch(move |s| {
            async move { s.cart.remove_item(s.auth.session(), product_id).await }.boxed_local()
        })
    };

    let line_total = item.line_total();

    view! {
        <tr>
            <td>
                <div class="flex items-center gap-3">
                    <div class="avatar">
                        <div class="w-12 rounded bg-base-200">
                            {(!image.is_empty()).then(|| view! { <img src=image alt="" /> })}
                        </div>
                    </div>
                    <Link route=AppRoute::ProductDetail(product_id) class="link link-hover">
                        {item.name.clone().unwrap_or_else(|| format!("Product #{}", product_id))}
                    </Link>
                </div>
            </td>
            <td>{format_price(item.price.unwrap_or(0.0))}</td>
            <td>
                <div class="join">
                    <button
                        class="btn btn-sm join-item"
                        disabled={quantity <= 1}
                        on:click=move |_| set_quantity(quantity.saturating_sub(1))
                    >
                        "-"
                    </button>
                    <span class="btn btn-sm join-item no-animation">{quantity}</span>
                    <button class="btn btn-sm join-item" on:click=move |_| set_quantity(quantity + 1)>
                        "+"
                    </button>
                </div>
            </td>
            <td>{format_price(line_total)}</td>
            <td>
                <button class="btn btn-ghost btn-sm text-error" on:click=on_remove>
                    "Remove"
                </button>
            </td>
        </tr>
    }
}

#[component]
pub fn CartPage() -> impl IntoView {
    let shop = use_shop();
    let snapshot = shop.snapshot();

    let items = move || snapshot.with(|s| s.cart_items.clone());
    let is_empty = move || snapshot.with(|s| s.cart_items.is_empty());
    let pending = move || snapshot.with(|s| s.cart_pending);

    let on_retry = move |_| {
        shop.dispatch(|s| {
            async move {
                s.cart.reconcile(s.auth.session()).await;
            }
            .boxed_local()
        })
    };
    let on_clear = move |_| {
        shop.dispatch(|s| {
            async move {
                s.cart.clear_cart(s.auth.session());
            }
            .boxed_local()
        })
    };

    view! {
        <h1 class="text-3xl font-bold mb-6">"Cart"</h1>

        <Show when=move || { pending() > 0 }>
            <div role="alert" class="alert alert-warning mb-4">
                <span>
                    {move || snapshot.with(|s| s.cart_error.clone()).unwrap_or_default()} " "
                    {move || format!("{} change(s) not yet saved.", pending())}
                </span>
                <button class="btn btn-sm" on:click=on_retry>
                    "Retry"
                </button>
            </div>
        </Show>

        <Show
            when=move || !is_empty()
            fallback=|| {
                view! {
                    <div class="text-center py-16">
                        <p class="mb-4">"Your cart is empty."</p>
                        <Link route=AppRoute::Products class="btn btn-primary">
                            "Continue shopping"
                        </Link>
                    </div>
                }
            }
        >
            <div class="overflow-x-auto bg-base-100 rounded-box">
                <table class="table">
                    <thead>
                        <tr>
                            <th>"Product"</th>
                            <th>"Price"</th>
                            <th>"Quantity"</th>
                            <th>"Total"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=items
                            key=|item| (item.product_id, item.quantity)
                            let:item
                        >
                            <CartRow item=item />
                        </For>
                    </tbody>
                </table>
            </div>
            <div class="flex justify-between items-center mt-4">
                <button class="btn btn-ghost" on:click=on_clear>
                    "Clear cart"
                </button>
                <div class="text-xl">
                    {move || snapshot.with(|s| s.cart_count)} " items, total "
                    <span class="font-bold">{move || format_price(snapshot.with(|s| s.cart_total))}</span>
                </div>
            </div>
        </Show>
    }
}
