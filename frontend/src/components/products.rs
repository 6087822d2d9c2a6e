//! 商品列表与详情

use futures::FutureExt;
use leptos::prelude::*;
use oeffi_shop::AppRoute;
use oeffi_shop::shared::Product;

use super::common::{Notice, Spinner, format_price};
use crate::state::use_shop;
use crate::web::router::Link;

#[component]
pub fn ProductCard(product: Product) -> impl IntoView {
    let shop = use_shop();
    let image = shop
        .snapshot()
        .with_untracked(|s| s.image_url(product.image_path.as_deref()));
    let id = product.id;

    let on_add = move |_| {
        shop.dispatch(move |s| {
            async move {
                s.add_to_cart(id).await;
            }
            .boxed_local()
        })
    };

    view! {
        <div class="card bg-base-100 shadow-md">
            <figure class="h-48 bg-base-200">
                {(!image.is_empty())
                    .then(|| {
                        view! {
                            <img src=image alt=product.name.clone() class="object-cover h-full w-full" />
                        }
                    })}
            </figure>
            <div class="card-body">
                <h2 class="card-title">{product.name.clone()}</h2>
                {product.category_name.clone().map(|c| view! { <div class="badge badge-outline">{c}</div> })}
                <p class="font-semibold">{format_price(product.price)}</p>
                <div class="card-actions justify-end">
                    <Link route=AppRoute::ProductDetail(id) class="btn btn-ghost btn-sm">
                        "Details"
                    </Link>
                    <button class="btn btn-primary btn-sm" on:click=on_add>
                        "Add to cart"
                    </button>
                </div>
            </div>
        </div>
    }
}

/// 商品网格
#[component]
pub fn ProductGrid(#[prop(into)] products: Signal<Vec<Product>>) -> impl IntoView {
    view! {
        <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4">
            <For each=move || products.get() key=|p| p.id let:product>
                <ProductCard product=product />
            </For>
        </div>
    }
}

#[component]
pub fn ProductsPage() -> impl IntoView {
    let shop = use_shop();
    let snapshot = shop.snapshot();

    shop.dispatch(|s| {
        async move {
            s.catalog.fetch_categories().await;
            s.catalog.fetch_products().await;
        }
        .boxed_local()
    });

    let on_category = move |ev: leptos::ev::Event| {
        let category = event_target_value(&ev).parse::<u64>().ok();
        shop.dispatch(move |s| {
            async move { s.catalog.fetch_products_by_category(category).await }.boxed_local()
        });
    };

    view! {
        <div class="flex flex-wrap items-center justify-between gap-4 mb-6">
            <h1 class="text-3xl font-bold">"Products"</h1>
            <select class="select select-bordered" on:change=on_category>
                <option value="">"All categories"</option>
                {move || {
                    snapshot
                        .with(|s| s.categories.clone())
                        .into_iter()
                        .map(|c| view! { <option value=c.id.to_string()>{c.name}</option> })
                        .collect_view()
                }}
            </select>
        </div>
        <Notice message=Signal::derive(move || snapshot.with(|s| s.catalog_error.clone())) />
        <Show when=move || !snapshot.with(|s| s.catalog_loading) fallback=|| view! { <Spinner /> }>
            <ProductGrid products=Signal::derive(move || snapshot.with(|s| s.products.clone())) />
        </Show>
    }
}

#[component]
pub fn ProductDetailPage(id: u64) -> impl IntoView {
    let shop = use_shop();
    let snapshot = shop.snapshot();

    shop.dispatch(move |s| async move { s.catalog.fetch_product(id).await }.boxed_local());

    let product = Memo::new(move |_| {
        snapshot.with(|s| s.selected_product.clone().filter(|p| p.id == id))
    });

    let on_add = move |_| {
        shop.dispatch(move |s| {
            async move {
                s.add_to_cart(id).await;
            }
            .boxed_local()
        })
    };

    view! {
        <Notice message=Signal::derive(move || snapshot.with(|s| s.catalog_error.clone())) />
        {move || match product.get() {
            None => view! { <Spinner /> }.into_any(),
            Some(p) => {
                let image = snapshot.with_untracked(|s| s.image_url(p.image_path.as_deref()));
                view! {
                    <div class="card lg:card-side bg-base-100 shadow-xl">
                        <figure class="lg:w-1/2 bg-base-200">
                            {(!image.is_empty()).then(|| view! { <img src=image alt=p.name.clone() /> })}
                        </figure>
                        <div class="card-body">
                            <h1 class="card-title text-3xl">{p.name.clone()}</h1>
                            {p.category_name.clone().map(|c| view! { <div class="badge badge-outline">{c}</div> })}
                            {p.rating.clone().map(|r| view! { <p class="text-sm">"Rating: " {r}</p> })}
                            <p class="whitespace-pre-line">{p.description.clone()}</p>
                            <p class="text-2xl font-semibold">{format_price(p.price)}</p>
                            <div class="card-actions justify-end">
                                <Link route=AppRoute::Products class="btn btn-ghost">
                                    "Back"
                                </Link>
                                <button class="btn btn-primary" on:click=on_add>
                                    "Add to cart"
                                </button>
                            </div>
                        </div>
                    </div>
                }
                    .into_any()
            }
        }}
    }
}
