//! 管理端：商品列表与编辑

use futures::FutureExt;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use oeffi_shop::AppRoute;
use oeffi_shop::shared::Product;

use crate::components::common::{Notice, Spinner, TextField, format_price};
use crate::state::use_shop;
use crate::web::read_selected_file;
use crate::web::router::{Link, use_router};

#[component]
pub fn AdminProductsPage() -> impl IntoView {
    let shop = use_shop();
    let snapshot = shop.snapshot();

    shop.dispatch(|s| async move { s.catalog.fetch_products().await }.boxed_local());

    let delete = move |id: u64| {
        shop.dispatch(move |s| {
            async move {
                s.catalog.delete_product(id).await;
            }
            .boxed_local()
        })
    };

    view! {
        <div class="flex justify-between items-center mb-6">
            <h1 class="text-3xl font-bold">"Manage products"</h1>
            <Link route=AppRoute::AdminProductNew class="btn btn-primary">
                "New product"
            </Link>
        </div>
        <Notice message=Signal::derive(move || snapshot.with(|s| s.catalog_error.clone())) />
        <Show when=move || !snapshot.with(|s| s.catalog_loading) fallback=|| view! { <Spinner /> }>
            <div class="overflow-x-auto bg-base-100 rounded-box">
                <table class="table">
                    <thead>
                        <tr>
                            <th>"ID"</th>
                            <th>"Name"</th>
                            <th>"Category"</th>
                            <th>"Price"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For each=move || snapshot.with(|s| s.products.clone()) key=|p| p.id let:product>
                            {
                                let id = product.id;
                                view! {
                                    <tr>
                                        <td>{id}</td>
                                        <td>{product.name.clone()}</td>
                                        <td>{product.category_name.clone().unwrap_or_default()}</td>
                                        <td>{format_price(product.price)}</td>
                                        <td class="flex gap-2 justify-end">
                                            <Link route=AppRoute::AdminProductEdit(id) class="btn btn-ghost btn-sm">
                                                "Edit"
                                            </Link>
                                            <button class="btn btn-ghost btn-sm text-error" on:click=move |_| delete(id)>
                                                "Delete"
                                            </button>
                                        </td>
                                    </tr>
                                }
                            }
                        </For>
                    </tbody>
                </table>
            </div>
        </Show>
    }
}

/// 新建（`id` 为 `None`）或编辑商品
#[component]
pub fn AdminProductEditPage(id: Option<u64>) -> impl IntoView {
    let shop = use_shop();
    let router = use_router();
    let snapshot = shop.snapshot();

    let name = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let price = RwSignal::new(String::new());
    let category = RwSignal::new(String::new());
    let local_error = RwSignal::new(Option::<String>::None);
    let image_input = NodeRef::<html::Input>::new();

    shop.dispatch(move |s| {
        async move {
            s.catalog.fetch_categories().await;
            if let Some(id) = id {
                s.catalog.fetch_product(id).await;
            }
        }
        .boxed_local()
    });

    let existing = Memo::new(move |_| {
        let id = id?;
        snapshot.with(|s| s.selected_product.clone().filter(|p| p.id == id))
    });
    Effect::new(move |_| {
        if let Some(p) = existing.get() {
            name.set(p.name);
            description.set(p.description);
            price.set(format!("{:.2}", p.price));
            category.set(p.category_id.map(|c| c.to_string()).unwrap_or_default());
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Ok(parsed_price) = price.get_untracked().trim().replace(',', ".").parse::<f64>() else {
            local_error.set(Some("Please enter a valid price.".to_string()));
            return;
        };
        if name.get_untracked().trim().is_empty() {
            local_error.set(Some("Name is required.".to_string()));
            return;
        }
        local_error.set(None);

        let base = existing.get_untracked().unwrap_or_default();
        let product = Product {
            id: id.unwrap_or_default(),
            name: name.get_untracked(),
            description: description.get_untracked(),
            price: parsed_price,
            category_id: category.get_untracked().parse().ok(),
            ..base
        };

        spawn_local(async move {
            let image = match image_input.get_untracked() {
                Some(input) => read_selected_file(&input).await,
                None => None,
            };
            let saved = shop
                .run(move |s| {
                    async move { s.catalog.save_product(product, image, id.is_none()).await }.boxed_local()
                })
                .await;
            if saved.is_some() {
                router.navigate(AppRoute::AdminProducts);
            }
        });
    };

    let title = if id.is_some() { "Edit product" } else { "New product" };

    view! {
        <div class="max-w-2xl mx-auto card bg-base-100 shadow-xl">
            <form class="card-body gap-2" on:submit=on_submit>
                <h1 class="card-title text-2xl">{title}</h1>
                <Notice message=local_error />
                <Notice message=Signal::derive(move || snapshot.with(|s| s.catalog_error.clone())) />

                <TextField label="Name" value=name />
                <label class="form-control w-full">
                    <div class="label">
                        <span class="label-text">"Description"</span>
                    </div>
                    <textarea
                        class="textarea textarea-bordered h-32"
                        prop:value=move || description.get()
                        on:input=move |ev| description.set(event_target_value(&ev))
                    ></textarea>
                </label>
                <TextField label="Price" value=price />
                <label class="form-control w-full">
                    <div class="label">
                        <span class="label-text">"Category"</span>
                    </div>
                    <select
                        class="select select-bordered w-full"
                        on:change=move |ev| category.set(event_target_value(&ev))
                    >
                        <option value="" selected=move || category.get().is_empty()>
                            "None"
                        </option>
                        {move || {
                            snapshot
                                .with(|s| s.categories.clone())
                                .into_iter()
                                .map(|c| {
                                    let value = c.id.to_string();
                                    let selected = value.clone();
                                    view! {
                                        <option value=value selected=move || category.get() == selected>
                                            {c.name}
                                        </option>
                                    }
                                })
                                .collect_view()
                        }}
                    </select>
                </label>
                <label class="form-control w-full">
                    <div class="label">
                        <span class="label-text">"Image"</span>
                    </div>
                    <input
                        type="file"
                        accept="image/*"
                        class="file-input file-input-bordered w-full"
                        node_ref=image_input
                    />
                </label>

                <div class="card-actions justify-end mt-4">
                    <Link route=AppRoute::AdminProducts class="btn btn-ghost">
                        "Cancel"
                    </Link>
                    <button class="btn btn-primary" disabled=move || shop.is_busy().get()>
                        "Save"
                    </button>
                </div>
            </form>
        </div>
    }
}
