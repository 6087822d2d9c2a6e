use futures::FutureExt;
use leptos::prelude::*;
use oeffi_shop::AppRoute;

use super::products::ProductGrid;
use crate::state::use_shop;
use crate::web::router::Link;

const FEATURED: usize = 4;

#[component]
pub fn HomePage() -> impl IntoView {
    let shop = use_shop();
    let snapshot = shop.snapshot();

    if snapshot.with_untracked(|s| s.products.is_empty()) {
        shop.dispatch(|s| async move { s.catalog.fetch_products().await }.boxed_local());
    }

    let greeting = move || {
        let name = snapshot.with(|s| s.session.full_name());
        if name.trim().is_empty() {
            "Welcome to Oeffi Shop".to_string()
        } else {
            format!("Welcome back, {}", name)
        }
    };
    let featured = Signal::derive(move || {
        snapshot.with(|s| s.products.iter().take(FEATURED).cloned().collect::<Vec<_>>())
    });

    view! {
        <div class="hero bg-base-100 rounded-box mb-8 py-12">
            <div class="hero-content text-center">
                <div class="max-w-md">
                    <h1 class="text-4xl font-bold">{greeting}</h1>
                    <p class="py-4">"Tickets, passes and merchandise for public transport."</p>
                    <Link route=AppRoute::Products class="btn btn-primary">
                        "Browse products"
                    </Link>
                </div>
            </div>
        </div>
        <h2 class="text-2xl font-bold mb-4">"Featured"</h2>
        <ProductGrid products=featured />
    }
}
