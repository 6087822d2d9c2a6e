//! 页面框架：导航栏与页脚

use futures::FutureExt;
use leptos::prelude::*;
use leptos::task::spawn_local;
use oeffi_shop::AppRoute;

use crate::state::use_shop;
use crate::web::router::{Link, use_router};

#[component]
pub fn NavBar() -> impl IntoView {
    let shop = use_shop();
    let router = use_router();
    let snapshot = shop.snapshot();

    let is_auth = move || snapshot.with(|s| s.session.is_authenticated());
    let is_admin = move || snapshot.with(|s| s.session.is_admin());
    let is_customer = move || is_auth() && !is_admin();
    let cart_count = move || snapshot.with(|s| s.cart_count);
    let name = move || snapshot.with(|s| s.session.full_name());

    let on_logout = move |_| {
        spawn_local(async move {
            shop.run(|s| async move { s.logout().await }.boxed_local()).await;
            router.navigate(AppRoute::Home);
        });
    };

    view! {
        <div class="navbar bg-base-100 shadow-sm px-4">
            <div class="flex-1">
                <Link route=AppRoute::Home class="btn btn-ghost text-xl">
                    "Oeffi Shop"
                </Link>
                <Link route=AppRoute::Products class="btn btn-ghost">
                    "Products"
                </Link>
            </div>
            <div class="flex-none gap-1">
                <Show when=is_admin>
                    <Link route=AppRoute::AdminProducts class="btn btn-ghost btn-sm">
                        "Manage products"
                    </Link>
                    <Link route=AppRoute::AdminUsers class="btn btn-ghost btn-sm">
                        "Users"
                    </Link>
                    <Link route=AppRoute::AdminOrders class="btn btn-ghost btn-sm">
                        "All orders"
                    </Link>
                </Show>
                <Show when=is_customer>
                    <Link route=AppRoute::Orders class="btn btn-ghost btn-sm">
                        "My orders"
                    </Link>
                </Show>
                <Link route=AppRoute::Cart class="btn btn-ghost btn-sm">
                    "Cart"
                    <span class="badge badge-primary badge-sm">{cart_count}</span>
                </Link>
                <Show
                    when=is_auth
                    fallback=|| {
                        view! {
                            <Link route=AppRoute::Login class="btn btn-primary btn-sm">
                                "Login"
                            </Link>
                            <Link route=AppRoute::Registration class="btn btn-ghost btn-sm">
                                "Register"
                            </Link>
                        }
                    }
                >
                    <Link route=AppRoute::Account class="btn btn-ghost btn-sm">
                        {name}
                    </Link>
                    <button class="btn btn-outline btn-sm" on:click=on_logout>
                        "Logout"
                    </button>
                </Show>
            </div>
        </div>
    }
}

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer class="footer footer-center p-6 bg-base-200 text-base-content mt-10">
            <nav class="grid grid-flow-col gap-4">
                <Link route=AppRoute::Imprint class="link link-hover">
                    "Imprint"
                </Link>
                <Link route=AppRoute::Help class="link link-hover">
                    "Help"
                </Link>
            </nav>
        </footer>
    }
}

#[component]
pub fn Layout(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen flex flex-col bg-base-200">
            <NavBar />
            <main class="flex-1 container mx-auto p-4">{children()}</main>
            <Footer />
        </div>
    }
}
