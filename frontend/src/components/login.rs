use futures::FutureExt;
use leptos::prelude::*;
use leptos::task::spawn_local;
use oeffi_shop::AppRoute;
use oeffi_shop::stores::LoginCredentials;

use crate::components::common::Notice;
use crate::state::use_shop;
use crate::web::router::{Link, use_router};

#[component]
pub fn LoginPage() -> impl IntoView {
    let shop = use_shop();
    let router = use_router();

    let (identifier, set_identifier) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (remember, set_remember) = signal(false);
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if identifier.get().is_empty() || password.get().is_empty() {
            set_error_msg.set(Some("Please fill in all fields".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let credentials = LoginCredentials {
            identifier: identifier.get(),
            password: password.get(),
            remember: remember.get(),
        };
        spawn_local(async move {
            let result = shop
                .run(move |s| async move { s.login(&credentials).await }.boxed_local())
                .await;
            match result {
                Ok(()) => router.navigate(AppRoute::auth_success_redirect()),
                Err(message) => set_error_msg.set(Some(message)),
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-[70vh]">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Welcome back"</h1>
                    <p class="text-base-content/70">"Sign in with your email or username"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Notice message=error_msg />

                        <div class="form-control">
                            <label class="label" for="identifier">
                                <span class="label-text">"Email or username"</span>
                            </label>
                            <input
                                id="identifier"
                                type="text"
                                autocomplete="username"
                                on:input=move |ev| set_identifier.set(event_target_value(&ev))
                                prop:value=identifier
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                autocomplete="current-password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <label class="label cursor-pointer justify-start gap-2">
                            <input
                                type="checkbox"
                                class="checkbox checkbox-sm"
                                prop:checked=remember
                                on:change=move |ev| set_remember.set(event_target_checked(&ev))
                            />
                            <span class="label-text">"Stay signed in"</span>
                        </label>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || {
                                    if is_submitting.get() {
                                        view! {
                                            <span class="loading loading-spinner"></span>
                                            "Signing in..."
                                        }
                                            .into_any()
                                    } else {
                                        "Sign in".into_any()
                                    }
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "No account yet? "
                            <Link route=AppRoute::Registration class="link link-primary">
                                "Register"
                            </Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
