use leptos::prelude::*;
use oeffi_shop::AppRoute;

use crate::web::router::Link;

#[component]
pub fn ImprintPage() -> impl IntoView {
    view! {
        <article class="prose max-w-2xl mx-auto bg-base-100 p-8 rounded-box">
            <h1>"Imprint"</h1>
            <p>"Oeffi Shop GmbH"<br />"Ring 1"<br />"1010 Wien, Austria"</p>
            <p>"Contact: office@oeffi-shop.example"</p>
        </article>
    }
}

#[component]
pub fn HelpPage() -> impl IntoView {
    view! {
        <article class="prose max-w-2xl mx-auto bg-base-100 p-8 rounded-box">
            <h1>"Help"</h1>
            <h3>"Do I need an account to shop?"</h3>
            <p>"No. Your cart is kept in this browser until you sign in. After signing in the cart stored with your account is used."</p>
            <h3>"Some cart changes were not saved"</h3>
            <p>"If the connection drops, changes are kept locally. Open the cart and choose Retry to send them again."</p>
            <h3>"How do I change my password?"</h3>
            <p>"Open your account page and fill in the password section."</p>
        </article>
    }
}

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-[50vh]">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl mt-4">"Page not found"</p>
                <Link route=AppRoute::Home class="btn btn-primary mt-6">
                    "Back to the shop"
                </Link>
            </div>
        </div>
    }
}
