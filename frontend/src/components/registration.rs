//! 自助注册

use futures::FutureExt;
use leptos::prelude::*;
use leptos::task::spawn_local;
use oeffi_shop::AppRoute;
use oeffi_shop::shared::validation::{RegistrationForm, ValidationErrors, validate_registration};
use oeffi_shop::shared::{Salutation, User};

use super::common::{Notice, TextField, field_error};
use super::user_form::SalutationSelect;
use crate::state::use_shop;
use crate::web::router::{Link, use_router};

#[component]
pub fn RegistrationPage() -> impl IntoView {
    let shop = use_shop();
    let router = use_router();
    let snapshot = shop.snapshot();

    let salutation = RwSignal::new(String::new());
    let other_salutation = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let repeat_password = RwSignal::new(String::new());
    let country = RwSignal::new(String::new());
    let errors = RwSignal::new(ValidationErrors::default());
    let submitted = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let form = RegistrationForm {
            salutation: salutation.get_untracked(),
            other_salutation: other_salutation.get_untracked(),
            email: email.get_untracked(),
            username: username.get_untracked(),
            password: password.get_untracked(),
            repeat_password: repeat_password.get_untracked(),
            country: country.get_untracked(),
        };
        if let Err(e) = validate_registration(&form) {
            errors.set(e);
            return;
        }
        errors.set(ValidationErrors::default());
        submitted.set(true);

        spawn_local(async move {
            let created = shop
                .run(move |s| {
                    async move {
                        s.users.set_subject(User {
                            salutation: Salutation::parse(&form.salutation).unwrap_or_default(),
                            email: form.email,
                            username: form.username,
                            country_code: form.country,
                            ..Default::default()
                        });
                        s.users.set_other_salutation(form.other_salutation);
                        s.users.create_user(&form.password).await
                    }
                    .boxed_local()
                })
                .await;
            submitted.set(false);
            if created {
                router.navigate(AppRoute::Login);
            }
        });
    };

    view! {
        <div class="max-w-xl mx-auto card bg-base-100 shadow-xl">
            <form class="card-body gap-2" on:submit=on_submit>
                <h1 class="card-title text-2xl">"Create an account"</h1>
                <Notice message=Signal::derive(move || snapshot.with(|s| s.users_error.clone())) />

                <SalutationSelect value=salutation other=other_salutation errors=errors />
                <TextField
                    label="Email"
                    value=email
                    input_type="email"
                    error=field_error(errors, "email")
                />
                <TextField label="Username" value=username error=field_error(errors, "username") />
                <TextField
                    label="Password"
                    value=password
                    input_type="password"
                    error=field_error(errors, "password")
                />
                <TextField
                    label="Repeat password"
                    value=repeat_password
                    input_type="password"
                    error=field_error(errors, "repeatPassword")
                />
                <TextField
                    label="Country code"
                    value=country
                    error=field_error(errors, "country")
                />

                <div class="card-actions justify-between items-center mt-4">
                    <Link route=AppRoute::Login class="link">
                        "Already registered? Sign in"
                    </Link>
                    <button class="btn btn-primary" disabled=move || submitted.get()>
                        "Register"
                    </button>
                </div>
            </form>
        </div>
    }
}
