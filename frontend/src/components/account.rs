//! 账户设置：个人资料、密码、头像与注销账户

use futures::FutureExt;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use oeffi_shop::AppRoute;
use oeffi_shop::shared::validation::{
    PasswordForm, ValidationErrors, validate_account, validate_password_change,
};
use oeffi_shop::stores::{PasswordChange, SaveUserOptions};

use super::common::{Notice, TextField, field_error};
use super::user_form::{UserFields, UserFormState};
use crate::state::use_shop;
use crate::web::read_selected_file;
use crate::web::router::use_router;

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[component]
pub fn AccountPage() -> impl IntoView {
    let shop = use_shop();
    let router = use_router();
    let snapshot = shop.snapshot();

    let state = UserFormState::new();
    let errors = RwSignal::new(ValidationErrors::default());
    let current_password = RwSignal::new(String::new());
    let new_password = RwSignal::new(String::new());
    let repeat_new_password = RwSignal::new(String::new());
    let password_errors = RwSignal::new(ValidationErrors::default());
    let picture_input = NodeRef::<html::Input>::new();

    shop.dispatch(|s| async move { s.users.load_user(s.auth.session()).await }.boxed_local());

    // 仅在用户记录本身变化时重新填充表单
    let subject = Memo::new(move |_| snapshot.with(|s| (s.subject.clone(), s.other_salutation.clone())));
    Effect::new(move |_| {
        let (user, other) = subject.get();
        if !user.id.is_empty() {
            state.load(&user, &other);
        }
    });

    let on_save = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let picture_path = snapshot.with_untracked(|s| s.subject.profile_picture_path.clone());
        if let Err(e) = validate_account(&state.to_account_form(picture_path)) {
            errors.set(e);
            return;
        }
        errors.set(ValidationErrors::default());

        let wants_password_change = !current_password.get_untracked().is_empty()
            || !new_password.get_untracked().is_empty()
            || !repeat_new_password.get_untracked().is_empty();
        let password_change = if wants_password_change {
            let form = PasswordForm {
                current_password: current_password.get_untracked(),
                new_password: new_password.get_untracked(),
                repeat_new_password: repeat_new_password.get_untracked(),
            };
            if let Err(e) = validate_password_change(&form) {
                password_errors.set(e);
                return;
            }
            Some(PasswordChange {
                current_password: form.current_password,
                new_password: form.new_password,
            })
        } else {
            None
        };
        password_errors.set(ValidationErrors::default());

        spawn_local(async move {
            let profile_picture = match picture_input.get_untracked() {
                Some(input) => read_selected_file(&input).await,
                None => None,
            };
            let options = SaveUserOptions {
                password_change,
                password_reset: None,
                profile_picture,
            };
            let saved = shop
                .run(move |s| {
                    async move {
                        state.apply_to(s.users.subject_mut());
                        s.users.set_other_salutation(state.other_salutation.get_untracked());
                        s.users.save_user(s.auth.session(), options).await
                    }
                    .boxed_local()
                })
                .await;
            if saved {
                current_password.set(String::new());
                new_password.set(String::new());
                repeat_new_password.set(String::new());
            }
        });
    };

    let on_delete = move |_| {
        if !confirm("Delete your account? This cannot be undone.") {
            return;
        }
        spawn_local(async move {
            let deleted = shop
                .run(|s| {
                    async move {
                        let deleted = s.users.delete_user().await;
                        if deleted {
                            s.logout().await;
                        }
                        deleted
                    }
                    .boxed_local()
                })
                .await;
            if deleted {
                router.navigate(AppRoute::Home);
            }
        });
    };

    let picture_url = move || snapshot.with(|s| s.profile_picture_url.clone());

    view! {
        <div class="max-w-3xl mx-auto card bg-base-100 shadow-xl">
            <form class="card-body gap-2" on:submit=on_save>
                <h1 class="card-title text-2xl">"My account"</h1>
                <Notice message=Signal::derive(move || snapshot.with(|s| s.users_error.clone())) />
                <Notice
                    message=Signal::derive(move || snapshot.with(|s| s.users_success.clone()))
                    success=true
                />

                <div class="flex items-center gap-4">
                    <div class="avatar">
                        <div class="w-20 rounded-full bg-base-200">
                            {move || {
                                let url = picture_url();
                                (!url.is_empty()).then(|| view! { <img src=url alt="Profile picture" /> })
                            }}
                        </div>
                    </div>
                    <input
                        type="file"
                        accept="image/*"
                        class="file-input file-input-bordered file-input-sm"
                        node_ref=picture_input
                    />
                </div>

                <UserFields state=state errors=errors />

                <div class="divider">"Change password"</div>
                <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                    <TextField
                        label="Current password"
                        value=current_password
                        input_type="password"
                        error=field_error(password_errors, "currentPassword")
                    />
                    <TextField
                        label="New password"
                        value=new_password
                        input_type="password"
                        error=field_error(password_errors, "newPassword")
                    />
                    <TextField
                        label="Repeat new password"
                        value=repeat_new_password
                        input_type="password"
                        error=field_error(password_errors, "repeatNewPassword")
                    />
                </div>

                <div class="card-actions justify-between mt-6">
                    <button type="button" class="btn btn-error btn-outline" on:click=on_delete>
                        "Delete account"
                    </button>
                    <button class="btn btn-primary" disabled=move || shop.is_busy().get()>
                        "Save changes"
                    </button>
                </div>
            </form>
        </div>
    }
}
