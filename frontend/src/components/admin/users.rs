//! 管理端：用户列表与编辑

use futures::FutureExt;
use leptos::prelude::*;
use leptos::task::spawn_local;
use oeffi_shop::AppRoute;
use oeffi_shop::shared::validation::{ValidationErrors, validate_account};
use oeffi_shop::shared::{Role, UserStatus};
use oeffi_shop::stores::SaveUserOptions;

use crate::components::common::{Notice, Spinner, TextField};
use crate::components::user_form::{UserFields, UserFormState};
use crate::state::use_shop;
use crate::web::router::{Link, use_router};

const ROLES: [(Role, &str); 2] = [(Role::User, "USER"), (Role::Admin, "ADMIN")];
const STATUSES: [(UserStatus, &str); 4] = [
    (UserStatus::Active, "ACTIVE"),
    (UserStatus::Inactive, "INACTIVE"),
    (UserStatus::Banned, "BANNED"),
    (UserStatus::Deleted, "DELETED"),
];

fn role_label(role: Role) -> &'static str {
    ROLES.iter().find(|(r, _)| *r == role).map_or("USER", |(_, l)| l)
}

fn status_label(status: UserStatus) -> &'static str {
    STATUSES.iter().find(|(s, _)| *s == status).map_or("ACTIVE", |(_, l)| l)
}

#[component]
pub fn AdminUsersPage() -> impl IntoView {
    let shop = use_shop();
    let snapshot = shop.snapshot();

    shop.dispatch(|s| async move { s.users.fetch_users(s.auth.session()).await }.boxed_local());

    let delete = move |id: String| {
        shop.dispatch(move |s| {
            async move {
                s.users.delete_user_by_id(&id).await;
            }
            .boxed_local()
        })
    };

    view! {
        <h1 class="text-3xl font-bold mb-6">"Users"</h1>
        <Notice message=Signal::derive(move || snapshot.with(|s| s.users_error.clone())) />
        <Notice message=Signal::derive(move || snapshot.with(|s| s.users_success.clone())) success=true />
        <Show when=move || !snapshot.with(|s| s.users_loading) fallback=|| view! { <Spinner /> }>
            <div class="overflow-x-auto bg-base-100 rounded-box">
                <table class="table">
                    <thead>
                        <tr>
                            <th>"Name"</th>
                            <th>"Username"</th>
                            <th>"Email"</th>
                            <th>"Role"</th>
                            <th>"Status"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For each=move || snapshot.with(|s| s.users.clone()) key=|u| u.id.clone() let:user>
                            {
                                let id = user.id.clone();
                                let delete_id = user.id.clone();
                                view! {
                                    <tr>
                                        <td>{user.full_name()}</td>
                                        <td>{user.username.clone()}</td>
                                        <td>{user.email.clone()}</td>
                                        <td>{role_label(user.role)}</td>
                                        <td>{status_label(user.status)}</td>
                                        <td class="flex gap-2 justify-end">
                                            <Link route=AppRoute::AdminUserEdit(id) class="btn btn-ghost btn-sm">
                                                "Edit"
                                            </Link>
                                            <button
                                                class="btn btn-ghost btn-sm text-error"
                                                on:click=move |_| delete(delete_id.clone())
                                            >
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

#[component]
pub fn AdminUserEditPage(id: String) -> impl IntoView {
    let shop = use_shop();
    let router = use_router();
    let snapshot = shop.snapshot();

    let state = UserFormState::new();
    let email = RwSignal::new(String::new());
    let username = RwSignal::new(String::new());
    let role = RwSignal::new(Role::User);
    let status = RwSignal::new(UserStatus::Active);
    let password_reset = RwSignal::new(String::new());
    let errors = RwSignal::new(ValidationErrors::default());

    let load_id = id.clone();
    shop.dispatch(move |s| async move { s.users.fetch_user_by_id(&load_id).await }.boxed_local());

    let subject = Memo::new(move |_| snapshot.with(|s| (s.subject.clone(), s.other_salutation.clone())));
    Effect::new(move |_| {
        let (user, other) = subject.get();
        if user.id == id {
            state.load(&user, &other);
            email.set(user.email.clone());
            username.set(user.username.clone());
            role.set(user.role);
            status.set(user.status);
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let picture_path = snapshot.with_untracked(|s| s.subject.profile_picture_path.clone());
        if let Err(e) = validate_account(&state.to_account_form(picture_path)) {
            errors.set(e);
            return;
        }
        errors.set(ValidationErrors::default());

        let reset = password_reset.get_untracked();
        let options = SaveUserOptions {
            password_reset: (!reset.is_empty()).then_some(reset),
            ..Default::default()
        };
        spawn_local(async move {
            let saved = shop
                .run(move |s| {
                    async move {
                        let user = s.users.subject_mut();
                        state.apply_to(user);
                        user.email = email.get_untracked();
                        user.username = username.get_untracked();
                        user.role = role.get_untracked();
                        user.status = status.get_untracked();
                        s.users.set_other_salutation(state.other_salutation.get_untracked());
                        s.users.save_user(s.auth.session(), options).await
                    }
                    .boxed_local()
                })
                .await;
            if saved {
                router.navigate(AppRoute::AdminUsers);
            }
        });
    };

    view! {
        <div class="max-w-3xl mx-auto card bg-base-100 shadow-xl">
            <form class="card-body gap-2" on:submit=on_submit>
                <h1 class="card-title text-2xl">"Edit user"</h1>
                <Notice message=Signal::derive(move || snapshot.with(|s| s.users_error.clone())) />

                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    <TextField label="Email" value=email input_type="email" />
                    <TextField label="Username" value=username />
                    <label class="form-control w-full">
                        <div class="label">
                            <span class="label-text">"Role"</span>
                        </div>
                        <select
                            class="select select-bordered w-full"
                            on:change=move |ev| {
                                let value = event_target_value(&ev);
                                if let Some((r, _)) = ROLES.iter().find(|(_, l)| *l == value) {
                                    role.set(*r);
                                }
                            }
                        >
                            {ROLES
                                .into_iter()
                                .map(|(r, label)| {
                                    view! {
                                        <option value=label selected=move || role.get() == r>
                                            {label}
                                        </option>
                                    }
                                })
                                .collect_view()}
                        </select>
                    </label>
                    <label class="form-control w-full">
                        <div class="label">
                            <span class="label-text">"Status"</span>
                        </div>
                        <select
                            class="select select-bordered w-full"
                            on:change=move |ev| {
                                let value = event_target_value(&ev);
                                if let Some((s, _)) = STATUSES.iter().find(|(_, l)| *l == value) {
                                    status.set(*s);
                                }
                            }
                        >
                            {STATUSES
                                .into_iter()
                                .map(|(s, label)| {
                                    view! {
                                        <option value=label selected=move || status.get() == s>
                                            {label}
                                        </option>
                                    }
                                })
                                .collect_view()}
                        </select>
                    </label>
                </div>

                <UserFields state=state errors=errors />

                <TextField label="Reset password (optional)" value=password_reset input_type="password" />

                <div class="card-actions justify-end mt-4">
                    <Link route=AppRoute::AdminUsers class="btn btn-ghost">
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
