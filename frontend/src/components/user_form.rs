//! 用户资料表单状态
//!
//! 将零散的 signal 整合为 `UserFormState`，负责：
//! - 从用户记录加载
//! - 转换为校验表单
//! - 写回用户记录

use leptos::prelude::*;
use oeffi_shop::shared::validation::{AccountForm, ValidationErrors};
use oeffi_shop::shared::{Salutation, User};

use super::common::{TextField, field_error};

pub fn salutation_label(salutation: Salutation) -> &'static str {
    match salutation {
        Salutation::Mr => "Mr",
        Salutation::Ms => "Ms",
        Salutation::Mrs => "Mrs",
        Salutation::Mx => "Other",
    }
}

/// 使用 `RwSignal` 因为它实现了 `Copy`，适合作为 Props 在组件间传递
#[derive(Clone, Copy)]
pub struct UserFormState {
    pub salutation: RwSignal<String>,
    pub other_salutation: RwSignal<String>,
    pub first_name: RwSignal<String>,
    pub last_name: RwSignal<String>,
    pub country_code: RwSignal<String>,
    pub address: RwSignal<String>,
    pub city: RwSignal<String>,
    pub zip: RwSignal<String>,
}

impl UserFormState {
    pub fn new() -> Self {
        Self {
            salutation: RwSignal::new(String::new()),
            other_salutation: RwSignal::new(String::new()),
            first_name: RwSignal::new(String::new()),
            last_name: RwSignal::new(String::new()),
            country_code: RwSignal::new(String::new()),
            address: RwSignal::new(String::new()),
            city: RwSignal::new(String::new()),
            zip: RwSignal::new(String::new()),
        }
    }

    pub fn load(&self, user: &User, other_salutation: &str) {
        self.salutation.set(user.salutation.as_str().to_string());
        self.other_salutation.set(other_salutation.to_string());
        self.first_name.set(user.first_name.clone());
        self.last_name.set(user.last_name.clone());
        self.country_code.set(user.country_code.clone());
        self.address.set(user.address.clone());
        self.city.set(user.city.clone());
        self.zip.set(user.zip.clone());
    }

    pub fn to_account_form(&self, profile_picture_path: Option<String>) -> AccountForm {
        AccountForm {
            salutation: self.salutation.get_untracked(),
            other_salutation: self.other_salutation.get_untracked(),
            first_name: self.first_name.get_untracked(),
            last_name: self.last_name.get_untracked(),
            country_code: self.country_code.get_untracked(),
            address: self.address.get_untracked(),
            city: self.city.get_untracked(),
            zip: self.zip.get_untracked(),
            profile_picture_path,
        }
    }

    /// 把表单值写回用户记录（调用前已通过校验）
    pub fn apply_to(&self, user: &mut User) {
        if let Some(salutation) = Salutation::parse(&self.salutation.get_untracked()) {
            user.salutation = salutation;
        }
        user.first_name = self.first_name.get_untracked();
        user.last_name = self.last_name.get_untracked();
        user.country_code = self.country_code.get_untracked();
        user.address = self.address.get_untracked();
        user.city = self.city.get_untracked();
        user.zip = self.zip.get_untracked();
    }
}

impl Default for UserFormState {
    fn default() -> Self {
        Self::new()
    }
}

/// 称谓选择；选择 "Other" 时显示自定义称谓输入
#[component]
pub fn SalutationSelect(
    value: RwSignal<String>,
    other: RwSignal<String>,
    errors: RwSignal<ValidationErrors>,
) -> impl IntoView {
    let salutation_error = field_error(errors, "salutation");

    view! {
        <label class="form-control w-full">
            <div class="label">
                <span class="label-text">"Salutation"</span>
            </div>
            <select
                class="select select-bordered w-full"
                on:change=move |ev| value.set(event_target_value(&ev))
            >
                <option value="" selected=move || value.get().is_empty()>
                    "Choose..."
                </option>
                {Salutation::ALL
                    .into_iter()
                    .map(|s| {
                        view! {
                            <option value=s.as_str() selected=move || value.get() == s.as_str()>
                                {salutation_label(s)}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
            {move || {
                salutation_error
                    .get()
                    .map(|e| {
                        view! {
                            <div class="label">
                                <span class="label-text-alt text-error">{e}</span>
                            </div>
                        }
                    })
            }}
        </label>
        <Show when=move || value.get() == Salutation::Mx.as_str()>
            <TextField
                label="Your salutation"
                value=other
                error=field_error(errors, "otherSalutation")
            />
        </Show>
    }
}

/// 个人与地址字段
#[component]
pub fn UserFields(state: UserFormState, errors: RwSignal<ValidationErrors>) -> impl IntoView {
    view! {
        <SalutationSelect value=state.salutation other=state.other_salutation errors=errors />
        <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
            <TextField
                label="First name"
                value=state.first_name
                error=field_error(errors, "firstName")
            />
            <TextField
                label="Last name"
                value=state.last_name
                error=field_error(errors, "lastName")
            />
            <TextField label="Address" value=state.address error=field_error(errors, "address") />
            <TextField label="ZIP" value=state.zip error=field_error(errors, "zip") />
            <TextField label="City" value=state.city error=field_error(errors, "city") />
            <TextField
                label="Country code"
                value=state.country_code
                error=field_error(errors, "countryCode")
            />
        </div>
    }
}
