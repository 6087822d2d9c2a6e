//! 通用 UI 片段

use leptos::prelude::*;
use oeffi_shop::shared::validation::ValidationErrors;

pub fn format_price(value: f64) -> String {
    format!("€ {:.2}", value)
}

/// 取某字段的校验错误，供输入框下方显示
pub fn field_error(errors: RwSignal<ValidationErrors>, field: &'static str) -> Signal<Option<String>> {
    Signal::derive(move || errors.with(|e| e.field(field).map(str::to_string)))
}

/// 成功或错误提示条；消息为空时不渲染
#[component]
pub fn Notice(
    #[prop(into)] message: Signal<Option<String>>,
    #[prop(optional)] success: bool,
) -> impl IntoView {
    let class = if success {
        "alert alert-success text-sm py-2"
    } else {
        "alert alert-error text-sm py-2"
    };
    move || {
        message.get().map(|text| {
            view! {
                <div role="alert" class=class>
                    <span>{text}</span>
                </div>
            }
        })
    }
}

#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <div class="flex justify-center py-10">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

/// 带标签与错误提示的文本输入
#[component]
pub fn TextField(
    #[prop(into)] label: String,
    value: RwSignal<String>,
    #[prop(optional, into)] error: MaybeProp<String>,
    #[prop(default = "text")] input_type: &'static str,
) -> impl IntoView {
    view! {
        <label class="form-control w-full">
            <div class="label">
                <span class="label-text">{label}</span>
            </div>
            <input
                type=input_type
                class="input input-bordered w-full"
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
            {move || {
                error
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
    }
}
