//! HTTP 请求封装模块
//!
//! 基于 `web_sys::fetch` 实现核心库的 `HttpClient` 特性。

use async_trait::async_trait;
use oeffi_shop::http::HttpBody;
use oeffi_shop::{FileUpload, HttpClient, HttpRequest, HttpResponse, ShopError, ShopResult};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Headers, Request, RequestInit, Response};

fn js_error(context: &str, value: JsValue) -> ShopError {
    ShopError::transport(format!("{}: {:?}", context, value))
}

/// 构造单文件 multipart 表单；边界由浏览器生成
fn multipart(field: &str, file: &FileUpload) -> ShopResult<FormData> {
    let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
    let parts = js_sys::Array::of1(&bytes);
    let options = BlobPropertyBag::new();
    options.set_type(&file.content_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|e| js_error("blob", e))?;

    let form = FormData::new().map_err(|e| js_error("form data", e))?;
    form.append_with_blob_and_filename(field, &blob, &file.file_name)
        .map_err(|e| js_error("form data", e))?;
    Ok(form)
}

fn build_request(req: HttpRequest) -> ShopResult<Request> {
    let headers = Headers::new().map_err(|e| js_error("headers", e))?;
    for (key, value) in &req.headers {
        headers
            .set(key, value)
            .map_err(|e| js_error("headers", e))?;
    }

    let opts = RequestInit::new();
    opts.set_method(req.method.as_str());
    opts.set_headers(&headers.into());

    match &req.body {
        Some(HttpBody::Json(body)) => opts.set_body(&JsValue::from_str(body)),
        Some(HttpBody::Multipart { field, file }) => opts.set_body(&multipart(field, file)?.into()),
        None => {}
    }

    Request::new_with_str_and_init(&req.url, &opts).map_err(|e| js_error("request", e))
}

/// 浏览器 fetch 客户端
#[derive(Clone, Copy, Default)]
pub struct FetchHttpClient;

#[async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> ShopResult<HttpResponse> {
        let request = build_request(req)?;
        let window = web_sys::window().ok_or_else(|| ShopError::transport("no window object"))?;

        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| js_error("fetch", e))?;
        let response: Response = value.dyn_into().map_err(|e| js_error("response", e))?;
        let status = response.status();

        let promise = response.text().map_err(|e| js_error("response body", e))?;
        let text = JsFuture::from(promise)
            .await
            .map_err(|e| js_error("response body", e))?;

        Ok(HttpResponse {
            status,
            body: text.as_string().unwrap_or_default(),
        })
    }
}
