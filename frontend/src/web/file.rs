//! 读取 `<input type="file">` 中选择的文件

use oeffi_shop::FileUpload;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlInputElement;

/// 读取第一个选中的文件；未选择或读取失败时返回 `None`
pub async fn read_selected_file(input: &HtmlInputElement) -> Option<FileUpload> {
    let file = input.files()?.get(0)?;
    let buffer = match JsFuture::from(file.array_buffer()).await {
        Ok(buffer) => buffer,
        Err(e) => {
            tracing::warn!("file {} could not be read: {:?}", file.name(), e);
            return None;
        }
    };
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Some(FileUpload::new(file.name(), file.type_(), bytes))
}
