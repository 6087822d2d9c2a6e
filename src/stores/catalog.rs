//! 商品目录
//!
//! 商品列表、详情与分类；管理员可新建、修改、删除商品。

use std::rc::Rc;

use oeffi_shop_shared::protocol::{
    CreateProductRequest, DeleteProductRequest, GetProductRequest, ListCategoriesRequest,
    ListProductsRequest, UpdateProductRequest,
};
use oeffi_shop_shared::{Category, Product};

use crate::api::ApiClient;
use crate::error::ShopError;
use crate::http::{FileUpload, HttpClient};

pub struct ProductStore<C: HttpClient> {
    api: Rc<ApiClient<C>>,
    products: Vec<Product>,
    categories: Vec<Category>,
    selected: Option<Product>,
    loading: bool,
    error: Option<String>,
}

impl<C: HttpClient> ProductStore<C> {
    pub fn new(api: Rc<ApiClient<C>>) -> Self {
        Self {
            api,
            products: Vec::new(),
            categories: Vec::new(),
            selected: None,
            loading: false,
            error: None,
        }
    }

    // --- Accessors ---

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn selected(&self) -> Option<&Product> {
        self.selected.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 在已加载的列表中查找
    pub fn find(&self, id: u64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// 商品图片的绝对地址；无图片时为空字符串
    pub fn image_url(&self, product: &Product) -> String {
        self.api.file_url(product.image_path.as_deref())
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn fail(&mut self, err: ShopError, fallback: &str) {
        tracing::warn!("{}", err);
        self.error = Some(err.remote_message().unwrap_or(fallback).to_string());
    }

    // --- Actions ---

    pub async fn fetch_products(&mut self) {
        self.fetch_products_by_category(None).await;
    }

    /// `None` 加载全部商品
    pub async fn fetch_products_by_category(&mut self, category_id: Option<u64>) {
        self.begin();
        match self.api.send(&ListProductsRequest { category_id }).await {
            Ok(products) => self.products = products,
            Err(e) => self.fail(e.in_op("catalog.list"), "Products could not be loaded."),
        }
        self.loading = false;
    }

    pub async fn fetch_product(&mut self, id: u64) {
        self.begin();
        match self.api.send(&GetProductRequest { id }).await {
            Ok(product) => self.selected = Some(product),
            Err(e) => self.fail(
                e.in_op_with("catalog.get", id.to_string()),
                "Product could not be loaded.",
            ),
        }
        self.loading = false;
    }

    pub async fn fetch_categories(&mut self) {
        self.begin();
        match self.api.send(&ListCategoriesRequest).await {
            Ok(categories) => self.categories = categories,
            Err(e) => self.fail(e.in_op("catalog.categories"), "Categories could not be loaded."),
        }
        self.loading = false;
    }

    /// 保存商品
    ///
    /// 带图片时先上传，再以返回的存储键替换 `image_path`。
    /// `is_new` 决定 POST 新建还是 PUT 更新。成功后同步到已加载的列表。
    pub async fn save_product(
        &mut self,
        mut product: Product,
        image: Option<FileUpload>,
        is_new: bool,
    ) -> Option<Product> {
        self.begin();

        if let Some(file) = image {
            match self.api.upload(file).await {
                Ok(key) => product.image_path = Some(key),
                Err(e) => {
                    self.fail(e.in_op("catalog.save"), "Image could not be uploaded.");
                    self.loading = false;
                    return None;
                }
            }
        }

        let result = if is_new {
            product.id = 0;
            self.api.send(&CreateProductRequest { product }).await
        } else {
            self.api.send(&UpdateProductRequest { product }).await
        };
        self.loading = false;

        match result {
            Ok(saved) => {
                match self.products.iter_mut().find(|p| p.id == saved.id) {
                    Some(existing) => *existing = saved.clone(),
                    None => self.products.push(saved.clone()),
                }
                self.selected = Some(saved.clone());
                tracing::info!(product_id = saved.id, is_new, "product saved");
                Some(saved)
            }
            Err(e) => {
                self.fail(e.in_op("catalog.save"), "Error while saving.");
                None
            }
        }
    }

    /// 删除商品，并从已加载的列表中移除
    pub async fn delete_product(&mut self, id: u64) -> bool {
        self.begin();
        let result = self.api.send(&DeleteProductRequest { id }).await;
        self.loading = false;

        match result {
            Ok(_) => {
                self.products.retain(|p| p.id != id);
                if self.selected.as_ref().is_some_and(|p| p.id == id) {
                    self.selected = None;
                }
                tracing::info!(product_id = id, "product deleted");
                true
            }
            Err(e) => {
                self.fail(
                    e.in_op_with("catalog.delete", id.to_string()),
                    "Error while deleting.",
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, MockHttpClient};
    use crate::test_support::{BASE, api};
    use serde_json::json;

    fn store() -> (ProductStore<MockHttpClient>, Rc<ApiClient<MockHttpClient>>) {
        let api = api();
        (ProductStore::new(api.clone()), api)
    }

    #[tokio::test]
    async fn fetch_products_and_filter() {
        let (mut catalog, api) = store();
        api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/products", BASE),
            200,
            json!([
                { "id": 1, "name": "Ticket", "description": "", "price": 2.4 },
                { "id": 2, "name": "Map", "description": "", "price": 5.0, "categoryId": 3 }
            ]),
        );
        api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/products?categoryId=3", BASE),
            200,
            json!([{ "id": 2, "name": "Map", "description": "", "price": 5.0, "categoryId": 3 }]),
        );

        catalog.fetch_products().await;
        assert_eq!(catalog.products().len(), 2);
        assert!(catalog.error().is_none());
        assert!(!catalog.loading());

        catalog.fetch_products_by_category(Some(3)).await;
        assert_eq!(catalog.products().len(), 1);
        assert_eq!(catalog.find(2).unwrap().name, "Map");

        catalog.fetch_products_by_category(None).await;
        assert_eq!(catalog.products().len(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_sets_message_and_keeps_list() {
        let (mut catalog, api) = store();
        api.client().mock_failure(HttpMethod::Get, &format!("{}/api/products", BASE), "offline");

        catalog.fetch_products().await;
        assert_eq!(catalog.error(), Some("Products could not be loaded."));
        assert!(catalog.products().is_empty());
        assert!(!catalog.loading());
    }

    #[tokio::test]
    async fn fetch_categories_and_detail() {
        let (mut catalog, api) = store();
        api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/categories", BASE),
            200,
            json!([{ "id": 1, "name": "Tickets" }]),
        );
        api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/products/9", BASE),
            200,
            json!({ "id": 9, "name": "Pass", "description": "Year", "price": 365.0, "imagePath": "p9.png" }),
        );

        catalog.fetch_categories().await;
        assert_eq!(catalog.categories()[0].name, "Tickets");

        catalog.fetch_product(9).await;
        let selected = catalog.selected().unwrap().clone();
        assert_eq!(catalog.image_url(&selected), format!("{}/api/files/p9.png", BASE));
    }

    #[tokio::test]
    async fn save_new_product_uploads_image_first() {
        let (mut catalog, api) = store();
        api.client().mock_response(
            HttpMethod::Post,
            &format!("{}/api/files/upload", BASE),
            200,
            json!({ "path": "new.png" }),
        );
        api.client().mock_response(
            HttpMethod::Post,
            &format!("{}/api/products", BASE),
            201,
            json!({ "id": 11, "name": "Widget", "description": "", "price": 10.0, "imagePath": "new.png" }),
        );

        let product = Product {
            name: "Widget".into(),
            price: 10.0,
            ..Default::default()
        };
        let saved = catalog
            .save_product(product, Some(FileUpload::new("w.png", "image/png", vec![0])), true)
            .await
            .unwrap();
        assert_eq!(saved.id, 11);
        assert_eq!(catalog.products().len(), 1);

        let create = api
            .client()
            .find(HttpMethod::Post, &format!("{}/api/products", BASE))
            .unwrap();
        let body = create.json().unwrap();
        assert_eq!(body["imagePath"], "new.png");
        assert!(body.get("id").is_none());
    }

    #[tokio::test]
    async fn update_replaces_cached_entry() {
        let (mut catalog, api) = store();
        api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/products", BASE),
            200,
            json!([{ "id": 4, "name": "Old", "description": "", "price": 1.0 }]),
        );
        api.client().mock_response(
            HttpMethod::Put,
            &format!("{}/api/products/4", BASE),
            200,
            json!({ "id": 4, "name": "New", "description": "", "price": 2.0 }),
        );
        catalog.fetch_products().await;

        let mut product = catalog.find(4).unwrap().clone();
        product.name = "New".into();
        catalog.save_product(product, None, false).await.unwrap();

        assert_eq!(catalog.products().len(), 1);
        assert_eq!(catalog.find(4).unwrap().name, "New");
        // 无图片时不上传
        assert!(
            api.client()
                .find(HttpMethod::Post, &format!("{}/api/files/upload", BASE))
                .is_none()
        );
    }

    #[tokio::test]
    async fn failed_save_reports_backend_message() {
        let (mut catalog, api) = store();
        api.client().mock_response(
            HttpMethod::Post,
            &format!("{}/api/products", BASE),
            400,
            json!({ "message": "Price must be positive" }),
        );
        let product = Product {
            name: "Broken".into(),
            price: -1.0,
            ..Default::default()
        };
        assert!(catalog.save_product(product, None, true).await.is_none());
        assert_eq!(catalog.error(), Some("Price must be positive"));
    }

    #[tokio::test]
    async fn delete_removes_from_list() {
        let (mut catalog, api) = store();
        api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/products", BASE),
            200,
            json!([
                { "id": 1, "name": "A", "description": "", "price": 1.0 },
                { "id": 2, "name": "B", "description": "", "price": 2.0 }
            ]),
        );
        api.client()
            .mock_response(HttpMethod::Delete, &format!("{}/api/products/1", BASE), 204, json!(null));
        catalog.fetch_products().await;

        assert!(catalog.delete_product(1).await);
        assert!(catalog.find(1).is_none());
        assert_eq!(catalog.products().len(), 1);

        // 未配置的响应返回 404
        assert!(!catalog.delete_product(2).await);
        assert_eq!(catalog.products().len(), 1);
        assert_eq!(catalog.error(), Some("Error while deleting."));
    }
}
