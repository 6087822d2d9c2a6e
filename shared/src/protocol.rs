use crate::{Category, CartItem, Order, OrderStatus, Product, Role, Salutation, User, UserStatus};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use urlencoding::encode;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Path parameters are part of the request struct but skipped during serialization,
/// so the remaining fields form the JSON body.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The URL path, including path and query parameters.
    fn path(&self) -> String;
    /// Whether the request itself is sent as JSON body.
    fn has_body(&self) -> bool {
        matches!(Self::METHOD, HttpMethod::Post | HttpMethod::Put)
    }
}

/// Endpoint for multipart uploads (field name `file`).
pub const UPLOAD_PATH: &str = "/api/files/upload";
pub const UPLOAD_FIELD: &str = "file";

/// Storage key returned by the upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(alias = "key", alias = "filePath")]
    pub path: String,
}

/// Error payload returned by the backend on 4xx/5xx.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub message: Option<String>,
}

// =========================================================
// Auth
// =========================================================

#[derive(Debug, Serialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

impl ApiRequest for TokenRequest {
    type Response = TokenResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/auth/token".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct CurrentUserRequest;

impl ApiRequest for CurrentUserRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/users/me".to_string()
    }
}

// =========================================================
// Catalog
// =========================================================

/// List products, optionally filtered by category
#[derive(Debug, Default, Serialize)]
pub struct ListProductsRequest {
    #[serde(skip)]
    pub category_id: Option<u64>,
}

impl ApiRequest for ListProductsRequest {
    type Response = Vec<Product>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        match self.category_id {
            Some(id) => format!("/api/products?categoryId={}", id),
            None => "/api/products".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GetProductRequest {
    #[serde(skip)]
    pub id: u64,
}

impl ApiRequest for GetProductRequest {
    type Response = Product;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/products/{}", self.id)
    }
}

#[derive(Debug, Serialize)]
pub struct ListCategoriesRequest;

impl ApiRequest for ListCategoriesRequest {
    type Response = Vec<Category>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/categories".to_string()
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct CreateProductRequest {
    pub product: Product,
}

impl ApiRequest for CreateProductRequest {
    type Response = Product;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/products".to_string()
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct UpdateProductRequest {
    pub product: Product,
}

impl ApiRequest for UpdateProductRequest {
    type Response = Product;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/products/{}", self.product.id)
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteProductRequest {
    #[serde(skip)]
    pub id: u64,
}

impl ApiRequest for DeleteProductRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/api/products/{}", self.id)
    }
}

// =========================================================
// Cart
// =========================================================

#[derive(Debug, Serialize)]
pub struct GetCartRequest {
    #[serde(skip)]
    pub user_id: String,
}

impl ApiRequest for GetCartRequest {
    type Response = Vec<CartItem>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/cart/{}", encode(&self.user_id))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    #[serde(skip)]
    pub user_id: String,
    pub product_id: u64,
    pub quantity: u32,
}

impl ApiRequest for AddCartItemRequest {
    type Response = CartItem;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/api/cart/{}/items", encode(&self.user_id))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    #[serde(skip)]
    pub user_id: String,
    pub product_id: u64,
    pub quantity: u32,
}

impl ApiRequest for UpdateCartItemRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/cart/{}/items/{}", encode(&self.user_id), self.product_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveCartItemRequest {
    #[serde(skip)]
    pub user_id: String,
    #[serde(skip)]
    pub product_id: u64,
}

impl ApiRequest for RemoveCartItemRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/api/cart/{}/items/{}", encode(&self.user_id), self.product_id)
    }
}

// =========================================================
// Orders
// =========================================================

/// All orders (admin)
#[derive(Debug, Serialize)]
pub struct ListOrdersRequest;

impl ApiRequest for ListOrdersRequest {
    type Response = Vec<Order>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/orders".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct ListUserOrdersRequest {
    #[serde(skip)]
    pub user_id: String,
}

impl ApiRequest for ListUserOrdersRequest {
    type Response = Vec<Order>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/orders/user/{}", encode(&self.user_id))
    }
}

#[derive(Debug, Serialize)]
pub struct GetOrderRequest {
    #[serde(skip)]
    pub id: u64,
}

impl ApiRequest for GetOrderRequest {
    type Response = Order;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/orders/{}", self.id)
    }
}

/// Status goes as query parameter, the body stays empty.
#[derive(Debug, Serialize)]
pub struct UpdateOrderStatusRequest {
    #[serde(skip)]
    pub id: u64,
    #[serde(skip)]
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusResponse {
    pub status: OrderStatus,
}

impl ApiRequest for UpdateOrderStatusRequest {
    type Response = OrderStatusResponse;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/orders/{}/status?status={}", self.id, self.status.as_str())
    }
    fn has_body(&self) -> bool {
        false
    }
}

// =========================================================
// Users
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListUsersRequest;

impl ApiRequest for ListUsersRequest {
    type Response = Vec<User>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/users".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct GetUserRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for GetUserRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/users/{}", encode(&self.id))
    }
}

/// Self-service update: personal and address fields plus an optional own password change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip)]
    pub id: String,
    pub salutation: Salutation,
    pub first_name: String,
    pub last_name: String,
    pub country_code: String,
    pub address: String,
    pub zip: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

impl ApiRequest for UpdateProfileRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/users/{}", encode(&self.id))
    }
}

/// Admin update: may also change account fields and reset the password.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    #[serde(skip)]
    pub id: String,
    pub salutation: Salutation,
    pub first_name: String,
    pub last_name: String,
    pub country_code: String,
    pub address: String,
    pub zip: String,
    pub city: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ApiRequest for AdminUpdateUserRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/users/admin/{}", encode(&self.id))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub salutation: Salutation,
    pub first_name: String,
    pub last_name: String,
    pub country_code: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl ApiRequest for CreateUserRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/users".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteUserRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeleteUserRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/api/users/{}", encode(&self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_params_are_not_serialized() {
        let req = AddCartItemRequest {
            user_id: "u-7".into(),
            product_id: 5,
            quantity: 2,
        };
        assert_eq!(req.path(), "/api/cart/u-7/items");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "productId": 5, "quantity": 2 })
        );
    }

    #[test]
    fn user_ids_are_escaped_in_paths() {
        let cart = RemoveCartItemRequest {
            user_id: "a/b?c".into(),
            product_id: 5,
        };
        assert_eq!(cart.path(), "/api/cart/a%2Fb%3Fc/items/5");

        let orders = ListUserOrdersRequest {
            user_id: "x#1".into(),
        };
        assert_eq!(orders.path(), "/api/orders/user/x%231");

        let user = DeleteUserRequest { id: "../admin".into() };
        assert_eq!(user.path(), "/api/users/..%2Fadmin");

        // 普通 ID 不受影响
        let plain = GetUserRequest { id: "u-1".into() };
        assert_eq!(plain.path(), "/api/users/u-1");
    }

    #[test]
    fn status_update_uses_query_and_no_body() {
        let req = UpdateOrderStatusRequest {
            id: 12,
            status: OrderStatus::Canceled,
        };
        assert_eq!(req.path(), "/api/orders/12/status?status=CANCELED");
        assert!(!req.has_body());
    }

    #[test]
    fn category_filter_in_query() {
        assert_eq!(ListProductsRequest::default().path(), "/api/products");
        let filtered = ListProductsRequest {
            category_id: Some(3),
        };
        assert_eq!(filtered.path(), "/api/products?categoryId=3");
    }

    #[test]
    fn upload_response_accepts_aliases() {
        let a: UploadResponse = serde_json::from_value(json!({ "path": "a.png" })).unwrap();
        let b: UploadResponse = serde_json::from_value(json!({ "key": "b.png" })).unwrap();
        assert_eq!(a.path, "a.png");
        assert_eq!(b.path, "b.png");
    }

    #[test]
    fn self_update_skips_absent_passwords() {
        let req = UpdateProfileRequest {
            id: "u-1".into(),
            salutation: Salutation::Ms,
            first_name: "A".into(),
            last_name: "B".into(),
            country_code: "AT".into(),
            address: "Street 1".into(),
            zip: "1010".into(),
            city: "Wien".into(),
            profile_picture_path: None,
            current_password: None,
            new_password: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("newPassword").is_none());
        assert!(value.get("role").is_none());
        assert_eq!(value["salutation"], "MS");
    }
}
