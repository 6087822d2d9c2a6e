use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub mod protocol;
pub mod validation;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const FILES_PATH: &str = "/api/files";

/// 构造 Bearer 认证头的值
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

// =========================================================
// 用户模型 (User Models)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Salutation {
    #[default]
    Mr,
    Ms,
    Mrs,
    /// 自定义称谓，需要额外填写文本
    Mx,
}

impl Salutation {
    pub const ALL: [Salutation; 4] = [Self::Mr, Self::Ms, Self::Mrs, Self::Mx];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mr => "MR",
            Self::Ms => "MS",
            Self::Mrs => "MRS",
            Self::Mx => "MX",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Banned,
    Deleted,
}

/// 用户资料
///
/// `/api/users/me` 与 `/api/users/:id` 返回同一结构，缺失字段按默认值处理。
/// `role` 与 `status` 由服务端分配，客户端只读。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
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
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =========================================================
// 商品模型 (Catalog Models)
// =========================================================

fn is_zero(id: &u64) -> bool {
    *id == 0
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// 新建商品时为 0，不参与序列化
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    /// 相对存储键，绝对地址需经由文件路径拼接
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

// =========================================================
// 购物车模型 (Cart Models)
// =========================================================

/// 购物车条目
///
/// `name`/`price`/`image_path` 是加入购物车时从商品复制的冗余字段，
/// 商品后续变化不会同步到这里。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// 服务端 ID，仅在持久化到后端后存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub product_id: u64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.price.unwrap_or(0.0) * f64::from(self.quantity)
    }
}

// =========================================================
// 订单模型 (Order Models)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "PENDING", alias = "pending")]
    Pending,
    #[serde(rename = "COMPLETED", alias = "completed")]
    Completed,
    #[serde(rename = "CANCELED", alias = "canceled")]
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [Self::Pending, Self::Completed, Self::Canceled];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// 作为查询参数发送时的取值
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Canceled => "CANCELED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    pub quantity: u32,
    #[serde(default)]
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub user_id: String,
    pub total_price: f64,
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: String,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// 解析创建时间
    ///
    /// 后端可能返回带时区的 RFC 3339 字符串，也可能是不带时区的本地时间。
    pub fn created_at_time(&self) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.created_at) {
            return Some(dt.naive_utc());
        }
        NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}
