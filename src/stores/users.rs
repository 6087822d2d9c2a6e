//! 用户账户
//!
//! 一个可编辑的"当前对象"用户记录（自己或管理员正在编辑的用户），
//! 以及管理员的用户列表。结果通过成功/错误消息字段报告，不向外返回错误。

use std::rc::Rc;

use oeffi_shop_shared::protocol::{
    AdminUpdateUserRequest, CreateUserRequest, DeleteUserRequest, GetUserRequest,
    ListUsersRequest, UpdateProfileRequest,
};
use oeffi_shop_shared::{Salutation, User};

use crate::api::ApiClient;
use crate::error::ShopError;
use crate::http::{FileUpload, HttpClient};
use crate::stores::auth::Session;

/// 用户修改自己的密码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Default)]
pub struct SaveUserOptions {
    /// 自助修改时的密码变更
    pub password_change: Option<PasswordChange>,
    /// 管理员为他人重置的新密码
    pub password_reset: Option<String>,
    /// 先上传的头像
    pub profile_picture: Option<FileUpload>,
}

pub struct UserStore<C: HttpClient> {
    api: Rc<ApiClient<C>>,
    subject: User,
    other_salutation: String,
    users: Vec<User>,
    loading: bool,
    success: Option<String>,
    error: Option<String>,
}

impl<C: HttpClient> UserStore<C> {
    pub fn new(api: Rc<ApiClient<C>>) -> Self {
        Self {
            api,
            subject: User::default(),
            other_salutation: String::new(),
            users: Vec::new(),
            loading: false,
            success: None,
            error: None,
        }
    }

    // --- Accessors ---

    pub fn subject(&self) -> &User {
        &self.subject
    }

    /// 表单直接编辑当前对象
    pub fn subject_mut(&mut self) -> &mut User {
        &mut self.subject
    }

    pub fn set_subject(&mut self, user: User) {
        self.subject = user;
    }

    pub fn other_salutation(&self) -> &str {
        &self.other_salutation
    }

    pub fn set_other_salutation(&mut self, value: impl Into<String>) {
        self.other_salutation = value.into();
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn success_message(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 头像的绝对地址；无头像时为空字符串
    pub fn profile_picture_url(&self) -> String {
        self.api.file_url(self.subject.profile_picture_path.as_deref())
    }

    fn begin(&mut self) {
        self.loading = true;
        self.success = None;
        self.error = None;
    }

    fn finish(&mut self, result: Result<&str, (ShopError, &str)>) -> bool {
        self.loading = false;
        match result {
            Ok(message) => {
                self.success = Some(message.to_string());
                true
            }
            Err((err, fallback)) => {
                tracing::warn!("{}", err);
                self.error = Some(err.remote_message().unwrap_or(fallback).to_string());
                false
            }
        }
    }

    fn replace_subject(&mut self, user: User) {
        if user.salutation == Salutation::Mx {
            self.other_salutation.clear();
        }
        if let Some(cached) = self.users.iter_mut().find(|u| u.id == user.id) {
            *cached = user.clone();
        }
        self.subject = user;
    }

    // --- Actions ---

    /// 加载会话用户自己的记录
    pub async fn load_user(&mut self, session: &Session) {
        let Some(user_id) = session.user_id() else {
            return;
        };
        let user_id = user_id.to_string();
        self.fetch_user_by_id(&user_id).await;
    }

    pub async fn fetch_user_by_id(&mut self, id: &str) {
        self.begin();
        let result = self.api.send(&GetUserRequest { id: id.to_string() }).await;
        self.loading = false;
        match result {
            Ok(user) => self.replace_subject(user),
            Err(e) => {
                tracing::warn!("{}", e.in_op_with("users.get", id));
                self.error = Some("User could not be loaded.".to_string());
            }
        }
    }

    /// 用户列表（仅管理员）
    pub async fn fetch_users(&mut self, session: &Session) {
        if !session.is_admin() {
            return;
        }
        self.begin();
        let result = self.api.send(&ListUsersRequest).await;
        self.loading = false;
        match result {
            Ok(users) => self.users = users,
            Err(e) => {
                tracing::warn!("{}", e.in_op("users.list"));
                self.error = Some("Users could not be loaded.".to_string());
            }
        }
    }

    /// 保存当前对象
    ///
    /// 管理员走管理端点，可修改账户字段并重置密码；
    /// 其他用户走自助端点，只能修改个人与地址字段以及自己的密码。
    pub async fn save_user(&mut self, session: &Session, options: SaveUserOptions) -> bool {
        self.begin();

        // 新头像只随保存请求发送，保存成功后才由响应写回当前对象
        let mut picture_path = self.subject.profile_picture_path.clone();
        if let Some(file) = options.profile_picture {
            match self.api.upload(file).await {
                Ok(key) => picture_path = Some(key),
                Err(e) => {
                    return self.finish(Err((
                        e.in_op("users.save"),
                        "Profile picture could not be uploaded.",
                    )));
                }
            }
        }

        let user = &self.subject;
        let result = if session.is_admin() {
            let req = AdminUpdateUserRequest {
                id: user.id.clone(),
                salutation: user.salutation,
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                country_code: user.country_code.clone(),
                address: user.address.clone(),
                zip: user.zip.clone(),
                city: user.city.clone(),
                email: user.email.clone(),
                username: user.username.clone(),
                role: user.role,
                status: user.status,
                profile_picture_path: picture_path,
                password: options.password_reset,
            };
            self.api.send(&req).await
        } else {
            let (current_password, new_password) = match options.password_change {
                Some(change) => (Some(change.current_password), Some(change.new_password)),
                None => (None, None),
            };
            let req = UpdateProfileRequest {
                id: user.id.clone(),
                salutation: user.salutation,
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                country_code: user.country_code.clone(),
                address: user.address.clone(),
                zip: user.zip.clone(),
                city: user.city.clone(),
                profile_picture_path: picture_path,
                current_password,
                new_password,
            };
            self.api.send(&req).await
        };

        match result {
            Ok(saved) => {
                tracing::info!(user_id = %saved.id, "user saved");
                self.replace_subject(saved);
                self.finish(Ok("Changes saved successfully."))
            }
            Err(e) => self.finish(Err((e.in_op("users.save"), "Error while saving changes."))),
        }
    }

    /// 以当前对象的数据新建用户（自助注册或管理员创建）
    pub async fn create_user(&mut self, password: &str) -> bool {
        self.begin();
        let user = &self.subject;
        let req = CreateUserRequest {
            salutation: user.salutation,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            country_code: user.country_code.clone(),
            address: user.address.clone(),
            city: user.city.clone(),
            zip: user.zip.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            password: password.to_string(),
        };

        match self.api.send(&req).await {
            Ok(created) => {
                tracing::info!(user_id = %created.id, "user created");
                self.users.push(created.clone());
                self.subject = created;
                self.finish(Ok("User created successfully."))
            }
            Err(e) => self.finish(Err((e.in_op("users.create"), "Error while creating the user."))),
        }
    }

    /// 删除当前对象
    pub async fn delete_user(&mut self) -> bool {
        let id = self.subject.id.clone();
        self.begin();
        match self.api.send(&DeleteUserRequest { id: id.clone() }).await {
            Ok(_) => {
                tracing::info!(user_id = %id, "user deleted");
                self.users.retain(|u| u.id != id);
                self.finish(Ok("User account was deleted."))
            }
            Err(e) => self.finish(Err((
                e.in_op_with("users.delete", id),
                "Error while deleting the user account.",
            ))),
        }
    }

    /// 按 ID 删除，并从已加载的列表中移除
    pub async fn delete_user_by_id(&mut self, id: &str) -> bool {
        self.begin();
        match self.api.send(&DeleteUserRequest { id: id.to_string() }).await {
            Ok(_) => {
                tracing::info!(user_id = %id, "user deleted");
                self.users.retain(|u| u.id != id);
                self.finish(Ok("User account was deleted."))
            }
            Err(e) => self.finish(Err((
                e.in_op_with("users.delete", id),
                "Error while deleting the user account.",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, MockHttpClient};
    use crate::test_support::{BASE, api, session_for, user_json};
    use serde_json::json;

    fn store() -> (UserStore<MockHttpClient>, Rc<ApiClient<MockHttpClient>>) {
        let api = api();
        (UserStore::new(api.clone()), api)
    }

    #[tokio::test]
    async fn load_user_uses_session_id() {
        let (mut users, api) = store();
        users.load_user(&Session::default()).await;
        assert_eq!(api.client().request_count(), 0);

        api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/users/u-1", BASE),
            200,
            user_json("u-1", "USER"),
        );
        users.load_user(&session_for("u-1", "USER")).await;
        assert_eq!(users.subject().first_name, "Ada");
        assert!(users.error_message().is_none());
    }

    #[tokio::test]
    async fn self_service_save_uses_restricted_endpoint() {
        let (mut users, api) = store();
        let session = session_for("u-1", "USER");
        users.set_subject(serde_json::from_value(user_json("u-1", "USER")).unwrap());
        users.subject_mut().city = "Graz".into();
        api.client().mock_response(
            HttpMethod::Put,
            &format!("{}/api/users/u-1", BASE),
            200,
            user_json("u-1", "USER"),
        );

        let ok = users
            .save_user(
                &session,
                SaveUserOptions {
                    password_change: Some(PasswordChange {
                        current_password: "old".into(),
                        new_password: "new-secret".into(),
                    }),
                    ..Default::default()
                },
            )
            .await;
        assert!(ok);
        assert_eq!(users.success_message(), Some("Changes saved successfully."));

        let body = api.client().last_request().unwrap().json().unwrap();
        assert_eq!(body["city"], "Graz");
        assert_eq!(body["currentPassword"], "old");
        assert_eq!(body["newPassword"], "new-secret");
        assert!(body.get("role").is_none());
        assert!(body.get("email").is_none());
    }

    #[tokio::test]
    async fn admin_save_uploads_picture_and_uses_admin_endpoint() {
        let (mut users, api) = store();
        let admin = session_for("a-1", "ADMIN");
        users.set_subject(serde_json::from_value(user_json("u-2", "USER")).unwrap());
        api.client().mock_response(
            HttpMethod::Post,
            &format!("{}/api/files/upload", BASE),
            200,
            json!({ "path": "avatars/u-2.png" }),
        );
        api.client().mock_response(
            HttpMethod::Put,
            &format!("{}/api/users/admin/u-2", BASE),
            200,
            json!({ "id": "u-2", "firstName": "Ada", "profilePicturePath": "avatars/u-2.png" }),
        );

        let ok = users
            .save_user(
                &admin,
                SaveUserOptions {
                    password_reset: Some("reset-pw".into()),
                    profile_picture: Some(FileUpload::new("me.png", "image/png", vec![9])),
                    ..Default::default()
                },
            )
            .await;
        assert!(ok);

        let body = api.client().last_request().unwrap().json().unwrap();
        assert_eq!(body["profilePicturePath"], "avatars/u-2.png");
        assert_eq!(body["password"], "reset-pw");
        assert_eq!(body["role"], "USER");
        assert_eq!(
            users.profile_picture_url(),
            format!("{}/api/files/avatars/u-2.png", BASE)
        );
    }

    #[tokio::test]
    async fn save_failure_reports_backend_message() {
        let (mut users, api) = store();
        users.set_subject(serde_json::from_value(user_json("u-1", "USER")).unwrap());
        api.client().mock_response(
            HttpMethod::Put,
            &format!("{}/api/users/u-1", BASE),
            400,
            json!({ "message": "Current password is wrong" }),
        );

        assert!(!users.save_user(&session_for("u-1", "USER"), SaveUserOptions::default()).await);
        assert_eq!(users.error_message(), Some("Current password is wrong"));
        assert!(users.success_message().is_none());
        // 本地编辑保持不变
        assert_eq!(users.subject().id, "u-1");
    }

    #[tokio::test]
    async fn uploaded_picture_is_kept_only_after_save() {
        let (mut users, api) = store();
        let session = session_for("u-1", "USER");
        users.set_subject(serde_json::from_value(user_json("u-1", "USER")).unwrap());
        api.client().mock_response(
            HttpMethod::Post,
            &format!("{}/api/files/upload", BASE),
            200,
            json!({ "path": "avatars/new.png" }),
        );
        api.client().mock_response(
            HttpMethod::Put,
            &format!("{}/api/users/u-1", BASE),
            500,
            json!({ "message": "Database unavailable" }),
        );
        let options = || SaveUserOptions {
            profile_picture: Some(FileUpload::new("me.png", "image/png", vec![1])),
            ..Default::default()
        };

        assert!(!users.save_user(&session, options()).await);
        assert_eq!(users.error_message(), Some("Database unavailable"));
        assert!(users.subject().profile_picture_path.is_none());
        let body = api.client().last_request().unwrap().json().unwrap();
        assert_eq!(body["profilePicturePath"], "avatars/new.png");
    }

    #[tokio::test]
    async fn create_user_overwrites_subject() {
        let (mut users, api) = store();
        users.subject_mut().email = "ada@example.org".into();
        users.subject_mut().username = "ada".into();
        api.client().mock_response(
            HttpMethod::Post,
            &format!("{}/api/users", BASE),
            201,
            user_json("u-new", "USER"),
        );

        assert!(users.create_user("long-enough").await);
        assert_eq!(users.subject().id, "u-new");

        let body = api.client().last_request().unwrap().json().unwrap();
        assert_eq!(body["password"], "long-enough");
        assert_eq!(body["username"], "ada");
    }

    #[tokio::test]
    async fn create_failure_without_payload_uses_fallback() {
        let (mut users, _) = store();
        assert!(!users.create_user("pw").await);
        assert_eq!(users.error_message(), Some("Error while creating the user."));
    }

    #[tokio::test]
    async fn admin_listing_and_delete_by_id() {
        let (mut users, api) = store();
        let admin = session_for("a-1", "ADMIN");

        users.fetch_users(&session_for("u-1", "USER")).await;
        assert_eq!(api.client().request_count(), 0);

        api.client().mock_response(
            HttpMethod::Get,
            &format!("{}/api/users", BASE),
            200,
            json!([user_json("u-1", "USER"), user_json("u-2", "USER")]),
        );
        api.client().mock_response(
            HttpMethod::Delete,
            &format!("{}/api/users/u-2", BASE),
            204,
            json!(null),
        );

        users.fetch_users(&admin).await;
        assert_eq!(users.users().len(), 2);

        assert!(users.delete_user_by_id("u-2").await);
        assert_eq!(users.users().len(), 1);
        assert_eq!(users.success_message(), Some("User account was deleted."));
    }

    #[tokio::test]
    async fn delete_own_account() {
        let (mut users, api) = store();
        users.set_subject(serde_json::from_value(user_json("u-1", "USER")).unwrap());
        api.client().mock_response(
            HttpMethod::Delete,
            &format!("{}/api/users/u-1", BASE),
            204,
            json!(null),
        );
        assert!(users.delete_user().await);
    }
}
