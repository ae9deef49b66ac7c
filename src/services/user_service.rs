use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::{check_fields, field_error, FindLimits, ServiceError, ServiceResult};
use crate::auth::{hash_password, verify_password, TokenIssuer, TokenType};
use crate::dao::UserStore;
use crate::database::models::user::{normalize_roles, validate_password};
use crate::database::models::{FieldErrors, RegisterInput, User, UserEdit, UserView};
use crate::database::DatabaseError;
use crate::filter::UserFilter;
use crate::middleware::AuthUser;
use crate::types::{unix_now, Role};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserView,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    tokens: TokenIssuer,
    limits: FindLimits,
}

const BAD_CREDENTIALS: &str = "Invalid username or password";

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenIssuer, limits: FindLimits) -> Self {
        Self { users, tokens, limits }
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let username = request.username.trim();
        let user = match self.users.get(username).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound(_)) => {
                warn!("login attempt for unknown user {}", username);
                return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if !verify_password(&request.password, &user.hashed_password) {
            warn!("failed login for {}", username);
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        info!("{} logged in", user.id);
        Ok(LoginResponse {
            access_token: self.tokens.access_token(&user, true)?,
            refresh_token: self.tokens.refresh_token(&user)?,
            token_type: "Bearer",
            expires_in: self.tokens.access_ttl_seconds(),
            user: user.into(),
        })
    }

    /// New non-fresh access token for a valid refresh token of a user that still exists
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<RefreshResponse> {
        let claims = self.tokens.validate(refresh_token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(ServiceError::Unauthorized("Refresh token required".to_string()));
        }
        let user = match self.users.get(&claims.identity).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound(_)) => {
                return Err(ServiceError::Unauthorized("User no longer exists".to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(RefreshResponse {
            access_token: self.tokens.access_token(&user, false)?,
            token_type: "Bearer",
            expires_in: self.tokens.access_ttl_seconds(),
        })
    }

    pub async fn register(&self, input: RegisterInput) -> ServiceResult<UserView> {
        let mut errors = FieldErrors::new();
        input.validate(&mut errors);
        let roles = normalize_roles(&input.roles, &mut errors);
        if roles.is_empty() && !errors.contains_key("roles") {
            errors.insert("roles".to_string(), "At least one role is required".to_string());
        }
        check_fields(errors)?;

        let now = unix_now();
        let user = User {
            id: input.id.trim().to_string(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            roles,
            branch: input.branch.trim().to_uppercase(),
            hashed_password: hash_password(&input.password)?,
            created_at: now,
            updated_at: now,
        };
        match self.users.insert(&user).await {
            Ok(()) => {}
            Err(DatabaseError::Duplicate(_)) => {
                return Err(DatabaseError::Duplicate(format!("User {} already exists", user.id)).into())
            }
            Err(e) => return Err(e.into()),
        }
        info!("user {} registered", user.id);
        Ok(user.into())
    }

    pub async fn edit(&self, id: &str, edit: UserEdit) -> ServiceResult<UserView> {
        let mut errors = FieldErrors::new();
        if edit.name.trim().is_empty() {
            errors.insert("name".to_string(), "This field is required".to_string());
        }
        if edit.branch.trim().is_empty() {
            errors.insert("branch".to_string(), "This field is required".to_string());
        }
        let roles = normalize_roles(&edit.roles, &mut errors);
        if roles.is_empty() && !errors.contains_key("roles") {
            errors.insert("roles".to_string(), "At least one role is required".to_string());
        }
        check_fields(errors)?;

        let edit = UserEdit {
            name: edit.name.trim().to_string(),
            email: edit.email.trim().to_string(),
            roles,
            branch: edit.branch.trim().to_uppercase(),
        };
        Ok(self.users.edit(id, &edit, unix_now()).await?.into())
    }

    pub async fn delete(&self, actor: &AuthUser, id: &str) -> ServiceResult<UserView> {
        if actor.identity == id {
            return Err(ServiceError::BadRequest("You cannot delete your own account".to_string()));
        }
        let deleted = self.users.delete(id).await?;
        info!("user {} deleted by {}", id, actor.identity);
        Ok(deleted.into())
    }

    pub async fn reset_password(&self, id: &str, request: ResetPasswordRequest) -> ServiceResult<()> {
        let mut errors = FieldErrors::new();
        validate_password(&request.password, "password", &mut errors);
        check_fields(errors)?;

        let hashed = hash_password(&request.password)?;
        self.users.change_password(id, &hashed, unix_now()).await?;
        info!("password of {} reset", id);
        Ok(())
    }

    /// Requires a token from a password login, the current password, and a different new one
    pub async fn change_password(&self, actor: &AuthUser, request: ChangePasswordRequest) -> ServiceResult<()> {
        if !actor.fresh {
            return Err(ServiceError::Forbidden(
                "Fresh login required to change password".to_string(),
            ));
        }
        let mut errors = FieldErrors::new();
        validate_password(&request.new_password, "new_password", &mut errors);
        if request.new_password == request.old_password {
            errors.insert(
                "new_password".to_string(),
                "New password must differ from the old one".to_string(),
            );
        }
        check_fields(errors)?;

        let user = self.users.get(&actor.identity).await?;
        if !verify_password(&request.old_password, &user.hashed_password) {
            return Err(field_error("old_password", "Incorrect password"));
        }

        let hashed = hash_password(&request.new_password)?;
        self.users.change_password(&user.id, &hashed, unix_now()).await?;
        info!("{} changed their password", user.id);
        Ok(())
    }

    pub async fn get(&self, id: &str) -> ServiceResult<UserView> {
        Ok(self.users.get(id).await?.into())
    }

    pub async fn find(&self, mut filter: UserFilter) -> ServiceResult<Vec<UserView>> {
        filter.limit = self.limits.apply(filter.limit);
        let users = self.users.find(&filter).await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    /// Creates the admin account when it is missing; true when one was created
    pub async fn bootstrap_admin(&self, username: &str, password: &str, branch: &str) -> ServiceResult<bool> {
        match self.users.get(username).await {
            Ok(_) => return Ok(false),
            Err(DatabaseError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        self.register(RegisterInput {
            id: username.to_string(),
            name: username.to_string(),
            email: String::new(),
            roles: vec![Role::Admin.as_str().to_string()],
            branch: branch.to_string(),
            password: password.to_string(),
        })
        .await?;
        Ok(true)
    }
}
