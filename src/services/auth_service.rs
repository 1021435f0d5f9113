use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::{OsRng, RngCore};
use pbkdf2::pbkdf2_hmac;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{
    audit,
    config::JwtConfig,
    dto::auth::{
        AuthResponse, ChangePasswordRequest, Claims, LoginRequest, RegisterRequest,
        UpdateProfileRequest,
    },
    entity::users::{self, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Role, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const ITERATIONS: u32 = 10_000;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Hash a password as base64(salt || PBKDF2-HMAC-SHA256(password, salt)).
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(password, &salt);

    let mut stored = Vec::with_capacity(SALT_LEN + KEY_LEN);
    stored.extend_from_slice(&salt);
    stored.extend_from_slice(&key);
    STANDARD.encode(stored)
}

/// Re-derive with the stored salt and compare in constant time. Anything that
/// does not decode to salt plus key is a mismatch.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(bytes) = STANDARD.decode(stored) else {
        return false;
    };
    if bytes.len() != SALT_LEN + KEY_LEN {
        return false;
    }
    let (salt, expected) = bytes.split_at(SALT_LEN);
    let actual = derive_key(password, salt);
    actual.as_slice().ct_eq(expected).into()
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, ITERATIONS, &mut key);
    key
}

pub fn issue_token(jwt: &JwtConfig, user: &users::Model) -> AppResult<(String, DateTime<Utc>)> {
    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(Duration::minutes(jwt.expiry_minutes))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        name: user.full_name(),
        role: user.role.clone(),
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
        iss: jwt.issuer.clone(),
        aud: jwt.audience.clone(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok((token, expires_at))
}

pub fn decode_token(jwt: &JwtConfig, token: &str) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[jwt.issuer.as_str()]);
    validation.set_audience(&[jwt.audience.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn auth_response(jwt: &JwtConfig, user: users::Model) -> AppResult<AuthResponse> {
    let (token, expires_at) = issue_token(jwt, &user)?;
    Ok(AuthResponse {
        token,
        expires_at,
        user: User::from(user),
    })
}

async fn active_user(state: &AppState, user_id: Uuid) -> AppResult<users::Model> {
    Users::find_by_id(user_id)
        .filter(UserCol::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let email = normalize_email(&payload.email);
    let exists = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .is_some();
    if exists {
        // Generic on purpose: does not reveal that the email is taken.
        return Err(AppError::bad_request("Registration failed"));
    }

    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)),
        phone_number: Set(payload.phone_number),
        address: Set(None),
        city: Set(None),
        state: Set(None),
        zip_code: Set(None),
        country: Set(None),
        role: Set(Role::User.as_str().to_string()),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await;

    let data = auth_response(&state.jwt, user)?;
    Ok(ApiResponse::success("Registration successful", data, Some(Meta::empty())))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let email = normalize_email(&payload.email);
    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .filter(UserCol::IsActive.eq(true))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) if verify_password(&payload.password, &u.password_hash) => u,
        _ => {
            tracing::debug!("rejected login attempt");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
    };

    audit::record(
        &state.orm,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await;

    let data = auth_response(&state.jwt, user)?;
    Ok(ApiResponse::success("Login successful", data, Some(Meta::empty())))
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let model = active_user(state, user.user_id).await?;
    Ok(ApiResponse::success("Profile", User::from(model), Some(Meta::empty())))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let model = active_user(state, user.user_id).await?;

    let mut active: users::ActiveModel = model.into();
    active.first_name = Set(payload.first_name.trim().to_string());
    active.last_name = Set(payload.last_name.trim().to_string());
    active.phone_number = Set(payload.phone_number);
    active.address = Set(payload.address);
    active.city = Set(payload.city);
    active.state = Set(payload.state);
    active.zip_code = Set(payload.zip_code);
    active.country = Set(payload.country);
    active.updated_at = Set(Utc::now().into());
    let model = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "profile_update",
        Some("users"),
        None,
    )
    .await;

    Ok(ApiResponse::success("Profile updated", User::from(model), Some(Meta::empty())))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let model = active_user(state, user.user_id).await?;
    if !verify_password(&payload.current_password, &model.password_hash) {
        return Err(AppError::bad_request("Current password is incorrect"));
    }

    let mut active: users::ActiveModel = model.into();
    active.password_hash = Set(hash_password(&payload.new_password));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "password_change",
        Some("users"),
        None,
    )
    .await;

    Ok(ApiResponse::success(
        "Password changed successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn refresh_token(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AuthResponse>> {
    let model = active_user(state, user.user_id).await?;
    let data = auth_response(&state.jwt, model)?;
    Ok(ApiResponse::success("Token refreshed", data, Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-secret".into(),
            issuer: "home-store-api".into(),
            audience: "home-store-client".into(),
            expiry_minutes: 60,
        }
    }

    fn user() -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: String::new(),
            phone_number: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            role: "Admin".into(),
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn hash_round_trips_and_salts() {
        let first = hash_password("s3cret!");
        let second = hash_password("s3cret!");
        assert_ne!(first, second);
        assert_eq!(STANDARD.decode(&first).map(|b| b.len()).ok(), Some(48));
        assert!(verify_password("s3cret!", &first));
        assert!(verify_password("s3cret!", &second));
        assert!(!verify_password("wrong", &first));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not base64 at all!"));
        assert!(!verify_password("anything", &STANDARD.encode([0u8; 10])));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn single_flipped_key_byte_fails() {
        let stored = hash_password("s3cret!");
        let mut bytes = STANDARD.decode(&stored).expect("base64");
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(!verify_password("s3cret!", &STANDARD.encode(&bytes)));

        let mut salt_changed = STANDARD.decode(&stored).expect("base64");
        salt_changed[0] ^= 0x80;
        assert!(!verify_password("s3cret!", &STANDARD.encode(&salt_changed)));
    }

    #[test]
    fn token_carries_identity_claims() {
        let jwt = jwt();
        let user = user();
        let (token, expires_at) = issue_token(&jwt, &user).expect("token");
        assert!(expires_at > Utc::now());

        let claims = decode_token(&jwt, &token).expect("claims");
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.name, "Ada Lovelace");
        assert_eq!(claims.role, "Admin");
        assert_eq!(claims.iss, "home-store-api");
        assert_eq!(claims.aud, "home-store-client");
    }

    #[test]
    fn token_from_other_issuer_is_rejected() {
        let user = user();
        let other = JwtConfig {
            issuer: "someone-else".into(),
            ..jwt()
        };
        let (token, _) = issue_token(&other, &user).expect("token");
        assert!(matches!(
            decode_token(&jwt(), &token),
            Err(AppError::Unauthorized(_))
        ));

        let wrong_secret = JwtConfig {
            secret: "another-secret".into(),
            ..jwt()
        };
        let (token, _) = issue_token(&wrong_secret, &user).expect("token");
        assert!(decode_token(&jwt(), &token).is_err());
    }
}
