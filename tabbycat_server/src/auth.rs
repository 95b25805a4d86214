use argon2::Argon2;
use axum::{
    routing::post,
    Router, extract::State, Json, headers::authorization::Bearer,
};
use base64::Engine;
use rand::{thread_rng, Rng};
use sea_orm::{prelude::*, DatabaseConnection, IntoActiveModel};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use axum::TypedHeader;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::headers::Authorization;
use axum::headers::authorization::Basic;
use axum::http::StatusCode;
use axum::http::request::Parts;

use tabbycat_entities::schema::{self, user_access_key};
use tabbycat_entities::prelude::Tournament;

use crate::{response::{APIError, handle_error}, state::AppState};

use password_hash::{PasswordHash, PasswordVerifier, PasswordHasher, SaltString};

const ACCESS_KEY_SALT: &str = "bXlzYWx0bXlzYWx0";


#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub uuid: Uuid,
    pub username: String,
    pub is_superuser: bool,
    pub authorized_only_for_tournament: Option<Uuid>
}

impl AuthenticatedUser {
    /// Tournament scoped tokens may only administer their own tournament.
    pub fn check_can_administer(&self, tournament_id: Uuid) -> Result<(), APIError> {
        if !self.is_superuser {
            return Err(APIError::new_with_status(StatusCode::FORBIDDEN, "Superuser access required"));
        }
        match self.authorized_only_for_tournament {
            Some(scope) if scope != tournament_id => Err(APIError::new_with_status(StatusCode::FORBIDDEN, "Token is not valid for this tournament")),
            _ => Ok(())
        }
    }
}


pub struct ExtractAuthenticatedUser(pub AuthenticatedUser);

async fn load_user(db: &DatabaseConnection, user_id: Uuid, authorized_only_for_tournament: Option<Uuid>) -> Result<AuthenticatedUser, APIError> {
    let user = schema::user::Entity::find_by_id(user_id).one(db).await.map_err(handle_error)?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found"))?;
    Ok(AuthenticatedUser {
        uuid: user.uuid,
        username: user.username,
        is_superuser: user.is_superuser,
        authorized_only_for_tournament
    })
}

#[async_trait]
impl FromRequestParts<AppState> for ExtractAuthenticatedUser
{
    type Rejection = APIError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let basic_header = TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
            .await;

        if let Ok(basic_header) = basic_header {
            let decoded = basic_header.0;
            let user_name = decoded.username();
            let password = decoded.password();

            let user = schema::user::Entity::find()
                .filter(schema::user::Column::Username.eq(user_name))
                .one(&state.db).await.map_err(handle_error)?;

            let user = user.ok_or((StatusCode::UNAUTHORIZED, "User not found or password incorrect"))?;

            let password_hash = PasswordHash::new(&user.password_hash).map_err(|_| (StatusCode::UNAUTHORIZED, "User not found or password incorrect"))?;
            let algs: &[&dyn PasswordVerifier] = &[&Argon2::default()];

            password_hash.verify_password(algs, password).map_err(|_| (StatusCode::UNAUTHORIZED, "User not found or password incorrect"))?;

            Ok(ExtractAuthenticatedUser(AuthenticatedUser {
                uuid: user.uuid,
                username: user.username,
                is_superuser: user.is_superuser,
                authorized_only_for_tournament: None
            }))
        }
        else {
            let TypedHeader(bearer_header) = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await.map_err(|_| {
                (StatusCode::UNAUTHORIZED, "No valid authorization header found")
            })?;
            let key = base64::engine::general_purpose::STANDARD_NO_PAD.decode(bearer_header.0.token())
                .map_err(|_| (StatusCode::UNAUTHORIZED, "Bearer token invalid"))?;
            let hashed_key = hash_key(&key).map_err(|_| (StatusCode::UNAUTHORIZED, "No valid authorization header found"))?;

            let key = schema::user_access_key::Entity::find_by_id(hashed_key).one(&state.db).await.map_err(handle_error)?;

            let key = key.ok_or((StatusCode::UNAUTHORIZED, "Bearer token invalid"))?;

            Ok(ExtractAuthenticatedUser(load_user(&state.db, key.user_id, key.tournament_id).await?))
        }
    }
}

/// Rejects with 401 without valid credentials and with 403 if the user is not a superuser.
pub struct RequireSuperuser(pub AuthenticatedUser);

#[async_trait]
impl FromRequestParts<AppState> for RequireSuperuser
{
    type Rejection = APIError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ExtractAuthenticatedUser(user) = ExtractAuthenticatedUser::from_request_parts(parts, state).await?;
        if !user.is_superuser {
            return Err(APIError::new_with_status(StatusCode::FORBIDDEN, "Superuser access required"));
        }
        Ok(RequireSuperuser(user))
    }
}


#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_superuser: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub uuid: Uuid
}


#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GetTokenRequest {
    pub tournament: Option<Uuid>
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GetTokenResponse {
    pub token: String
}

pub fn hash_password(pwd: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let pwd = Argon2::default().hash_password(
        pwd.as_bytes(),
        &salt
    )?;

    Ok(pwd.to_string())
}

fn hash_key(key: &[u8]) -> Result<String, password_hash::Error> {
    let salt = SaltString::from_b64(ACCESS_KEY_SALT)?;
    Ok(Argon2::default().hash_password(key, &salt)?.to_string())
}

#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("User {0} already exists")]
    AlreadyExists(String),
    #[error("Could not hash password: {0}")]
    Hash(password_hash::Error),
    #[error(transparent)]
    DbErr(#[from] DbErr),
}

impl From<CreateUserError> for APIError {
    fn from(err: CreateUserError) -> Self {
        match err {
            CreateUserError::AlreadyExists(_) => APIError::bad_request("A user with this name already exists"),
            CreateUserError::Hash(e) => handle_error(e),
            CreateUserError::DbErr(e) => handle_error(e),
        }
    }
}

pub async fn create_user<C>(db: &C, username: &str, password: &str, is_superuser: bool) -> Result<Uuid, CreateUserError> where C: ConnectionTrait {
    let existing = schema::user::Entity::find()
        .filter(schema::user::Column::Username.eq(username))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(CreateUserError::AlreadyExists(username.to_string()));
    }

    let new_user_uuid = Uuid::new_v4();
    let model = schema::user::Model {
        uuid: new_user_uuid,
        username: username.to_string(),
        password_hash: hash_password(password).map_err(CreateUserError::Hash)?,
        is_superuser,
    };
    model.into_active_model().insert(db).await?;
    Ok(new_user_uuid)
}

pub async fn create_user_handler(
    State(db): State<DatabaseConnection>,
    RequireSuperuser(user): RequireSuperuser,
    Json(request): Json<CreateUserRequest>
) -> Result<Json<CreateUserResponse>, APIError> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(APIError::bad_request("Username and password are required"));
    }
    let uuid = create_user(&db, &request.username, &request.password, request.is_superuser).await?;
    tracing::info!("User {} created user {}", user.username, request.username);

    Ok(CreateUserResponse {
        uuid
    }.into())
}


pub fn create_key(key: &[u8], user_id: Uuid, tournament_id: Option<Uuid>) -> Result<user_access_key::Model, password_hash::Error> {
    Ok(schema::user_access_key::Model {
        key_hash: hash_key(key)?,
        user_id,
        tournament_id
    })
}

pub async fn create_token_handler(State(db): State<DatabaseConnection>, ExtractAuthenticatedUser(user): ExtractAuthenticatedUser, Json(request): Json<GetTokenRequest>) -> Result<Json<GetTokenResponse>, APIError> {
    if user.authorized_only_for_tournament.is_some() {
        return Err((StatusCode::UNAUTHORIZED, "Tournament specific tokens can't be used to create new keys").into())
    }

    if let Some(tournament_id) = request.tournament {
        if Tournament::get(&db, tournament_id).await?.is_none() {
            return Err(APIError::not_found("Tournament not found"));
        }
    }

    let key: [u8; 32] = thread_rng().gen::<[u8; 32]>();

    let token = create_key(&key, user.uuid, request.tournament).map_err(handle_error)?;
    token.into_active_model().insert(&db).await.map_err(handle_error)?;

    Ok(
        GetTokenResponse {
            token: base64::engine::general_purpose::STANDARD_NO_PAD.encode(key)
        }.into()
    )
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user_handler))
        .route("/tokens", post(create_token_handler))
}
