use std::borrow::BorrowMut;

use axum::{response::Response, http::{Request, request::Builder}, body::Body};
use http_body::{combinators::UnsyncBoxBody, Body as _};
use sea_orm::{prelude::Uuid, IntoActiveModel, ActiveModelTrait, DatabaseConnection};
use tabbycat_entities::{mock::{self, MockOption, MockTournament}, prelude::*};
use tabbycat_server::{auth::{create_key, create_user}, state::AppState};
use tower::Service;
use base64::{engine::general_purpose, Engine as _};


pub struct FixtureOptions {
    pub mock_default_tournament: bool,
    pub draw_status: DrawStatus,
    pub use_regular_user: bool,
    pub max_upload_size: Option<usize>,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        FixtureOptions {
            mock_default_tournament: true,
            draw_status: DrawStatus::Confirmed,
            use_regular_user: false,
            max_upload_size: None,
        }
    }
}

pub struct Fixture {
    pub app: axum::Router,
    pub auth: Auth,
    pub db: DatabaseConnection,
    pub mock: Option<MockTournament>,
    pub cookie: Option<String>,
}

#[derive(Clone)]
pub enum Auth {
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer {
        token: String,
    },
}

pub struct APIResponse {
    response: Response<UnsyncBoxBody<axum::body::Bytes, axum::Error>>,
}

impl APIResponse {
    pub fn status(&self) -> axum::http::StatusCode {
        self.response.status()
    }

    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<String> {
        self.response.headers().get(name).map(|v| v.to_str().unwrap().to_string())
    }

    #[allow(dead_code)]
    pub async fn bytes(&mut self) -> Vec<u8> {
        let mut buf = Vec::new();

        let body = self.response.body_mut();

        while let Some(next) = body.data().await {
            buf.extend_from_slice(&next.unwrap());
        }
        buf
    }

    #[allow(dead_code)]
    pub async fn json<T: serde::de::DeserializeOwned>(&mut self) -> T {
        let buf = self.bytes().await;
        serde_json::from_slice(&buf).unwrap()
    }

    #[allow(dead_code)]
    pub async fn text(&mut self) -> String {
        String::from_utf8(self.bytes().await).unwrap()
    }
}

impl From<Response<UnsyncBoxBody<axum::body::Bytes, axum::Error>>> for APIResponse {
    fn from(response: Response<UnsyncBoxBody<hyper::body::Bytes, axum::Error>>) -> Self {
        Self {
            response,
        }
    }
}

pub const SUPERUSER_NAME: &str = "admin";
pub const REGULAR_USER_NAME: &str = "volunteer";
pub const PASSWORD: &str = "testtest";

impl Fixture {
    pub async fn new(options: FixtureOptions) -> Self {
        let mut state = AppState::new_test_app().await;
        if let Some(max_upload_size) = options.max_upload_size {
            state.max_upload_size = max_upload_size;
        }

        let mock = if options.mock_default_tournament {
            Some(mock::make_mock_tournament_with_options(&state.db, MockOption {
                draw_status: options.draw_status,
                ..Default::default()
            }).await.unwrap())
        }
        else {
            None
        };

        let superuser_id = create_user(&state.db, SUPERUSER_NAME, PASSWORD, true).await.unwrap();
        create_user(&state.db, REGULAR_USER_NAME, PASSWORD, false).await.unwrap();

        let raw_key = [0, 0, 0, 0];
        let key = create_key(&raw_key, superuser_id, None).unwrap();
        key.into_active_model().insert(&state.db).await.unwrap();

        let auth = if options.use_regular_user {
            Auth::Basic { username: REGULAR_USER_NAME.into(), password: PASSWORD.into() }
        }
        else {
            Auth::Bearer { token: general_purpose::STANDARD_NO_PAD.encode(raw_key) }
        };

        let db = state.db.clone();
        Self {
            app: tabbycat_server::app_with_state(state).await,
            auth,
            db,
            mock,
            cookie: None,
        }
    }

    #[allow(dead_code)]
    pub async fn default() -> Self {
        Self::new(FixtureOptions::default()).await
    }

    #[allow(dead_code)]
    pub fn with_auth(self, auth: Auth) -> Self {
        Self {
            auth,
            ..self
        }
    }

    #[allow(dead_code)]
    pub fn tournament_id(&self) -> Uuid {
        Uuid::from_u128(1)
    }

    fn get_base_request(&self) -> Builder {
        let builder = Request::builder();

        let builder = match &self.auth {
            Auth::None => builder,
            Auth::Basic { username, password } => {
                builder.header(
                    "Authorization",
                    format!("Basic {}", general_purpose::STANDARD.encode(format!("{}:{}", username, password)))
                )
            },
            Auth::Bearer { token } => {
                builder.header(
                    "Authorization",
                    format!("Bearer {}", token)
                )
            }
        };

        match &self.cookie {
            Some(cookie) => builder.header("Cookie", cookie.as_str()),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> APIResponse {
        self.app.borrow_mut()
            .call(request)
            .await
            .unwrap().into()
    }

    #[allow(dead_code)]
    pub async fn get(&mut self, path: &str) -> APIResponse {
        let request = self.get_base_request()
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    #[allow(dead_code)]
    pub async fn get_with_headers(&mut self, path: &str, headers: &[(&str, &str)]) -> APIResponse {
        let mut builder = self.get_base_request().uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::empty()).unwrap();
        self.send(request).await
    }

    #[allow(dead_code)]
    pub async fn post_json_no_body(&mut self, path: &str) -> APIResponse
    {
        let request = self.get_base_request()
            .method("POST")
            .header("Content-Type", "application/json")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    #[allow(dead_code)]
    pub async fn post_json<T>(&mut self, path: &str, body: T) -> APIResponse where T: serde::Serialize
    {
        self.send_json("POST", path, body).await
    }

    #[allow(dead_code)]
    pub async fn patch_json<T>(&mut self, path: &str, body: T) -> APIResponse where T: serde::Serialize
    {
        self.send_json("PATCH", path, body).await
    }

    async fn send_json<T>(&mut self, method: &str, path: &str, body: T) -> APIResponse where T: serde::Serialize
    {
        let request = self.get_base_request()
            .method(method)
            .header("Content-Type", "application/json")
            .uri(path)
            .body(
                Body::from(
                    serde_json::to_string(&body).unwrap()
                )
            )
            .unwrap();
        self.send(request).await
    }

    #[allow(dead_code)]
    pub async fn post_form(&mut self, path: &str, form: &[(&str, &str)]) -> APIResponse
    {
        let request = self.get_base_request()
            .method("POST")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .uri(path)
            .body(Body::from(serde_urlencoded::to_string(form).unwrap()))
            .unwrap();
        self.send(request).await
    }

    #[allow(dead_code)]
    pub async fn delete(&mut self, path: &str) -> APIResponse {
        let request = self.get_base_request()
            .method("DELETE")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }
}
