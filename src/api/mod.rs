// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{gateway, AuthenticatedUser, Role},
    models::{
        AuthResponse, ContactMessage, LoginRequest, MemberStatus, MessageListResponse,
        NavigationItem, NavigationResponse, RegisterRequest, SendMessageRequest, UpdateUserRequest,
        UserListResponse, UserView,
    },
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod health;
pub mod messages;
pub mod navigation;
pub mod pages;
pub mod users;

/// Build the application router.
///
/// Every route, including the fallback, runs behind the gateway.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/health/live", get(health::liveness))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(users::get_current_user))
        .route("/api/messages", post(messages::send_message))
        .route("/api/navigation", get(navigation::navigation))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/messages", get(admin::list_messages))
        .route("/api/admin/users/{id}", patch(admin::update_user))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .fallback(pages::fallback)
        .layer(from_fn_with_state(state.gateway.clone(), gateway))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        auth::register,
        auth::login,
        auth::logout,
        users::get_current_user,
        messages::send_message,
        navigation::navigation,
        admin::list_users,
        admin::list_messages,
        admin::update_user
    ),
    components(
        schemas(
            AuthResponse,
            AuthenticatedUser,
            ContactMessage,
            LoginRequest,
            MemberStatus,
            MessageListResponse,
            NavigationItem,
            NavigationResponse,
            RegisterRequest,
            Role,
            SendMessageRequest,
            UpdateUserRequest,
            UserListResponse,
            UserView
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and session"),
        (name = "Admin", description = "Member administration"),
        (name = "Messages", description = "Contact messages"),
        (name = "Navigation", description = "Role-filtered navigation"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{GatewayConfig, TokenService},
        config::Environment,
        rate_limit::RateLimiter,
        store::InMemoryStore,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{CONTENT_TYPE, LOCATION, SET_COOKIE},
            Request, StatusCode,
        },
        response::Response,
    };
    use serde_json::{json, Value};
    use std::{sync::Arc, time::Duration};
    use tower::ServiceExt;

    const ADMIN_EMAIL: &str = "admin@example.org";
    const ADMIN_PASSWORD: &str = "admin-password";

    fn test_state() -> AppState {
        let tokens = TokenService::new("router-test-secret", Environment::Development).unwrap();
        let mut store = InMemoryStore::new();
        auth::seed_admin(&mut store, ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();
        AppState::new(store, GatewayConfig::new(Arc::new(tokens), "token"))
            .with_login_limiter(RateLimiter::in_memory(3, Duration::from_secs(60)))
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register(app: &Router, email: &str, role: &str) -> (String, String) {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                None,
                json!({"name": "Member", "email": email, "password": "member-password", "role": role}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    async fn login(app: &Router, email: &str, password: &str) -> Response {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                None,
                json!({"email": email, "password": password}),
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_state());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn registration_sets_seven_day_cookie_and_pending_status() {
        let app = router(test_state());
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                None,
                json!({"name": "Sara", "email": "sara@example.org", "password": "sara-password"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));

        let body = body_json(response).await;
        assert_eq!(body["user"]["role"], "trainee");
        assert_eq!(body["user"]["status"], "pending");
    }

    #[tokio::test]
    async fn registration_refuses_admin_role() {
        let app = router(test_state());
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                None,
                json!({"name": "Eve", "email": "eve@example.org", "password": "eve-password", "role": "admin"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_issues_one_day_cookie_unless_remembered() {
        let app = router(test_state());

        let response = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.contains("Max-Age=86400"));

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                None,
                json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD, "rememberMe": true}),
            ))
            .await
            .unwrap();
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.contains("Max-Age=2592000"));
    }

    #[tokio::test]
    async fn wrong_password_is_401_and_rate_limited() {
        let app = router(test_state());
        for _ in 0..3 {
            let response = login(&app, ADMIN_EMAIL, "wrong-password").await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body = body_json(response).await;
            assert_eq!(body["error"], "Invalid email or password");
        }
        let response = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn me_requires_token_and_returns_member() {
        let app = router(test_state());

        let response = app.clone().oneshot(get_request("/api/auth/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let (token, id) = register(&app, "noor@example.org", "trainer").await;
        let response = app
            .clone()
            .oneshot(get_request("/api/auth/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], id.as_str());
        assert_eq!(body["role"], "trainer");
    }

    #[tokio::test]
    async fn me_accepts_cookie_token() {
        let app = router(test_state());
        let (token, _) = register(&app, "cookie@example.org", "trainee").await;

        let request = Request::builder()
            .uri("/api/auth/me")
            .header("cookie", format!("token={token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn forged_identity_headers_do_not_authenticate() {
        let app = router(test_state());
        let request = Request::builder()
            .uri("/api/admin/users")
            .header("x-user-id", "1")
            .header("x-user-role", "admin")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Authentication required"})
        );
    }

    #[tokio::test]
    async fn admin_lists_members_non_admin_is_forbidden() {
        let app = router(test_state());
        let (member_token, _) = register(&app, "m1@example.org", "trainee").await;

        let response = app
            .clone()
            .oneshot(get_request("/api/admin/users", Some(&member_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = body_json(login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await).await;
        let admin_token = admin["token"].as_str().unwrap();
        let response = app
            .oneshot(get_request("/api/admin/users", Some(admin_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["total"], 2);
    }

    #[tokio::test]
    async fn member_updates_own_profile_only() {
        let app = router(test_state());
        let (token, id) = register(&app, "self@example.org", "trainer").await;
        let (_, other_id) = register(&app, "other@example.org", "trainee").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/admin/users/{id}"),
                Some(&token),
                json!({"name": "Renamed"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "Renamed");

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/admin/users/{other_id}"),
                Some(&token),
                json!({"name": "Hijacked"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(json_request(
                "PATCH",
                &format!("/api/admin/users/{id}"),
                Some(&token),
                json!({"role": "admin"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn member_password_change_is_validated() {
        let app = router(test_state());
        let (token, id) = register(&app, "rotate@example.org", "trainee").await;
        let uri = format!("/api/admin/users/{id}");

        let response = app
            .clone()
            .oneshot(json_request("PATCH", &uri, Some(&token), json!({"password": "a"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            login(&app, "rotate@example.org", "member-password").await.status(),
            StatusCode::OK
        );

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &uri,
                Some(&token),
                json!({"password": "rotated-password"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(
            login(&app, "rotate@example.org", "member-password").await.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            login(&app, "rotate@example.org", "rotated-password").await.status(),
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn unknown_email_login_is_401() {
        let app = router(test_state());
        let response = login(&app, "nobody@example.org", "member-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn admin_approves_pending_member() {
        let app = router(test_state());
        let (_, id) = register(&app, "pending@example.org", "trainee").await;
        let admin = body_json(login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await).await;

        let response = app
            .oneshot(json_request(
                "PATCH",
                &format!("/api/admin/users/{id}"),
                admin["token"].as_str(),
                json!({"status": "approved"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "approved");
    }

    #[tokio::test]
    async fn messages_require_authentication() {
        let app = router(test_state());
        let payload = json!({"subject": "Hello", "body": "Question about courses"});

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/messages", None, payload.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let (token, id) = register(&app, "writer@example.org", "trainee").await;
        let response = app
            .oneshot(json_request("POST", "/api/messages", Some(&token), payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["senderId"], id.as_str());
    }

    #[tokio::test]
    async fn admin_reads_contact_messages() {
        let app = router(test_state());
        let (token, _) = register(&app, "asker@example.org", "trainer").await;
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/messages",
                Some(&token),
                json!({"subject": "Schedule", "body": "When does the next cohort start?"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(get_request("/api/admin/messages", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = body_json(login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await).await;
        let response = app
            .oneshot(get_request("/api/admin/messages", admin["token"].as_str()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["messages"][0]["subject"], "Schedule");
        assert_eq!(body["messages"][0]["senderEmail"], "asker@example.org");
    }

    #[tokio::test]
    async fn navigation_filters_by_role() {
        let app = router(test_state());

        let response = app
            .clone()
            .oneshot(get_request("/api/navigation?locale=ar", None))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["locale"], "ar");
        let hrefs: Vec<&str> = body["links"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["href"].as_str().unwrap())
            .collect();
        assert!(hrefs.contains(&"/ar/news"));
        assert!(!hrefs.contains(&"/ar/admin"));

        let admin = body_json(login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await).await;
        let response = app
            .oneshot(get_request("/api/navigation", admin["token"].as_str()))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert!(body["links"]
            .as_array()
            .unwrap()
            .iter()
            .any(|l| l["href"] == "/en/admin"));
    }

    #[tokio::test]
    async fn pages_are_localized_and_admin_pages_guarded() {
        let app = router(test_state());

        let response = app.clone().oneshot(get_request("/about", None)).await.unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[LOCATION], "/en/about");

        let response = app.clone().oneshot(get_request("/ar/about", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.clone().oneshot(get_request("/ar/admin", None)).await.unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[LOCATION], "/ar/login");

        let response = app.oneshot(get_request("/api/unknown", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let app = router(test_state());
        let response = app
            .oneshot(json_request("POST", "/api/auth/logout", None, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn health_is_not_localized() {
        let app = router(test_state());
        let response = app
            .clone()
            .oneshot(get_request("/api/health/live", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get_request("/api/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert!(body["checks"].get("members").is_none());
    }
}
