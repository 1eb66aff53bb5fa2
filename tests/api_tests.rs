//! End-to-end tests against the full router with in-memory stores.
//!
//! These cover:
//! 1. Registration and login (duplicate names, wrong passwords)
//! 2. The token -> permission chain in front of every protected route
//! 3. Stats staying coherent with record writes

use axum::{
    body::Body,
    extract::FromRef,
    http::{Request, StatusCode},
    Router,
};
use fittrack::{
    app::build_app,
    auth::{
        jwt::JwtKeys,
        permissions::{Permission, PermissionSet},
    },
    middleware::TOKEN_HEADER,
    state::AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    app: Router,
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        let state = AppState::fake();
        Self {
            app: build_app(state.clone()),
            state,
        }
    }

    /// Registers `username` directly in the store and returns a token.
    async fn user_with(&self, username: &str, perms: &[Permission]) -> String {
        self.state
            .credentials
            .register(username, "password1", PermissionSet::new(perms.iter().copied()))
            .await
            .unwrap();
        JwtKeys::from_ref(&self.state).issue(username).unwrap()
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(TOKEN_HEADER, t);
        }
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn total_duration(&self, token: &str) -> i64 {
        let (status, body) = self.send("GET", "/stats", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        body["total_workout_duration"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn health_is_public() {
    let t = TestApp::new();
    let response = t
        .app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_then_login_flow() {
    let t = TestApp::new();
    let creds = json!({"username": "user1", "password": "password1"});

    let (status, body) = t.send("POST", "/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "user1");

    let (status, body) = t
        .send(
            "POST",
            "/register",
            None,
            Some(json!({"username": "user1", "password": "another-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("already exists"));

    let (status, body) = t
        .send(
            "POST",
            "/login",
            None,
            Some(json!({"username": "user1", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("token").is_none());

    // The losing registration must not have replaced the password.
    let (status, body) = t.send("POST", "/login", None, Some(creds)).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(JwtKeys::from_ref(&t.state).verify(&token).unwrap(), "user1");

    let (status, body) = t.send("GET", "/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"user": "user1"}));
}

#[tokio::test]
async fn login_for_unknown_user_is_unauthorized() {
    let t = TestApp::new();
    let (status, body) = t
        .send(
            "POST",
            "/login",
            None,
            Some(json!({"username": "ghost", "password": "password1"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Could not verify");
}

#[tokio::test]
async fn registration_validates_input() {
    let t = TestApp::new();
    let (status, _) = t
        .send(
            "POST",
            "/register",
            None,
            Some(json!({"username": "x", "password": "password1"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .send(
            "POST",
            "/register",
            None,
            Some(json!({"username": "valid_name", "password": "short"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .send("POST", "/register", None, Some(json!({"username": "valid_name"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fresh_registration_is_default_deny() {
    let t = TestApp::new();
    t.send(
        "POST",
        "/register",
        None,
        Some(json!({"username": "newbie", "password": "password1"})),
    )
    .await;
    let (_, body) = t
        .send(
            "POST",
            "/login",
            None,
            Some(json!({"username": "newbie", "password": "password1"})),
        )
        .await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = t.send("GET", "/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t.send("GET", "/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Permission denied");

    let (status, _) = t
        .send(
            "POST",
            "/workouts",
            Some(&token),
            Some(json!({"activity_type": "run", "duration_minutes": 30})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let t = TestApp::new();
    t.user_with("editor", &[Permission::View, Permission::Edit]).await;

    let (status, body) = t.send("GET", "/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "A valid token is missing");

    let (status, body) = t
        .send(
            "POST",
            "/workouts",
            Some("eyJhbGciOiJIUzI1NiJ9.e30.invalid"),
            Some(json!({"activity_type": "run", "duration_minutes": 30})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid");

    assert!(t.state.records.query_by_identity("editor").await.unwrap().is_empty());
}

#[tokio::test]
async fn viewer_cannot_mutate() {
    let t = TestApp::new();
    let token = t.user_with("viewer", &[Permission::View]).await;

    let (status, body) = t
        .send(
            "POST",
            "/workouts",
            Some(&token),
            Some(json!({"activity_type": "run", "duration_minutes": 30})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Permission denied");
    assert!(t.state.records.query_by_identity("viewer").await.unwrap().is_empty());

    let (status, _) = t.send("GET", "/workouts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn stats_reflect_each_new_workout() {
    let t = TestApp::new();
    let token = t.user_with("athlete", &[Permission::View, Permission::Edit]).await;

    let (status, body) = t
        .send(
            "POST",
            "/workouts",
            Some(&token),
            Some(json!({"activity_type": "run", "duration_minutes": 30})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["record"]["measure"], 30);
    assert_eq!(t.total_duration(&token).await, 30);

    t.send(
        "POST",
        "/workouts",
        Some(&token),
        Some(json!({"activity_type": "swim", "duration_minutes": 15})),
    )
    .await;
    assert_eq!(t.total_duration(&token).await, 45);

    let (status, _) = t
        .send(
            "POST",
            "/diet",
            Some(&token),
            Some(json!({"meal_type": "lunch", "description": "rice bowl", "calories": 650})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, stats) = t.send("GET", "/stats", Some(&token), None).await;
    assert_eq!(
        stats,
        json!({
            "total_workout_duration": 45,
            "total_calories_consumed": 650,
            "workout_count": 2,
            "diet_count": 1
        })
    );
}

#[tokio::test]
async fn update_and_delete_keep_stats_fresh() {
    let t = TestApp::new();
    let token = t.user_with("athlete", &[Permission::View, Permission::Edit]).await;
    let other = t.user_with("rival", &[Permission::View, Permission::Edit]).await;

    let (_, body) = t
        .send(
            "POST",
            "/workouts",
            Some(&token),
            Some(json!({"activity_type": "run", "duration_minutes": 30})),
        )
        .await;
    let id = body["record"]["id"].as_str().unwrap().to_string();
    assert_eq!(t.total_duration(&token).await, 30);

    let (status, body) = t
        .send(
            "PUT",
            &format!("/records/{id}"),
            Some(&token),
            Some(json!({"duration_minutes": 50})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["measure"], 50);
    assert_eq!(t.total_duration(&token).await, 50);

    let (status, _) = t
        .send("PUT", &format!("/records/{id}"), Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .send("DELETE", &format!("/records/{id}"), Some(&other), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(t.total_duration(&token).await, 50);

    let (status, _) = t
        .send("DELETE", &format!("/records/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(t.total_duration(&token).await, 0);
}

#[tokio::test]
async fn range_queries_bypass_the_cache() {
    let t = TestApp::new();
    let token = t.user_with("athlete", &[Permission::View, Permission::Edit]).await;

    for (date, minutes) in [("2024-01-05", 10), ("2024-01-20", 20), ("2024-02-10", 40)] {
        let (status, _) = t
            .send(
                "POST",
                "/workouts",
                Some(&token),
                Some(json!({"activity_type": "row", "duration_minutes": minutes, "date": date})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    assert_eq!(t.total_duration(&token).await, 70);

    let (status, body) = t
        .send("GET", "/stats?start=2024-01-01&end=2024-01-31", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_workout_duration"], 30);

    let (status, body) = t
        .send("GET", "/workouts?start=2024-02-01&end=2024-02-28", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // The windowed read must not have replaced the cached full total.
    assert_eq!(t.total_duration(&token).await, 70);

    let (status, _) = t
        .send("GET", "/stats?start=2024-02-01", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .send("GET", "/stats?start=2024-03-01&end=2024-02-01", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let t = TestApp::new();
    let token = t.user_with("athlete", &[Permission::View, Permission::Edit]).await;

    let (status, _) = t
        .send("POST", "/workouts", Some(&token), Some(json!({"activity_type": "run"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .send(
            "POST",
            "/diet",
            Some(&token),
            Some(json!({"meal_type": "lunch", "description": "soup", "calories": -10})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(t.state.records.query_by_identity("athlete").await.unwrap().is_empty());
}

#[tokio::test]
async fn updates_reject_fields_of_the_other_kind() {
    let t = TestApp::new();
    let token = t.user_with("athlete", &[Permission::View, Permission::Edit]).await;

    let (_, body) = t
        .send(
            "POST",
            "/workouts",
            Some(&token),
            Some(json!({"activity_type": "run", "duration_minutes": 30})),
        )
        .await;
    let workout = body["record"]["id"].as_str().unwrap().to_string();
    let (_, body) = t
        .send(
            "POST",
            "/diet",
            Some(&token),
            Some(json!({"meal_type": "lunch", "description": "soup", "calories": 400})),
        )
        .await;
    let meal = body["record"]["id"].as_str().unwrap().to_string();
    assert_eq!(t.total_duration(&token).await, 30);

    for patch in [json!({"calories": 900}), json!({"description": "not a meal"}), json!({"meal_type": "dinner"})] {
        let (status, body) = t
            .send("PUT", &format!("/records/{workout}"), Some(&token), Some(patch))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("workout"));
    }
    for patch in [json!({"duration_minutes": 90}), json!({"intensity": "high"})] {
        let (status, _) = t
            .send("PUT", &format!("/records/{meal}"), Some(&token), Some(patch))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    assert_eq!(t.total_duration(&token).await, 30);

    let (status, body) = t
        .send("PUT", &format!("/records/{meal}"), Some(&token), Some(json!({"calories": 550})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "diet");
    assert_eq!(body["measure"], 550);
    assert_eq!(t.total_duration(&token).await, 30);
}

#[tokio::test]
async fn malformed_record_ids_get_json_errors() {
    let t = TestApp::new();
    let token = t.user_with("athlete", &[Permission::View, Permission::Edit]).await;

    let (status, body) = t
        .send("DELETE", "/records/not-a-uuid", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = t
        .send("PUT", "/records/not-a-uuid", Some(&token), Some(json!({"duration_minutes": 5})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}
