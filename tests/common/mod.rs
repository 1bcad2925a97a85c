#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use sms::router::init_router;
use sms::service::{InMemoryStudentService, StudentService};
use sms::state::AppState;
use sms::view::{Notice, decode_notices};
use sms_auth::create_access_token;
use sms_config::{CookieConfig, CorsConfig, JwtConfig};
use sms_models::StudentData;
use tower::ServiceExt;

pub const CSRF_TOKEN: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

pub const ADMIN: &[&str] = &["admin"];
pub const MANAGER: &[&str] = &["manager"];
pub const GUEST: &[&str] = &["guest"];

fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
    }
}

fn student(name: &str, email: &str, course: &str, age: i32, grade: i32) -> StudentData {
    StudentData {
        name: name.to_string(),
        email: email.to_string(),
        course: course.to_string(),
        age,
        grade,
        photo_url: None,
    }
}

/// Seeds a fixed data set. Ids are assigned in insertion order:
///
/// students: 1 Homer, 2 Marge, 3 Bart, 4 Lisa
/// modules: 1 Programming, 2 Maths, 3 Physics Lab
/// enrollments: 1 Homer/Programming (60), 2 Lisa/Maths (90)
/// tickets: 1..=8, where 2, 4 and 8 are closed
async fn seed(service: &InMemoryStudentService) {
    for data in [
        student("Homer Simpson", "homer@mail.com", "Physics", 40, 56),
        student("Marge Simpson", "marge@mail.com", "English", 38, 69),
        student("Bart Simpson", "bart@mail.com", "Art", 16, 30),
        student("Lisa Simpson", "lisa@mail.com", "Poetry", 18, 95),
    ] {
        service.add_student(data).await.unwrap();
    }

    service.insert_module("CS101", "Programming").await;
    service.insert_module("MA101", "Maths").await;
    service.insert_module("PH101", "Physics Lab").await;

    service.add_student_to_module(1, 1, 60).await.unwrap();
    service.add_student_to_module(4, 2, 90).await.unwrap();

    let tickets = [
        (1, "Printer not working", true),
        (1, "Password reset", false),
        (2, "Timetable clash", true),
        (3, "Locker jammed", false),
        (4, "Library fine dispute", true),
        (3, "Lost ID card", true),
        (2, "Wi-Fi drops in the lab", true),
        (4, "Exam results missing", false),
    ];
    for (day, (student_id, issue, active)) in (1..).zip(tickets) {
        let created_on = Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap();
        service
            .insert_ticket(student_id, issue, created_on, active)
            .await;
    }
}

pub struct TestApp {
    pub app: Router,
    pub service: Arc<InMemoryStudentService>,
    jwt_config: JwtConfig,
}

pub async fn setup_test_app() -> TestApp {
    let service = Arc::new(InMemoryStudentService::new());
    seed(&service).await;

    let jwt_config = test_jwt_config();
    let state = AppState {
        service: service.clone() as Arc<dyn StudentService>,
        jwt_config: jwt_config.clone(),
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        cookie_config: CookieConfig::default(),
    };

    TestApp {
        app: init_router(state),
        service,
        jwt_config,
    }
}

impl TestApp {
    pub fn token(&self, roles: &[&str]) -> String {
        create_access_token(
            "42",
            "staff@sms.test",
            roles.iter().map(|r| r.to_string()).collect(),
            &self.jwt_config,
        )
        .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, roles: &[&str]) -> Response<Body> {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token(roles)))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Posts an urlencoded form carrying a valid anti-forgery token.
    pub async fn post_form(&self, uri: &str, roles: &[&str], form: &str) -> Response<Body> {
        let body = if form.is_empty() {
            format!("csrf_token={}", CSRF_TOKEN)
        } else {
            format!("{}&csrf_token={}", form, CSRF_TOKEN)
        };

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token(roles)))
            .header(header::COOKIE, format!("sms_csrf={}", CSRF_TOKEN))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Raw `Set-Cookie` value for `name`, without attributes.
pub fn set_cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| {
            let pair = v.split(';').next()?;
            let (key, value) = pair.split_once('=')?;
            (key.trim() == name).then(|| value.trim().to_string())
        })
}

/// Notices carried across a redirect in the flash cookie.
pub fn flash_notices(response: &Response<Body>) -> Vec<Notice> {
    set_cookie_value(response, "sms_notices")
        .map(|v| decode_notices(&v))
        .unwrap_or_default()
}

pub fn flash_messages(response: &Response<Body>) -> Vec<String> {
    flash_notices(response)
        .into_iter()
        .map(|n| n.message)
        .collect()
}
