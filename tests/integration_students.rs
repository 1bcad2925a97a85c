mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{
    ADMIN, CSRF_TOKEN, GUEST, MANAGER, body_json, flash_messages, flash_notices, location,
    set_cookie_value, setup_test_app,
};
use sms::service::StudentService;
use sms::view::NoticeKind;

const NEW_STUDENT: &str =
    "name=Ned+Flanders&email=ned@mail.com&course=Theology&age=60&grade=70";

#[tokio::test]
async fn test_list_students_ordered_by_name() {
    let app = setup_test_app().await;

    let response = app.get("/student", GUEST).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["view"], "student/index");
    let names: Vec<&str> = body["model"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Bart Simpson", "Homer Simpson", "Lisa Simpson", "Marge Simpson"]
    );
    assert!(body["notices"].as_array().unwrap().is_empty());
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_list_students_requires_token() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .uri("/student")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing authorization header");
}

#[tokio::test]
async fn test_token_cookie_is_accepted() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .uri("/student")
        .header(header::COOKIE, format!("sms_token={}", app.token(GUEST)))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_student_details_include_tickets_and_modules() {
    let app = setup_test_app().await;

    let response = app.get("/student/details/1", GUEST).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["view"], "student/details");
    assert_eq!(body["model"]["name"], "Homer Simpson");
    assert_eq!(body["model"]["tickets"].as_array().unwrap().len(), 2);
    let modules = body["model"]["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0]["module_title"], "Programming");
    assert_eq!(modules[0]["mark"], 60);
}

#[tokio::test]
async fn test_missing_student_redirects_with_warning() {
    let app = setup_test_app().await;

    for uri in [
        "/student/details/999",
        "/student/edit/999",
        "/student/delete/999",
        "/student/createticket/999",
    ] {
        let response = app.get(uri, ADMIN).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/student", "{}", uri);

        let notices = flash_notices(&response);
        assert_eq!(notices.len(), 1, "{}", uri);
        assert_eq!(notices[0].kind, NoticeKind::Warning);
        assert_eq!(notices[0].message, "Student 999 not found");
    }
}

#[tokio::test]
async fn test_create_student_as_admin() {
    let app = setup_test_app().await;

    let response = app.post_form("/student/create", ADMIN, NEW_STUDENT).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student/details/5");
    let notices = flash_notices(&response);
    assert_eq!(notices[0].kind, NoticeKind::Success);
    assert_eq!(notices[0].message, "Student created successfully");

    let student = app.service.get_student(5).await.unwrap().unwrap();
    assert_eq!(student.name, "Ned Flanders");
    assert_eq!(student.course, "Theology");
    assert_eq!(student.age, 60);
}

#[tokio::test]
async fn test_create_student_as_manager_forbidden() {
    let app = setup_test_app().await;

    let response = app.post_form("/student/create", MANAGER, NEW_STUDENT).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Access denied. Required roles: admin");
    assert_eq!(app.service.get_students().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_create_student_duplicate_email_redisplays_form() {
    let app = setup_test_app().await;

    let response = app
        .post_form(
            "/student/create",
            ADMIN,
            "name=Homer+Two&email=HOMER@mail.com&course=Physics&age=41&grade=50",
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["view"], "student/create");
    assert_eq!(body["model"]["name"], "Homer Two");
    assert_eq!(
        body["errors"]["email"][0],
        "The email address is already in use"
    );
    assert_eq!(app.service.get_students().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_create_student_validation_errors() {
    let app = setup_test_app().await;

    let response = app
        .post_form(
            "/student/create",
            ADMIN,
            "name=+++&email=not-an-email&course=Art&age=&grade=150",
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    let errors = body["errors"].as_object().unwrap();
    for field in ["name", "email", "age", "grade"] {
        assert!(errors.contains_key(field), "missing error for {}", field);
    }
    assert!(!errors.contains_key("course"));
    assert_eq!(errors["age"][0], "Age is required");
}

#[tokio::test]
async fn test_create_student_with_non_numeric_age() {
    let app = setup_test_app().await;

    let response = app
        .post_form(
            "/student/create",
            ADMIN,
            "name=Ned+Flanders&email=ned@mail.com&course=Theology&age=sixty&grade=70",
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["view"], "student/create");
    assert_eq!(body["errors"]["age"], serde_json::json!(["Age must be a number"]));
    assert_eq!(body["model"]["age"], "sixty");
    assert_eq!(body["model"]["grade"], 70);
    assert_eq!(body["model"]["name"], "Ned Flanders");
    assert_eq!(app.service.get_students().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let app = setup_test_app().await;

    let response = app.get("/student/edit/2", MANAGER).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["view"], "student/edit");
    assert_eq!(body["model"]["id"], 2);
    assert_eq!(body["model"]["email"], "marge@mail.com");
    assert_eq!(body["model"]["grade"], 69);
}

#[tokio::test]
async fn test_edit_student_keeping_own_email() {
    let app = setup_test_app().await;

    let response = app
        .post_form(
            "/student/edit/1",
            MANAGER,
            "name=Homer+Simpson&email=homer@mail.com&course=Nuclear+Safety&age=40&grade=61",
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student/details/1");
    assert_eq!(flash_messages(&response), vec!["Student updated successfully"]);

    let student = app.service.get_student(1).await.unwrap().unwrap();
    assert_eq!(student.course, "Nuclear Safety");
    assert_eq!(student.grade, 61);
}

#[tokio::test]
async fn test_edit_student_with_taken_email() {
    let app = setup_test_app().await;

    let response = app
        .post_form(
            "/student/edit/1",
            MANAGER,
            "name=Homer+Simpson&email=marge@mail.com&course=Physics&age=40&grade=56",
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["view"], "student/edit");
    assert_eq!(body["model"]["id"], 1);
    assert_eq!(body["errors"]["email"][0], "This email is already registered");

    let student = app.service.get_student(1).await.unwrap().unwrap();
    assert_eq!(student.email, "homer@mail.com");
}

#[tokio::test]
async fn test_edit_student_that_no_longer_exists() {
    let app = setup_test_app().await;

    let response = app
        .post_form(
            "/student/edit/999",
            MANAGER,
            "name=Moe+Szyslak&email=moe@mail.com&course=Brewing&age=45&grade=50",
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student");
    let notices = flash_notices(&response);
    assert_eq!(notices[0].kind, NoticeKind::Warning);
    assert_eq!(notices[0].message, "Student 999 not found");
    assert_eq!(app.service.get_students().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_edit_student_as_guest_forbidden() {
    let app = setup_test_app().await;

    let response = app.get("/student/edit/1", GUEST).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_student_flow() {
    let app = setup_test_app().await;

    let response = app.get("/student/delete/3", ADMIN).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["view"], "student/delete");
    assert_eq!(body["model"]["name"], "Bart Simpson");

    let response = app.post_form("/student/deleteconfirm/3", ADMIN, "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student");
    assert_eq!(flash_messages(&response), vec!["Student deleted successfully"]);

    assert!(app.service.get_student(3).await.unwrap().is_none());
    let tickets = app.service.get_all_tickets().await.unwrap();
    assert!(tickets.iter().all(|t| t.student_id != 3));
}

#[tokio::test]
async fn test_delete_student_twice_is_a_no_op() {
    let app = setup_test_app().await;

    for uri in [
        "/student/deleteconfirm/3",
        "/student/deleteconfirm/3",
        "/student/deleteconfirm/999",
    ] {
        let response = app.post_form(uri, ADMIN, "").await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/student");
        assert_eq!(flash_messages(&response), vec!["Student deleted successfully"]);
    }

    let names: Vec<String> = app
        .service
        .get_students()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Homer Simpson", "Lisa Simpson", "Marge Simpson"]);
}

#[tokio::test]
async fn test_delete_student_as_manager_forbidden() {
    let app = setup_test_app().await;

    let response = app.post_form("/student/deleteconfirm/3", MANAGER, "").await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.service.get_student(3).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_student_requires_post() {
    let app = setup_test_app().await;

    let response = app.get("/student/deleteconfirm/3", ADMIN).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_create_ticket_for_student() {
    let app = setup_test_app().await;

    let response = app.get("/student/createticket/3", GUEST).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["view"], "student/createticket");
    assert_eq!(body["model"]["student_id"], 3);

    let response = app
        .post_form("/student/createticket/3", GUEST, "issue=Cannot+log+in")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student/details/3");
    assert_eq!(
        flash_messages(&response),
        vec!["Ticket created successfully for student 3"]
    );

    let tickets = app.service.get_all_tickets().await.unwrap();
    let ticket = tickets.iter().find(|t| t.issue == "Cannot log in").unwrap();
    assert_eq!(ticket.id, 9);
    assert_eq!(ticket.student_id, 3);
    assert!(ticket.active);
    assert!(ticket.resolution.is_none());
}

#[tokio::test]
async fn test_create_ticket_requires_issue() {
    let app = setup_test_app().await;

    let response = app
        .post_form("/student/createticket/3", GUEST, "issue=+++")
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["model"]["student_id"], 3);
    assert!(body["errors"]["issue"].is_array());
    assert_eq!(app.service.get_all_tickets().await.unwrap().len(), 8);
}

#[tokio::test]
async fn test_create_ticket_for_missing_student() {
    let app = setup_test_app().await;

    let response = app
        .post_form("/student/createticket/999", GUEST, "issue=Cannot+log+in")
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student");
    assert_eq!(flash_messages(&response), vec!["Student 999 not found"]);
    assert_eq!(app.service.get_all_tickets().await.unwrap().len(), 8);
}

#[tokio::test]
async fn test_delete_ticket_flow() {
    let app = setup_test_app().await;

    let response = app.get("/student/ticketdelete/6", GUEST).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["view"], "student/ticketdelete");
    assert_eq!(body["model"]["issue"], "Lost ID card");
    assert_eq!(body["model"]["student_id"], 3);

    let response = app
        .post_form("/student/ticketdeleteconfirm/6", GUEST, "student_id=3")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student/details/3");
    assert_eq!(
        flash_messages(&response),
        vec!["Ticket deleted successfully for student 3"]
    );
    assert!(app.service.get_ticket(6).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_ticket_with_non_numeric_student_keeps_ticket() {
    let app = setup_test_app().await;

    let response = app
        .post_form("/student/ticketdeleteconfirm/6", GUEST, "student_id=bart")
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student");
    let notices = flash_notices(&response);
    assert_eq!(notices[0].kind, NoticeKind::Warning);
    assert_eq!(notices[0].message, "Ticket 6 could not be deleted");
    assert!(app.service.get_ticket(6).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_missing_ticket_redirects() {
    let app = setup_test_app().await;

    let response = app.get("/student/ticketdelete/99", GUEST).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student");
    assert_eq!(flash_messages(&response), vec!["Ticket 99 not found"]);
}

#[tokio::test]
async fn test_flash_notice_survives_one_redirect() {
    let app = setup_test_app().await;

    let response = app.post_form("/student/create", ADMIN, NEW_STUDENT).await;
    let flash = set_cookie_value(&response, "sms_notices").unwrap();

    let request = Request::builder()
        .uri("/student/details/5")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token(ADMIN)))
        .header(header::COOKIE, format!("sms_notices={}", flash))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Rendering consumes the flash cookie
    assert_eq!(set_cookie_value(&response, "sms_notices").as_deref(), Some(""));

    let body = body_json(response).await;
    assert_eq!(body["notices"][0]["kind"], "success");
    assert_eq!(body["notices"][0]["message"], "Student created successfully");
}

#[tokio::test]
async fn test_page_carries_issued_csrf_token() {
    let app = setup_test_app().await;

    let response = app.get("/student/create", ADMIN).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie_value(&response, "sms_csrf").unwrap();
    assert_eq!(cookie.len(), 64);

    let body = body_json(response).await;
    assert_eq!(body["csrf_token"], cookie.as_str());
}

#[tokio::test]
async fn test_page_reuses_existing_csrf_token() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .uri("/student")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token(GUEST)))
        .header(header::COOKIE, format!("sms_csrf={}", CSRF_TOKEN))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert!(set_cookie_value(&response, "sms_csrf").is_none());
    let body = body_json(response).await;
    assert_eq!(body["csrf_token"], CSRF_TOKEN);
}

#[tokio::test]
async fn test_post_without_csrf_token_rejected() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/student/create")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token(ADMIN)))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(NEW_STUDENT))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing anti-forgery token");
    assert_eq!(app.service.get_students().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_post_with_mismatched_csrf_token_rejected() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/student/create")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token(ADMIN)))
        .header(header::COOKIE, format!("sms_csrf={}", CSRF_TOKEN))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("{}&csrf_token=forged", NEW_STUDENT)))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid anti-forgery token");
}

#[tokio::test]
async fn test_post_with_csrf_header_accepted() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/student/create")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token(ADMIN)))
        .header(header::COOKIE, format!("sms_csrf={}", CSRF_TOKEN))
        .header("x-csrf-token", CSRF_TOKEN)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(NEW_STUDENT))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student/details/5");
}
