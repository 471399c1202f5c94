mod common;

use common::{bearer, spawn, SERVICE_KEY};

const PATH: &str = "/functions/v1/admin-create-user";
const VALID_BODY: &str =
    r#"{"email":"new.hire@example.com","password":"s3cret-pw","first_name":"New","last_name":"Hire"}"#;

#[tokio::test]
async fn rejects_missing_and_invalid_tokens() {
    let server = spawn(Some(SERVICE_KEY)).await;

    let res = server.send("POST", PATH, &[], Some(VALID_BODY)).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.json()["error"], "missing authorization header");

    let res = server
        .send("POST", PATH, &[("Authorization", "Basic abc")], Some(VALID_BODY))
        .await;
    assert_eq!(res.status, 401);

    let res = server
        .send(
            "POST",
            PATH,
            &[("Authorization", "Bearer not-a-real-token")],
            Some(VALID_BODY),
        )
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.json()["error"], "invalid or expired token");
}

#[tokio::test]
async fn rejects_non_admin_callers() {
    let server = spawn(Some(SERVICE_KEY)).await;

    for email in ["detective@example.com", "viewer@example.com"] {
        let auth = bearer(&server.token_for(email).await);
        let res = server
            .send("POST", PATH, &[("Authorization", auth.as_str())], Some(VALID_BODY))
            .await;
        assert_eq!(res.status, 403, "{email}");
        assert_eq!(res.json()["error"], "only admins can create users");
    }
}

#[tokio::test]
async fn rejects_incomplete_bodies() {
    let server = spawn(Some(SERVICE_KEY)).await;
    let auth = bearer(&server.token_for("admin@example.com").await);

    for body in [
        "not json",
        r#"{"password":"s3cret-pw"}"#,
        r#"{"email":"x@example.com"}"#,
        r#"{"email":"  ","password":"s3cret-pw"}"#,
    ] {
        let res = server
            .send("POST", PATH, &[("Authorization", auth.as_str())], Some(body))
            .await;
        assert_eq!(res.status, 400, "{body}");
        assert!(res.json()["error"].is_string());
    }
}

#[tokio::test]
async fn creates_investigator_for_admin() {
    let server = spawn(Some(SERVICE_KEY)).await;
    let auth = bearer(&server.token_for("admin@example.com").await);

    let res = server
        .send("POST", PATH, &[("Authorization", auth.as_str())], Some(VALID_BODY))
        .await;
    assert_eq!(res.status, 200, "{}", res.body);
    let user_id = res.json()["user_id"].as_str().unwrap().to_string();

    let res = server
        .send("GET", "/rest/v1/users", &[("Authorization", auth.as_str())], None)
        .await;
    let users = res.json();
    let created = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["id"] == user_id.as_str())
        .expect("created user listed");
    assert_eq!(created["email"], "new.hire@example.com");
    assert_eq!(created["role"], "investigator");

    // The new account can sign in.
    server.token_for("new.hire@example.com").await;

    let res = server
        .send("GET", "/rest/v1/audit_logs", &[("Authorization", auth.as_str())], None)
        .await;
    let logs = res.json();
    assert!(logs
        .as_array()
        .unwrap()
        .iter()
        .any(|log| log["action"] == "user.created" && log["entity_id"] == user_id.as_str()));
}

#[tokio::test]
async fn passes_backend_failures_through() {
    let server = spawn(Some(SERVICE_KEY)).await;
    let auth = bearer(&server.token_for("admin@example.com").await);

    let duplicate = r#"{"email":"viewer@example.com","password":"s3cret-pw"}"#;
    let res = server
        .send("POST", PATH, &[("Authorization", auth.as_str())], Some(duplicate))
        .await;
    assert_eq!(res.status, 400);
    assert!(res.json()["error"]
        .as_str()
        .unwrap()
        .contains("already been registered"));

    let short = r#"{"email":"short@example.com","password":"abc"}"#;
    let res = server
        .send("POST", PATH, &[("Authorization", auth.as_str())], Some(short))
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn unconfigured_backend_is_a_server_error() {
    let server = spawn(None).await;

    let res = server.send("POST", PATH, &[], Some(VALID_BODY)).await;
    assert_eq!(res.status, 500);
    assert_eq!(res.json()["error"], "user administration is not configured");
}

#[tokio::test]
async fn answers_preflight_with_cors_headers() {
    let server = spawn(Some(SERVICE_KEY)).await;

    let res = server
        .send(
            "OPTIONS",
            PATH,
            &[
                ("Origin", "http://localhost:5173"),
                ("Access-Control-Request-Method", "POST"),
            ],
            None,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.header("access-control-allow-origin").as_deref(), Some("*"));
    assert!(res
        .header("access-control-allow-headers")
        .unwrap()
        .contains("authorization"));
}
