mod common;

use common::{bearer, spawn, TestServer, SERVICE_KEY};
use serde_json::Value;

async fn create_case(server: &TestServer, auth: &str, number: &str, priority: &str) -> Value {
    let body = format!(
        r#"{{"case_number":"{number}","title":"Harbor theft {number}","priority":"{priority}","location":"Pier 4"}}"#
    );
    let res = server
        .send("POST", "/rest/v1/cases", &[("Authorization", auth)], Some(&body))
        .await;
    assert_eq!(res.status, 201, "{}", res.body);
    res.json()
}

#[tokio::test]
async fn health_and_auth_gate() {
    let server = spawn(None).await;

    let res = server.send("GET", "/healthz", &[], None).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, "ok");

    let res = server.send("GET", "/rest/v1/cases", &[], None).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.json()["error"], "missing bearer token");

    let res = server
        .send("GET", "/rest/v1/cases", &[("Authorization", "Bearer nope")], None)
        .await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn sign_in_and_out() {
    let server = spawn(None).await;

    let bad = r#"{"email":"admin@example.com","password":"wrong-password"}"#;
    let res = server.send("POST", "/auth/v1/token", &[], Some(bad)).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.json()["error"], "invalid email or password");

    let auth = bearer(&server.token_for("detective@example.com").await);
    let res = server
        .send("GET", "/auth/v1/user", &[("Authorization", auth.as_str())], None)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["email"], "detective@example.com");
    assert!(res.json().get("password_hash").is_none());

    let res = server
        .send("POST", "/auth/v1/logout", &[("Authorization", auth.as_str())], None)
        .await;
    assert_eq!(res.status, 204);

    let res = server
        .send("GET", "/auth/v1/user", &[("Authorization", auth.as_str())], None)
        .await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn case_lifecycle_with_records_and_report() {
    let server = spawn(None).await;
    let auth = bearer(&server.token_for("detective@example.com").await);
    let headers = [("Authorization", auth.as_str())];

    let case = create_case(&server, &auth, "CASE-100", "high").await;
    let case_id = case["id"].as_str().unwrap().to_string();
    assert_eq!(case["status"], "open");

    let victim = format!(r#"{{"case_id":"{case_id}","first_name":"Ada","last_name":"Moss","age":41}}"#);
    let res = server
        .send("POST", "/rest/v1/victims", &headers, Some(&victim))
        .await;
    assert_eq!(res.status, 201, "{}", res.body);
    let victim_id = res.json()["id"].as_str().unwrap().to_string();

    let evidence = format!(
        r#"{{"case_id":"{case_id}","name":"Crowbar","evidence_type":"physical"}}"#
    );
    let res = server
        .send("POST", "/rest/v1/evidence", &headers, Some(&evidence))
        .await;
    assert_eq!(res.status, 201, "{}", res.body);

    let res = server
        .send(
            "GET",
            &format!("/rest/v1/victims?case_id={case_id}"),
            &headers,
            None,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json().as_array().unwrap().len(), 1);

    let res = server
        .send(
            "PATCH",
            &format!("/rest/v1/cases/{case_id}"),
            &headers,
            Some(r#"{"status":"in_progress"}"#),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.body);
    assert_eq!(res.json()["status"], "in_progress");

    let res = server
        .send(
            "GET",
            &format!("/rest/v1/cases/{case_id}/report"),
            &headers,
            None,
        )
        .await;
    assert_eq!(res.status, 200);
    assert!(res
        .header("content-type")
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(
        res.header("content-disposition").as_deref(),
        Some("attachment; filename=\"case-report-CASE-100.txt\"")
    );
    assert!(res.body.contains("CASE REPORT"));
    assert!(res.body.contains("Ada Moss"));
    assert!(res.body.contains("Crowbar"));

    let res = server
        .send(
            "DELETE",
            &format!("/rest/v1/victims/{victim_id}"),
            &headers,
            None,
        )
        .await;
    assert_eq!(res.status, 204);
    let res = server
        .send(
            "GET",
            &format!("/rest/v1/victims/{victim_id}"),
            &headers,
            None,
        )
        .await;
    assert_eq!(res.status, 404);

    let res = server
        .send("DELETE", &format!("/rest/v1/cases/{case_id}"), &headers, None)
        .await;
    assert_eq!(res.status, 204);
    let res = server
        .send("GET", "/rest/v1/evidence", &headers, None)
        .await;
    assert_eq!(res.json().as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn rejects_bad_writes() {
    let server = spawn(None).await;
    let auth = bearer(&server.token_for("detective@example.com").await);
    let headers = [("Authorization", auth.as_str())];

    create_case(&server, &auth, "CASE-200", "low").await;
    let res = server
        .send(
            "POST",
            "/rest/v1/cases",
            &headers,
            Some(r#"{"case_number":"CASE-200","title":"Again"}"#),
        )
        .await;
    assert_eq!(res.status, 409);

    let res = server
        .send("POST", "/rest/v1/cases", &headers, Some("{not json"))
        .await;
    assert_eq!(res.status, 400);

    let res = server
        .send(
            "POST",
            "/rest/v1/suspects",
            &headers,
            Some(r#"{"case_id":"missing-case","first_name":"Vic"}"#),
        )
        .await;
    assert_eq!(res.status, 404);

    let res = server
        .send("GET", "/rest/v1/cases/missing-case", &headers, None)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn viewers_read_but_do_not_write() {
    let server = spawn(None).await;
    let writer = bearer(&server.token_for("detective@example.com").await);
    let viewer = bearer(&server.token_for("viewer@example.com").await);
    let case = create_case(&server, &writer, "CASE-300", "medium").await;

    let res = server
        .send("GET", "/rest/v1/cases", &[("Authorization", viewer.as_str())], None)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json().as_array().unwrap().len(), 1);

    let res = server
        .send(
            "DELETE",
            &format!("/rest/v1/cases/{}", case["id"].as_str().unwrap()),
            &[("Authorization", viewer.as_str())],
            None,
        )
        .await;
    assert_eq!(res.status, 403);
    assert_eq!(res.json()["error"], "viewers cannot modify records");
}

#[tokio::test]
async fn role_checks_run_before_body_parsing() {
    let server = spawn(None).await;
    let viewer = bearer(&server.token_for("viewer@example.com").await);
    let detective = bearer(&server.token_for("detective@example.com").await);

    for path in ["/rest/v1/cases", "/rest/v1/victims", "/rest/v1/reports"] {
        let res = server
            .send("POST", path, &[("Authorization", viewer.as_str())], Some("{not json"))
            .await;
        assert_eq!(res.status, 403, "{path}");
        assert_eq!(res.json()["error"], "viewers cannot modify records");
    }

    let res = server
        .send(
            "PATCH",
            "/rest/v1/users/anyone",
            &[("Authorization", detective.as_str())],
            Some("{not json"),
        )
        .await;
    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn deleting_a_case_drops_its_saved_reports() {
    let server = spawn(None).await;
    let auth = bearer(&server.token_for("detective@example.com").await);
    let headers = [("Authorization", auth.as_str())];
    let case = create_case(&server, &auth, "CASE-600", "low").await;
    let case_id = case["id"].as_str().unwrap();

    let body = format!(r#"{{"case_id":"{case_id}","title":"Canvass notes"}}"#);
    let res = server
        .send("POST", "/rest/v1/reports", &headers, Some(&body))
        .await;
    assert_eq!(res.status, 201, "{}", res.body);

    let res = server
        .send("DELETE", &format!("/rest/v1/cases/{case_id}"), &headers, None)
        .await;
    assert_eq!(res.status, 204);

    let res = server.send("GET", "/rest/v1/reports", &headers, None).await;
    assert_eq!(res.status, 200);
    assert!(res.json().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn case_list_filters() {
    let server = spawn(None).await;
    let auth = bearer(&server.token_for("admin@example.com").await);
    let headers = [("Authorization", auth.as_str())];

    create_case(&server, &auth, "CASE-401", "low").await;
    create_case(&server, &auth, "CASE-402", "critical").await;

    let res = server
        .send("GET", "/rest/v1/cases?priority=critical", &headers, None)
        .await;
    let cases = res.json();
    assert_eq!(cases.as_array().unwrap().len(), 1);
    assert_eq!(cases[0]["case_number"], "CASE-402");

    let res = server
        .send("GET", "/rest/v1/cases?q=case-401", &headers, None)
        .await;
    assert_eq!(res.json().as_array().unwrap().len(), 1);

    let res = server
        .send("GET", "/rest/v1/cases?status=bogus", &headers, None)
        .await;
    assert_eq!(res.status, 400);

    let res = server
        .send("GET", "/rest/v1/dashboard/stats", &headers, None)
        .await;
    assert_eq!(res.status, 200);
    let stats = res.json();
    assert_eq!(stats["cases"], 2);
    assert_eq!(stats["high_priority_cases"], 1);
    assert_eq!(stats["users"], 3);
    assert_eq!(stats["cards"][0]["title"], "Total Cases");
    assert_eq!(stats["recent_cases"][0]["case_number"], "CASE-402");
}

#[tokio::test]
async fn user_administration_is_admin_only() {
    let server = spawn(Some(SERVICE_KEY)).await;
    let admin = bearer(&server.token_for("admin@example.com").await);
    let detective = bearer(&server.token_for("detective@example.com").await);

    let res = server
        .send("GET", "/rest/v1/users", &[("Authorization", admin.as_str())], None)
        .await;
    let users = res.json();
    let viewer_id = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "viewer@example.com")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    let path = format!("/rest/v1/users/{viewer_id}");

    let res = server
        .send(
            "PATCH",
            &path,
            &[("Authorization", detective.as_str())],
            Some(r#"{"role":"admin"}"#),
        )
        .await;
    assert_eq!(res.status, 403);

    let res = server
        .send(
            "PATCH",
            &path,
            &[("Authorization", admin.as_str())],
            Some(r#"{"role":"investigator","is_active":false}"#),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.body);
    assert_eq!(res.json()["role"], "investigator");
    assert_eq!(res.json()["is_active"], false);

    let res = server
        .send("GET", "/rest/v1/audit_logs", &[("Authorization", detective.as_str())], None)
        .await;
    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn service_key_user_creation() {
    let server = spawn(Some(SERVICE_KEY)).await;
    let body = r#"{"email":"analyst@example.com","password":"s3cret-pw","role":"viewer"}"#;

    let res = server
        .send("POST", "/auth/v1/admin/users", &[("apikey", "wrong")], Some(body))
        .await;
    assert_eq!(res.status, 401);

    let res = server
        .send(
            "POST",
            "/auth/v1/admin/users",
            &[("apikey", SERVICE_KEY)],
            Some(body),
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.body);
    assert_eq!(res.json()["role"], "viewer");

    let res = server
        .send(
            "POST",
            "/auth/v1/admin/users",
            &[("apikey", SERVICE_KEY)],
            Some(body),
        )
        .await;
    assert_eq!(res.status, 409);
}

#[tokio::test]
async fn saved_reports_round_trip() {
    let server = spawn(None).await;
    let auth = bearer(&server.token_for("detective@example.com").await);
    let headers = [("Authorization", auth.as_str())];
    let case = create_case(&server, &auth, "CASE-500", "medium").await;
    let case_id = case["id"].as_str().unwrap();

    let body = format!(
        r#"{{"case_id":"{case_id}","title":"Initial findings","report_type":"initial","content":"Scene secured."}}"#
    );
    let res = server
        .send("POST", "/rest/v1/reports", &headers, Some(&body))
        .await;
    assert_eq!(res.status, 201, "{}", res.body);
    let report_id = res.json()["id"].as_str().unwrap().to_string();

    let res = server
        .send(
            "GET",
            &format!("/rest/v1/reports?case_id={case_id}"),
            &headers,
            None,
        )
        .await;
    assert_eq!(res.json().as_array().unwrap().len(), 1);

    let res = server
        .send(
            "DELETE",
            &format!("/rest/v1/reports/{report_id}"),
            &headers,
            None,
        )
        .await;
    assert_eq!(res.status, 204);

    let res = server
        .send(
            "DELETE",
            &format!("/rest/v1/reports/{report_id}"),
            &headers,
            None,
        )
        .await;
    assert_eq!(res.status, 404);
}
