use super::*;
use crate::resolver::{LOGIN_PATHS, LoginCandidate, PARAM_SCHEMES, ParamScheme};

#[tokio::test]
async fn missing_credentials_makes_no_network_call() {
    let (client, transport) = create_test_client(anonymous_config());

    let result = client.login().await;

    assert!(!result.ok);
    assert_eq!(result.reason.as_deref(), Some("missing_credentials"));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn empty_password_counts_as_missing() {
    let mut config = test_config();
    config.server.password = Some(String::new());
    let (client, transport) = create_test_client(config);

    let result = client.login().await;

    assert_eq!(result.reason.as_deref(), Some("missing_credentials"));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn first_candidate_success_stops_iteration() {
    let (client, transport) = create_test_client(test_config());
    transport.respond(LOGIN_PATH, 200, r#"{ "error": 0, "sid": "abc123" }"#);

    let result = client.login().await;

    assert!(result.ok);
    assert_eq!(result.session.unwrap().session_id, "abc123");
    assert_eq!(
        result.endpoint,
        Some(LoginCandidate::new(LOGIN_PATH, ParamScheme::UserPass))
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "http://10.0.0.5:8080/downloadstation/V4/Misc/Login");
    assert_eq!(requests[0].param_value("user"), Some("u"));
    // "p" Base64-encoded
    assert_eq!(requests[0].param_value("pass"), Some("cA=="));
}

#[tokio::test]
async fn not_found_paths_are_skipped_in_table_order() {
    let (client, transport) = create_test_client(test_config());
    transport.respond("/downloadstation/V3/Login", 200, r#"{"error":0,"sid":"v3sid"}"#);

    let result = client.login().await;

    assert!(result.ok);
    assert_eq!(result.session.unwrap().session_id, "v3sid");

    let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
    // Four schemes on each of the three 404 paths, then the first scheme on V3/Login
    assert_eq!(urls.len(), 13);
    assert!(urls[..4].iter().all(|u| u.ends_with("/V4/Misc/Login")));
    assert!(urls[4..8].iter().all(|u| u.ends_with("/V4/Login")));
    assert!(urls[8..12].iter().all(|u| u.ends_with("/V3/Misc/Login")));
    assert!(urls[12].ends_with("/V3/Login"));
}

#[tokio::test]
async fn repeated_runs_probe_in_the_same_order() {
    let (client, transport) = create_test_client(test_config());

    client.login().await;
    let first: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
    client.login().await;
    let all: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();

    assert_eq!(&all[..first.len()], &first[..]);
    assert_eq!(&all[first.len()..], &first[..]);
}

#[tokio::test]
async fn parameter_schemes_follow_table_order() {
    let (client, transport) = create_test_client(test_config());
    // Reject the first three schemes with a non-session error
    transport.respond_once(LOGIN_PATH, 200, r#"{"error": 2}"#);
    transport.respond_once(LOGIN_PATH, 200, r#"{"error": 2}"#);
    transport.respond_once(LOGIN_PATH, 200, r#"{"error": 2}"#);
    transport.respond_once(LOGIN_PATH, 200, r#"{"error": 0, "sid": "s4"}"#);

    let result = client.login().await;
    assert!(result.ok);

    let requests = transport.requests_to(LOGIN_PATH);
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[1].param_value("username"), Some("u"));
    assert_eq!(requests[1].param_value("password"), Some("p"));
    assert_eq!(requests[2].param_value("user"), Some("u"));
    assert_eq!(requests[2].param_value("password"), Some("p"));
    assert_eq!(requests[3].param_value("username"), Some("u"));
    assert_eq!(requests[3].param_value("pass"), Some("cA=="));
    assert_eq!(
        result.endpoint.unwrap().scheme,
        PARAM_SCHEMES[3],
        "endpoint hint should record the winning scheme"
    );
}

#[tokio::test]
async fn session_error_stops_without_fallback() {
    let (client, transport) = create_test_client(test_config());
    transport.respond(LOGIN_PATH, 200, r#"{ "error": 5, "reason": "session error" }"#);
    transport.respond(AUTH_LOGIN_PATH, 200, "<authSid>never</authSid>");

    let result = client.login().await;

    assert!(!result.ok);
    assert_eq!(result.error_code, Some(5));
    assert_eq!(result.reason.as_deref(), Some("session error"));
    assert_eq!(transport.requests().len(), 1);
    assert!(transport.requests_to(AUTH_LOGIN_PATH).is_empty());
}

#[tokio::test]
async fn sid_less_success_and_garbage_bodies_advance() {
    let (client, transport) = create_test_client(test_config());
    transport.respond_once(LOGIN_PATH, 200, r#"{"error": 0}"#);
    transport.respond_once(LOGIN_PATH, 500, "<html>oops</html>");
    transport.fail_once(LOGIN_PATH, "connection reset");
    transport.respond_once(LOGIN_PATH, 200, "<QDocRoot><sid>xml1</sid></QDocRoot>");

    let result = client.login().await;

    assert!(result.ok);
    assert_eq!(result.session.unwrap().session_id, "xml1");
    assert_eq!(transport.requests().len(), 4);
}

#[tokio::test]
async fn token_is_carried_into_session() {
    let (client, transport) = create_test_client(test_config());
    transport.respond(LOGIN_PATH, 200, r#"{"error":0,"sid":"s","token":"t"}"#);

    let session = client.login().await.session.unwrap();
    assert_eq!(session.token.as_deref(), Some("t"));
}

#[tokio::test]
async fn exhaustion_falls_back_to_administration_login() {
    let (client, transport) = create_test_client(test_config());
    transport.respond(
        AUTH_LOGIN_PATH,
        200,
        "<QDocRoot><authPassed>1</authPassed><authSid>qts99</authSid></QDocRoot>",
    );

    let result = client.login().await;

    assert!(result.ok);
    assert_eq!(result.session.unwrap().session_id, "qts99");
    assert!(result.endpoint.is_none());

    let requests = transport.requests();
    assert_eq!(requests.len(), LOGIN_PATHS.len() * PARAM_SCHEMES.len() + 1);
    let fallback = requests.last().unwrap();
    assert_eq!(fallback.method, crate::transport::Method::Post);
    assert_eq!(fallback.param_value("user"), Some("u"));
    assert_eq!(fallback.param_value("pwd"), Some("p"));
}

#[tokio::test]
async fn administration_post_failure_retries_as_get() {
    let (client, transport) = create_test_client(test_config());
    transport.fail_once(AUTH_LOGIN_PATH, "connection reset");
    transport.respond(AUTH_LOGIN_PATH, 200, "<authSid>viaget</authSid>");

    let result = client.login().await;

    assert!(result.ok);
    let calls = transport.requests_to(AUTH_LOGIN_PATH);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].method, crate::transport::Method::Post);
    assert_eq!(calls[1].method, crate::transport::Method::Get);
    assert_eq!(calls[1].param_value("pwd"), Some("p"));
}

#[tokio::test]
async fn administration_success_without_sid_reports_session_missing() {
    let (client, transport) = create_test_client(test_config());
    transport.respond(AUTH_LOGIN_PATH, 200, "<QDocRoot><authPassed>0</authPassed></QDocRoot>");

    let result = client.login().await;

    assert!(!result.ok);
    assert!(result.is_session_missing());
}

#[tokio::test]
async fn total_exhaustion_reports_last_diagnostic() {
    let (client, transport) = create_test_client(test_config());
    transport.respond(
        "/downloadstation/login.cgi",
        200,
        r#"{"error": 3, "reason": "bad parameter"}"#,
    );

    let result = client.login().await;

    assert!(!result.ok);
    assert_eq!(result.error_code, Some(3));
    assert_eq!(result.reason.as_deref(), Some("bad parameter"));
}

#[tokio::test]
async fn unreachable_admin_login_reports_its_own_diagnostic() {
    let (client, transport) = create_test_client(test_config());
    transport.respond(
        "/downloadstation/login.cgi",
        200,
        r#"{"error": 3, "reason": "bad parameter"}"#,
    );
    transport.fail(AUTH_LOGIN_PATH, "connection refused");

    let result = client.login().await;

    assert!(!result.ok);
    assert_eq!(result.error_code, None);
    assert_eq!(
        result.reason.as_deref(),
        Some("network error: connection refused")
    );
}

#[tokio::test]
async fn rejected_admin_login_drops_earlier_error_code() {
    let (client, transport) = create_test_client(test_config());
    transport.respond(
        "/downloadstation/login.cgi",
        200,
        r#"{"error": 3, "reason": "bad parameter"}"#,
    );
    transport.respond(AUTH_LOGIN_PATH, 500, "");

    let result = client.login().await;

    assert!(!result.ok);
    assert_eq!(result.error_code, None);
    assert_eq!(
        result.reason.as_deref(),
        Some("administration login rejected (HTTP 500)")
    );
}

#[tokio::test]
async fn everything_missing_is_endpoint_not_found() {
    let (client, _transport) = create_test_client(test_config());

    let result = client.login().await;

    assert!(!result.ok);
    assert!(matches!(result.into_result(), Err(Error::EndpointNotFound)));
}

#[tokio::test]
async fn logout_posts_sid_and_swallows_failures() {
    let (client, transport) = create_test_client(test_config());
    transport.fail("/downloadstation/V4/Misc/Logout", "connection refused");

    client.logout(&crate::types::Session::new("abc")).await;

    let calls = transport.requests_to("/downloadstation/V4/Misc/Logout");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].param_value("sid"), Some("abc"));
}
