use judgekit_client::client::JudgeClient;
use judgekit_client::config::{self, Config, Credential};
use judgekit_client::encode::{Limits, Submission};
use judgekit_client::{Abort, CodeJudge, JudgeError};

use judgekit_protocol::common::{Problem, Provider};
use judgekit_protocol::external::sample_test_cases;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn judge_config(server: &MockServer, max_poll_attempts: u32) -> config::Judge {
    config::Judge {
        base_url: server.uri(),
        api_host: "judge0-ce.p.rapidapi.com".into(),
        api_key: Some(Credential::new("secret-key")),
        poll_interval: 1,
        max_poll_attempts,
        ..config::Judge::default()
    }
}

fn submission(source: &str, stdin: Option<&str>) -> Submission {
    Submission {
        source_code: source.as_bytes().to_vec(),
        language_id: 71,
        stdin: stdin.map(|s| s.as_bytes().to_vec()),
        limits: Limits {
            cpu_time_limit: 2.0,
            memory_limit: 128_000,
            wall_time_limit: Some(10.0),
        },
    }
}

fn status(id: u32, description: &str) -> serde_json::Value {
    json!({ "id": id, "description": description })
}

#[tokio::test]
async fn submit_sends_encoded_payload_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submissions"))
        .and(query_param("base64_encoded", "true"))
        .and(query_param("wait", "false"))
        .and(header("X-RapidAPI-Key", "secret-key"))
        .and(header("X-RapidAPI-Host", "judge0-ce.p.rapidapi.com"))
        .and(body_partial_json(json!({
            "source_code": base64::encode("print(input())"),
            "language_id": 71,
            "stdin": base64::encode("hello"),
            "cpu_time_limit": 2.0,
            "memory_limit": 128000,
            "wall_time_limit": 10.0,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "d85cd024" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = JudgeClient::new(&judge_config(&server, 3)).unwrap();
    let handle = client.submit(&submission("print(input())", Some("hello"))).await.unwrap();
    assert_eq!(handle.token(), "d85cd024");
}

#[tokio::test]
async fn poll_until_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submissions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "abc" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/submissions/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": status(1, "In Queue") })))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/submissions/abc"))
        .and(query_param("base64_encoded", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": status(3, "Accepted"),
            "stdout": "aGVsbG8K",
            "stderr": null,
            "compile_output": null,
            "message": null,
            "time": "0.021",
            "memory": 7440,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = JudgeClient::new(&judge_config(&server, 5)).unwrap();
    let result = client
        .execute(&submission("print('hello')", None), &Abort::none())
        .await
        .unwrap();

    assert_eq!(result.status_id, 3);
    assert_eq!(result.stdout.as_deref(), Some("hello\n"));
    assert_eq!(result.time_seconds, Some(0.021));
    assert_eq!(result.memory_kb, Some(7440));
}

#[tokio::test]
async fn never_terminal_times_out_after_exact_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submissions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "slow" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/submissions/slow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": status(2, "Processing") })))
        .expect(4)
        .mount(&server)
        .await;

    let client = JudgeClient::new(&judge_config(&server, 4)).unwrap();
    let err = client
        .execute(&submission("while True: pass", None), &Abort::none())
        .await
        .unwrap_err();

    assert!(matches!(err, JudgeError::Timeout { attempts: 4 }));
}

#[tokio::test]
async fn http_errors_carry_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submissions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid API key"))
        .expect(1)
        .mount(&server)
        .await;

    let client = JudgeClient::new(&judge_config(&server, 3)).unwrap();
    let err = client.submit(&submission("print(1)", None)).await.unwrap_err();
    match err {
        JudgeError::Http { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid API key");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    let server = MockServer::start().await;
    let mut config = judge_config(&server, 3);
    config.api_key = None;

    let err = JudgeClient::new(&config).err().unwrap();
    assert!(matches!(err, JudgeError::Configuration(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn custom_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/languages"))
        .and(header("X-Auth-Token", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 71, "name": "Python (3.8.1)" },
            { "id": 54, "name": "C++ (GCC 9.2.0)" },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = judge_config(&server, 3);
    config.auth_header = "X-Auth-Token".into();
    let client = JudgeClient::new(&config).unwrap();
    let languages = client.languages().await.unwrap();
    assert_eq!(languages.len(), 2);
    assert_eq!(languages[1].id, 54);
}

#[tokio::test]
async fn service_judges_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submissions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "tok" })))
        .expect(3)
        .mount(&server)
        .await;
    // every case prints [0,1]; the second sample expects [1,2]
    Mock::given(method("GET"))
        .and(path("/submissions/tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": status(3, "Accepted"),
            "stdout": base64::encode("[0, 1]\n"),
            "time": "0.004",
            "memory": 3200,
        })))
        .mount(&server)
        .await;

    let config = Config {
        judge: judge_config(&server, 3),
        ..Config::default()
    };
    let service = CodeJudge::new(Arc::new(config));
    assert!(!service.is_degraded());

    let problem = Problem::from_cases(sample_test_cases());
    let report = service
        .execute("def twoSum(nums, target):\n    return [0, 1]\n", "python", &problem)
        .await;

    assert_eq!(report.provider, Provider::Authoritative);
    assert_eq!(report.total_passed, 2);
    assert_eq!(report.per_case.len(), 3);
    assert!(report.per_case[0].passed);
    assert!(!report.per_case[1].passed);
    assert_eq!(report.per_case[1].status, "Wrong Answer");
    assert!(report.per_case[2].passed);
}

#[tokio::test]
async fn service_degrades_when_judge_rejects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submissions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let mut config = Config {
        judge: judge_config(&server, 3),
        ..Config::default()
    };
    config.fallback.seed = Some(11);
    let service = CodeJudge::new(Arc::new(config));

    let problem = Problem::from_cases(sample_test_cases());
    let report = service.execute("def twoSum(nums, target):\n    return []\n", "python", &problem).await;
    assert_eq!(report.provider, Provider::Heuristic);
    assert_eq!(report.total_tests, 3);
}
