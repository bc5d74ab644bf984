//! End-to-end runs against a mocked traffic estimator service.

use crate::config::{ApiConfig, EstimateConfig};
use crate::errors::Error;
use crate::input::read_table;
use crate::{ReportRunner, ReportWriter, ReqwestTrafficEstimator};
use serde_json::{Value, json};
use std::io::Write;
use std::time::Duration;
use tracing::info;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const SERVICE_PATH: &str = "/api/adwords/o/v201806/TrafficEstimatorService";

fn runner_for(server: &MockServer) -> ReportRunner<ReqwestTrafficEstimator> {
    let api = ApiConfig {
        endpoint: Url::parse(&server.uri()).unwrap(),
        access_token: Some("test-token".to_string()),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    };
    ReportRunner::new(ReqwestTrafficEstimator::new(&api).unwrap(), EstimateConfig::default())
}

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Keywords of the first ad group in a captured selector body.
fn requested_keywords(request: &Request) -> Vec<(String, String)> {
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    body["campaignEstimateRequests"][0]["adGroupEstimateRequests"][0]["keywordEstimateRequests"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["keyword"]["text"].as_str().unwrap().to_string(),
                r["keyword"]["matchType"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

/// Responds with one estimate per requested keyword; keyword `i` gets `i + 1` clicks per day and a CPC
/// of `(i + 1) * 0.25`.
fn echo_response(request: &Request) -> ResponseTemplate {
    let estimates: Vec<Value> = (0..requested_keywords(request).len())
        .map(|i| {
            let n = i as i64 + 1;
            json!({
                "min": {"averageCpc": {"microAmount": n * 250_000}, "clicksPerDay": n as f64, "totalCost": {}},
                "max": {"averageCpc": {"microAmount": n * 500_000}, "clicksPerDay": n as f64 * 2.0}
            })
        })
        .collect();

    ResponseTemplate::new(200).set_body_json(json!({
        "campaignEstimates": [{
            "adGroupEstimates": [{"keywordEstimates": estimates}],
            "platformEstimates": [{"platform": {"id": 30000, "platformName": "Desktop"}}]
        }]
    }))
}

#[test_log::test(tokio::test)]
async fn test_e2e_report_with_duplicates_across_campaigns() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SERVICE_PATH))
        .respond_with(echo_response)
        .expect(2)
        .mount(&mock_server)
        .await;

    let input = write_csv(
        "ad_group,keyword,match_type,campaign_id\n\
         g1,shoes,broad,100\n\
         g2,boots,exact,200\n\
         g1,sandals,phrase,100\n\
         g3,shoes,BROAD,100\n\
         g2,boots,Exact,200\n",
    );
    let table = read_table(input.path()).unwrap();

    let runner = runner_for(&mock_server);
    let mut report = ReportWriter::new(Vec::new());
    let mut diag = Vec::new();
    let summary = runner.run(&table, &mut report, &mut diag).await.unwrap();
    info!(?summary, "Run finished");

    assert_eq!(summary.groups, 2);
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.requests, 3);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(
        requested_keywords(&requests[0]),
        vec![
            ("shoes".to_string(), "BROAD".to_string()),
            ("sandals".to_string(), "PHRASE".to_string()),
        ]
    );
    assert_eq!(requested_keywords(&requests[1]), vec![("boots".to_string(), "EXACT".to_string())]);

    let output = String::from_utf8(report.into_inner()).unwrap();
    let expected = "\
ad_group,keyword,match_type,campaign_id,Est Min CPC,Est Max CPC,Est Min Pos,Est Max Pos,Est Min Click,Est Max Click,Est Min Cost,Est Max Cost,Est Min Imp,Est Max Imp
g1,shoes,broad,100,0.25,0.50,none2,none2,1.00,2.00,none1,none1,none2,none2
g1,sandals,phrase,100,0.50,1.00,none2,none2,2.00,4.00,none1,none1,none2,none2
g3,shoes,BROAD,100,0.25,0.50,none2,none2,1.00,2.00,none1,none1,none2,none2
g2,boots,exact,200,0.25,0.50,none2,none2,1.00,2.00,none1,none1,none2,none2
g2,boots,Exact,200,0.25,0.50,none2,none2,1.00,2.00,none1,none1,none2,none2
";
    assert_eq!(output, expected);

    assert_eq!(String::from_utf8(diag).unwrap(), "2\n0\t100\n1\t200\n");
}

#[tokio::test]
async fn test_e2e_count_mismatch_aborts_after_earlier_groups() {
    let mock_server = MockServer::start().await;

    // Campaign 1 gets a well-formed answer
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "campaignEstimateRequests": [{"adGroupEstimateRequests": [{"keywordEstimateRequests": [
                {"keyword": {"text": "first", "matchType": "BROAD"}}
            ]}]}]
        })))
        .respond_with(echo_response)
        .mount(&mock_server)
        .await;

    // Campaign 2 asks for two keywords but only one estimate comes back
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "campaignEstimateRequests": [{"adGroupEstimateRequests": [{"keywordEstimateRequests": [
                {"keyword": {"text": "second", "matchType": "EXACT"}},
                {"keyword": {"text": "third", "matchType": "EXACT"}}
            ]}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "campaignEstimates": [{"adGroupEstimates": [{"keywordEstimates": [{}]}]}]
        })))
        .mount(&mock_server)
        .await;

    let input = write_csv("keyword,match_type,campaign_id\nfirst,broad,1\nsecond,exact,2\nthird,exact,2\nfourth,exact,3\n");
    let table = read_table(input.path()).unwrap();

    let runner = runner_for(&mock_server);
    let mut report = ReportWriter::new(Vec::new());
    let err = runner.run(&table, &mut report, &mut std::io::sink()).await.unwrap_err();

    assert!(matches!(err, Error::ContractViolation { requested: 2, returned: 1 }));

    let output = String::from_utf8(report.into_inner()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("first,broad,1,0.25,0.50"));

    // Campaign 3 never reached the service
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_e2e_api_fault_is_enumerated() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "[KeywordError.INVALID_KEYWORD_TEXT @ keyword.text]",
            "errors": [
                {"fieldPath": "keywordEstimateRequests[0].keyword.text", "trigger": "!!", "errorString": "KeywordError.INVALID_KEYWORD_TEXT"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let table = read_table(write_csv("keyword,match_type,campaign_id\n!!,broad,1\n").path()).unwrap();
    let err = runner_for(&mock_server)
        .run(&table, &mut ReportWriter::new(Vec::new()), &mut std::io::sink())
        .await
        .unwrap_err();

    let message = err.user_message();
    // Fields keep the order the service sent them in
    assert_eq!(
        message,
        "Message: [KeywordError.INVALID_KEYWORD_TEXT @ keyword.text]\nErrors:\n\tError [1]:\
         \n\t\tfieldPath: keywordEstimateRequests[0].keyword.text\
         \n\t\ttrigger: !!\
         \n\t\terrorString: KeywordError.INVALID_KEYWORD_TEXT"
    );
}

#[tokio::test]
async fn test_e2e_rejected_credentials_stop_before_any_row() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("AuthenticationError.OAUTH_TOKEN_INVALID"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let table = read_table(write_csv("keyword,match_type,campaign_id\na,broad,1\nb,broad,2\n").path()).unwrap();
    let mut report = ReportWriter::new(Vec::new());
    let err = runner_for(&mock_server)
        .run(&table, &mut report, &mut std::io::sink())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authorization { .. }));
    assert_eq!(report.lines(), 1);
}

#[tokio::test]
async fn test_e2e_empty_response_moves_on_to_next_campaign() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "campaignEstimateRequests": [{"adGroupEstimateRequests": [{"keywordEstimateRequests": [
                {"keyword": {"text": "unknown", "matchType": "BROAD"}}
            ]}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"campaignEstimates": []})))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "campaignEstimateRequests": [{"adGroupEstimateRequests": [{"keywordEstimateRequests": [
                {"keyword": {"text": "known", "matchType": "PHRASE"}}
            ]}]}]
        })))
        .respond_with(echo_response)
        .mount(&mock_server)
        .await;

    let table = read_table(write_csv("keyword,match_type,campaign_id\nunknown,broad,1\nknown,phrase,2\n").path()).unwrap();
    let mut report = ReportWriter::new(Vec::new());
    let summary = runner_for(&mock_server)
        .run(&table, &mut report, &mut std::io::sink())
        .await
        .unwrap();

    assert_eq!(summary.skipped, 1);
    let output = String::from_utf8(report.into_inner()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "No traffic estimates were returned.");
    assert!(lines[2].starts_with("known,phrase,2,0.25,0.50"));
}
