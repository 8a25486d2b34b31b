mod support;

use ajudante::weather::{TomorrowIoWeather, WeatherOutcome, WeatherProvider};
use ajudante::AjudanteError;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::fast_http;

fn weather_client(server: &MockServer, max_retries: u32) -> TomorrowIoWeather {
    TomorrowIoWeather::with_api_key(
        &format!("{}/v4/weather/realtime", server.uri()),
        "weather-key",
        fast_http(max_retries),
    )
}

#[tokio::test]
async fn realtime_returns_provider_json_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/weather/realtime"))
        .and(query_param("location", "toronto"))
        .and(query_param("apikey", "weather-key"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"temperature": 5})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = weather_client(&server, 0)
        .realtime("toronto")
        .await
        .expect("weather");

    assert_eq!(outcome, WeatherOutcome::Report(json!({"temperature": 5})));
    assert_eq!(outcome.to_string(), r#"{"temperature":5}"#);

    let requests = server.received_requests().await.unwrap_or_default();
    let encoding = requests[0]
        .headers
        .get("accept-encoding")
        .and_then(|v| v.to_str().ok());
    assert_eq!(encoding, Some("deflate, gzip, br"));
}

#[tokio::test]
async fn non_200_status_is_an_outcome_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/weather/realtime"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = weather_client(&server, 2)
        .realtime("toronto")
        .await
        .expect("outcome");

    assert_eq!(outcome, WeatherOutcome::Failed { status: 401 });
    assert_eq!(outcome.to_string(), "Erro: status code 401");
}

#[tokio::test]
async fn transient_status_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/weather/realtime"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/weather/realtime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"temperature": 12.5})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = weather_client(&server, 2)
        .realtime("lisbon")
        .await
        .expect("weather");

    assert_eq!(outcome.report(), Some(&json!({"temperature": 12.5})));
}

#[tokio::test]
async fn exhausted_retries_report_the_last_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/weather/realtime"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let outcome = weather_client(&server, 2)
        .realtime("toronto")
        .await
        .expect("outcome");

    assert_eq!(outcome, WeatherOutcome::Failed { status: 503 });
}

#[tokio::test]
async fn empty_city_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = weather_client(&server, 0).realtime("  ").await.unwrap_err();
    assert!(matches!(err, AjudanteError::InvalidInput(_)));
}
