use std::{str::FromStr, time::Duration};

use common_utils::{
    errors::CustomResult,
    request::{Headers, Method, Request},
};
use domain_types::{errors::ApiClientError, router_response_types::Response, types::Proxy};
use error_stack::{report, ResultExt};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::field::Empty;

use crate::{metrics, redaction::sanitize_request_body};

/// Builds the HTTP client a connector keeps for its lifetime.
///
/// Every call made through it is bounded by `timeout`; redirects are never followed.
pub fn create_client(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
    timeout: Duration,
) -> CustomResult<Client, ApiClientError> {
    get_client_builder(proxy_config, should_bypass_proxy)?
        .timeout(timeout)
        .build()
        .change_context(ApiClientError::ClientConstructionFailed)
        .inspect_err(|err| {
            info_log(
                "ERROR",
                &json!(format!("Failed to construct base client. Error: {:?}", err)),
            );
        })
}

fn get_client_builder(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
) -> CustomResult<reqwest::ClientBuilder, ApiClientError> {
    let mut client_builder = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_idle_timeout(Duration::from_secs(
            proxy_config
                .idle_pool_connection_timeout
                .unwrap_or_default(),
        ));

    if should_bypass_proxy {
        return Ok(client_builder);
    }

    // Proxy all HTTPS traffic through the configured HTTPS proxy
    if let Some(url) = proxy_config.https_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::https(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .inspect_err(|err| {
                    info_log(
                        "PROXY_ERROR",
                        &json!(format!("HTTPS proxy configuration error. Error: {:?}", err)),
                    );
                })?,
        );
    }

    // Proxy all HTTP traffic through the configured HTTP proxy
    if let Some(url) = proxy_config.http_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::http(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .inspect_err(|err| {
                    info_log(
                        "PROXY_ERROR",
                        &json!(format!("HTTP proxy configuration error. Error: {:?}", err)),
                    );
                })?,
        );
    }

    Ok(client_builder)
}

/// Sends `request` and hands back the raw response with the time the round trip took.
///
/// Any HTTP status is returned as a [Response]; deciding what a status means is up to the
/// connector. The span carries the golden log line: method, path, sanitized request body,
/// status, response body and latency.
#[tracing::instrument(
    name = "call_connector_api",
    skip_all,
    fields(
        connector = %connector_name,
        flow = %flow,
        request.url = Empty,
        request.method = Empty,
        request.body = Empty,
        response.body = Empty,
        response.status_code = Empty,
        message_ = "Golden Log Line (outgoing)",
        latency = Empty,
    )
)]
pub async fn call_connector_api(
    client: &Client,
    request: Request,
    connector_name: &str,
    flow: &str,
) -> CustomResult<(Duration, Response), ApiClientError> {
    let start = tokio::time::Instant::now();
    let method = request.method;
    let method_label = method.to_string();

    let url =
        reqwest::Url::parse(&request.url).change_context(ApiClientError::UrlEncodingFailed)?;
    tracing::Span::current().record("request.url", tracing::field::display(url.path()));
    tracing::Span::current().record("request.method", tracing::field::display(method));

    let body = match request.body.as_ref() {
        Some(content) => {
            let bytes = content
                .get_body_bytes()
                .change_context(ApiClientError::UrlEncodingFailed)?;
            tracing::Span::current().record(
                "request.body",
                tracing::field::display(sanitize_request_body(content)),
            );
            Some((content.content_type(), bytes))
        }
        None => None,
    };

    let mut builder = client
        .request(to_reqwest_method(method), url)
        .headers(request.headers.construct_header_map()?);
    if let Some((content_type, bytes)) = body {
        builder = builder
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
    }

    metrics::EXTERNAL_SERVICE_TOTAL_API_CALLS
        .with_label_values(&[&method_label, flow, connector_name])
        .inc();

    let result = match builder.send().await {
        Ok(response) => handle_response(response).await,
        Err(error) => {
            let api_error = if error.is_timeout() {
                ApiClientError::RequestTimeoutReceived
            } else {
                ApiClientError::RequestNotSent(error.to_string())
            };
            info_log(
                "REQUEST_FAILURE",
                &json!(format!("Unable to send request to connector. Error: {error}")),
            );
            Err(report!(api_error))
        }
    };

    let latency = start.elapsed();
    tracing::Span::current().record("latency", latency.as_millis());
    metrics::EXTERNAL_SERVICE_API_CALLS_LATENCY
        .with_label_values(&[&method_label, flow, connector_name])
        .observe(latency.as_secs_f64());

    match &result {
        Ok(response) => {
            tracing::Span::current()
                .record("response.status_code", response.status_code);
            tracing::Span::current().record(
                "response.body",
                tracing::field::display(String::from_utf8_lossy(&response.response)),
            );
            if !response.is_success() {
                metrics::EXTERNAL_SERVICE_API_CALLS_ERRORS
                    .with_label_values(&[
                        &method_label,
                        flow,
                        connector_name,
                        &response.status_code.to_string(),
                    ])
                    .inc();
            }
        }
        Err(error) => {
            metrics::EXTERNAL_SERVICE_API_CALLS_ERRORS
                .with_label_values(&[
                    &method_label,
                    flow,
                    connector_name,
                    &error.current_context().to_string(),
                ])
                .inc();
        }
    }
    tracing::info!(tag = ?Tag::OutgoingApi, log_type = "api", "Outgoing Request completed");

    result.map(|response| (latency, response))
}

async fn handle_response(
    response: reqwest::Response,
) -> CustomResult<Response, ApiClientError> {
    let status_code = response.status().as_u16();
    let headers = Some(response.headers().to_owned());
    let body = response.bytes().await.map_err(|error| {
        if error.is_timeout() {
            report!(ApiClientError::RequestTimeoutReceived)
        } else {
            report!(error).change_context(ApiClientError::ResponseDecodingFailed)
        }
    })?;
    Ok(Response {
        headers,
        response: body,
        status_code,
    })
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
    }
}

pub(super) trait HeaderExt {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError>;
}

impl HeaderExt for Headers {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError> {
        use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

        self.into_iter().try_fold(
            HeaderMap::new(),
            |mut header_map, (header_name, header_value)| {
                let header_name = HeaderName::from_str(&header_name)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                let header_value = header_value.into_inner();
                let header_value = HeaderValue::from_str(&header_value)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                header_map.append(header_name, header_value);
                Ok(header_map)
            },
        )
    }
}

#[derive(Debug, Clone)]
pub enum Tag {
    /// Api Outgoing Request
    OutgoingApi,
}

#[inline]
pub fn info_log(action: &str, message: &Value) {
    tracing::info!(tags = %action, json_value= %message);
}

#[cfg(test)]
mod tests {
    use common_utils::request::{RequestBuilder, RequestContent};
    use masking::{Mask, Secret};

    use super::*;

    fn client(timeout: Duration) -> Client {
        create_client(&Proxy::default(), true, timeout).unwrap()
    }

    #[tokio::test]
    async fn test_call_connector_api_sends_json_body_and_returns_any_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/payments")
            .match_header("content-type", "application/json")
            .match_header("authorization", "Bearer token")
            .match_body(mockito::Matcher::Json(json!({ "amount": 10.0 })))
            .with_status(400)
            .with_body(r#"{"name":"INVALID"}"#)
            .expect(1)
            .create_async()
            .await;

        let request = RequestBuilder::new()
            .method(Method::Post)
            .url(&format!("{}/api/payments", server.url()))
            .headers(vec![(
                "Authorization".to_string(),
                "Bearer token".to_string().into_masked(),
            )])
            .set_body(RequestContent::Json(json!({ "amount": 10.0 })))
            .build();

        let (_latency, response) =
            call_connector_api(&client(Duration::from_secs(5)), request, "cardpay", "payment")
                .await
                .unwrap();

        assert_eq!(response.status_code, 400);
        assert_eq!(&response.response[..], br#"{"name":"INVALID"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_connector_api_sends_exposed_form_values() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("grant_type=password&password=secret")
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let request = RequestBuilder::new()
            .method(Method::Post)
            .url(&format!("{}/api/auth/token", server.url()))
            .set_body(RequestContent::FormUrlEncoded(vec![
                ("grant_type".to_string(), "password".to_string().into()),
                (
                    "password".to_string(),
                    Secret::new("secret".to_string()).into_masked(),
                ),
            ]))
            .build();

        let (_latency, response) =
            call_connector_api(&client(Duration::from_secs(5)), request, "cardpay", "auth")
                .await
                .unwrap();
        assert_eq!(response.status_code, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_connector_api_reports_unreachable_host() {
        let request = RequestBuilder::new()
            .method(Method::Get)
            .url("http://127.0.0.1:1/api/payments")
            .build();

        let error = call_connector_api(&client(Duration::from_secs(2)), request, "cardpay", "payment")
            .await
            .unwrap_err();
        assert!(matches!(
            error.current_context(),
            ApiClientError::RequestNotSent(_) | ApiClientError::RequestTimeoutReceived
        ));
    }

    #[tokio::test]
    async fn test_call_connector_api_rejects_malformed_url() {
        let request = RequestBuilder::new().method(Method::Get).url("not a url").build();

        let error = call_connector_api(&client(Duration::from_secs(2)), request, "cardpay", "payment")
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &ApiClientError::UrlEncodingFailed);
    }
}
