use std::collections::HashMap;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::{
    HeaderMap, Method, Request, Response, StatusCode, Uri,
    body::Incoming,
    header::{self, HeaderValue},
};
use location_kit::{ColorScheme, Language, LocationClient, MapStyle, StyleRequest};
use percent_encoding::percent_decode_str;
use reqwest::Url;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::RouteError;

pub(crate) type JsonResponse = Response<Full<Bytes>>;

/// Language used when the frontend does not ask for one.
const DEFAULT_LANGUAGE: &str = "default";

/// Largest accepted request body, the same as Express' `json()` has.
const BODY_LIMIT: usize = 100 * 1024;

const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

#[derive(Deserialize)]
struct SuggestBody {
    text: Option<String>,
}

pub(crate) struct Routes {
    client: LocationClient,
    default_style: StyleRequest,
}

impl Routes {
    pub fn new(client: LocationClient, default_style: StyleRequest) -> Self {
        Self {
            client,
            default_style,
        }
    }

    pub async fn handle(&self, request: Request<Incoming>) -> JsonResponse {
        log::info!("{} {}", request.method(), request.uri());

        let mut response = self
            .route(request)
            .await
            .unwrap_or_else(RouteError::into_response);

        allow_any_origin(response.headers_mut());
        response
    }

    async fn route(&self, request: Request<Incoming>) -> Result<JsonResponse, RouteError> {
        if request.method() == Method::OPTIONS {
            return Ok(preflight(request.headers()));
        }

        // HEAD is answered like GET, hyper leaves the body out.
        let method = match request.method() {
            &Method::HEAD => Method::GET,
            method => method.clone(),
        };
        let path = request.uri().path().to_owned();
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        let body = match (method, segments.as_slice()) {
            (Method::POST, ["api", "places", "search"]) => {
                let body: Value = json_body(request).await?;
                self.client.search_place_index_for_text(&body).await?
            }
            (Method::GET, ["api", "places", "geocode"]) => {
                let query = query_params(request.uri())
                    .remove("q")
                    .filter(|q| !q.is_empty())
                    .ok_or_else(|| RouteError::BadRequest("Missing q param".to_owned()))?;
                self.client.geocode(&query).await?
            }
            (Method::POST, ["api", "routes", "calculate"]) => {
                let body: Value = json_body(request).await?;
                self.client.calculate_route(&body).await?
            }
            (Method::GET, ["api", "tracker", "device", device_id]) => {
                let device_id = percent_decode_str(device_id).decode_utf8().map_err(|error| {
                    RouteError::BadRequest(format!("Invalid device id: {error}"))
                })?;
                self.client.device_position(&device_id).await?
            }
            (Method::POST, ["api", "suggest"]) => {
                let body: SuggestBody = json_body(request).await?;
                let text = body
                    .text
                    .filter(|text| !text.is_empty())
                    .ok_or_else(|| RouteError::BadRequest("Missing 'text' in body".to_owned()))?;
                self.client.suggest(&text).await?
            }
            (Method::GET, ["api", "map-style"]) => self.map_style(request.uri()).await?,
            _ => return Err(RouteError::NotFound),
        };

        Ok(json_response(StatusCode::OK, &body))
    }

    async fn map_style(&self, uri: &Uri) -> Result<Value, RouteError> {
        let params = query_params(uri);

        let style = match params.get("style") {
            Some(style) => style
                .parse::<MapStyle>()
                .map_err(|error| RouteError::BadRequest(error.to_string()))?,
            None => self.default_style.style,
        };

        let color_scheme = match params.get("color-scheme") {
            Some(scheme) => scheme
                .parse::<ColorScheme>()
                .map_err(|error| RouteError::BadRequest(error.to_string()))?,
            None => self.default_style.color_scheme,
        };

        let language = params
            .get("language")
            .map_or(DEFAULT_LANGUAGE, String::as_str);

        match Language::find(language) {
            Some(offered) => log::debug!("{style} labels in {}.", offered.name),
            None => log::warn!("'{language}' is not an offered language, labels may fall back."),
        }

        Ok(self
            .client
            .localized_style(
                &StyleRequest {
                    style,
                    color_scheme,
                },
                language,
            )
            .await?)
    }
}

pub(crate) fn json_response(status: StatusCode, body: &Value) -> JsonResponse {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

fn preflight(request_headers: &HeaderMap) -> JsonResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    if let Some(requested) = request_headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
    }
    response
}

fn allow_any_origin(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
}

/// Percent-decoded query parameters. Later occurrences win.
fn query_params(uri: &Uri) -> HashMap<String, String> {
    let Some(query) = uri.query() else {
        return HashMap::new();
    };

    Url::parse(&format!("http://localhost/?{query}"))
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

/// Read the body as JSON. Empty body is the same as `{}`.
async fn json_body<T: DeserializeOwned>(request: Request<Incoming>) -> Result<T, RouteError> {
    let body = Limited::new(request.into_body(), BODY_LIMIT)
        .collect()
        .await
        .map_err(|error| {
            if error.is::<LengthLimitError>() {
                RouteError::TooLarge
            } else {
                RouteError::Body(error)
            }
        })?
        .to_bytes();
    let body = if body.is_empty() { &b"{}"[..] } else { &body[..] };
    Ok(serde_json::from_slice(body)?)
}
