//! REST client for AWS Location Service, authenticated with an API key.

use std::{borrow::Cow, time::Duration};

use reqwest::{RequestBuilder, StatusCode, Url};
use serde_json::{Value, json};

use crate::{
    config::Config,
    endpoints::{self, Endpoints, Service},
    latest::Latest,
    style::{self, apply_language_preference},
    styles::StyleRequest,
};

pub use reqwest::header::HeaderValue;

/// Controls how [`LocationClient`] uses the HTTP protocol.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// User agent to be sent to AWS.
    pub user_agent: HeaderValue,

    /// Requests taking longer than that are abandoned.
    pub timeout: Option<Duration>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
            )),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("AWS Location responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error(transparent)]
    Endpoint(#[from] endpoints::Error),

    #[error(transparent)]
    Style(#[from] style::Error),

    #[error("Query text is empty.")]
    EmptyQuery,
}

/// Number of results of a geocoding search.
const GEOCODE_MAX_RESULTS: u32 = 1;

/// Number of suggestions offered while typing.
const SUGGEST_MAX_RESULTS: u32 = 5;

pub struct LocationClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    api_key: String,
    place_index: String,
    route_calculator: String,
    tracker: String,
}

impl LocationClient {
    /// # Errors
    ///
    /// When the HTTP client cannot be initialized.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().user_agent(config.http.user_agent.clone());
        if let Some(timeout) = config.http.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoints: config.endpoints.clone(),
            api_key: config.api_key.clone(),
            place_index: config.place_index.clone(),
            route_calculator: config.route_calculator.clone(),
            tracker: config.tracker.clone(),
        })
    }

    /// Fetch a style descriptor, i.e. a MapLibre style document.
    ///
    /// # Errors
    ///
    /// When the request fails, or AWS does not respond with a JSON.
    pub async fn style_descriptor(&self, request: &StyleRequest) -> Result<Value, Error> {
        let url = self
            .endpoints
            .style_descriptor_url(request, &self.api_key)?;
        log::debug!(
            "Fetching {} style descriptor ({} color scheme).",
            request.style,
            request.color_scheme.api_name()
        );
        send(self.http.get(url)).await
    }

    /// Fetch a style descriptor with labels preferring given language.
    ///
    /// # Errors
    ///
    /// When the request fails, or the style has no layers.
    pub async fn localized_style(
        &self,
        request: &StyleRequest,
        language: &str,
    ) -> Result<Value, Error> {
        let style = self.style_descriptor(request).await?;
        let localized = match apply_language_preference(&style, language)? {
            Cow::Owned(localized) => Some(localized),
            Cow::Borrowed(_) => None,
        };
        Ok(localized.unwrap_or(style))
    }

    /// Same as [`Self::localized_style`], but gives `None` if another load was started in the
    /// meantime using the same `latest`.
    ///
    /// # Errors
    ///
    /// When the request fails, or the style has no layers.
    pub async fn latest_localized_style(
        &self,
        latest: &Latest,
        request: &StyleRequest,
        language: &str,
    ) -> Result<Option<Value>, Error> {
        let ticket = latest.begin();
        let style = self.localized_style(request, language).await?;
        Ok(latest.resolve(ticket, style))
    }

    /// Search the place index, passing the body as it is.
    /// <https://docs.aws.amazon.com/location/latest/APIReference/API_SearchPlaceIndexForText.html>
    ///
    /// # Errors
    ///
    /// When the request fails, or AWS does not respond with a JSON.
    pub async fn search_place_index_for_text(&self, body: &Value) -> Result<Value, Error> {
        let url = self.endpoints.url(
            Service::Places,
            [
                "places",
                "v0",
                "indexes",
                self.place_index.as_str(),
                "search",
                "text",
            ],
        )?;
        send(self.http.post(self.authorized(url)).json(body)).await
    }

    /// Find coordinates of the best match for `query`.
    ///
    /// # Errors
    ///
    /// When `query` is blank, or the search fails.
    pub async fn geocode(&self, query: &str) -> Result<Value, Error> {
        let query = non_blank(query)?;
        self.search_place_index_for_text(&json!({
            "Text": query,
            "MaxResults": GEOCODE_MAX_RESULTS,
        }))
        .await
    }

    /// Places matching partially typed `text`. Gives the `Results` array of the search.
    ///
    /// # Errors
    ///
    /// When `text` is blank, or the search fails.
    pub async fn suggest(&self, text: &str) -> Result<Value, Error> {
        let text = non_blank(text)?;
        let mut response = self
            .search_place_index_for_text(&json!({
                "Text": text,
                "MaxResults": SUGGEST_MAX_RESULTS,
            }))
            .await?;

        Ok(response
            .get_mut("Results")
            .map(Value::take)
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }

    /// Calculate a route, passing the body as it is.
    /// <https://docs.aws.amazon.com/location/latest/APIReference/API_CalculateRoute.html>
    ///
    /// # Errors
    ///
    /// When the request fails, or AWS does not respond with a JSON.
    pub async fn calculate_route(&self, body: &Value) -> Result<Value, Error> {
        let url = self.endpoints.url(
            Service::Routes,
            [
                "routes",
                "v0",
                "calculators",
                self.route_calculator.as_str(),
                "calculate",
                "route",
            ],
        )?;
        send(self.http.post(self.authorized(url)).json(body)).await
    }

    /// Last known position of a tracked device.
    /// <https://docs.aws.amazon.com/location/latest/APIReference/API_GetDevicePosition.html>
    ///
    /// # Errors
    ///
    /// When the request fails, or AWS does not respond with a JSON.
    pub async fn device_position(&self, device_id: &str) -> Result<Value, Error> {
        let url = self.endpoints.url(
            Service::Tracking,
            [
                "tracking",
                "v0",
                "trackers",
                self.tracker.as_str(),
                "devices",
                device_id,
                "positions",
                "latest",
            ],
        )?;
        send(self.http.get(self.authorized(url))).await
    }

    fn authorized(&self, mut url: Url) -> Url {
        url.query_pairs_mut().append_pair("key", &self.api_key);
        url
    }
}

async fn send(request: RequestBuilder) -> Result<Value, Error> {
    let response = request.send().await?;
    let status = response.status();
    log::debug!("{} responded with {status}.", response.url().path());

    if !status.is_success() {
        // Body is only for the error message, do not bother if it can't be read.
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Status { status, body });
    }

    Ok(response.json().await?)
}

fn non_blank(text: &str) -> Result<&str, Error> {
    let text = text.trim();
    if text.is_empty() {
        Err(Error::EmptyQuery)
    } else {
        Ok(text)
    }
}
