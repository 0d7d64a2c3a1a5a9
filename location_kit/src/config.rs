//! Configuration read from the environment.

use std::{fmt, str::FromStr};

use crate::{
    client::{HeaderValue, HttpOptions},
    endpoints::Endpoints,
    styles::MapStyle,
};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Environment variable {0} is not set.")]
    Missing(&'static str),

    #[error("Invalid value of {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Everything needed to talk to AWS Location Service.
#[derive(Clone)]
pub struct Config {
    /// API key, sent with every request.
    pub api_key: String,
    pub endpoints: Endpoints,
    /// Style served when the client does not ask for a particular one.
    pub map_style: MapStyle,
    pub place_index: String,
    pub route_calculator: String,
    pub tracker: String,
    /// Port the proxy listens on.
    pub port: u16,
    pub http: HttpOptions,
}

impl Config {
    /// Load the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// When a required variable is missing, or a variable has invalid value.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration from variables provided by `lookup`. Empty values are treated as
    /// not set.
    ///
    /// # Errors
    ///
    /// When a required variable is missing, or a variable has invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let vars = Vars { lookup };

        let endpoints = match vars.optional("LOCATION_ENDPOINT") {
            Some(base) => {
                log::info!("Using custom endpoint: {base}");
                Endpoints::Custom(base)
            }
            None => Endpoints::Aws {
                region: vars.required("AWS_REGION")?,
            },
        };

        let mut http = HttpOptions::default();
        if let Some(user_agent) = vars.optional("LOCATION_USER_AGENT") {
            http.user_agent = user_agent
                .parse::<HeaderValue>()
                .map_err(|error| Error::Invalid {
                    var: "LOCATION_USER_AGENT",
                    reason: error.to_string(),
                })?;
        }

        Ok(Self {
            api_key: vars.required("AWS_LOCATION_API_KEY")?,
            endpoints,
            map_style: vars.parsed("MAP_STYLE", MapStyle::default())?,
            place_index: vars.or("AWS_PLACE_INDEX_NAME", "PlaceStudyCase"),
            route_calculator: vars.or("AWS_ROUTE_CALCULATOR", "YourRouteCalculator"),
            tracker: vars.or("AWS_TRACKER_NAME", "YourTracker"),
            port: vars.parsed("PORT", 4000)?,
            http,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("endpoints", &self.endpoints)
            .field("map_style", &self.map_style)
            .field("place_index", &self.place_index)
            .field("route_calculator", &self.route_calculator)
            .field("tracker", &self.tracker)
            .field("port", &self.port)
            .field("http", &self.http)
            .finish()
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, Error> {
        self.optional(key).ok_or(Error::Missing(key))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| {
            log::info!("{key} not set, using default: {default}");
            default.to_owned()
        })
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> Result<T, Error>
    where
        T: FromStr + fmt::Display,
        T::Err: fmt::Display,
    {
        match self.optional(key) {
            Some(value) => value.parse().map_err(|error: T::Err| Error::Invalid {
                var: key,
                reason: error.to_string(),
            }),
            None => {
                log::info!("{key} not set, using default: {default}");
                Ok(default)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn minimal_configuration() {
        let config = load(&[
            ("AWS_REGION", "ap-southeast-1"),
            ("AWS_LOCATION_API_KEY", "v1.public.key"),
        ])
        .unwrap();

        assert_eq!("v1.public.key", config.api_key);
        assert_eq!(
            Endpoints::Aws {
                region: "ap-southeast-1".to_owned()
            },
            config.endpoints
        );
        assert_eq!(MapStyle::Standard, config.map_style);
        assert_eq!("PlaceStudyCase", config.place_index);
        assert_eq!("YourRouteCalculator", config.route_calculator);
        assert_eq!("YourTracker", config.tracker);
        assert_eq!(4000, config.port);
    }

    #[test]
    fn full_configuration() {
        let config = load(&[
            ("AWS_LOCATION_API_KEY", "v1.public.key"),
            ("LOCATION_ENDPOINT", "http://localhost:4566"),
            ("MAP_STYLE", "hybrid"),
            ("AWS_PLACE_INDEX_NAME", "Places"),
            ("AWS_ROUTE_CALCULATOR", "Routes"),
            ("AWS_TRACKER_NAME", "Trucks"),
            ("PORT", "8080"),
            ("LOCATION_USER_AGENT", "showcase/1.0"),
        ])
        .unwrap();

        assert_eq!(
            Endpoints::Custom("http://localhost:4566".to_owned()),
            config.endpoints
        );
        assert_eq!(MapStyle::Hybrid, config.map_style);
        assert_eq!("Places", config.place_index);
        assert_eq!("Routes", config.route_calculator);
        assert_eq!("Trucks", config.tracker);
        assert_eq!(8080, config.port);
        assert_eq!("showcase/1.0", config.http.user_agent);
    }

    #[test]
    fn region_is_required_without_custom_endpoint() {
        assert_eq!(
            Err(Error::Missing("AWS_REGION")),
            load(&[("AWS_LOCATION_API_KEY", "v1.public.key")]).map(|_| ())
        );
    }

    #[test]
    fn empty_api_key_is_missing() {
        assert_eq!(
            Err(Error::Missing("AWS_LOCATION_API_KEY")),
            load(&[("AWS_REGION", "us-east-1"), ("AWS_LOCATION_API_KEY", "")]).map(|_| ())
        );
    }

    #[test]
    fn invalid_values() {
        let error = load(&[
            ("AWS_REGION", "us-east-1"),
            ("AWS_LOCATION_API_KEY", "v1.public.key"),
            ("PORT", "port"),
        ])
        .map(|_| ())
        .unwrap_err();
        assert!(matches!(error, Error::Invalid { var: "PORT", .. }));

        let error = load(&[
            ("AWS_REGION", "us-east-1"),
            ("AWS_LOCATION_API_KEY", "v1.public.key"),
            ("MAP_STYLE", "VectorEsriStreets"),
        ])
        .map(|_| ())
        .unwrap_err();
        assert_eq!(
            Error::Invalid {
                var: "MAP_STYLE",
                reason: "unknown map style: 'VectorEsriStreets'".to_owned()
            },
            error
        );
    }

    #[test]
    fn api_key_is_not_printed() {
        let config = load(&[
            ("AWS_REGION", "us-east-1"),
            ("AWS_LOCATION_API_KEY", "v1.public.secret"),
        ])
        .unwrap();

        assert!(!format!("{config:?}").contains("secret"));
    }
}
