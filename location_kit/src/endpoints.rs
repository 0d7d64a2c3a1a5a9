//! Where AWS Location Service lives.

use reqwest::Url;

use crate::styles::StyleRequest;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid endpoint URL '{0}': {1}")]
    InvalidUrl(String, String),

    #[error("Endpoint URL '{0}' cannot have a path.")]
    CannotBeABase(String),
}

/// AWS Location Service APIs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Service {
    Maps,
    Places,
    Routes,
    Tracking,
}

impl Service {
    fn host_prefix(self) -> &'static str {
        match self {
            Self::Maps => "maps",
            Self::Places => "places",
            Self::Routes => "routes",
            Self::Tracking => "tracking",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoints {
    /// Regional AWS hosts, e.g. `https://maps.geo.us-east-1.amazonaws.com`.
    Aws { region: String },
    /// Single base URL for all services. Useful for emulators and tests.
    Custom(String),
}

impl Endpoints {
    pub fn base_url(&self, service: Service) -> String {
        match self {
            Self::Aws { region } => {
                format!("https://{}.geo.{region}.amazonaws.com", service.host_prefix())
            }
            Self::Custom(base) => base.trim_end_matches('/').to_owned(),
        }
    }

    /// URL of a resource, with path segments percent-encoded as needed.
    ///
    /// # Errors
    ///
    /// When the base URL is not valid.
    pub fn url<'a>(
        &self,
        service: Service,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, Error> {
        let base = self.base_url(service);
        let mut url =
            Url::parse(&base).map_err(|error| Error::InvalidUrl(base.clone(), error.to_string()))?;

        url.path_segments_mut()
            .map_err(|()| Error::CannotBeABase(base.clone()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// URL of a style descriptor, ready to be handed to a map renderer.
    /// <https://docs.aws.amazon.com/location/latest/APIReference/API_geomaps_GetStyleDescriptor.html>
    ///
    /// # Errors
    ///
    /// When the base URL is not valid.
    pub fn style_descriptor_url(
        &self,
        request: &StyleRequest,
        api_key: &str,
    ) -> Result<Url, Error> {
        let mut url = self.url(
            Service::Maps,
            ["v2", "styles", request.style.api_name(), "descriptor"],
        )?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", api_key);
            if request.style.supports_color_scheme() {
                query.append_pair("color-scheme", request.color_scheme.api_name());
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::{ColorScheme, MapStyle};

    fn aws() -> Endpoints {
        Endpoints::Aws {
            region: "ap-southeast-1".to_owned(),
        }
    }

    #[test]
    fn test_aws_base_urls() {
        assert_eq!(
            "https://maps.geo.ap-southeast-1.amazonaws.com",
            aws().base_url(Service::Maps)
        );
        assert_eq!(
            "https://tracking.geo.ap-southeast-1.amazonaws.com",
            aws().base_url(Service::Tracking)
        );
    }

    #[test]
    fn custom_base_url_is_shared_by_all_services() {
        let endpoints = Endpoints::Custom("http://localhost:4566/".to_owned());
        assert_eq!("http://localhost:4566", endpoints.base_url(Service::Places));
        assert_eq!("http://localhost:4566", endpoints.base_url(Service::Routes));
    }

    #[test]
    fn path_segments_are_encoded() {
        let url = aws()
            .url(Service::Tracking, ["tracking", "v0", "devices", "truck 1/a"])
            .unwrap();
        assert_eq!("/tracking/v0/devices/truck%201%2Fa", url.path());
    }

    #[test]
    fn custom_base_path_is_kept() {
        let url = Endpoints::Custom("http://localhost:8080/aws".to_owned())
            .url(Service::Routes, ["routes", "v0"])
            .unwrap();
        assert_eq!("http://localhost:8080/aws/routes/v0", url.as_str());
    }

    #[test]
    fn invalid_base_url() {
        let endpoints = Endpoints::Custom("not a url".to_owned());
        assert!(matches!(
            endpoints.url(Service::Maps, ["v2"]),
            Err(Error::InvalidUrl(..))
        ));

        let endpoints = Endpoints::Custom("mailto:someone@example.com".to_owned());
        assert_eq!(
            Err(Error::CannotBeABase("mailto:someone@example.com".to_owned())),
            endpoints.url(Service::Maps, ["v2"])
        );
    }

    #[test]
    fn style_descriptor_url_with_color_scheme() {
        let url = aws()
            .style_descriptor_url(
                &StyleRequest {
                    style: MapStyle::Monochrome,
                    color_scheme: ColorScheme::Dark,
                },
                "v1.public.key",
            )
            .unwrap();

        assert_eq!(
            "https://maps.geo.ap-southeast-1.amazonaws.com/v2/styles/Monochrome/descriptor?key=v1.public.key&color-scheme=Dark",
            url.as_str()
        );
    }

    #[test]
    fn style_descriptor_url_without_color_scheme() {
        let url = aws()
            .style_descriptor_url(
                &StyleRequest {
                    style: MapStyle::Hybrid,
                    color_scheme: ColorScheme::Dark,
                },
                "v1.public.key",
            )
            .unwrap();

        assert_eq!(
            "https://maps.geo.ap-southeast-1.amazonaws.com/v2/styles/Hybrid/descriptor?key=v1.public.key",
            url.as_str()
        );
    }
}
