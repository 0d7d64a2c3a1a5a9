use std::{fmt, str::FromStr};

/// Predefined AWS Location map styles.
/// <https://docs.aws.amazon.com/location/latest/developerguide/map-styles.html>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MapStyle {
    /// Clean, modern look with soft colors.
    #[default]
    Standard,
    /// Grayscale, for data visualization overlays.
    Monochrome,
    /// Satellite imagery with labels.
    Hybrid,
    /// Satellite imagery only.
    Satellite,
}

impl MapStyle {
    pub const ALL: [Self; 4] = [
        Self::Standard,
        Self::Monochrome,
        Self::Hybrid,
        Self::Satellite,
    ];

    /// Name as it appears in the style descriptor path.
    pub fn api_name(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Monochrome => "Monochrome",
            Self::Hybrid => "Hybrid",
            Self::Satellite => "Satellite",
        }
    }

    /// Whether the style comes in light and dark variants.
    pub fn supports_color_scheme(&self) -> bool {
        matches!(self, Self::Standard | Self::Monochrome)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown map style: '{0}'")]
pub struct UnknownMapStyle(pub String);

impl FromStr for MapStyle {
    type Err = UnknownMapStyle;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.api_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownMapStyle(name.to_owned()))
    }
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn api_name(&self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown color scheme: '{0}'")]
pub struct UnknownColorScheme(pub String);

impl FromStr for ColorScheme {
    type Err = UnknownColorScheme;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name.eq_ignore_ascii_case("light") {
            Ok(Self::Light)
        } else if name.eq_ignore_ascii_case("dark") {
            Ok(Self::Dark)
        } else {
            Err(UnknownColorScheme(name.to_owned()))
        }
    }
}

/// Which style descriptor to fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StyleRequest {
    pub style: MapStyle,
    /// Ignored for styles not supporting color schemes.
    pub color_scheme: ColorScheme,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsing_map_styles() {
        assert_eq!(Ok(MapStyle::Standard), "Standard".parse());
        assert_eq!(Ok(MapStyle::Monochrome), "monochrome".parse());
        assert_eq!(Ok(MapStyle::Hybrid), "HYBRID".parse());
        assert_eq!(Ok(MapStyle::Satellite), "Satellite".parse());
        assert_eq!(
            Err(UnknownMapStyle("VectorEsriStreets".to_owned())),
            "VectorEsriStreets".parse::<MapStyle>()
        );
    }

    #[test]
    fn test_parsing_color_schemes() {
        assert_eq!(Ok(ColorScheme::Light), "light".parse());
        assert_eq!(Ok(ColorScheme::Dark), "Dark".parse());
        assert!("dim".parse::<ColorScheme>().is_err());
    }

    #[test]
    fn only_vector_styles_support_color_schemes() {
        assert!(MapStyle::Standard.supports_color_scheme());
        assert!(MapStyle::Monochrome.supports_color_scheme());
        assert!(!MapStyle::Hybrid.supports_color_scheme());
        assert!(!MapStyle::Satellite.supports_color_scheme());
    }
}
