//! Transformations of MapLibre style documents. Loosely (very) based on MapLibre's style
//! specification: only `layers` are interpreted, everything else passes through untouched.
//! <https://maplibre.org/maplibre-style-spec/>

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::{expression::Expression, language::is_identity};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Style document has no 'layers' array.")]
    MalformedStyle,
}

/// Make labels of all symbol layers prefer given language, falling back to English and then to
/// the feature's plain `name`.
///
/// `"default"` and `"en"` give back the very same document. Otherwise, a new document is built,
/// and the original one is left intact.
///
/// # Errors
///
/// [`Error::MalformedStyle`] if `style` has no `layers` array. Expressions are never validated,
/// unknown ones are kept as they are.
pub fn apply_language_preference<'a>(
    style: &'a Value,
    language: &str,
) -> Result<Cow<'a, Value>, Error> {
    layers(style)?;

    if is_identity(language) {
        return Ok(Cow::Borrowed(style));
    }

    log::debug!("Rewriting labels to prefer '{language}'.");
    map_layers(style, |layer| localize_layer(layer, language)).map(Cow::Owned)
}

fn localize_layer(layer: &Value, language: &str) -> Value {
    let mut layer = layer.clone();

    if layer.get("type").and_then(Value::as_str) == Some("symbol")
        && let Some(text_field) = layer.pointer_mut("/layout/text-field")
    {
        let localized = Expression::from(&*text_field).prefer_language(language);
        *text_field = Value::from(&localized);
    }

    layer
}

/// Layers which are shown or hidden together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerGroup {
    /// Roads, buildings, water and land.
    Vector,
    /// Raster and satellite imagery.
    Raster,
}

impl LayerGroup {
    pub fn contains(&self, layer: &Value) -> bool {
        let id = layer.get("id").and_then(Value::as_str).unwrap_or_default();

        match self {
            Self::Vector => ["road", "building", "water", "land"]
                .iter()
                .any(|prefix| id.starts_with(prefix)),
            Self::Raster => {
                layer.get("type").and_then(Value::as_str) == Some("raster")
                    || id.contains("raster")
                    || id.contains("satellite")
            }
        }
    }
}

/// Show or hide all layers of the group. Only layers which declare their `visibility` are
/// affected, as the others cannot be told apart from the ones the style wants always visible.
///
/// # Errors
///
/// [`Error::MalformedStyle`] if `style` has no `layers` array.
pub fn set_group_visibility(
    style: &Value,
    group: LayerGroup,
    visible: bool,
) -> Result<Value, Error> {
    let visibility = if visible { "visible" } else { "none" };

    map_layers(style, |layer| {
        let mut layer = layer.clone();
        if group.contains(&layer)
            && let Some(current) = layer.pointer_mut("/layout/visibility")
        {
            *current = Value::from(visibility);
        }
        layer
    })
}

fn layers(style: &Value) -> Result<&Vec<Value>, Error> {
    style
        .get("layers")
        .and_then(Value::as_array)
        .ok_or(Error::MalformedStyle)
}

/// Build a new style, with each layer replaced by the result of `f`.
fn map_layers(style: &Value, f: impl Fn(&Value) -> Value) -> Result<Value, Error> {
    let layers = layers(style)?;
    let object = style.as_object().ok_or(Error::MalformedStyle)?;

    let mut mapped = Map::new();
    for (key, value) in object {
        let value = if key == "layers" {
            Value::Array(layers.iter().map(&f).collect())
        } else {
            value.clone()
        };
        mapped.insert(key.clone(), value);
    }

    Ok(Value::Object(mapped))
}
