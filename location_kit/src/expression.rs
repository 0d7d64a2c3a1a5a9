//! MapLibre style expressions, as far as label localization is concerned.
//! <https://maplibre.org/maplibre-style-spec/expressions/>
//!
//! Only `get` and `coalesce` are understood. Everything else is kept as a generic node, so any
//! expression converts back to exactly the same JSON.

use serde_json::Value;

use crate::language::LanguageCode;

/// Property referenced by a `get` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyName {
    /// `name:<code>`, label in a particular language.
    Localized(LanguageCode),
    /// Any other property, including the bare `name`.
    Plain(String),
}

impl PropertyName {
    pub fn parse(property: &str) -> Self {
        property
            .strip_prefix("name:")
            .and_then(|code| code.parse().ok())
            .map_or_else(|| Self::Plain(property.to_owned()), Self::Localized)
    }

    pub fn to_property(&self) -> String {
        match self {
            Self::Localized(code) => code.property(),
            Self::Plain(property) => property.clone(),
        }
    }
}

/// Tree of a style expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Anything which is not an array.
    Literal(Value),
    /// `["get", property]`
    Get(PropertyName),
    /// `["coalesce", ...]`. Arguments are kept in the fallback order.
    Coalesce(Vec<Expression>),
    /// Any other array, with its operator (if any) as the first element.
    Other(Vec<Expression>),
}

impl From<&Value> for Expression {
    fn from(value: &Value) -> Self {
        let Value::Array(items) = value else {
            return Self::Literal(value.clone());
        };

        match items.as_slice() {
            [Value::String(operator), Value::String(property)] if operator == "get" => {
                Self::Get(PropertyName::parse(property))
            }
            [Value::String(operator), arguments @ ..] if operator == "coalesce" => {
                Self::Coalesce(arguments.iter().map(Self::from).collect())
            }
            _ => Self::Other(items.iter().map(Self::from).collect()),
        }
    }
}

impl From<&Expression> for Value {
    fn from(expression: &Expression) -> Self {
        expression.to_value()
    }
}

impl Expression {
    /// `["coalesce", ["get", "name:<language>"], ["get", "name:en"], ["get", "name"]]`
    pub fn label_chain(language: &str) -> Self {
        Self::Coalesce(vec![
            Self::Get(PropertyName::parse(&format!("name:{language}"))),
            Self::Get(PropertyName::parse("name:en")),
            Self::Get(PropertyName::Plain("name".to_owned())),
        ])
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Get(property) => Value::Array(vec![
                Value::from("get"),
                Value::from(property.to_property()),
            ]),
            Self::Coalesce(arguments) => Value::Array(
                std::iter::once(Value::from("coalesce"))
                    .chain(arguments.iter().map(Self::to_value))
                    .collect(),
            ),
            Self::Other(items) => Value::Array(items.iter().map(Self::to_value).collect()),
        }
    }

    /// Make labels prefer given language, then English, then whatever the feature's `name` is.
    ///
    /// Only `coalesce` nodes shaped like the label chains baked into AWS styles are replaced, i.e.
    /// the ones starting with a localized `get`, followed by another `get`, and having no more
    /// than three arguments. Everything else is traversed, but kept as it is.
    pub fn prefer_language(&self, language: &str) -> Self {
        match self {
            Self::Coalesce(arguments) if is_label_chain(arguments) => Self::label_chain(language),
            Self::Coalesce(arguments) => Self::Coalesce(
                arguments
                    .iter()
                    .map(|argument| argument.prefer_language(language))
                    .collect(),
            ),
            Self::Other(items) => Self::Other(
                items
                    .iter()
                    .map(|item| item.prefer_language(language))
                    .collect(),
            ),
            Self::Literal(_) | Self::Get(_) => self.clone(),
        }
    }

    /// Whether this is a `get`, including forms which are not [`Self::Get`], like
    /// `["get", "name", ["properties"]]`.
    fn is_get_operator(&self) -> bool {
        match self {
            Self::Get(_) => true,
            Self::Other(items) => {
                matches!(items.first(), Some(Self::Literal(Value::String(operator))) if operator == "get")
            }
            Self::Literal(_) | Self::Coalesce(_) => false,
        }
    }

    /// Whether this is a `get` of a `name:<code>` property, including forms with an object
    /// argument, like `["get", "name:ja", ["properties"]]`.
    fn is_localized_get(&self) -> bool {
        match self {
            Self::Get(property) => matches!(property, PropertyName::Localized(_)),
            Self::Other(items) => match items.as_slice() {
                [
                    Self::Literal(Value::String(operator)),
                    Self::Literal(Value::String(property)),
                    ..,
                ] => {
                    operator == "get"
                        && matches!(PropertyName::parse(property), PropertyName::Localized(_))
                }
                _ => false,
            },
            Self::Literal(_) | Self::Coalesce(_) => false,
        }
    }

    /// Whether a JavaScript renderer would consider this value false.
    fn is_falsy(&self) -> bool {
        match self {
            Self::Literal(Value::Null | Value::Bool(false)) => true,
            Self::Literal(Value::Number(number)) => number.as_f64().is_some_and(|n| n == 0.0),
            Self::Literal(Value::String(string)) => string.is_empty(),
            _ => false,
        }
    }
}

fn is_label_chain(arguments: &[Expression]) -> bool {
    match arguments {
        [first, second, rest @ ..] => {
            // The fourth argument may be there, the fifth element of the whole node counts as
            // absent if it is falsy.
            first.is_localized_get()
                && second.is_get_operator()
                && rest.get(1).is_none_or(Expression::is_falsy)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prefer(expression: Value, language: &str) -> Value {
        Expression::from(&expression)
            .prefer_language(language)
            .to_value()
    }

    #[test]
    fn test_parsing_property_names() {
        assert_eq!(
            PropertyName::Localized("ja".parse().unwrap()),
            PropertyName::parse("name:ja")
        );
        assert_eq!(
            PropertyName::Plain("name".to_owned()),
            PropertyName::parse("name")
        );
        assert_eq!(
            PropertyName::Plain("name:".to_owned()),
            PropertyName::parse("name:")
        );
        assert_eq!(
            PropertyName::Plain("name:ja2".to_owned()),
            PropertyName::parse("name:ja2")
        );
        assert_eq!(
            PropertyName::Plain("class".to_owned()),
            PropertyName::parse("class")
        );
    }

    #[test]
    fn test_parsing_expressions() {
        assert_eq!(
            Expression::Get(PropertyName::Plain("name".to_owned())),
            Expression::from(&json!(["get", "name"]))
        );

        assert_eq!(
            Expression::Coalesce(vec![
                Expression::Get(PropertyName::Localized("de".parse().unwrap())),
                Expression::Literal(json!("fallback")),
            ]),
            Expression::from(&json!(["coalesce", ["get", "name:de"], "fallback"]))
        );

        assert_eq!(
            Expression::Literal(json!({"text-font": ["Noto Sans"]})),
            Expression::from(&json!({"text-font": ["Noto Sans"]}))
        );
    }

    #[test]
    fn unusual_expressions_convert_back_unchanged() {
        for value in [
            json!([]),
            json!(["get"]),
            json!(["get", 1]),
            json!(["get", "name", ["properties"]]),
            json!(["coalesce"]),
            json!([1, "coalesce", null]),
            json!(["format", ["get", "name:zh-Hant"], {"font-scale": 0.8}]),
            json!("{name}"),
            json!(null),
        ] {
            assert_eq!(value, Expression::from(&value).to_value());
        }
    }

    #[test]
    fn label_chain_is_replaced() {
        assert_eq!(
            json!(["coalesce", ["get", "name:fr"], ["get", "name:en"], ["get", "name"]]),
            prefer(
                json!(["coalesce", ["get", "name:ja"], ["get", "name:en"], ["get", "name"]]),
                "fr"
            )
        );
    }

    #[test]
    fn short_label_chain_is_extended() {
        assert_eq!(
            json!(["coalesce", ["get", "name:ko"], ["get", "name:en"], ["get", "name"]]),
            prefer(json!(["coalesce", ["get", "name:ja"], ["get", "name"]]), "ko")
        );
    }

    #[test]
    fn chain_with_four_fallbacks_is_kept() {
        let expression = json!([
            "coalesce",
            ["get", "name:ja"],
            ["get", "name:en"],
            ["get", "name"],
            "unnamed"
        ]);

        assert_eq!(expression, prefer(expression.clone(), "fr"));
    }

    #[test]
    fn falsy_fourth_fallback_does_not_prevent_replacing() {
        assert_eq!(
            json!(["coalesce", ["get", "name:it"], ["get", "name:en"], ["get", "name"]]),
            prefer(
                json!([
                    "coalesce",
                    ["get", "name:ja"],
                    ["get", "name:en"],
                    ["get", "name"],
                    ""
                ]),
                "it"
            )
        );
    }

    #[test]
    fn chain_not_starting_with_localized_name_is_kept() {
        for expression in [
            json!(["coalesce", ["get", "name"], ["get", "name:en"]]),
            json!(["coalesce", ["get", "ref"], ["get", "name"]]),
            json!(["coalesce", "literal", ["get", "name"]]),
            json!(["coalesce", ["get", "name:ja"], "literal"]),
            json!(["coalesce", ["get", "name:ja"]]),
        ] {
            assert_eq!(expression, prefer(expression.clone(), "de"));
        }
    }

    #[test]
    fn second_fallback_may_be_any_get() {
        assert_eq!(
            json!(["coalesce", ["get", "name:es"], ["get", "name:en"], ["get", "name"]]),
            prefer(
                json!(["coalesce", ["get", "name:ja"], ["get", "name", ["properties"]]]),
                "es"
            )
        );
    }

    #[test]
    fn first_fallback_may_be_a_get_with_an_object() {
        assert_eq!(
            json!(["coalesce", ["get", "name:fr"], ["get", "name:en"], ["get", "name"]]),
            prefer(
                json!(["coalesce", ["get", "name:ja", ["properties"]], ["get", "name"]]),
                "fr"
            )
        );

        // Still has to be a localized name.
        let expression = json!(["coalesce", ["get", "ref", ["properties"]], ["get", "name"]]);
        assert_eq!(expression, prefer(expression.clone(), "fr"));
    }

    #[test]
    fn nested_chains_are_replaced() {
        assert_eq!(
            json!([
                "case",
                ["has", "ref"],
                ["coalesce", ["get", "name:ar"], ["get", "name:en"], ["get", "name"]],
                "fallback-literal"
            ]),
            prefer(
                json!([
                    "case",
                    ["has", "ref"],
                    ["coalesce", ["get", "name:de"], ["get", "name:en"], ["get", "name"]],
                    "fallback-literal"
                ]),
                "ar"
            )
        );
    }

    #[test]
    fn chains_nested_in_kept_chains_are_replaced() {
        assert_eq!(
            json!([
                "coalesce",
                ["get", "ref"],
                ["coalesce", ["get", "name:he"], ["get", "name:en"], ["get", "name"]],
                "",
                "x"
            ]),
            prefer(
                json!([
                    "coalesce",
                    ["get", "ref"],
                    ["coalesce", ["get", "name:ja"], ["get", "name:en"], ["get", "name"]],
                    "",
                    "x"
                ]),
                "he"
            )
        );
    }

    #[test]
    fn preferring_language_is_idempotent() {
        let expression = json!([
            "format",
            ["coalesce", ["get", "name:ja"], ["get", "name:en"], ["get", "name"]],
            {}
        ]);

        let once = prefer(expression, "vi");
        let twice = prefer(once.clone(), "vi");
        assert_eq!(once, twice);
    }
}
