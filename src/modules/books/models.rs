use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, DeserializeAs};
use utoipa::ToSchema;

use super::entity;

/// A stored book as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    /// Identity assigned by the store on creation
    pub id: i64,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Genre of the book
    pub genre: String,
    /// Publication year
    pub year: i32,
    /// Reader rating
    pub rating: f64,
}

/// Request body for creating or replacing a book.
///
/// Any `id` in the body is ignored; the path or the store decides it.
/// `year` and `rating` also accept numeric strings such as `"1965"`, as
/// submitted by HTML forms; see [`FormNumber`].
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookInput {
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Genre of the book
    pub genre: String,
    /// Publication year
    #[serde_as(deserialize_as = "FormNumber")]
    pub year: i32,
    /// Reader rating
    #[serde_as(deserialize_as = "FormNumber")]
    pub rating: f64,
}

/// Lenient number decoding for form-driven clients.
///
/// Accepts a JSON number or a numeric string. A blank string decodes as
/// zero. Non-finite floats (`"NaN"`, `"inf"`) are rejected.
pub struct FormNumber;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

fn parse_text<T, E>(text: &str) -> Result<T, E>
where
    T: FromStr + Default,
    T::Err: std::fmt::Display,
    E: de::Error,
{
    let text = text.trim();
    if text.is_empty() {
        return Ok(T::default());
    }
    text.parse()
        .map_err(|e| E::custom(format!("invalid number '{}': {}", text, e)))
}

impl<'de> DeserializeAs<'de, i32> for FormNumber {
    fn deserialize_as<D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumberOrText::<i32>::deserialize(deserializer)? {
            NumberOrText::Number(n) => Ok(n),
            NumberOrText::Text(text) => parse_text(&text),
        }
    }
}

impl<'de> DeserializeAs<'de, f64> for FormNumber {
    fn deserialize_as<D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match NumberOrText::<f64>::deserialize(deserializer)? {
            NumberOrText::Number(n) => n,
            NumberOrText::Text(text) => parse_text::<f64, D::Error>(&text)?,
        };
        if !value.is_finite() {
            return Err(de::Error::custom(format!(
                "number must be finite, got {}",
                value
            )));
        }
        Ok(value)
    }
}

impl From<entity::Model> for Book {
    fn from(model: entity::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            genre: model.genre,
            year: model.year,
            rating: model.rating,
        }
    }
}
