use serde::{Deserialize, Deserializer, Serialize};

pub type BookId = i64;

/// Flat book record as stored and listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub description: String,
    pub rating: f64,
    /// Fully-qualified cover image URL, empty when the book has no cover
    pub cover_url: String,
}

/// Payload for creating a book. Echoed back verbatim on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    /// Accepts `4.5` as well as `"4.5"`
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub rating: f64,
    pub cover_url: String,
}

impl NewBook {
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            rating: self.rating,
            cover_url: self.cover_url,
        }
    }
}

/// A book together with the text of every review, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub reviews: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub review: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddBookResponse {
    pub message: String,
    pub book: NewBook,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBooksQuery {
    #[serde(default, deserialize_with = "finite_number")]
    pub min_rating: f64,
}

fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Number(value) => value,
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid rating '{text}'")))?,
    };
    ensure_finite(value)
}

fn finite_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    ensure_finite(f64::deserialize(deserializer)?)
}

/// JSON has no encoding for NaN or infinity, so they never reach the store.
fn ensure_finite<E: serde::de::Error>(value: f64) -> Result<f64, E> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(E::custom(format!("rating must be a finite number, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rating_accepts_numeric_strings() {
        let book: NewBook = serde_json::from_value(json!({
            "title": "Dune",
            "author": "Herbert",
            "description": "Desert planet",
            "rating": " 4.5 ",
            "cover_url": ""
        }))
        .unwrap();
        assert_eq!(book.rating, 4.5);
    }

    #[test]
    fn rating_rejects_text() {
        let result = serde_json::from_value::<NewBook>(json!({
            "title": "Dune",
            "author": "Herbert",
            "description": "Desert planet",
            "rating": "great",
            "cover_url": ""
        }));
        assert!(result.is_err());
    }

    #[test]
    fn rating_rejects_non_finite_strings() {
        for rating in ["NaN", "inf", "-inf", "infinity"] {
            let result = serde_json::from_value::<NewBook>(json!({
                "title": "Dune",
                "author": "Herbert",
                "description": "Desert planet",
                "rating": rating,
                "cover_url": ""
            }));
            let err = result.expect_err(rating).to_string();
            assert!(err.contains("finite"), "{rating}: {err}");
        }
    }

    #[test]
    fn only_finite_values_pass() {
        assert_eq!(ensure_finite::<serde_json::Error>(3.0).unwrap(), 3.0);
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(ensure_finite::<serde_json::Error>(value).is_err());
        }
    }

    #[test]
    fn min_rating_defaults_to_zero() {
        let query: ListBooksQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.min_rating, 0.0);
    }

    #[test]
    fn details_serialize_flat() {
        let details = BookDetails {
            book: Book {
                id: 7,
                title: "Dune".to_string(),
                author: "Herbert".to_string(),
                description: "Desert planet".to_string(),
                rating: 4.5,
                cover_url: String::new(),
            },
            reviews: vec!["Spice!".to_string()],
        };

        assert_eq!(
            serde_json::to_value(&details).unwrap(),
            json!({
                "id": 7,
                "title": "Dune",
                "author": "Herbert",
                "description": "Desert planet",
                "rating": 4.5,
                "cover_url": "",
                "reviews": ["Spice!"]
            })
        );
    }
}
