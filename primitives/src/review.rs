use bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    schema::{FieldKind, Schema},
    validation::{max_length, Validation, ValidationError},
};

pub const COLLECTION: &str = "reviews";

pub static SCHEMA: Schema = Schema::new(
    COLLECTION,
    &[
        ("title", FieldKind::String),
        ("text", FieldKind::String),
        ("rating", FieldKind::Number),
        ("bootcamp", FieldKind::ObjectId),
        ("user", FieldKind::ObjectId),
    ],
);

/// Inclusive bounds of a review's rating.
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub text: String,
    pub rating: u8,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    pub bootcamp: ObjectId,
    pub user: ObjectId,
}

fn valid_rating(rating: &u8) -> bool {
    RATING_RANGE.contains(rating)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    pub rating: Option<u8>,
}

impl CreateReview {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validation::new()
            .check(
                !self.title.trim().is_empty(),
                "Please add a title for the review",
            )
            .check(
                max_length(self.title.trim(), 100),
                "Title can not be more than 100 characters",
            )
            .check(!self.text.is_empty(), "Please add some text")
            .check(
                self.rating.as_ref().map_or(false, valid_rating),
                "Please add a rating between 1 and 10",
            )
            .finish()
    }

    pub fn into_review(self, bootcamp: ObjectId, user: ObjectId) -> Result<Review, ValidationError> {
        self.validate()?;

        Ok(Review {
            id: ObjectId::new(),
            title: self.title.trim().to_string(),
            text: self.text,
            // checked by `validate()`
            rating: self.rating.unwrap_or_default(),
            created_at: Utc::now(),
            bootcamp,
            user,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyReview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

impl ModifyReview {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validation::new()
            .check_optional(
                self.title.as_deref(),
                |title| !title.trim().is_empty(),
                "Please add a title for the review",
            )
            .check_optional(
                self.title.as_deref(),
                |title| max_length(title.trim(), 100),
                "Title can not be more than 100 characters",
            )
            .check_optional(
                self.text.as_deref(),
                |text| !text.is_empty(),
                "Please add some text",
            )
            .check_optional(
                self.rating.as_ref(),
                valid_rating,
                "Please add a rating between 1 and 10",
            )
            .finish()
    }

    pub fn into_changes(mut self) -> Result<Document, bson::ser::Error> {
        if let Some(title) = self.title.as_mut() {
            *title = title.trim().to_string();
        }

        bson::to_document(&self)
    }
}

/// The mean rating, `None` without any reviews.
pub fn average_rating(ratings: &[f64]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }

    Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
}
