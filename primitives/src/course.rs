use bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime, Document};
use chrono::{DateTime, Utc};
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::{
    schema::{FieldKind, Schema},
    validation::{Validation, ValidationError},
};

pub const COLLECTION: &str = "courses";

pub static SCHEMA: Schema = Schema::new(
    COLLECTION,
    &[
        ("title", FieldKind::String),
        ("description", FieldKind::String),
        ("weeks", FieldKind::String),
        ("tuition", FieldKind::Number),
        ("minimumSkill", FieldKind::String),
        ("scholarshipAvailable", FieldKind::Boolean),
        ("bootcamp", FieldKind::ObjectId),
        ("user", FieldKind::ObjectId),
    ],
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, FromStr)]
#[serde(rename_all = "lowercase")]
#[display(style = "lowercase")]
pub enum MinimumSkill {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: MinimumSkill,
    pub scholarship_available: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    pub bootcamp: ObjectId,
    pub user: ObjectId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub weeks: String,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<MinimumSkill>,
    #[serde(default)]
    pub scholarship_available: bool,
}

impl CreateCourse {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validation::new()
            .check(!self.title.trim().is_empty(), "Please add a course title")
            .check(!self.description.is_empty(), "Please add a description")
            .check(!self.weeks.trim().is_empty(), "Please add number of weeks")
            .check(self.tuition.is_some(), "Please add a tuition cost")
            .check_optional(
                self.tuition.as_ref(),
                |tuition| tuition.is_finite() && *tuition >= 0.0,
                "Tuition cost can not be negative",
            )
            .check(self.minimum_skill.is_some(), "Please add a minimum skill")
            .finish()
    }

    /// Fails with the same [`ValidationError`] as [`CreateCourse::validate`]
    /// if a required field is missing.
    pub fn into_course(self, bootcamp: ObjectId, user: ObjectId) -> Result<Course, ValidationError> {
        self.validate()?;

        match (self.tuition, self.minimum_skill) {
            (Some(tuition), Some(minimum_skill)) => Ok(Course {
                id: ObjectId::new(),
                title: self.title.trim().to_string(),
                description: self.description,
                weeks: self.weeks,
                tuition,
                minimum_skill,
                scholarship_available: self.scholarship_available,
                created_at: Utc::now(),
                bootcamp,
                user,
            }),
            _ => Err(ValidationError(vec![
                "Please add a tuition cost and a minimum skill".to_string(),
            ])),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyCourse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuition: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_skill: Option<MinimumSkill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholarship_available: Option<bool>,
}

impl ModifyCourse {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validation::new()
            .check_optional(
                self.title.as_deref(),
                |title| !title.trim().is_empty(),
                "Please add a course title",
            )
            .check_optional(
                self.description.as_deref(),
                |description| !description.is_empty(),
                "Please add a description",
            )
            .check_optional(
                self.weeks.as_deref(),
                |weeks| !weeks.trim().is_empty(),
                "Please add number of weeks",
            )
            .check_optional(
                self.tuition.as_ref(),
                |tuition| tuition.is_finite() && *tuition >= 0.0,
                "Tuition cost can not be negative",
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

/// The mean tuition rounded up to the next multiple of 10, `None` without any courses.
pub fn average_cost(tuitions: &[f64]) -> Option<f64> {
    if tuitions.is_empty() {
        return None;
    }

    let average = tuitions.iter().sum::<f64>() / tuitions.len() as f64;

    Some((average / 10.0).ceil() * 10.0)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn average_cost_is_rounded_up_to_tens() {
        assert_eq!(None, average_cost(&[]));
        assert_eq!(Some(10000.0), average_cost(&[10000.0]));
        // (8000 + 12001) / 2 = 10000.5
        assert_eq!(Some(10010.0), average_cost(&[8000.0, 12001.0]));
        assert_eq!(Some(20.0), average_cost(&[11.0, 12.0, 13.0]));
    }

    #[test]
    fn minimum_skill_serialization() {
        assert_eq!(
            json!("intermediate"),
            serde_json::to_value(MinimumSkill::Intermediate).unwrap()
        );
        assert_eq!(Some(MinimumSkill::Advanced), "advanced".parse().ok());
        assert!(serde_json::from_value::<MinimumSkill>(json!("expert")).is_err());
    }

    #[test]
    fn create_course_validation() {
        let missing = serde_json::from_value::<CreateCourse>(json!({
            "title": " ",
            "tuition": -1.0,
        }))
        .expect("Should deserialize");

        assert_eq!(
            vec![
                "Please add a course title",
                "Please add a description",
                "Please add number of weeks",
                "Tuition cost can not be negative",
                "Please add a minimum skill",
            ],
            missing.validate().expect_err("Should be invalid").0
        );

        let (bootcamp, user) = (ObjectId::new(), ObjectId::new());
        let course = serde_json::from_value::<CreateCourse>(json!({
            "title": "Front End Web Development ",
            "description": "This course will provide you with all of the essentials",
            "weeks": "8",
            "tuition": 8000,
            "minimumSkill": "beginner",
            "scholarshipAvailable": true,
        }))
        .expect("Should deserialize")
        .into_course(bootcamp, user)
        .expect("Should be valid");

        assert_eq!("Front End Web Development", course.title);
        assert_eq!(8000.0, course.tuition);
        assert_eq!(MinimumSkill::Beginner, course.minimum_skill);
        assert!(course.scholarship_available);
        assert_eq!((bootcamp, user), (course.bootcamp, course.user));
    }

    #[test]
    fn modify_course_changes() {
        let modify = ModifyCourse {
            title: Some(" Full Stack ".to_string()),
            tuition: Some(12500.0),
            ..Default::default()
        };

        modify.validate().expect("Should be valid");
        assert_eq!(
            bson::doc! { "title": "Full Stack", "tuition": 12500.0 },
            modify.into_changes().expect("Should serialize")
        );
    }
}
