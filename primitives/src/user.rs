use bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime, Document};
use chrono::{DateTime, Utc};
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::{
    schema::{FieldKind, Schema},
    validation::{is_email, Validation, ValidationError},
};

pub const COLLECTION: &str = "users";

pub static SCHEMA: Schema = Schema::new(
    COLLECTION,
    &[
        ("name", FieldKind::String),
        ("email", FieldKind::String),
        ("role", FieldKind::String),
    ],
);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, FromStr,
)]
#[serde(rename_all = "lowercase")]
#[display(style = "lowercase")]
pub enum Role {
    #[default]
    User,
    Publisher,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl CreateUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validation::new()
            .check(!self.name.trim().is_empty(), "Please add a name")
            .check(is_email(self.email.trim()), "Please add a valid email")
            .finish()
    }

    pub fn into_user(self) -> User {
        User {
            id: ObjectId::new(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            role: self.role,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl ModifyUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validation::new()
            .check_optional(
                self.name.as_deref(),
                |name| !name.trim().is_empty(),
                "Please add a name",
            )
            .check_optional(
                self.email.as_deref(),
                |email| is_email(email.trim()),
                "Please add a valid email",
            )
            .finish()
    }

    pub fn into_changes(mut self) -> Result<Document, bson::ser::Error> {
        if let Some(name) = self.name.as_mut() {
            *name = name.trim().to_string();
        }
        if let Some(email) = self.email.as_mut() {
            *email = email.trim().to_lowercase();
        }

        bson::to_document(&self)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn role_defaults_to_user() {
        let create = serde_json::from_value::<CreateUser>(json!({
            "name": "John Doe",
            "email": " John@Gmail.com ",
        }))
        .expect("Should deserialize");

        create.validate().expect("Should be valid");
        let user = create.into_user();

        assert_eq!(Role::User, user.role);
        assert_eq!("john@gmail.com", user.email);
    }

    #[test]
    fn role_serialization() {
        assert_eq!(json!("publisher"), serde_json::to_value(Role::Publisher).unwrap());
        assert_eq!(Some(Role::Admin), "admin".parse().ok());
        assert_eq!("user", Role::User.to_string());
        assert!(serde_json::from_value::<Role>(json!("owner")).is_err());
    }

    #[test]
    fn invalid_users() {
        let create = CreateUser::default();
        assert_eq!(
            vec!["Please add a name", "Please add a valid email"],
            create.validate().expect_err("Should be invalid").0
        );

        let modify = ModifyUser {
            email: Some("@devcamper".to_string()),
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert!(modify.validate().is_err());
    }
}
