use bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime, Document};
use chrono::{DateTime, Utc};
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::{
    schema::{FieldKind, Schema},
    util::slug::slugify,
    validation::{is_email, is_website, max_length, Validation, ValidationError},
};

pub const COLLECTION: &str = "bootcamps";

pub static SCHEMA: Schema = Schema::new(
    COLLECTION,
    &[
        ("name", FieldKind::String),
        ("slug", FieldKind::String),
        ("description", FieldKind::String),
        ("website", FieldKind::String),
        ("phone", FieldKind::String),
        ("email", FieldKind::String),
        ("address", FieldKind::String),
        ("location", FieldKind::Embedded),
        ("location.formattedAddress", FieldKind::String),
        ("location.street", FieldKind::String),
        ("location.city", FieldKind::String),
        ("location.state", FieldKind::String),
        ("location.zipcode", FieldKind::String),
        ("location.country", FieldKind::String),
        ("careers", FieldKind::StringList),
        ("averageRating", FieldKind::Number),
        ("averageCost", FieldKind::Number),
        ("photo", FieldKind::String),
        ("housing", FieldKind::Boolean),
        ("jobAssistance", FieldKind::Boolean),
        ("jobGuarantee", FieldKind::Boolean),
        ("acceptGi", FieldKind::Boolean),
        ("user", FieldKind::ObjectId),
    ],
);

pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromStr)]
pub enum Career {
    #[serde(rename = "Web Development")]
    #[display("Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    #[display("Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    #[display("UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    #[display("Data Science")]
    DataScience,
    Business,
    Other,
}

/// A GeoJSON point with the address parts it was resolved from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Always `Point`
    #[serde(rename = "type", default = "point")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

fn point() -> String {
    "Point".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub careers: Vec<Career>,
    /// Calculated from the bootcamp's reviews
    #[serde(default)]
    pub average_rating: Option<f64>,
    /// Calculated from the bootcamp's courses
    #[serde(default)]
    pub average_cost: Option<f64>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// The publisher who owns the bootcamp
    pub user: ObjectId,
}

/// The request body for creating a [`Bootcamp`].
///
/// Required fields default to empty values so that all missing fields
/// are reported at once by [`CreateBootcamp::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBootcamp {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
    /// Resolved by the caller, addresses are not geocoded by the API
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub careers: Vec<Career>,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
}

impl CreateBootcamp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validation::new()
            .check(!self.name.trim().is_empty(), "Please add a name")
            .check(
                max_length(self.name.trim(), 50),
                "Name can not be more than 50 characters",
            )
            .check(!self.description.is_empty(), "Please add a description")
            .check(
                max_length(&self.description, 500),
                "Description can not be more than 500 characters",
            )
            .check_optional(
                self.website.as_deref(),
                is_website,
                "Please use a valid URL with HTTP or HTTPS",
            )
            .check_optional(
                self.phone.as_deref(),
                |phone| max_length(phone, 20),
                "Phone number can not be longer than 20 characters",
            )
            .check_optional(self.email.as_deref(), is_email, "Please add a valid email")
            .check(!self.address.trim().is_empty(), "Please add an address")
            .check(!self.careers.is_empty(), "Please add at least one career")
            .finish()
    }

    /// Creates the [`Bootcamp`] owned by `user` with a new [`ObjectId`].
    pub fn into_bootcamp(self, user: ObjectId) -> Bootcamp {
        let name = self.name.trim().to_string();

        Bootcamp {
            id: ObjectId::new(),
            slug: slugify(&name),
            name,
            description: self.description,
            website: self.website,
            phone: self.phone,
            email: self.email,
            address: self.address,
            location: self.location,
            careers: self.careers,
            average_rating: None,
            average_cost: None,
            photo: DEFAULT_PHOTO.to_string(),
            housing: self.housing,
            job_assistance: self.job_assistance,
            job_guarantee: self.job_guarantee,
            accept_gi: self.accept_gi,
            created_at: Utc::now(),
            user,
        }
    }
}

/// The request body for updating a [`Bootcamp`], only the present fields are changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyBootcamp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub careers: Option<Vec<Career>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_assistance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_guarantee: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_gi: Option<bool>,
}

impl ModifyBootcamp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validation::new()
            .check_optional(
                self.name.as_deref(),
                |name| !name.trim().is_empty(),
                "Please add a name",
            )
            .check_optional(
                self.name.as_deref(),
                |name| max_length(name.trim(), 50),
                "Name can not be more than 50 characters",
            )
            .check_optional(
                self.description.as_deref(),
                |description| !description.is_empty(),
                "Please add a description",
            )
            .check_optional(
                self.description.as_deref(),
                |description| max_length(description, 500),
                "Description can not be more than 500 characters",
            )
            .check_optional(
                self.website.as_deref(),
                is_website,
                "Please use a valid URL with HTTP or HTTPS",
            )
            .check_optional(
                self.phone.as_deref(),
                |phone| max_length(phone, 20),
                "Phone number can not be longer than 20 characters",
            )
            .check_optional(self.email.as_deref(), is_email, "Please add a valid email")
            .check_optional(
                self.address.as_deref(),
                |address| !address.trim().is_empty(),
                "Please add an address",
            )
            .check_optional(
                self.careers.as_ref(),
                |careers| !careers.is_empty(),
                "Please add at least one career",
            )
            .finish()
    }

    /// The `$set` document of the update, a new `name` also changes the `slug`.
    pub fn into_changes(mut self) -> Result<Document, bson::ser::Error> {
        let slug = self.name.as_mut().map(|name| {
            *name = name.trim().to_string();
            slugify(name)
        });

        let mut changes = bson::to_document(&self)?;
        if let Some(slug) = slug {
            changes.insert("slug", slug);
        }

        Ok(changes)
    }
}
