//! Dummy users, bootcamps, courses and reviews shared by the tests of all crates.
use std::collections::HashMap;

use bson::oid::ObjectId;
use chrono::{DateTime, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;

use crate::{
    bootcamp::{Bootcamp, Career, Location, DEFAULT_PHOTO},
    course::{Course, MinimumSkill},
    review::Review,
    user::{Role, User},
    util::slug::slugify,
};

pub static ADMIN_ID: Lazy<ObjectId> = Lazy::new(|| object_id("5c8a1d5b0190b214360dc031"));
pub static PUBLISHER_ID: Lazy<ObjectId> = Lazy::new(|| object_id("5d7a514b5d2c12c7449be045"));
pub static PUBLISHER_2_ID: Lazy<ObjectId> = Lazy::new(|| object_id("5d7a514b5d2c12c7449be046"));
pub static USER_ID: Lazy<ObjectId> = Lazy::new(|| object_id("5c8a1d5b0190b214360dc033"));
pub static USER_2_ID: Lazy<ObjectId> = Lazy::new(|| object_id("5c8a1d5b0190b214360dc034"));

pub static ADMIN_TOKEN: &str = "AUTH_ADMIN";
pub static PUBLISHER_TOKEN: &str = "AUTH_PUBLISHER";
pub static PUBLISHER_2_TOKEN: &str = "AUTH_PUBLISHER_2";
pub static USER_TOKEN: &str = "AUTH_USER";
pub static USER_2_TOKEN: &str = "AUTH_USER_2";

/// Every dummy auth token and the user it authenticates.
pub static DUMMY_AUTH: Lazy<HashMap<String, ObjectId>> = Lazy::new(|| {
    [
        (ADMIN_TOKEN, *ADMIN_ID),
        (PUBLISHER_TOKEN, *PUBLISHER_ID),
        (PUBLISHER_2_TOKEN, *PUBLISHER_2_ID),
        (USER_TOKEN, *USER_ID),
        (USER_2_TOKEN, *USER_2_ID),
    ]
    .into_iter()
    .map(|(token, user)| (token.to_string(), user))
    .collect()
});

pub static DUMMY_USERS: Lazy<[User; 5]> = Lazy::new(|| {
    [
        dummy_user(*ADMIN_ID, "Admin Account", Role::Admin),
        dummy_user(*PUBLISHER_ID, "Publisher Account", Role::Publisher),
        dummy_user(*PUBLISHER_2_ID, "Second Publisher", Role::Publisher),
        dummy_user(*USER_ID, "User Account", Role::User),
        dummy_user(*USER_2_ID, "Second User", Role::User),
    ]
});

fn first_created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap()
}

fn object_id(hex: &str) -> ObjectId {
    ObjectId::parse_str(hex).expect("Should be a valid ObjectId")
}

fn dummy_user(id: ObjectId, name: &str, role: Role) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@devcamper.io", slugify(name)),
        role,
        created_at: first_created_at(),
    }
}

/// A bootcamp owned by `user`, created `minutes` after the first dummy one.
pub fn dummy_bootcamp(name: &str, user: ObjectId, minutes: i64) -> Bootcamp {
    Bootcamp {
        id: ObjectId::new(),
        name: name.to_string(),
        slug: slugify(name),
        description: format!("{} is a full stack bootcamp", name),
        website: Some("https://devcamper.io".to_string()),
        phone: Some("(111) 111-1111".to_string()),
        email: Some("enroll@devcamper.io".to_string()),
        address: "233 Bay State Rd Boston MA 02215".to_string(),
        location: Some(Location {
            kind: "Point".to_string(),
            coordinates: vec![-71.104028, 42.350846],
            formatted_address: Some("233 Bay State Rd, Boston, MA 02215-1405, US".to_string()),
            street: Some("233 Bay State Rd".to_string()),
            city: Some("Boston".to_string()),
            state: Some("MA".to_string()),
            zipcode: Some("02215-1405".to_string()),
            country: Some("US".to_string()),
        }),
        careers: vec![Career::WebDevelopment, Career::UiUx],
        average_rating: None,
        average_cost: None,
        photo: DEFAULT_PHOTO.to_string(),
        housing: false,
        job_assistance: true,
        job_guarantee: false,
        accept_gi: true,
        created_at: first_created_at() + Duration::minutes(minutes),
        user,
    }
}

pub fn dummy_course(title: &str, tuition: f64, bootcamp: &Bootcamp) -> Course {
    Course {
        id: ObjectId::new(),
        title: title.to_string(),
        description: format!("{} course", title),
        weeks: "8".to_string(),
        tuition,
        minimum_skill: MinimumSkill::Beginner,
        scholarship_available: false,
        created_at: bootcamp.created_at + Duration::minutes(1),
        bootcamp: bootcamp.id,
        user: bootcamp.user,
    }
}

pub fn dummy_review(rating: u8, bootcamp: &Bootcamp, user: ObjectId) -> Review {
    Review {
        id: ObjectId::new(),
        title: format!("Rated {}", rating),
        text: "Learned a lot".to_string(),
        rating,
        created_at: bootcamp.created_at + Duration::minutes(2),
        bootcamp: bootcamp.id,
        user,
    }
}
