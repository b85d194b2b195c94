//! Testing utilities for the DevCamper Application

use std::sync::Arc;

use serde::Serialize;

use primitives::{
    config::{Environment, DEVELOPMENT_CONFIG},
    test_util::{DUMMY_AUTH, DUMMY_USERS},
    user,
    util::logging::discard_logger,
};

use crate::{
    authenticator::StaticTokens,
    db::{insert_item, MemoryStore},
    Application,
};

/// Uses the development configuration, the [`MemoryStore`] with all the
/// dummy users and the static dummy auth tokens.
pub async fn setup_dummy_app() -> Application<StaticTokens> {
    let store = Arc::new(MemoryStore::new());

    for dummy_user in DUMMY_USERS.iter() {
        insert_item(store.as_ref(), user::COLLECTION, dummy_user)
            .await
            .expect("Should insert dummy user");
    }

    Application::new(
        StaticTokens::new(DUMMY_AUTH.clone()),
        DEVELOPMENT_CONFIG.clone(),
        Environment::Development,
        discard_logger(),
        store,
    )
}

/// Inserts the items in the `collection` of the application's store.
pub async fn seed<T: Serialize>(app: &Application<StaticTokens>, collection: &str, items: &[T]) {
    for item in items {
        insert_item(app.store.as_ref(), collection, item)
            .await
            .expect("Should insert seeded item");
    }
}
