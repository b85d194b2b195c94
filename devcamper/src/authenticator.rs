//! Validation of the Bearer tokens of the requests.
//!
//! Issuing tokens is done outside of the API,
//! the [`Authenticator`] only resolves a token to the [`ObjectId`] of a user.
use std::{collections::HashMap, fmt, path::Path};

use async_trait::async_trait;
use bson::oid::ObjectId;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Token is not valid")]
    InvalidToken,
}

#[async_trait]
pub trait Authenticator: fmt::Debug + Send + Sync {
    /// Returns the user authenticated by `token`.
    async fn verify(&self, token: &str) -> Result<ObjectId, AuthenticationError>;
}

#[derive(Debug, Error)]
pub enum TokensError {
    #[error("Tokens file reading: {0}")]
    File(#[from] std::io::Error),
    #[error("Tokens file parsing: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A fixed map of tokens, e.g. loaded from a Toml file:
///
/// ```toml
/// [tokens]
/// AUTH_ADMIN = "5c8a1d5b0190b214360dc031"
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticTokens {
    tokens: HashMap<String, ObjectId>,
}

impl StaticTokens {
    pub fn new(tokens: HashMap<String, ObjectId>) -> Self {
        Self { tokens }
    }

    pub fn from_toml(toml: &str) -> Result<Self, toml::de::Error> {
        #[derive(Deserialize)]
        struct TokensFile {
            tokens: HashMap<String, String>,
        }

        let file = toml::from_str::<TokensFile>(toml)?;

        let tokens = file
            .tokens
            .into_iter()
            .map(|(token, user)| {
                ObjectId::parse_str(&user)
                    .map(|user| (token, user))
                    .map_err(<toml::de::Error as serde::de::Error>::custom)
            })
            .collect::<Result<_, toml::de::Error>>()?;

        Ok(Self { tokens })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TokensError> {
        let content = std::fs::read_to_string(path)?;

        Ok(Self::from_toml(&content)?)
    }
}

#[async_trait]
impl Authenticator for StaticTokens {
    async fn verify(&self, token: &str) -> Result<ObjectId, AuthenticationError> {
        self.tokens
            .get(token)
            .copied()
            .ok_or(AuthenticationError::InvalidToken)
    }
}
