#![deny(clippy::all)]
#![deny(rust_2018_idioms)]

use std::{collections::HashMap, error::Error, sync::Arc};

use clap::{crate_version, Arg, Command};
use slog::{info, warn, Level};

use devcamper::{
    application::EnvConfig,
    authenticator::StaticTokens,
    db::{DocumentStore, MemoryStore, MongoStore},
    Application,
};
use primitives::{
    config::{configuration, Environment},
    util::logging::new_logger,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Command::new("DevCamper")
        .version(crate_version!())
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("the config file for the DevCamper API")
                .takes_value(true),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .short('t')
                .help("the TOML file with the `[tokens]` table of auth tokens and their user ids")
                .takes_value(true),
        )
        .arg(
            Arg::new("memory")
                .long("memory")
                .short('m')
                .help("keep all the data in memory instead of MongoDB")
                .takes_value(false),
        )
        .get_matches();

    let env_config = EnvConfig::from_env()?;
    let config = configuration(env_config.env, cli.value_of("config"))?;

    let level = match env_config.env {
        Environment::Development => Level::Debug,
        Environment::Production => Level::Info,
    };
    let logger = new_logger("devcamper", level);

    let authenticator = match cli.value_of("tokens") {
        Some(tokens_file) => StaticTokens::from_file(tokens_file)?,
        None => {
            warn!(&logger, "No auth tokens file provided, only the public routes are available"; "main" => "main");

            StaticTokens::new(HashMap::new())
        }
    };

    let store: Arc<dyn DocumentStore> = if cli.is_present("memory") {
        info!(&logger, "Using the in-memory store"; "main" => "main");

        Arc::new(MemoryStore::new())
    } else {
        info!(
            &logger,
            "Connecting to MongoDB database `{}`", env_config.mongodb_database; "main" => "main"
        );

        Arc::new(MongoStore::connect(&env_config.mongodb_url, &env_config.mongodb_database).await?)
    };

    Application::new(authenticator, config, env_config.env, logger, store)
        .run(env_config.socket_addr())
        .await;

    Ok(())
}
