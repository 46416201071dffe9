pub mod db;
pub mod model;
pub mod services;
pub mod utils;

use dotenv::dotenv;
use std::sync::Arc;
use db::json_file::JsonFileRepository;
use model::policy::CredentialPolicy;
use utils::audit::TracingAuditSink;
use utils::errors::CredentialError;
use utils::config::{Configuration, self};
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, Registry, util::SubscriberInitExt};

pub use services::CredentialStore;

const BANNER: &str = r#"
  ___              _ _            _        _   _
 | __|_ _ _ __ (_) |_  _   /_\  _  _| |_| |_
 | _/ _` | '  \| | | || | / _ \ || |  _| ' \
 |_|\__,_|_|_|_|_|_|\_, |/_/ \_\_,_|\__|_||_|
                    |__/
"#;

///
/// Build a CredentialStore from the environment (and any local .env file), backed by the JSON
/// accounts file and auditing to the log.
///
pub async fn open_from_env() -> Result<CredentialStore, CredentialError> {

    // Load any local dev settings as environment variables from a .env file.
    dotenv().ok();

    // Default log level to INFO if it's not specified.
    config::default_env("RUST_LOG", "INFO");

    let config = Configuration::from_env()?;

    init_tracing();

    tracing::info!("{}\n{}", BANNER, config.fmt_console()?);

    let policy = CredentialPolicy::try_from(&config)?;

    CredentialStore::open(
        Arc::new(JsonFileRepository::new(&config.accounts_file)),
        Arc::new(TracingAuditSink::default()),
        policy).await
}

///
/// Install a log subscriber honouring RUST_LOG. Safe to call more than once.
///
pub fn init_tracing() {
    if let Err(err) = Registry::default()
        .with(tracing_subscriber::EnvFilter::from_default_env()) // Set the tracing level to match RUST_LOG env variable.
        .with(tracing_subscriber::fmt::layer().with_test_writer().with_ansi(true))
        .try_init() {
            tracing::info!("Tracing already initialised: {}", err.to_string()); // Allowed error here - tests call this fn repeatedly.
    }
}
