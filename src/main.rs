mod auth;
mod config;
mod domain;
mod ledger;
mod session;
mod store;
mod validation;

use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, DEFAULT_LOG_FILTER};
use crate::domain::Error;
use crate::ledger::Ledger;
use crate::session::Session;
use crate::store::JsonFileStore;

#[tokio::main] // using Tokio runtime for async
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout belongs to the console session.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    let store = JsonFileStore::new(&config.data_path);
    info!(path = %store.path().display(), "using ledger file");

    let mut ledger = Ledger::load(&store).await;
    let mut session = Session::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());

    let username = match session.login(&ledger).await {
        Ok(username) => username,
        Err(Error::AuthenticationExhausted | Error::InputClosed) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    // Whatever the menu loop ran into, keep what the session already did.
    let outcome = session.run(&mut ledger, &username).await;
    ledger.save(&store).await?;
    outcome?;

    println!("Thank you for using the banking application!");
    Ok(())
}
