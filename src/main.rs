// Entrypoint for the CLI application.
// - Keeps `main` small: load configuration, build the API client and the
//   thread store, and hand them to the menu loop.
// - Returns `anyhow::Result` so fatal errors (unreadable upload file,
//   corrupt thread store) end the process with a message.

use anyhow::Result;
use oai_tools::actions::Session;
use oai_tools::api::ApiClient;
use oai_tools::config::{dotenv_problem, Config};
use oai_tools::store::ThreadStore;
use oai_tools::ui::{main_menu, TerminalPrompt};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // A `.env` in the working directory may provide OPENAI_API_KEY (and
    // OAI_TOOLS_LOG, so load it before the subscriber). Report problems
    // once logging is up.
    let dotenv = dotenvy::dotenv();

    // Diagnostics go to stderr so they never interleave with menu output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("OAI_TOOLS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(err) = dotenv_problem(dotenv) {
        tracing::warn!(error = %err, "ignoring unreadable .env file");
    }

    let config = Config::from_env();
    let api = ApiClient::new(&config)?;
    let store = ThreadStore::new(config.store_path()?);
    tracing::debug!(base_url = %config.base_url, store = %store.path().display(), "starting");

    let mut input = TerminalPrompt::new();
    let mut stdout = std::io::stdout();
    let mut session = Session {
        api: &api,
        store: &store,
        input: &mut input,
        out: &mut stdout,
    };

    // Blocks until the user types `exit`.
    main_menu(&mut session)?;
    Ok(())
}
