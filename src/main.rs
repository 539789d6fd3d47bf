use manager_tasks::accounts::AccountStore;
use manager_tasks::api::{fetch_accounts, RemoteStatusNotifier};
use manager_tasks::app::App;
use manager_tasks::config::Config;
use manager_tasks::dashboard::Dashboard;
use manager_tasks::logging;
use manager_tasks::session::SessionManager;
use manager_tasks::storage::{FileStorage, Storage};
use manager_tasks::ui::run_app;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dotenv::dotenv;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tracing::{error, info, warn};

const SAMPLE_ACCOUNTS: &str = include_str!("../data/accounts.json");

// First run gets the bundled demo accounts
fn open_accounts(path: &Path) -> Result<AccountStore, Box<dyn std::error::Error>> {
    if !path.exists() {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, SAMPLE_ACCOUNTS)?;
        info!(path = %path.display(), "wrote sample accounts");
    }
    Ok(AccountStore::open(path)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::load()?;
    logging::setup(&config.log_file(), &config.log_filter)?;
    info!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "starting");

    let mut accounts = open_accounts(&config.accounts_path)?;

    // Prefer the backend's view of the accounts when it answers
    match tokio::time::timeout(Duration::from_secs(2), fetch_accounts(&config.api_url)).await {
        Ok(Ok(users)) => accounts.replace_users(users),
        Ok(Err(err)) => warn!(error = %err, "using local accounts file"),
        Err(_) => warn!("account backend timed out, using local accounts file"),
    }

    let storage: Rc<dyn Storage> = Rc::new(FileStorage::new(config.storage_dir()));
    let notifier = RemoteStatusNotifier::new(
        config.api_url.clone(),
        tokio::runtime::Handle::current(),
    );

    let mut session = SessionManager::new(accounts, storage.clone(), Box::new(notifier));
    if session.restore() {
        info!("restored previous session");
    }
    let dashboard = Dashboard::load(storage);

    // Setup terminal UI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.hide_cursor()?;

    let app = App::new(session, dashboard);

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "terminal loop failed");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
