//! Fills a database with demo news and, optionally, a staff account.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Days, Utc};
use clap::Parser;
use pb_auth_simple::SimpleAuthProvider;
use pb_config::Settings;
use pb_core::accounts::{AccountService, RegistrationInput};
use pb_core::content::ContentFilter;
use pb_core::models::NewNewsItem;
use pb_core::news::NewsService;
use pb_db_sqlite::SqliteRepo;
use tracing_subscriber::EnvFilter;

/// `seed` command arguments.
#[derive(Debug, Parser)]
#[command(name = "seed", about = "Publish demo news items into a Paperboard database", version)]
struct CliArgs {
    /// How many news items to publish, one per day going back from today.
    #[arg(long, default_value_t = 12)]
    count: u64,
    /// Database URL. Falls back to `database.url` from the configuration.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Also create a staff account with this username.
    #[arg(long = "staff-username", requires = "staff_password")]
    staff_username: Option<String>,
    #[arg(long = "staff-password", requires = "staff_username")]
    staff_password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = CliArgs::parse();
    let settings = Settings::load()?;
    let url = args.database_url.as_deref().unwrap_or(&settings.database.url);
    let repo = Arc::new(SqliteRepo::new(url).await.context("failed to open the database")?);

    let news = NewsService::new(
        repo.clone(),
        ContentFilter::new(&settings.news.bad_words),
        settings.news.per_page,
    );
    let today = Utc::now().date_naive();
    for n in 0..args.count {
        let date = today
            .checked_sub_days(Days::new(n))
            .context("date out of range")?;
        news.publish(NewNewsItem {
            title: format!("Новость {}", n + 1),
            text: format!("Просто текст новости номер {}.", n + 1),
            date,
        })
        .await?;
    }
    tracing::info!(count = args.count, "news published");

    if let (Some(username), Some(password)) = (args.staff_username, args.staff_password) {
        let accounts = AccountService::new(repo, Arc::new(SimpleAuthProvider::new()));
        let input = RegistrationInput {
            username,
            password1: password.clone(),
            password2: password,
        };
        let user = accounts.register_staff(&input).await?;
        tracing::info!(username = %user.username, "staff account created");
    }

    Ok(())
}
