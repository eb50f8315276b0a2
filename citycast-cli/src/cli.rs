use anyhow::Context;
use citycast_core::{
    Config, Event, Session, UnitMode, provider::provider_from_config, units::toggle_label,
};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use tracing::info;

use crate::render::render_state;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "City weather lookup with a 5-day forecast")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv). Logs go to stderr.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key, default city and units.
    Configure,

    /// Look up current weather and forecast once.
    Show {
        /// City name; defaults to the configured city.
        city: Option<String>,

        /// Unit system requested from the service: metric or imperial.
        #[arg(long)]
        units: Option<UnitMode>,
    },

    /// Search and toggle units in a loop.
    Interactive {
        /// Starting city; defaults to the configured city.
        city: Option<String>,

        #[arg(long)]
        units: Option<UnitMode>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, units } => {
                let mut session = open_session(city, units)?;
                session.dispatch(Event::Mount).await;
                print!("{}", render_state(session.state()));
                Ok(())
            }
            Command::Interactive { city, units } => {
                let session = open_session(city, units)?;
                interactive(session).await
            }
        }
    }
}

fn open_session(city: Option<String>, units: Option<UnitMode>) -> anyhow::Result<Session> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let query = city.unwrap_or_else(|| config.default_city.clone());
    Ok(Session::new(provider, query, units.unwrap_or(config.units)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    config.default_city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;

    let starting = UnitMode::all().iter().position(|m| *m == config.units).unwrap_or(0);
    config.units = Select::new("Units requested from the service:", UnitMode::all().to_vec())
        .with_starting_cursor(starting)
        .prompt()
        .context("Failed to read unit mode")?;

    let path = config.save()?;
    info!(path = %path.display(), "configuration saved");
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn interactive(mut session: Session) -> anyhow::Result<()> {
    session.dispatch(Event::Mount).await;

    loop {
        println!();
        print!("{}", render_state(session.state()));
        println!();

        let search = "Search";
        let quit = "Quit";
        let toggle = toggle_label(session.state().units);

        let choice = match Select::new("What next?", vec![search, toggle, quit]).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read menu choice"),
        };

        if choice == search {
            let query = match Text::new("City:")
                .with_placeholder("Enter city, Country")
                .with_initial_value(&session.state().query)
                .prompt()
            {
                Ok(query) => query,
                Err(InquireError::OperationCanceled) => continue,
                Err(InquireError::OperationInterrupted) => break,
                Err(e) => return Err(e).context("Failed to read city"),
            };
            session.dispatch(Event::QueryChanged(query)).await;
            session.dispatch(Event::Submit).await;
        } else if choice == toggle {
            session.dispatch(Event::ToggleUnits).await;
        } else {
            break;
        }
    }

    Ok(())
}
