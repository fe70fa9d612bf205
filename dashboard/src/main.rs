//! Krishi Mitra Dashboard - terminal front end
//!
//! Reads commands from stdin, runs each intent on the workflow orchestrator
//! and redraws the dashboard whenever its published state changes.

use dashboard::commands::{submit_prompted_prediction, Command, HELP};
use dashboard::view::render_dashboard;
use dashboard::{Config, DashboardError, WorkflowOrchestrator};
use shared::{IndianState, PredictionForm};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    init_tracing(&config);

    tracing::info!("Starting Krishi Mitra dashboard");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Back end: {}", config.api.base_url);

    let orchestrator = WorkflowOrchestrator::from_config(&config)?;

    // Redraw on every published change
    let mut views = orchestrator.subscribe();
    let renderer = tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            println!("\n{}", render_dashboard(&view));
        }
    });

    println!("{}", render_dashboard(&orchestrator.view()));
    println!("{}", HELP);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = input.next_line().await? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::Location { town, state } => {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    report(orchestrator.submit_location(&town, &state).await);
                });
            }
            Command::Refresh => {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    report(orchestrator.refresh_weather().await);
                });
            }
            Command::Predict => {
                if let Err(e) = orchestrator.open_prediction_form() {
                    println!("{}", e);
                    continue;
                }
                let Some(form) = read_prediction_form(&mut input).await? else {
                    orchestrator.dismiss_prediction_form();
                    println!("Prediction cancelled.");
                    continue;
                };
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    report(submit_prompted_prediction(&orchestrator, form).await);
                });
            }
            Command::Ask(question) => {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    report(orchestrator.ask_question(&question).await);
                });
            }
            Command::Status => println!("{}", render_dashboard(&orchestrator.view())),
            Command::States => {
                for state in IndianState::ALL {
                    println!("  {} ({})", state, state.region());
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    orchestrator.teardown();
    renderer.abort();
    tracing::info!("Dashboard closed");

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter.as_str().into());

    // Logs go to stderr so they do not interleave with the dashboard
    let (json, plain) = if config.logging.json {
        (
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
            None,
        )
    } else {
        (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .init();
}

/// Rejections surface immediately; request failures are already on the dashboard
fn report<T>(result: Result<T, DashboardError>) {
    if let Err(e) = result {
        println!("{}", e);
    }
}

async fn prompt(input: &mut Input, label: &str) -> std::io::Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{}: ", label).as_bytes()).await?;
    stdout.flush().await?;
    Ok(input.next_line().await?.map(|line| line.trim().to_string()))
}

/// Prompt for every field of the prediction form; `None` if cancelled
async fn read_prediction_form(input: &mut Input) -> std::io::Result<Option<PredictionForm>> {
    println!("Prediction form (type `cancel` at any prompt to close it)");

    let mut fields = Vec::with_capacity(5);
    for label in [
        "Soil type",
        "Crop",
        "Fertilizer used? (y/n)",
        "Irrigation used? (y/n)",
        "Days to harvest",
    ] {
        match prompt(input, label).await? {
            Some(value) if !value.eq_ignore_ascii_case("cancel") => fields.push(value),
            _ => return Ok(None),
        }
    }

    let [soil_type, crop, fertilizer, irrigation, days_to_harvest]: [String; 5] =
        match fields.try_into() {
            Ok(fields) => fields,
            Err(_) => return Ok(None),
        };

    Ok(Some(PredictionForm {
        soil_type,
        crop,
        fertilizer_used: is_yes(&fertilizer),
        irrigation_used: is_yes(&irrigation),
        days_to_harvest,
    }))
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.to_ascii_lowercase().as_str(),
        "y" | "yes" | "true" | "1"
    )
}
