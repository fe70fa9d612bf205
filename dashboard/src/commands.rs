//! Terminal command parsing

use std::str::FromStr;

use shared::PredictionForm;
use thiserror::Error;

use crate::error::DashboardResult;
use crate::workflow::{Settlement, WorkflowOrchestrator};

/// One line typed at the dashboard prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `location <town>, <state>`
    Location { town: String, state: String },
    Refresh,
    /// Open the prediction form; the fields are prompted for one by one
    Predict,
    Ask(String),
    Status,
    States,
    Help,
    Quit,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`; type `help` for the list")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        match keyword.to_ascii_lowercase().as_str() {
            "location" | "loc" => {
                let (town, state) = rest
                    .split_once(',')
                    .ok_or(CommandError::Usage("location <town>, <state>"))?;
                Ok(Command::Location {
                    town: town.trim().to_string(),
                    state: state.trim().to_string(),
                })
            }
            "refresh" => Ok(Command::Refresh),
            "predict" => Ok(Command::Predict),
            "ask" => Ok(Command::Ask(rest.to_string())),
            "status" | "" => Ok(Command::Status),
            "states" => Ok(Command::States),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Submit a prediction form that was filled in at the prompt
///
/// The prompt has already been left by the time the form is submitted, so a
/// rejected form also closes the prediction modal instead of leaving it open
/// with nothing to re-enter it.
pub async fn submit_prompted_prediction(
    orchestrator: &WorkflowOrchestrator,
    form: PredictionForm,
) -> DashboardResult<Settlement> {
    let result = orchestrator.submit_prediction(form).await;
    if matches!(&result, Err(e) if e.is_rejected_before_request()) {
        orchestrator.dismiss_prediction_form();
    }
    result
}

pub const HELP: &str = "\
Commands:
  location <town>, <state>   save your farm location and load its weather
  refresh                    reload the weather for the saved location
  predict                    fill in the yield prediction form
  ask <question>             ask the agronomy assistant
  status                     show the dashboard
  states                     list accepted state names
  quit                       leave the dashboard";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        let command: Command = "location  Jaipur ,  Rajasthan ".parse().unwrap();
        assert_eq!(
            command,
            Command::Location {
                town: "Jaipur".to_string(),
                state: "Rajasthan".to_string(),
            }
        );
    }

    #[test]
    fn test_location_needs_comma() {
        assert_eq!(
            "location Jaipur".parse::<Command>(),
            Err(CommandError::Usage("location <town>, <state>"))
        );
    }

    #[test]
    fn test_parse_ask_keeps_question_text() {
        let command: Command = "ASK  how much water does rice need?".parse().unwrap();
        assert_eq!(
            command,
            Command::Ask("how much water does rice need?".to_string())
        );
        // blank questions are left for the orchestrator to skip
        assert_eq!("ask".parse::<Command>(), Ok(Command::Ask(String::new())));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!("refresh".parse::<Command>(), Ok(Command::Refresh));
        assert_eq!("predict".parse::<Command>(), Ok(Command::Predict));
        assert_eq!("".parse::<Command>(), Ok(Command::Status));
        assert_eq!("states".parse::<Command>(), Ok(Command::States));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
        assert_eq!(
            "harvest".parse::<Command>(),
            Err(CommandError::Unknown("harvest".to_string()))
        );
    }
}
