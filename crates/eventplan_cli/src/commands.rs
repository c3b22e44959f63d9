//! Subcommand definitions and dispatch onto the engine.

use anyhow::Result;
use clap::Subcommand;
use eventplan_core::form::rules::{
    parse_comment_add, parse_comment_update, parse_event_create, parse_event_put,
    parse_participant_add, parse_participant_update, parse_term_add, parse_term_update,
};
use eventplan_core::{
    CommentId, EngineError, EventId, EventRepository, EventService, EventView, ParticipantId,
    Params, TermId,
};

use crate::Commands;

#[derive(Subcommand)]
pub enum TermCommands {
    /// Add a term (`term=NAME`)
    Add {
        id: u64,
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Rename a term (`term=NAME`)
    Update {
        id: u64,
        term_id: u64,
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Delete a term and its availability column
    Delete { id: u64, term_id: u64 },
}

#[derive(Subcommand)]
pub enum ParticipantCommands {
    /// Add a participant (`name=NAME [TERM_ID=VALUE]..`)
    Add {
        id: u64,
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Rename and/or set availability (`[name=NAME] [TERM_ID=VALUE]..`)
    Update {
        id: u64,
        participant_id: u64,
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Delete a participant and their availability row
    Delete { id: u64, participant_id: u64 },
}

#[derive(Subcommand)]
pub enum CommentCommands {
    /// Add a comment (`name=NAME body=TEXT`)
    Add {
        id: u64,
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Edit a comment (`[name=NAME] [body=TEXT]`)
    Update {
        id: u64,
        comment_id: u64,
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Delete a comment
    Delete { id: u64, comment_id: u64 },
}

/// Result of one command, ready for printing.
pub enum Outcome {
    Event(EventView),
    Deleted(EventId),
    Pong,
}

pub fn execute<R: EventRepository>(
    command: Commands,
    service: &EventService<R>,
) -> Result<Outcome> {
    let outcome = match command {
        Commands::Create { params } => {
            let (title, description) = parse_event_create(&to_params(&params)?)
                .map_err(EngineError::from)?;
            Outcome::Event(service.create(title, description)?)
        }
        Commands::Get { id } => Outcome::Event(service.get(EventId::new(id))?),
        Commands::Put { id, params } => {
            let request = parse_event_put(&to_params(&params)?).map_err(EngineError::from)?;
            Outcome::Event(service.put(EventId::new(id), &request)?)
        }
        Commands::Delete { id } => {
            service.delete(EventId::new(id))?;
            Outcome::Deleted(EventId::new(id))
        }
        Commands::Term(command) => Outcome::Event(term(command, service)?),
        Commands::Participant(command) => Outcome::Event(participant(command, service)?),
        Commands::Comment(command) => Outcome::Event(comment(command, service)?),
        Commands::Ping => Outcome::Pong,
    };
    Ok(outcome)
}

fn term<R: EventRepository>(
    command: TermCommands,
    service: &EventService<R>,
) -> Result<EventView> {
    let view = match command {
        TermCommands::Add { id, params } => {
            let name = parse_term_add(&to_params(&params)?).map_err(EngineError::from)?;
            service.add_term(EventId::new(id), name)?
        }
        TermCommands::Update {
            id,
            term_id,
            params,
        } => {
            let update = parse_term_update(&to_params(&params)?).map_err(EngineError::from)?;
            service.update_term(EventId::new(id), TermId::new(term_id), &update)?
        }
        TermCommands::Delete { id, term_id } => {
            service.delete_term(EventId::new(id), TermId::new(term_id))?
        }
    };
    Ok(view)
}

fn participant<R: EventRepository>(
    command: ParticipantCommands,
    service: &EventService<R>,
) -> Result<EventView> {
    let view = match command {
        ParticipantCommands::Add { id, params } => {
            let (name, availability) =
                parse_participant_add(&to_params(&params)?).map_err(EngineError::from)?;
            service.add_participant(EventId::new(id), name, &availability)?
        }
        ParticipantCommands::Update {
            id,
            participant_id,
            params,
        } => {
            let update =
                parse_participant_update(&to_params(&params)?).map_err(EngineError::from)?;
            service.update_participant(
                EventId::new(id),
                ParticipantId::new(participant_id),
                &update,
            )?
        }
        ParticipantCommands::Delete { id, participant_id } => {
            service.delete_participant(EventId::new(id), ParticipantId::new(participant_id))?
        }
    };
    Ok(view)
}

fn comment<R: EventRepository>(
    command: CommentCommands,
    service: &EventService<R>,
) -> Result<EventView> {
    let view = match command {
        CommentCommands::Add { id, params } => {
            let (name, body) =
                parse_comment_add(&to_params(&params)?).map_err(EngineError::from)?;
            service.add_comment(EventId::new(id), name, body)?
        }
        CommentCommands::Update {
            id,
            comment_id,
            params,
        } => {
            let update = parse_comment_update(&to_params(&params)?).map_err(EngineError::from)?;
            service.update_comment(EventId::new(id), CommentId::new(comment_id), &update)?
        }
        CommentCommands::Delete { id, comment_id } => {
            service.delete_comment(EventId::new(id), CommentId::new(comment_id))?
        }
    };
    Ok(view)
}

/// Splits `key=value` arguments; a repeated key or a missing `=` is a
/// caller error.
fn to_params(args: &[String]) -> Result<Params, EngineError> {
    let mut params = Params::new();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            return Err(EngineError::InvalidParameter(format!(
                "expected KEY=VALUE, got `{arg}`"
            )));
        };
        if params.insert(key.to_string(), value.to_string()).is_some() {
            return Err(EngineError::InvalidParameter(format!(
                "parameter `{key}` given more than once"
            )));
        }
    }
    Ok(params)
}
