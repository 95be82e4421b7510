//! User-facing command surface.
//!
//! Translates chat commands into engine calls and engine results into a
//! rendered message plus a machine-readable status. The chat dispatcher
//! renders the message and applies the effects.

use crate::config::EngineConfig;
use crate::effects::{Effect, TeamSpace};
use crate::engine::FormationEngine;
use crate::error::{Error, ErrorKind, NameProblem, Rejection};
use crate::models::{Email, Handle, UserId};
use serde::{Deserialize, Serialize};

/// The account issuing a command, as seen by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user: UserId,
    pub handle: Handle,
}

/// A chat command. Members beyond the first are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Verify {
        email: String,
    },
    CreateTeam {
        name: String,
        member1: UserId,
        #[serde(default)]
        member2: Option<UserId>,
        #[serde(default)]
        member3: Option<UserId>,
    },
    AddMembers {
        member1: UserId,
        #[serde(default)]
        member2: Option<UserId>,
        #[serde(default)]
        member3: Option<UserId>,
    },
    LeaveTeam,
}

/// Outcome status: success, a rejection code, or a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    InvalidName,
    NoMembers,
    NameTaken,
    MemberAlreadyTeamed,
    MemberUnverified,
    CapacityExceeded,
    TeamNotFound,
    NotInTeam,
    AlreadyVerified,
    EmailNotFound,
    HandleMismatch,
    EmailClaimed,
    HandleTaken,
    RetryableFailure,
}

impl From<&Rejection> for Status {
    fn from(rejection: &Rejection) -> Self {
        match rejection {
            Rejection::InvalidName(_) => Status::InvalidName,
            Rejection::NoMembers => Status::NoMembers,
            Rejection::NameTaken(_) => Status::NameTaken,
            Rejection::MemberAlreadyTeamed(_) => Status::MemberAlreadyTeamed,
            Rejection::MemberUnverified(_) => Status::MemberUnverified,
            Rejection::CapacityExceeded { .. } => Status::CapacityExceeded,
            Rejection::TeamNotFound(_) => Status::TeamNotFound,
            Rejection::NotInTeam => Status::NotInTeam,
            Rejection::AlreadyVerified => Status::AlreadyVerified,
            Rejection::EmailNotFound => Status::EmailNotFound,
            Rejection::HandleMismatch => Status::HandleMismatch,
            Rejection::EmailClaimed => Status::EmailClaimed,
            Rejection::HandleTaken => Status::HandleTaken,
        }
    }
}

/// What the dispatcher gets back for every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub status: Status,
    /// Failure category; `None` on success
    pub kind: Option<ErrorKind>,
    pub message: String,
    pub effects: Vec<Effect>,
}

impl CommandOutcome {
    fn success(message: String, effects: Vec<Effect>) -> Self {
        Self {
            status: Status::Success,
            kind: None,
            message,
            effects,
        }
    }

    fn failure(prefix: &str, error: &Error, config: &EngineConfig) -> Self {
        let (status, reason) = match error {
            Error::Rejected(rejection) => (Status::from(rejection), explain(rejection, config)),
            Error::Persistence(_) => (
                Status::RetryableFailure,
                "Something went wrong on our side. Please try again, or contact an organizer if this keeps happening.".to_string(),
            ),
        };
        Self {
            status,
            kind: Some(error.kind()),
            message: format!("{} {}", prefix, reason),
            effects: Vec::new(),
        }
    }

    /// True for a successful command.
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Run one command for `caller`.
pub async fn dispatch(engine: &FormationEngine, caller: &Caller, command: Command) -> CommandOutcome {
    let config = engine.config();
    match command {
        Command::Verify { email } => {
            let email = Email::new(&email);
            match engine
                .verify(caller.user.clone(), caller.handle.clone(), email)
                .await
            {
                Ok(verified) => CommandOutcome::success(
                    "You have been successfully verified. You now have access to the event server.".to_string(),
                    verified.effects,
                ),
                Err(e) => CommandOutcome::failure("Verification failed.", &e, config),
            }
        }

        Command::CreateTeam {
            name,
            member1,
            member2,
            member3,
        } => {
            let invitees = collect_members(member1, member2, member3);
            match engine.create_team(caller.user.clone(), &name, invitees).await {
                Ok(created) => {
                    let space = TeamSpace::for_team(&created.team);
                    CommandOutcome::success(
                        format!(
                            "Team created. {} created with members {}",
                            space.role,
                            mentions(created.team.members.iter())
                        ),
                        created.effects,
                    )
                }
                Err(e) => CommandOutcome::failure("Team creation failed.", &e, config),
            }
        }

        Command::AddMembers {
            member1,
            member2,
            member3,
        } => {
            let invitees = collect_members(member1, member2, member3);
            match engine.add_members(caller.user.clone(), invitees).await {
                Ok(added) => CommandOutcome::success(
                    format!(
                        "Team members added. Participant(s) {} added to {}",
                        mentions(added.added.iter()),
                        TeamSpace::for_team(&added.team).role
                    ),
                    added.effects,
                ),
                Err(e) => CommandOutcome::failure("Failed to add team member(s).", &e, config),
            }
        }

        Command::LeaveTeam => match engine.leave_team(caller.user.clone()).await {
            Ok(left) => CommandOutcome::success(
                format!("Team left. You have left Team: {}", left.departure.team),
                left.effects,
            ),
            Err(e) => CommandOutcome::failure("Failed to leave team.", &e, config),
        },
    }
}

fn collect_members(first: UserId, second: Option<UserId>, third: Option<UserId>) -> Vec<UserId> {
    std::iter::once(first).chain(second).chain(third).collect()
}

fn mentions<'a>(users: impl Iterator<Item = &'a UserId>) -> String {
    users.map(UserId::mention).collect::<Vec<_>>().join(", ")
}

/// User-facing reason. Never names another registrant's handle or account.
fn explain(rejection: &Rejection, config: &EngineConfig) -> String {
    match rejection {
        Rejection::InvalidName(NameProblem::Empty) => "Team name must not be empty.".to_string(),
        Rejection::InvalidName(NameProblem::IllegalCharacter(_)) => format!(
            "Team name includes prohibited characters: {}",
            config.illegal_name_chars
        ),
        Rejection::InvalidName(NameProblem::TooLong { max }) => {
            format!("Team name must be at most {} characters.", max)
        }
        Rejection::NoMembers => "No participants were given.".to_string(),
        Rejection::NameTaken(name) => format!("A team called `{}` already exists.", name),
        Rejection::MemberAlreadyTeamed(users) => format!(
            "These participant(s) are already in team(s): {}",
            mentions(users.iter())
        ),
        Rejection::MemberUnverified(users) => format!(
            "These user(s) have not been verified: {}",
            mentions(users.iter())
        ),
        Rejection::CapacityExceeded { max, .. } => format!(
            "There is not enough space on your team. Maximum team size is {}",
            max
        ),
        Rejection::TeamNotFound(_) => "That team no longer exists.".to_string(),
        Rejection::NotInTeam => "You must be in a team to use this command.".to_string(),
        Rejection::AlreadyVerified => "You have already been verified.".to_string(),
        Rejection::EmailNotFound => "That email address could not be found in our records. Registration is required in order to participate in this event. Please contact an organizer if you believe this is an error.".to_string(),
        Rejection::HandleMismatch => "The provided email address and account do not match our records. Please contact an organizer if you believe this is an error.".to_string(),
        Rejection::EmailClaimed => "That registration is already linked to a different account. Please contact an organizer if you believe this is an error.".to_string(),
        Rejection::HandleTaken => "That handle is already registered under another email address.".to_string(),
    }
}
