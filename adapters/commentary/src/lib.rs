#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Flavour text for Touchline matches.
//!
//! Text comes from an external generative collaborator. Its failures never
//! reach the caller: [`Commentator`] degrades to fixed local lines instead.

use tracing::{debug, warn};

/// Errors a text collaborator may report.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    /// The collaborator cannot be reached at all.
    #[error("text collaborator is unavailable")]
    Unavailable,
    /// The collaborator answered with something unusable.
    #[error("text collaborator returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// External service producing match commentary and chat replies.
pub trait TextCollaborator {
    /// Commentary lines for a match between `home` and `away`.
    fn commentary(&mut self, home: &str, away: &str) -> Result<Vec<String>, CollaboratorError>;

    /// Reply spoken by `speaker` to `message`, given free-form `context`.
    fn reply(
        &mut self,
        speaker: &str,
        context: &str,
        message: &str,
    ) -> Result<String, CollaboratorError>;
}

/// Collaborator used when no service is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineCollaborator;

impl TextCollaborator for OfflineCollaborator {
    fn commentary(&mut self, _home: &str, _away: &str) -> Result<Vec<String>, CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }

    fn reply(
        &mut self,
        _speaker: &str,
        _context: &str,
        _message: &str,
    ) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Unavailable)
    }
}

const FALLBACK_COMMENTARY: [&str; 5] = [
    "{home} and {away} walk out to a packed stadium.",
    "{home} press high from the first whistle.",
    "{away} look dangerous on the counter.",
    "A tense spell in midfield, neither side giving an inch.",
    "The crowd rises as {home} win a late corner.",
];

const FALLBACK_REPLY: &str = "Thanks for the message. Let's talk after training.";

/// Wraps a collaborator and substitutes local text whenever it fails.
#[derive(Debug)]
pub struct Commentator<C> {
    collaborator: C,
}

impl<C> Commentator<C>
where
    C: TextCollaborator,
{
    /// Creates a commentator backed by `collaborator`.
    #[must_use]
    pub fn new(collaborator: C) -> Self {
        Self { collaborator }
    }

    /// Commentary lines for a match, never empty.
    pub fn commentary(&mut self, home: &str, away: &str) -> Vec<String> {
        match self.collaborator.commentary(home, away) {
            Ok(lines) if lines.iter().any(|line| !line.trim().is_empty()) => {
                debug!(lines = lines.len(), "commentary received");
                lines
                    .into_iter()
                    .filter(|line| !line.trim().is_empty())
                    .collect()
            }
            Ok(_) => {
                warn!("collaborator returned no commentary, using fallback lines");
                fallback_commentary(home, away)
            }
            Err(error) => {
                warn!(%error, "commentary failed, using fallback lines");
                fallback_commentary(home, away)
            }
        }
    }

    /// Reply from `speaker`, never empty.
    pub fn reply(&mut self, speaker: &str, context: &str, message: &str) -> String {
        match self.collaborator.reply(speaker, context, message) {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                warn!(speaker, "collaborator returned an empty reply, using fallback");
                FALLBACK_REPLY.to_owned()
            }
            Err(error) => {
                warn!(speaker, %error, "reply failed, using fallback");
                FALLBACK_REPLY.to_owned()
            }
        }
    }

    /// Consumes the commentator, returning the collaborator.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.collaborator
    }
}

/// Fixed commentary used when the collaborator cannot help.
#[must_use]
pub fn fallback_commentary(home: &str, away: &str) -> Vec<String> {
    FALLBACK_COMMENTARY
        .iter()
        .map(|line| line.replace("{home}", home).replace("{away}", away))
        .collect()
}
