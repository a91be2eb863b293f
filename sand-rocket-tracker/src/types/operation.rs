//! Verb/noun vocabulary for parsed operations

use super::ids::UserId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// What an operation does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Add,
    Get,
    List,
    Update,
    Delete,
    Move,
    Accept,
    Decline,
}

impl Verb {
    /// Resolve a verb or one of its synonyms
    pub fn from_alias(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "add" | "create" | "new" | "insert" => Some(Self::Add),
            "get" | "show" | "read" | "view" => Some(Self::Get),
            "list" | "ls" | "find" => Some(Self::List),
            "update" | "edit" | "set" | "rename" | "change" => Some(Self::Update),
            "delete" | "remove" | "rm" | "revoke" => Some(Self::Delete),
            "move" | "mv" | "reorder" => Some(Self::Move),
            "accept" | "join" => Some(Self::Accept),
            "decline" | "reject" => Some(Self::Decline),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Get => "get",
            Self::List => "list",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Move => "move",
            Self::Accept => "accept",
            Self::Decline => "decline",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an operation acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Noun {
    User,
    Project,
    Member,
    Invitation,
    Epic,
    Task,
    Attachment,
    Activity,
}

impl Noun {
    /// Resolve a noun, accepting plurals and a few synonyms
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" | "users" => Some(Self::User),
            "project" | "projects" => Some(Self::Project),
            "member" | "members" | "membership" => Some(Self::Member),
            "invitation" | "invitations" | "invite" | "invites" => Some(Self::Invitation),
            "epic" | "epics" => Some(Self::Epic),
            "task" | "tasks" | "card" | "cards" => Some(Self::Task),
            "attachment" | "attachments" | "document" | "documents" | "doc" | "docs" => {
                Some(Self::Attachment)
            }
            "activity" | "log" => Some(Self::Activity),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Project => "project",
            Self::Member => "member",
            Self::Invitation => "invitation",
            Self::Epic => "epic",
            Self::Task => "task",
            Self::Attachment => "attachment",
            Self::Activity => "activity",
        }
    }
}

impl fmt::Display for Noun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized request: verb, noun, snake_case parameters and the actor
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOperation {
    pub verb: Verb,
    pub noun: Noun,
    pub params: Map<String, Value>,
    pub actor: Option<UserId>,
}

impl ParsedOperation {
    pub fn new(verb: Verb, noun: Noun, params: Map<String, Value>) -> Self {
        Self {
            verb,
            noun,
            params,
            actor: None,
        }
    }

    pub fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Canonical "verb noun"
    pub fn op_string(&self) -> String {
        format!("{} {}", self.verb, self.noun)
    }
}
