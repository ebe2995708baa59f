use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a memory unit.
pub type MemoryId = Uuid;

/// Identifier of the conversation session that produced a unit.
pub type SessionId = String;

/// What kind of reasoning artifact a memory unit captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    Decision,
    Fact,
    Constraint,
    Question,
    Assumption,
}

impl MemoryKind {
    pub const ALL: [MemoryKind; 5] = [
        MemoryKind::Decision,
        MemoryKind::Fact,
        MemoryKind::Constraint,
        MemoryKind::Question,
        MemoryKind::Assumption,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Decision => "decision",
            MemoryKind::Fact => "fact",
            MemoryKind::Constraint => "constraint",
            MemoryKind::Question => "question",
            MemoryKind::Assumption => "assumption",
        }
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "decision" => Ok(MemoryKind::Decision),
            "fact" => Ok(MemoryKind::Fact),
            "constraint" => Ok(MemoryKind::Constraint),
            "question" => Ok(MemoryKind::Question),
            "assumption" => Ok(MemoryKind::Assumption),
            other => Err(format!("invalid memory kind: '{other}'")),
        }
    }
}

/// Retention scope of a memory unit. Governs default TTL in working memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryScope {
    Session,
    Project,
    Global,
}

impl MemoryScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryScope::Session => "session",
            MemoryScope::Project => "project",
            MemoryScope::Global => "global",
        }
    }
}

impl fmt::Display for MemoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "session" => Ok(MemoryScope::Session),
            "project" => Ok(MemoryScope::Project),
            "global" => Ok(MemoryScope::Global),
            other => Err(format!("invalid memory scope: '{other}'")),
        }
    }
}

/// Lifecycle state of a memory unit.
///
/// `Active` may move to `Deprecated` or `Reinforced`. `Deprecated` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    #[default]
    Active,
    Deprecated,
    Reinforced,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Active => "active",
            Lifecycle::Deprecated => "deprecated",
            Lifecycle::Reinforced => "reinforced",
        }
    }

    /// Whether moving from `self` to `next` is permitted.
    ///
    /// Re-entering the current state is allowed (reinforce and deprecate are
    /// idempotent in lifecycle value), except nothing leaves `Deprecated`.
    /// A reinforced unit can still be superseded.
    pub fn can_transition_to(&self, next: Lifecycle) -> bool {
        match (self, next) {
            (Lifecycle::Deprecated, Lifecycle::Deprecated) => true,
            (Lifecycle::Deprecated, _) => false,
            (_, Lifecycle::Active) => *self == Lifecycle::Active,
            _ => true,
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lifecycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Lifecycle::Active),
            "deprecated" => Ok(Lifecycle::Deprecated),
            "reinforced" => Ok(Lifecycle::Reinforced),
            other => Err(format!("invalid lifecycle: '{other}'")),
        }
    }
}

/// One of the three memory tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Working,
    Episodic,
    Semantic,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Working => "working",
            Tier::Episodic => "episodic",
            Tier::Semantic => "semantic",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag attached to every episodic log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Decision,
    Transition,
    Change,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Decision => "decision",
            EventType::Transition => "transition",
            EventType::Change => "change",
        }
    }

    /// The event tag used when a unit of the given kind is appended to the log.
    pub fn for_kind(kind: MemoryKind) -> Self {
        match kind {
            MemoryKind::Decision => EventType::Decision,
            _ => EventType::Change,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "decision" => Ok(EventType::Decision),
            "transition" => Ok(EventType::Transition),
            "change" => Ok(EventType::Change),
            other => Err(format!("invalid event type: '{other}'")),
        }
    }
}
