//! Conversation data model
//!
//! A conversation is an ordered list of [`Turn`]s. Insertion order is
//! chronological order. The host appends turns as the session progresses,
//! and the history codec reads and writes the same structure.
//!
//! Turns are grouped into [`ConversationPair`]s (a user turn and the
//! assistant reply that follows it) for selection-based export and deletion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person using the client
    User,
    /// The model
    Assistant,
}

impl Role {
    /// Wire name used by OpenAI-compatible APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message within a conversation
///
/// `reasoning` is only ever present on assistant turns. The constructors are
/// the only way to build a turn, so a user turn can never carry reasoning.
/// Turns serialize but do not deserialize:
///
/// ```compile_fail
/// let turn: deepchat::Turn =
///     serde_json::from_str(r#"{"role":"user","content":"hi","reasoning":"x"}"#).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    role: Role,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<String>,
}

impl Turn {
    /// Creates a user turn
    ///
    /// # Examples
    ///
    /// ```
    /// use deepchat::conversation::{Role, Turn};
    ///
    /// let turn = Turn::user("hi");
    /// assert_eq!(turn.role(), Role::User);
    /// assert!(turn.reasoning().is_none());
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            reasoning: None,
        }
    }

    /// Creates an assistant turn without a reasoning phase
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            reasoning: None,
        }
    }

    /// Creates an assistant turn that carried a visible reasoning phase
    ///
    /// Blank reasoning is treated as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use deepchat::conversation::Turn;
    ///
    /// let turn = Turn::assistant_with_reasoning("hello", "thinking...");
    /// assert_eq!(turn.reasoning(), Some("thinking..."));
    ///
    /// let turn = Turn::assistant_with_reasoning("hello", "  \n");
    /// assert_eq!(turn.reasoning(), None);
    /// ```
    pub fn assistant_with_reasoning(
        content: impl Into<String>,
        reasoning: impl Into<String>,
    ) -> Self {
        let reasoning = reasoning.into();
        Self {
            role: Role::Assistant,
            content: content.into(),
            reasoning: if reasoning.trim().is_empty() {
                None
            } else {
                Some(reasoning)
            },
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn reasoning(&self) -> Option<&str> {
        self.reasoning.as_deref()
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// A user turn and the assistant turn that immediately follows it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationPair {
    /// Index of the user turn in the conversation
    pub user_index: usize,
    /// Index of the assistant reply, if one has been received
    pub assistant_index: Option<usize>,
}

impl ConversationPair {
    /// Message indices covered by this pair, in order
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        std::iter::once(self.user_index).chain(self.assistant_index)
    }
}

/// How an export selected its turns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Every turn of the conversation
    All,
    /// Only the turns of the selected pairs
    Selected {
        /// Number of selected pairs
        pairs: usize,
    },
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "全部对话"),
            Self::Selected { pairs } => write!(f, "选中对话（共{}对）", pairs),
        }
    }
}

/// A message in the shape OpenAI-compatible APIs expect
///
/// Reasoning is never sent back to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

impl ApiMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Ordered, in-memory conversation for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Creates an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn at the end
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Appends every turn of `other`, keeping its order
    pub fn extend(&mut self, other: Conversation) {
        self.turns.extend(other.turns);
    }

    /// Replaces the whole session with `other`
    pub fn replace(&mut self, other: Conversation) {
        self.turns = other.turns;
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }

    /// Groups turns into user/assistant pairs
    ///
    /// Every user turn opens a pair; an assistant turn directly after it is
    /// attached as the reply. Assistant turns with no preceding user turn
    /// (possible after importing a partial file) do not form a pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use deepchat::conversation::{Conversation, Turn};
    ///
    /// let conversation: Conversation = vec![
    ///     Turn::user("a"),
    ///     Turn::assistant("b"),
    ///     Turn::user("c"),
    /// ]
    /// .into();
    /// let pairs = conversation.pairs();
    /// assert_eq!(pairs.len(), 2);
    /// assert_eq!(pairs[0].assistant_index, Some(1));
    /// assert_eq!(pairs[1].assistant_index, None);
    /// ```
    pub fn pairs(&self) -> Vec<ConversationPair> {
        let mut pairs = Vec::new();
        let mut i = 0;
        while i < self.turns.len() {
            if self.turns[i].is_user() {
                let assistant_index = match self.turns.get(i + 1) {
                    Some(next) if next.role == Role::Assistant => Some(i + 1),
                    _ => None,
                };
                pairs.push(ConversationPair {
                    user_index: i,
                    assistant_index,
                });
                if assistant_index.is_some() {
                    i += 1;
                }
            }
            i += 1;
        }
        pairs
    }

    /// Resolves the turns to export for a pair selection
    ///
    /// An empty selection exports everything. Otherwise the union of the
    /// selected pairs' message indices is exported in conversation order.
    /// Pair indices that no longer exist are ignored.
    pub fn select_for_export(&self, selected_pairs: &BTreeSet<usize>) -> (Vec<Turn>, ExportMode) {
        if selected_pairs.is_empty() {
            return (self.turns.clone(), ExportMode::All);
        }

        let pairs = self.pairs();
        let indices: BTreeSet<usize> = selected_pairs
            .iter()
            .filter_map(|&p| pairs.get(p))
            .flat_map(|pair| pair.indices())
            .filter(|&i| i < self.turns.len())
            .collect();

        let turns = indices.iter().map(|&i| self.turns[i].clone()).collect();
        (
            turns,
            ExportMode::Selected {
                pairs: selected_pairs.len(),
            },
        )
    }

    /// Removes a pair (the user turn and its reply)
    ///
    /// Returns the number of turns removed, zero when the pair does not exist.
    pub fn remove_pair(&mut self, pair_index: usize) -> usize {
        let Some(pair) = self.pairs().get(pair_index).copied() else {
            return 0;
        };
        let removed = match pair.assistant_index {
            Some(_) => 2,
            None => 1,
        };
        self.turns.drain(pair.user_index..pair.user_index + removed);
        removed
    }

    /// Builds the message list for the next API request
    pub fn api_messages(&self) -> Vec<ApiMessage> {
        self.turns
            .iter()
            .map(|t| ApiMessage::new(t.role.as_str(), t.content.clone()))
            .collect()
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}
