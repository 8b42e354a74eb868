//! Append-only message log.
//!
//! The whole game state is a fold over this sequence (see [`crate::state`]).
//! Entries are never edited; the only way to remove entries is the rewind
//! used to replay the Marvin stage.

use serde::{Deserialize, Serialize};

use crate::message::{Action, Message, Speaker};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Append `message` unless it is identical to the current last entry.
    ///
    /// Returns `true` when the log grew.
    pub fn append(&mut self, message: Message) -> bool {
        if self.messages.last() == Some(&message) {
            return false;
        }
        self.messages.push(message);
        true
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn count_by(&self, speaker: Speaker) -> usize {
        self.messages.iter().filter(|m| m.speaker == speaker).count()
    }

    pub fn truncate_to(&mut self, len: usize) {
        self.messages.truncate(len);
    }

    /// Index the log would be cut at to replay the Marvin stage.
    ///
    /// That is the user message that prompted Marvin's first `join`, or the
    /// join itself when no user message precedes it.
    pub fn marvin_join_start_index(&self) -> Option<usize> {
        let join_index = self
            .messages
            .iter()
            .position(|m| m.speaker == Speaker::Marvin && m.action == Action::Join)?;

        let trigger = self.messages[..join_index]
            .iter()
            .rposition(|m| m.speaker == Speaker::User);

        Some(trigger.unwrap_or(join_index))
    }

    /// Cut the log back to just before the Marvin join interaction.
    ///
    /// Returns `false` and leaves the log untouched when Marvin never joined.
    pub fn rewind_to_marvin_join(&mut self) -> bool {
        match self.marvin_join_start_index() {
            Some(index) => {
                self.truncate_to(index);
                true
            }
            None => false,
        }
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Persona;

    #[test]
    fn identical_consecutive_messages_are_deduplicated() {
        let mut log = MessageLog::new();
        assert!(log.append(Message::user("open the doors")));
        assert!(!log.append(Message::user("open the doors")));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn dedupe_compares_the_action_tag_too() {
        let mut log = MessageLog::new();
        log.append(Message::from_persona(Persona::Elevator, "Fine.", Action::None));
        assert!(log.append(Message::from_persona(Persona::Elevator, "Fine.", Action::Down)));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn non_consecutive_repeats_are_kept() {
        let mut log = MessageLog::new();
        log.append(Message::user("down"));
        log.append(Message::from_persona(Persona::Elevator, "No.", Action::None));
        assert!(log.append(Message::user("down")));
        assert_eq!(log.count_by(Speaker::User), 2);
    }

    #[test]
    fn rewind_cuts_before_the_triggering_user_message() {
        let mut log = MessageLog::from_messages(vec![
            Message::guide("welcome"),
            Message::user("hello Marvin"),
            Message::from_persona(Persona::Marvin, "Life. Don't talk to me about life.", Action::None),
            Message::user("there are drinks upstairs"),
            Message::from_persona(Persona::Marvin, "I suppose.", Action::Join),
            Message::guide("joined"),
        ]);

        assert!(log.rewind_to_marvin_join());
        assert_eq!(log.len(), 3);
        assert_eq!(log.last().map(|m| m.speaker), Some(Speaker::Marvin));
    }

    #[test]
    fn rewind_without_user_message_cuts_at_the_join() {
        let mut log = MessageLog::from_messages(vec![
            Message::guide("welcome"),
            Message::from_persona(Persona::Marvin, "Oh, all right.", Action::Join),
        ]);

        assert_eq!(log.marvin_join_start_index(), Some(1));
        assert!(log.rewind_to_marvin_join());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn rewind_is_a_no_op_before_marvin_joins() {
        let mut log = MessageLog::from_messages(vec![Message::user("hi")]);
        assert!(!log.rewind_to_marvin_join());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn elevator_join_does_not_count_as_marvin_join() {
        let log = MessageLog::from_messages(vec![
            Message::user("hi"),
            Message::from_persona(Persona::Elevator, "?", Action::Join),
        ]);
        assert_eq!(log.marvin_join_start_index(), None);
    }
}
