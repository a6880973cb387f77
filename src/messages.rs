use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Me,
    Them,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Everyone in the directory except `me`.
pub fn contacts(directory: &[Profile], me: &str) -> Vec<Profile> {
    directory.iter().filter(|u| u.id != me).cloned().collect()
}

/// One open conversation. History lives only as long as the session.
#[derive(Debug, Clone)]
pub struct ChatSession {
    contact: Profile,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn open(contact: Profile) -> Self {
        let greeting = ChatMessage {
            id: "sys-1".into(),
            sender: Sender::System,
            text: format!("You are now connected with {}. Say hello!", contact.name),
            timestamp: Utc::now(),
        };
        Self { contact, history: vec![greeting] }
    }

    pub fn contact(&self) -> &Profile { &self.contact }

    pub fn history(&self) -> &[ChatMessage] { &self.history }

    pub fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }
        self.history.push(ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            sender: Sender::Me,
            text: text.to_string(),
            timestamp: Utc::now(),
        });
        self.history.last()
    }
}
