//! The conversation state machine: an append-only message list, the current
//! filter selections, and a two-state awaiting flag that enforces a single
//! in-flight request. The presentation layers only observe snapshots; every
//! mutation goes through `submit` / `apply_response`.

use chrono::Local;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    AiResponse, ChatMessage, Cuisine, FitnessGoal, FitnessProfile, HealthCondition, Mood, Recipe,
    Sender,
};

/// Seeded assistant greeting every conversation starts with.
pub const GREETING: &str = "السلام! أنا الشاف ديالك. ختار هدفك الرياضي أو مزاجك اليوم وقول ليا باش نقدر نعاونك؟";

/// Synthesized apology when a well-formed reply carries neither a recipe nor
/// chat text.
pub const BUSY_MESSAGE: &str = "عفوًا، حدث خطأ ما. الشاف مشغول شوية، حاول مرة أخرى!";

/// Canned prompts for the "surprise me" action.
pub const SUGGESTIONS: [&str; 4] = [
    "عطيني شي وصفة عشوائية للعشاء",
    "أنا حاير، اقترح علي شي حاجة خفيفة",
    "بغيت شي حاجة حلوة وساهلة",
    "شنو نطيب اليوم؟ فاجئني",
];

/// Retention cap: beyond this the oldest messages after the greeting are
/// evicted. Upstream behavior was unbounded; see DESIGN.md.
pub const MAX_MESSAGES: usize = 200;

/// Current filter selections, owned by the conversation and sent with every
/// request. `None` means "any"/"unspecified"/"no goal".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filters {
    pub cuisine: Option<Cuisine>,
    pub mood: Option<Mood>,
    pub health_conditions: Vec<HealthCondition>,
    pub fitness_goal: Option<FitnessGoal>,
    pub fitness_profile: FitnessProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingResponse,
}

pub struct Conversation {
    messages: Vec<ChatMessage>,
    next_id: u64,
    phase: Phase,
    pub filters: Filters,
}

impl Conversation {
    pub fn new() -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            next_id: 0,
            phase: Phase::Idle,
            filters: Filters::default(),
        };
        conversation.push_message(Sender::Assistant, GREETING.to_string(), None, None);
        conversation
    }

    fn push_message(
        &mut self,
        sender: Sender,
        content: String,
        recipe: Option<Recipe>,
        health_tips: Option<Vec<String>>,
    ) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            sender,
            content,
            recipe,
            health_tips,
        });
        // Evict the oldest entries after the greeting once the cap is hit.
        while self.messages.len() > MAX_MESSAGES {
            self.messages.remove(1);
        }
    }

    /// Accepts user input while idle. Returns the trimmed text to dispatch to
    /// the gateway, or `None` when the input is blank or a request is already
    /// in flight (both are no-ops: nothing is appended, nothing is sent).
    pub fn submit(&mut self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if self.phase == Phase::AwaitingResponse {
            debug!("Submission ignored: a request is already in flight");
            return None;
        }
        let accepted = trimmed.to_string();
        self.push_message(Sender::User, accepted.clone(), None, None);
        self.phase = Phase::AwaitingResponse;
        debug!("Accepted user submission: {accepted}");
        Some(accepted)
    }

    /// Resolves the in-flight request with the gateway's result. A reply with
    /// neither a recipe nor chat text becomes the synthesized apology instead
    /// of an empty bubble. Always returns the conversation to idle.
    pub fn apply_response(&mut self, response: AiResponse) {
        if self.phase != Phase::AwaitingResponse {
            warn!("Response applied while idle; appending anyway");
        }
        if response.has_content() {
            let content = response.chat.map(|c| c.message).unwrap_or_default();
            self.push_message(Sender::Assistant, content, response.recipe, response.health_tips);
        } else {
            self.push_message(Sender::Assistant, BUSY_MESSAGE.to_string(), None, None);
        }
        self.phase = Phase::Idle;
    }

    /// Picks one of the canned suggestion prompts at uniform random and feeds
    /// it through the normal submit gating.
    pub fn random_suggestion(&mut self) -> Option<String> {
        let pick = SUGGESTIONS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(SUGGESTIONS[0]);
        self.submit(pick)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Recipe;

    #[test]
    fn test_new_conversation_is_seeded_with_greeting() {
        let conversation = Conversation::new();
        assert_eq!(conversation.messages().len(), 1);
        let greeting = &conversation.messages()[0];
        assert_eq!(greeting.sender, Sender::Assistant);
        assert_eq!(greeting.content, GREETING);
        assert!(!conversation.is_awaiting());
    }

    #[test]
    fn test_blank_submission_is_a_no_op() {
        let mut conversation = Conversation::new();
        assert!(conversation.submit("").is_none());
        assert!(conversation.submit("   \t\n").is_none());
        assert_eq!(conversation.messages().len(), 1);
        assert!(!conversation.is_awaiting());
    }

    #[test]
    fn test_submit_appends_user_message_and_awaits() {
        let mut conversation = Conversation::new();
        let dispatched = conversation.submit("  بغيت كسكس  ").unwrap();
        assert_eq!(dispatched, "بغيت كسكس");
        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.messages()[1].sender, Sender::User);
        assert_eq!(conversation.messages()[1].content, "بغيت كسكس");
        assert!(conversation.is_awaiting());
    }

    #[test]
    fn test_submission_while_awaiting_is_ignored() {
        let mut conversation = Conversation::new();
        conversation.submit("الأولى").unwrap();
        let len_before = conversation.messages().len();

        assert!(conversation.submit("الثانية").is_none());
        assert_eq!(conversation.messages().len(), len_before);
        assert!(conversation.is_awaiting());
    }

    #[test]
    fn test_apply_response_with_recipe() {
        let mut conversation = Conversation::new();
        conversation.submit("عطيني وصفة").unwrap();

        let response = AiResponse {
            recipe: Some(Recipe {
                name: "طاجين".to_string(),
                ..Recipe::default()
            }),
            chat: None,
            health_tips: Some(vec!["شرب الما".to_string()]),
        };
        conversation.apply_response(response);

        assert!(!conversation.is_awaiting());
        let last = conversation.last_message().unwrap();
        assert_eq!(last.sender, Sender::Assistant);
        assert_eq!(last.content, "");
        assert_eq!(last.recipe.as_ref().unwrap().name, "طاجين");
        assert_eq!(last.health_tips.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_response_becomes_apology() {
        let mut conversation = Conversation::new();
        conversation.submit("شنو ناكل؟").unwrap();
        conversation.apply_response(AiResponse::default());

        let last = conversation.last_message().unwrap();
        assert_eq!(last.content, BUSY_MESSAGE);
        assert!(last.recipe.is_none());
        assert!(!conversation.is_awaiting());
    }

    #[test]
    fn test_empty_chat_string_without_recipe_becomes_apology() {
        let mut conversation = Conversation::new();
        conversation.submit("شنو ناكل؟").unwrap();
        conversation.apply_response(AiResponse::chat_only(""));
        assert_eq!(conversation.last_message().unwrap().content, BUSY_MESSAGE);
    }

    #[test]
    fn test_message_ids_are_unique_and_creation_ordered() {
        let mut conversation = Conversation::new();
        for i in 0..5 {
            conversation.submit(&format!("رسالة {i}")).unwrap();
            conversation.apply_response(AiResponse::chat_only("واخا"));
        }
        let ids: Vec<u64> = conversation.messages().iter().map(|m| m.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_random_suggestion_uses_canned_prompt() {
        let mut conversation = Conversation::new();
        let dispatched = conversation.random_suggestion().unwrap();
        assert!(SUGGESTIONS.contains(&dispatched.as_str()));
        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.messages()[1].content, dispatched);
        assert!(conversation.is_awaiting());

        // Gated the same way as any submission while awaiting.
        assert!(conversation.random_suggestion().is_none());
        assert_eq!(conversation.messages().len(), 2);
    }

    #[test]
    fn test_retention_cap_keeps_greeting_and_newest() {
        let mut conversation = Conversation::new();
        for i in 0..(MAX_MESSAGES) {
            conversation.submit(&format!("دورة {i}")).unwrap();
            conversation.apply_response(AiResponse::chat_only("واخا"));
        }
        assert_eq!(conversation.messages().len(), MAX_MESSAGES);
        assert_eq!(conversation.messages()[0].content, GREETING);
        // Ids stay strictly increasing across evictions.
        let ids: Vec<u64> = conversation.messages().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}
