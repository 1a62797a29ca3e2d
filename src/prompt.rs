//! Chat-completion payload sent to the vision model.

use serde::Serialize;

/// Output ceiling for a single analysis.
pub const MAX_TOKENS: u32 = 500;

/// Low randomness keeps the verdict stable for the same photos.
pub const TEMPERATURE: f32 = 0.2;

pub const SYSTEM_INSTRUCTION: &str = "\
You analyze photographs of parking signs. Using every provided image, decide:
1. Whether parking is allowed right now, taking the current time and day into account
2. Any time restrictions or limits
3. Special conditions or exceptions
4. Payment requirements, if any

Answer with a JSON object of exactly this shape:
{
    \"canPark\": boolean,
    \"explanation\": \"clear explanation of the decision\",
    \"restrictions\": [\"list\", \"of\", \"restrictions\"],
    \"timeLimit\": optional_integer_minutes
}";

pub const USER_INSTRUCTION: &str = "Can I park here right now? Analyze these parking signs.";

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Build the two-message prompt for one batch of images.
///
/// Image parts follow the instruction text in submission order.
pub fn build_chat_request(model: &str, images: &[String]) -> ChatRequest {
    let mut parts = Vec::with_capacity(images.len() + 1);
    parts.push(ContentPart::Text {
        text: USER_INSTRUCTION.to_string(),
    });
    parts.extend(images.iter().map(|image| ContentPart::ImageUrl {
        image_url: ImageUrl { url: image.clone() },
    }));

    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: MessageContent::Text(SYSTEM_INSTRUCTION.to_string()),
            },
            ChatMessage {
                role: Role::User,
                content: MessageContent::Parts(parts),
            },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}
