//! Prompt construction for genre recommendations.

use crate::boardgames::BoardGame;
use crate::llms::ChatMessage;

/// Characters of the game description included in the prompt.
pub const DESCRIPTION_EXCERPT_CHARS: usize = 900;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that provides music recommendations based on board game themes. You MUST respond with a single valid JSON object FOLLOWED BY a brief explanation of 2-3 sentences. The explanation must not be part of the JSON. First the JSON, then the explanation.";

/// Render the user prompt for a game.
pub fn build_prompt(game: &BoardGame) -> String {
    let excerpt: String = game
        .description
        .chars()
        .take(DESCRIPTION_EXCERPT_CHARS)
        .collect();

    format!(
        r#"
Generate music recommendations for a board game playlist with the following details:

BOARD GAME:
- Name: {name}
- Description: {excerpt}...
- Categories: {categories}
- Mechanics: {mechanics}

Please provide:
1. The best 5 Spotify music genres/keywords that would match this board game's theme and gameplay

CRITICAL INSTRUCTIONS - FOLLOW EXACTLY:
1. FIRST provide a single valid JSON object with the structure shown below
2. THEN provide 2-3 sentences explaining your choices
3. DO NOT include any text, examples, or self-dialogue before the JSON
4. DO NOT include multiple JSON objects or code blocks
5. DO NOT ask questions or seek confirmation

JSON FORMAT:
{{
  "genres": ["genre1/keyword1", "genre2/keyword2", "genre3/keyword3", "genre4/keyword4", "genre5/keyword5"]
}}
"#,
        name = game.name,
        excerpt = excerpt,
        categories = game.categories.join(", "),
        mechanics = game.mechanics.join(", "),
    )
}

/// System + user messages for a recommendation request.
pub fn build_messages(game: &BoardGame) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_prompt(game)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(description: &str) -> BoardGame {
        BoardGame {
            id: "13".into(),
            name: "Catan".into(),
            description: description.into(),
            categories: vec!["Economic".into(), "Negotiation".into()],
            mechanics: vec!["Dice Rolling".into(), "Trading".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_prompt_contains_game_details() {
        let prompt = build_prompt(&game("Settle the island."));
        assert!(prompt.contains("- Name: Catan"));
        assert!(prompt.contains("- Description: Settle the island...."));
        assert!(prompt.contains("- Categories: Economic, Negotiation"));
        assert!(prompt.contains("- Mechanics: Dice Rolling, Trading"));
        assert!(prompt.contains(r#""genres": ["genre1/keyword1""#));
    }

    #[test]
    fn test_description_excerpt_is_bounded() {
        let long = "x".repeat(5000);
        let prompt = build_prompt(&game(&long));
        assert!(prompt.contains(&format!("{}...", "x".repeat(DESCRIPTION_EXCERPT_CHARS))));
        assert!(!prompt.contains(&"x".repeat(DESCRIPTION_EXCERPT_CHARS + 1)));
    }

    #[test]
    fn test_messages_roles() {
        let messages = build_messages(&game("d"));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
    }
}
