//! Interactive terminal chat session over the same conversation engine the
//! web front end uses. Recipes and health tips render as plain text.

use anyhow::Result;
use std::io::{self, BufRead, Write};
use tracing::info;

use crate::conversation::Conversation;
use crate::domain::{ChatMessage, Sender};
use crate::gemini::GeminiClient;

pub async fn run_chat_session() -> Result<()> {
    info!("Starting interactive chat session");
    let gemini = GeminiClient::from_env();
    let mut conversation = Conversation::new();

    if let Some(greeting) = conversation.last_message() {
        render_message(greeting);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input == "exit" || input == "quit" {
            break;
        }

        let Some(text) = conversation.submit(input) else {
            // Blank input; prompt again.
            continue;
        };
        let filters = conversation.filters.clone();
        let response = gemini
            .get_response(
                &text,
                filters.cuisine,
                filters.mood,
                &filters.health_conditions,
                filters.fitness_goal,
                &filters.fitness_profile,
            )
            .await;
        conversation.apply_response(response);
        if let Some(reply) = conversation.last_message() {
            render_message(reply);
        }
    }

    info!("Chat session finished");
    Ok(())
}

fn render_message(message: &ChatMessage) {
    let who = match message.sender {
        Sender::User => "أنت",
        Sender::Assistant => "الشاف بوط",
    };
    if !message.content.is_empty() {
        println!("[{}] {}: {}", message.timestamp, who, message.content);
    }

    if let Some(recipe) = &message.recipe {
        println!("\n=== {} ===", recipe.name);
        if !recipe.description.is_empty() {
            println!("{}", recipe.description);
        }
        if !recipe.cuisine.is_empty() {
            println!("المطبخ: {}", recipe.cuisine);
        }
        if let Some(macros) = &recipe.macros {
            println!(
                "القيم الغذائية: بروتين {}غ | كربوهيدرات {}غ | دهون {}غ | {} kcal",
                macros.protein, macros.carbs, macros.fats, macros.calories
            );
        }
        if !recipe.ingredients.is_empty() {
            println!("المكونات:");
            for item in &recipe.ingredients {
                println!("  - {}", item);
            }
        }
        if !recipe.preparation_steps.is_empty() {
            println!("طريقة التحضير:");
            for (i, step) in recipe.preparation_steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
        }
    }

    if let Some(tips) = &message.health_tips {
        println!("💡 نصيحة الشاف:");
        for tip in tips {
            println!("  - {}", tip);
        }
    }
}
