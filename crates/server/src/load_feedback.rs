use std::env;

use anyhow::Context;
use feedback_service::{
    models::SubmitFeedback,
    store::{FeedbackStore, PgFeedbackStore},
    validation::validate_submission,
};

/// Splits a `category | title | optional body` line.
fn parse_line(line: &str) -> Option<SubmitFeedback> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut parts = line.splitn(3, '|').map(str::trim);
    let category = parts.next()?;
    let title = parts.next()?;
    let body = parts.next().filter(|b| !b.is_empty());

    Some(SubmitFeedback {
        title: Some(title.to_string()),
        body: body.map(str::to_string),
        category: Some(category.to_string()),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let path = env::args().nth(1).unwrap_or_else(|| "feedback.txt".to_string());

    let store = PgFeedbackStore::connect(&database_url, 1).await?;
    println!("Connected to database!");

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {path} - make sure it exists!"))?;

    let mut count = 0;
    let mut skipped = 0;
    let mut invalid = 0;

    for (number, line) in content.lines().enumerate() {
        let Some(payload) = parse_line(line) else {
            continue;
        };

        let new = match validate_submission(payload) {
            Ok(new) => new,
            Err(err) => {
                println!("✗ Line {}: {}", number + 1, err);
                invalid += 1;
                continue;
            }
        };

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM feedback WHERE title = $1)")
                .bind(&new.title)
                .fetch_one(store.pool())
                .await?;

        if exists {
            println!("⊘ Skipped (duplicate): {}", new.title);
            skipped += 1;
            continue;
        }

        let created = store.insert_feedback(&new).await?;
        count += 1;
        println!("✓ Loaded [{}]: {}", created.category, created.title);
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Successfully loaded {} new feedback items!", count);
    if skipped > 0 {
        println!("⊘ Skipped {} duplicate items", skipped);
    }
    if invalid > 0 {
        println!("✗ Rejected {} invalid lines", invalid);
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_title_and_body() {
        let payload = parse_line(" idea | Add dark mode | Easier on the eyes ").unwrap();
        assert_eq!(payload.category.as_deref(), Some("idea"));
        assert_eq!(payload.title.as_deref(), Some("Add dark mode"));
        assert_eq!(payload.body.as_deref(), Some("Easier on the eyes"));
    }

    #[test]
    fn body_is_optional_and_may_contain_pipes() {
        let payload = parse_line("bug|Crash on save").unwrap();
        assert_eq!(payload.body, None);

        let payload = parse_line("ux | Tables | a | b").unwrap();
        assert_eq!(payload.body.as_deref(), Some("a | b"));
    }

    #[test]
    fn skips_blank_comment_and_malformed_lines() {
        assert!(parse_line("   ").is_none());
        assert!(parse_line("# seeded for the launch").is_none());
        assert!(parse_line("just a title").is_none());
    }
}
