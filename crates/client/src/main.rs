mod models;

use colored::*;
use models::*;
use std::env;
use std::io::{self, Write};

const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";
const CATEGORIES: [&str; 3] = ["bug", "idea", "ux"];

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Submit,
    /// 1-based position in the last listing.
    Vote(usize),
    Help,
    Quit,
    Invalid,
}

fn parse_command(input: &str) -> Command {
    let mut words = input.split_whitespace();
    let Some(first) = words.next() else {
        return Command::Invalid;
    };

    match first.to_lowercase().as_str() {
        "l" | "list" => Command::List,
        "s" | "submit" => Command::Submit,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" => Command::Quit,
        "v" | "vote" => match words.next().and_then(|n| n.parse().ok()) {
            Some(n) if n > 0 => Command::Vote(n),
            _ => Command::Invalid,
        },
        _ => Command::Invalid,
    }
}

// ===== Main =====

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let backend_url =
        env::var("FEEDBACK_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
    let api = Api::new(backend_url);

    println!("{}", "=".repeat(60).bright_cyan());
    println!("{}", "    💬 PRODUCT FEEDBACK 💬".bright_yellow().bold());
    println!("{}", "=".repeat(60).bright_cyan());
    println!();

    feedback_loop(&api).await
}

// ===== Feedback Loop =====

async fn feedback_loop(api: &Api) -> anyhow::Result<()> {
    let mut listing = show_list(api).await?;
    print_help();

    loop {
        print!("{}", "> ".bright_green().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(());
        }

        match parse_command(&input) {
            Command::List => listing = show_list(api).await?,
            Command::Submit => {
                if let Err(e) = submit_interactive(api).await {
                    println!("{} {}", "✗".red(), e);
                }
                listing = show_list(api).await?;
            }
            Command::Vote(n) => match listing.get(n - 1) {
                Some(item) => match api.vote(item).await {
                    Ok(DataResponse { data, message }) => println!(
                        "{} {} ({} votes)",
                        format!("✓ {}:", message.as_deref().unwrap_or("Voted")).green(),
                        data.title.bright_white().bold(),
                        data.upvotes.to_string().yellow()
                    ),
                    Err(e) => println!("{} {}", "✗".red(), e),
                },
                None => println!("{}", "No item with that number.".red()),
            },
            Command::Help => print_help(),
            Command::Quit => {
                println!();
                println!("{}", "Thanks for the feedback! 👋".bright_cyan().bold());
                return Ok(());
            }
            Command::Invalid => println!("{}", "Invalid choice. Type 'help'.".red()),
        }
    }
}

fn print_help() {
    println!(
        "{}",
        "[L]ist  [S]ubmit  [V]ote <n>  [H]elp  [Q]uit".bright_black()
    );
}

async fn show_list(api: &Api) -> anyhow::Result<Vec<FeedbackItem>> {
    let items = api.list().await?;

    println!("{}", "━".repeat(60).bright_black());
    if items.is_empty() {
        println!("{}", "No feedback yet. Be the first!".yellow());
    }
    for (i, item) in items.iter().enumerate() {
        let marker = if item.user_has_voted {
            "▲".green()
        } else {
            "△".bright_black()
        };
        let status = if item.status == "open" {
            String::new()
        } else {
            format!(" ({})", item.status)
        };
        println!(
            "{}. {} {} {} {}{} {}",
            (i + 1).to_string().bright_cyan(),
            marker,
            item.upvotes.to_string().yellow(),
            format!("[{}]", item.category).bright_magenta(),
            item.title.bright_white().bold(),
            status.bright_blue(),
            item.created_at.format("%Y-%m-%d").to_string().bright_black()
        );
        if let Some(body) = &item.body {
            println!("      {}", body.bright_black());
        }
    }
    println!("{}", "━".repeat(60).bright_black());

    Ok(items)
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{} ", label.bright_white());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

async fn submit_interactive(api: &Api) -> anyhow::Result<()> {
    let title = prompt("Title:")?;
    let category = prompt(&format!("Category ({}):", CATEGORIES.join("/")))?.to_lowercase();
    let body = prompt("Details (optional):")?;

    let request = SubmitRequest {
        title,
        body: (!body.is_empty()).then_some(body),
        category,
    };
    let created = api.submit(&request).await?;
    println!(
        "{} {}",
        "✓ Submitted".green(),
        created.title.bright_white().bold()
    );

    Ok(())
}

// ===== API Calls =====

struct Api {
    client: reqwest::Client,
    base_url: String,
}

impl Api {
    fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn list(&self) -> anyhow::Result<Vec<FeedbackItem>> {
        let response = self
            .client
            .get(format!("{}/feedback", self.base_url))
            .send()
            .await?;
        Ok(read_data::<Vec<FeedbackItem>>(response).await?.data)
    }

    async fn submit(&self, request: &SubmitRequest) -> anyhow::Result<FeedbackItem> {
        let response = self
            .client
            .post(format!("{}/feedback", self.base_url))
            .json(request)
            .send()
            .await?;
        Ok(read_data(response).await?.data)
    }

    async fn vote(&self, item: &FeedbackItem) -> anyhow::Result<DataResponse<FeedbackItem>> {
        let response = self
            .client
            .post(format!("{}/feedback/{}/vote", self.base_url, item.id))
            .send()
            .await?;
        read_data(response).await
    }
}

async fn read_data<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> anyhow::Result<DataResponse<T>> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await?;
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error)
            .unwrap_or(text);
        anyhow::bail!("API error ({}): {}", status, message);
    }

    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_commands() {
        assert_eq!(parse_command("l\n"), Command::List);
        assert_eq!(parse_command("SUBMIT"), Command::Submit);
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command("?"), Command::Help);
    }

    #[test]
    fn vote_needs_a_positive_number() {
        assert_eq!(parse_command("v 3"), Command::Vote(3));
        assert_eq!(parse_command("vote  12 "), Command::Vote(12));
        assert_eq!(parse_command("v"), Command::Invalid);
        assert_eq!(parse_command("v 0"), Command::Invalid);
        assert_eq!(parse_command("v two"), Command::Invalid);
    }

    #[test]
    fn blank_and_unknown_input_is_invalid() {
        assert_eq!(parse_command("   "), Command::Invalid);
        assert_eq!(parse_command("x"), Command::Invalid);
    }

    #[test]
    fn api_trims_trailing_slash() {
        let api = Api::new("http://localhost:3000/".to_string());
        assert_eq!(api.base_url, "http://localhost:3000");
    }
}
