//! timefold — CLI client for the Timefold capsule service.
//!
//! Usage:
//!   timefold signup  --email <addr> --username <name> --password <pw> [--full-name <name>]
//!   timefold login   --username <name-or-email> --password <pw>
//!   timefold whoami
//!   timefold send    --to <user-uuid> --title <t> --body <b> [--theme <t>] [--media <url>…] [--early-view]
//!   timefold seal    --capsule <uuid> --unlock <rfc3339>
//!   timefold open    --capsule <uuid>
//!   timefold show    --capsule <uuid>
//!   timefold inbox   [--state <s>] [--page <n>]
//!   timefold outbox  [--state <s>] [--page <n>]
//!
//! Tokens from signup/login are kept in the session file (default
//! `~/.timefold/session.json`) and attached to subsequent commands.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

mod client;
use client::ApiClient;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "timefold",
    version,
    about = "Timefold client — write letters that open on schedule"
)]
struct Args {
    /// Path to the session file (stores auth tokens).
    #[arg(long, global = true, default_value = "~/.timefold/session.json")]
    session: PathBuf,

    /// Server base URL.
    #[arg(long, global = true, default_value = "http://127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register an account and start a session.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },

    /// Log in with a username or email and start a session.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Print the authenticated account.
    Whoami,

    /// Create a draft capsule addressed to a user.
    Send {
        /// Receiver user id (UUID).
        #[arg(long)]
        to: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        theme: Option<String>,
        /// Media attachment URL (repeatable).
        #[arg(long)]
        media: Vec<String>,
        /// Let the receiver peek during the unfolding phase.
        #[arg(long, default_value_t = false)]
        early_view: bool,
    },

    /// Seal a draft with an unlock instant (RFC 3339; offset-free is UTC).
    Seal {
        #[arg(long)]
        capsule: String,
        #[arg(long)]
        unlock: String,
    },

    /// Open a ready capsule.
    Open {
        #[arg(long)]
        capsule: String,
    },

    /// Show one capsule (contents gated by the server).
    Show {
        #[arg(long)]
        capsule: String,
    },

    /// List received capsules.
    Inbox {
        #[arg(long)]
        state: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// List sent capsules.
    Outbox {
        #[arg(long)]
        state: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Delete a draft capsule.
    Delete {
        #[arg(long)]
        capsule: String,
    },
}

// ── Session file ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct Session {
    access_token: String,
    refresh_token: String,
}

fn load_session(path: &Path) -> Option<Session> {
    let json = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&json).ok()
}

fn save_session(path: &Path, tokens: &Value) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating session dir {}", dir.display()))?;
    }
    let session = Session {
        access_token: tokens["access_token"]
            .as_str()
            .context("missing access_token in response")?
            .to_string(),
        refresh_token: tokens["refresh_token"]
            .as_str()
            .context("missing refresh_token in response")?
            .to_string(),
    };
    std::fs::write(path, serde_json::to_string_pretty(&session)?)
        .with_context(|| format!("writing session file {}", path.display()))?;
    Ok(())
}

// ── Output helpers ───────────────────────────────────────────────────────────

fn print_capsule_line(capsule: &Value) {
    let unlock = capsule["scheduled_unlock_at"].as_str().unwrap_or("—");
    println!(
        "{}  [{}]  \"{}\"  unlocks: {}",
        capsule["id"].as_str().unwrap_or("?"),
        capsule["state"].as_str().unwrap_or("?"),
        capsule["title"].as_str().unwrap_or(""),
        unlock
    );
}

fn list_path(box_name: &str, state: &Option<String>, page: usize) -> String {
    let mut path = format!("/capsules?box={box_name}&page={page}");
    if let Some(state) = state {
        path.push_str(&format!("&state={state}"));
    }
    path
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let session_path = expand_tilde(&args.session);
    let session = load_session(&session_path);
    let client = ApiClient::new(
        args.server.clone(),
        session.as_ref().map(|s| s.access_token.clone()),
    );

    match args.command {
        Command::Signup {
            email,
            username,
            password,
            full_name,
        } => {
            let tokens = client
                .post(
                    "/auth/signup",
                    &json!({
                        "email": email,
                        "username": username,
                        "password": password,
                        "full_name": full_name,
                    }),
                )
                .await?;
            save_session(&session_path, &tokens)?;
            println!("Account created; session saved to {}", session_path.display());
        }

        Command::Login { username, password } => {
            let tokens = client
                .post(
                    "/auth/login",
                    &json!({ "username": username, "password": password }),
                )
                .await?;
            save_session(&session_path, &tokens)?;
            println!("Logged in; session saved to {}", session_path.display());
        }

        Command::Whoami => {
            let me = client.get("/auth/me").await?;
            println!(
                "{}  <{}>  id: {}",
                me["username"].as_str().unwrap_or("?"),
                me["email"].as_str().unwrap_or("?"),
                me["id"].as_str().unwrap_or("?")
            );
        }

        Command::Send {
            to,
            title,
            body,
            theme,
            media,
            early_view,
        } => {
            let capsule = client
                .post(
                    "/capsules",
                    &json!({
                        "receiver_id": to,
                        "title": title,
                        "body": body,
                        "theme": theme,
                        "media_urls": media,
                        "allow_early_view": early_view,
                    }),
                )
                .await?;
            println!("Draft created:");
            print_capsule_line(&capsule);
            println!("Seal it with: timefold seal --capsule {} --unlock <rfc3339>",
                capsule["id"].as_str().unwrap_or("?"));
        }

        Command::Seal { capsule, unlock } => {
            let sealed = client
                .post(
                    &format!("/capsules/{capsule}/seal"),
                    &json!({ "scheduled_unlock_at": unlock }),
                )
                .await?;
            println!("Sealed:");
            print_capsule_line(&sealed);
        }

        Command::Open { capsule } => {
            let opened = client
                .post(&format!("/capsules/{capsule}/open"), &json!({}))
                .await?;
            println!("Opened \"{}\":", opened["title"].as_str().unwrap_or(""));
            println!("{}", opened["body"].as_str().unwrap_or(""));
        }

        Command::Show { capsule } => {
            let view = client.get(&format!("/capsules/{capsule}")).await?;
            print_capsule_line(&view);
            match view["body"].as_str() {
                Some(body) => println!("{body}"),
                None => println!("(contents locked)"),
            }
        }

        Command::Inbox { state, page } => {
            let listing = client.get(&list_path("inbox", &state, page)).await?;
            print_listing(&listing);
        }

        Command::Outbox { state, page } => {
            let listing = client.get(&list_path("outbox", &state, page)).await?;
            print_listing(&listing);
        }

        Command::Delete { capsule } => {
            client.delete(&format!("/capsules/{capsule}")).await?;
            println!("Draft deleted.");
        }
    }

    Ok(())
}

fn print_listing(listing: &Value) {
    let capsules = listing["capsules"].as_array().cloned().unwrap_or_default();
    for capsule in &capsules {
        print_capsule_line(capsule);
    }
    println!(
        "page {} of {} capsule(s) total",
        listing["page"].as_u64().unwrap_or(1),
        listing["total"].as_u64().unwrap_or(0)
    );
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
