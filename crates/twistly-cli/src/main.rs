use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::info;
use uuid::Uuid;

use twistly_core::App;
use twistly_store::kv::MemoryStore;
use twistly_store::sqlite::SqliteStore;
use twistly_store::users::NewUser;
use twistly_types::identity::Identity;

fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "twistly=info".into()),
        )
        .init();

    let db_path = std::env::var("TWISTLY_DB_PATH").unwrap_or_else(|_| "twistly.db".into());
    let kv = Arc::new(SqliteStore::open(&PathBuf::from(&db_path))?);
    // Each invocation is one "tab": the guest marker never outlives the
    // process, only the stored guest session id does.
    let transient = Arc::new(MemoryStore::new());
    let app = App::new(kv, transient);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = args.first().map(String::as_str).unwrap_or("help");

    match cmd {
        "signup" => signup(&app, &args[1..]),
        "login" => login(&app, &args[1..]),
        "guest" => guest(&app),
        "logout" => logout(&app),
        "whoami" => whoami(&app),
        "post" => post(&app, &args[1..]),
        "feed" => feed(&app),
        "react" => react(&app, &args[1..]),
        "comment" => comment(&app, &args[1..]),
        "send" => send(&app, &args[1..]),
        "conversations" => conversations(&app),
        "chat" => chat(&app, &args[1..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("unknown command: {}", other);
        }
    }
}

fn print_usage() {
    println!(
        "twistly — ephemeral social feed\n\n\
         USAGE:\n  twistly <command> [args]\n\n\
         COMMANDS:\n\
         \x20 signup <email> <password> <username> [bio] [pfp-url]\n\
         \x20 login <email> <password>\n\
         \x20 guest\n\
         \x20 logout\n\
         \x20 whoami\n\
         \x20 post <media-file>\n\
         \x20 feed\n\
         \x20 react <post-id> <emoji>\n\
         \x20 comment <post-id> <text...>\n\
         \x20 send <peer-email> <text...>\n\
         \x20 conversations\n\
         \x20 chat <peer-email>\n\n\
         ENV:\n  TWISTLY_DB_PATH  storage file (default: twistly.db)"
    );
}

fn signup(app: &App, args: &[String]) -> Result<()> {
    let [email, password, username, rest @ ..] = args else {
        bail!("usage: twistly signup <email> <password> <username> [bio] [pfp-url]");
    };
    let user = app.sign_up(NewUser {
        email: email.clone(),
        password: password.clone(),
        username: username.clone(),
        bio: rest.first().cloned().unwrap_or_default(),
        pfp: rest.get(1).cloned().unwrap_or_default(),
    })?;
    println!("signed up and logged in as {} <{}>", user.username, user.email);
    Ok(())
}

fn login(app: &App, args: &[String]) -> Result<()> {
    let [email, password] = args else {
        bail!("usage: twistly login <email> <password>");
    };
    let user = app.log_in(email, password)?;
    println!("logged in as {} <{}>", user.username, user.email);
    Ok(())
}

fn guest(app: &App) -> Result<()> {
    let identity = app.guest_login()?;
    println!("browsing as {}", identity.as_str());
    Ok(())
}

fn logout(app: &App) -> Result<()> {
    app.log_out()?;
    println!("logged out");
    Ok(())
}

fn whoami(app: &App) -> Result<()> {
    match app.current_identity()? {
        Some(Identity::Registered(email)) => match app.users.find(&email)? {
            Some(user) => println!("{} <{}>", user.username, user.email),
            None => println!("{} (no account record)", email),
        },
        Some(Identity::Guest(id)) => println!("{} (guest)", id),
        None => println!("not logged in"),
    }
    Ok(())
}

fn post(app: &App, args: &[String]) -> Result<()> {
    let [file] = args else {
        bail!("usage: twistly post <media-file>");
    };
    let path = Path::new(file);
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let content_type = content_type_for(path);

    let post = app.create_post(content_type, &bytes)?;
    info!("stored {} bytes of {}", bytes.len(), content_type);
    println!("posted {} ({:?}), expires in 24h", post.id, post.kind);
    Ok(())
}

fn feed(app: &App) -> Result<()> {
    let feed = app.feed()?;
    if feed.is_empty() {
        println!("No posts yet. Upload something to get started!");
        return Ok(());
    }

    for entry in feed {
        let hours = entry.remaining_ms / (1000 * 60 * 60);
        let mins = (entry.remaining_ms % (1000 * 60 * 60)) / (1000 * 60);
        println!(
            "{}  by {} ({:?}, expires in {}h {}m)",
            entry.post.id, entry.author_name, entry.post.kind, hours, mins
        );
        let counts: Vec<String> = entry
            .reaction_counts
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(emoji, n)| format!("{emoji} {n}"))
            .collect();
        if !counts.is_empty() {
            println!("    {}", counts.join("  "));
        }
        for comment in &entry.post.comments {
            println!("    {}: {}", comment.username, comment.text);
        }
    }
    Ok(())
}

fn react(app: &App, args: &[String]) -> Result<()> {
    let [post_id, emoji] = args else {
        bail!("usage: twistly react <post-id> <emoji>");
    };
    let post_id: Uuid = post_id.parse().context("invalid post id")?;
    match app.toggle_reaction(post_id, emoji)? {
        Some(outcome) => println!("{:?} {}", outcome, emoji),
        None => println!("post not found (it may have expired)"),
    }
    Ok(())
}

fn comment(app: &App, args: &[String]) -> Result<()> {
    let [post_id, text @ ..] = args else {
        bail!("usage: twistly comment <post-id> <text...>");
    };
    let post_id: Uuid = post_id.parse().context("invalid post id")?;
    if app.comment(post_id, &text.join(" "))? {
        println!("comment added");
    } else {
        println!("post not found (it may have expired)");
    }
    Ok(())
}

fn send(app: &App, args: &[String]) -> Result<()> {
    let [to, text @ ..] = args else {
        bail!("usage: twistly send <peer-email> <text...>");
    };
    let message = app.send_message(to, &text.join(" "))?;
    println!("sent to {}", message.to);
    Ok(())
}

fn conversations(app: &App) -> Result<()> {
    let convos = app.conversations()?;
    if convos.is_empty() {
        println!("No conversations yet.");
        return Ok(());
    }
    for convo in convos {
        let last = convo.messages.last().map(|m| m.text.as_str()).unwrap_or("");
        println!(
            "{} <{}> — {} messages, last: {}",
            convo.peer_name,
            convo.peer_email,
            convo.messages.len(),
            last
        );
    }
    Ok(())
}

fn chat(app: &App, args: &[String]) -> Result<()> {
    let [peer] = args else {
        bail!("usage: twistly chat <peer-email>");
    };
    let me = app
        .current_user()?
        .map(|u| u.email)
        .unwrap_or_default();
    for message in app.chat_with(peer)? {
        let marker = if message.from == me {
            "me"
        } else {
            message.from.as_str()
        };
        println!("[{}] {}", marker, message.text);
    }
    Ok(())
}

/// Map a file extension to a MIME type. Anything unrecognized falls
/// through to the upload validator, which rejects non-media types.
fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}
