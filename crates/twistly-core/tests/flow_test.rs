//! End-to-end flows over an in-memory backend: signup, posting, reacting,
//! commenting and messaging, plus the gates that reject guests and
//! logged-out sessions.

use std::sync::Arc;

use twistly_core::App;
use twistly_store::kv::MemoryStore;
use twistly_store::users::NewUser;
use twistly_store::StoreError;
use twistly_types::identity::Identity;

fn app() -> App {
    App::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
}

fn new_user(email: &str, username: &str) -> NewUser {
    NewUser {
        email: email.into(),
        password: "pw".into(),
        username: username.into(),
        bio: String::new(),
        pfp: String::new(),
    }
}

const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47];

#[test]
fn signup_logs_the_new_user_in() {
    let app = app();
    app.sign_up(new_user("alice@example.com", "alice")).unwrap();

    let user = app.current_user().unwrap().unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(
        app.current_identity().unwrap(),
        Some(Identity::Registered("alice@example.com".into()))
    );
}

#[test]
fn duplicate_signup_fails_and_preserves_the_session() {
    let app = app();
    app.sign_up(new_user("alice@example.com", "alice")).unwrap();

    let result = app.sign_up(new_user("alice@example.com", "impostor"));
    assert!(matches!(result, Err(StoreError::EmailTaken)));

    // The failed signup altered neither the user set nor the session.
    assert_eq!(app.users.all().unwrap().len(), 1);
    assert_eq!(app.current_user().unwrap().unwrap().username, "alice");
}

#[test]
fn wrong_credentials_are_rejected() {
    let app = app();
    app.sign_up(new_user("alice@example.com", "alice")).unwrap();
    app.log_out().unwrap();

    assert!(matches!(
        app.log_in("alice@example.com", "nope"),
        Err(StoreError::InvalidCredentials)
    ));
    assert_eq!(app.current_identity().unwrap(), None);

    app.log_in("alice@example.com", "pw").unwrap();
    assert!(app.current_user().unwrap().is_some());
}

#[test]
fn logout_clears_the_session() {
    let app = app();
    app.sign_up(new_user("alice@example.com", "alice")).unwrap();
    app.log_out().unwrap();
    assert_eq!(app.current_identity().unwrap(), None);
    assert_eq!(app.current_user().unwrap().map(|u| u.email), None);
}

#[test]
fn post_react_comment_flow() {
    let app = app();
    app.sign_up(new_user("alice@example.com", "alice")).unwrap();
    let post = app.create_post("image/png", PNG).unwrap();
    assert!(post.url.starts_with("data:image/png;base64,"));

    app.sign_up(new_user("bob@example.com", "bob")).unwrap();
    app.toggle_reaction(post.id, "❤️").unwrap();
    app.comment(post.id, "  nice shot  ").unwrap();

    let feed = app.feed().unwrap();
    assert_eq!(feed.len(), 1);
    let entry = &feed[0];
    assert_eq!(entry.author_name, "alice");
    assert_eq!(
        entry.reaction_counts.iter().find(|(e, _)| *e == "❤️"),
        Some(&("❤️", 1))
    );
    assert_eq!(entry.post.comments.len(), 1);
    assert_eq!(entry.post.comments[0].username, "bob");
    assert_eq!(entry.post.comments[0].text, "nice shot");
    assert!(entry.remaining_ms > 0);
}

#[test]
fn heart_then_heart_removes_heart_then_fire_switches() {
    let app = app();
    app.sign_up(new_user("alice@example.com", "alice")).unwrap();
    let post = app.create_post("image/png", PNG).unwrap();

    app.toggle_reaction(post.id, "❤️").unwrap();
    app.toggle_reaction(post.id, "❤️").unwrap();
    let feed = app.feed().unwrap();
    assert!(feed[0].post.reactions.is_empty());

    app.toggle_reaction(post.id, "❤️").unwrap();
    app.toggle_reaction(post.id, "🔥").unwrap();
    let feed = app.feed().unwrap();
    assert_eq!(feed[0].post.reactions.len(), 1);
    assert_eq!(
        feed[0].post.reactions.get("alice@example.com").map(String::as_str),
        Some("🔥")
    );
}

#[test]
fn guests_can_browse_but_not_write() {
    let app = app();
    app.sign_up(new_user("alice@example.com", "alice")).unwrap();
    let post = app.create_post("image/png", PNG).unwrap();
    app.log_out().unwrap();

    let identity = app.guest_login().unwrap();
    assert!(identity.is_guest());
    assert!(app.current_user().unwrap().is_none());

    // Browsing works.
    assert_eq!(app.feed().unwrap().len(), 1);

    // Writes are all rejected with no mutation.
    assert!(matches!(
        app.toggle_reaction(post.id, "❤️"),
        Err(StoreError::NotAuthenticated)
    ));
    assert!(matches!(
        app.comment(post.id, "hi"),
        Err(StoreError::NotAuthenticated)
    ));
    assert!(matches!(
        app.create_post("image/png", PNG),
        Err(StoreError::NotAuthenticated)
    ));
    assert!(matches!(
        app.send_message("alice@example.com", "hi"),
        Err(StoreError::NotAuthenticated)
    ));

    let feed = app.feed().unwrap();
    assert_eq!(feed.len(), 1);
    assert!(feed[0].post.reactions.is_empty());
    assert!(feed[0].post.comments.is_empty());
    assert!(app.messages.all().unwrap().is_empty());
}

#[test]
fn non_media_upload_is_rejected_without_writing() {
    let app = app();
    app.sign_up(new_user("alice@example.com", "alice")).unwrap();

    assert!(matches!(
        app.create_post("text/plain", b"hello"),
        Err(StoreError::UnsupportedMedia(_))
    ));
    assert!(app.feed().unwrap().is_empty());
}

#[test]
fn feed_resolves_unknown_authors_to_a_placeholder() {
    let author_app = app();
    author_app
        .sign_up(new_user("alice@example.com", "alice"))
        .unwrap();
    author_app.create_post("video/mp4", &[0, 0, 0]).unwrap();

    // Simulate a dangling author: the post outlives any user record in a
    // different profile. Rebuild the app over a store holding only posts.
    let posts = author_app.posts.load().unwrap();
    let fresh = app();
    fresh.posts.save(&posts).unwrap();

    let feed = fresh.feed().unwrap();
    assert_eq!(feed[0].author_name, "Unknown");
    assert!(feed[0].author_avatar.contains("alice@example.com"));
}

#[test]
fn messaging_flow_both_directions() {
    let app = app();
    app.sign_up(new_user("alice@example.com", "alice")).unwrap();
    app.sign_up(new_user("bob@example.com", "bob")).unwrap();

    // bob is now logged in
    let sent = app.send_message("alice@example.com", "hey alice").unwrap();

    let bob_convos = app.conversations().unwrap();
    assert_eq!(bob_convos.len(), 1);
    assert_eq!(bob_convos[0].peer_email, "alice@example.com");
    assert_eq!(bob_convos[0].peer_name, "alice");
    assert_eq!(bob_convos[0].messages[0].id, sent.id);

    app.log_in("alice@example.com", "pw").unwrap();
    let alice_convos = app.conversations().unwrap();
    assert_eq!(alice_convos.len(), 1);
    assert_eq!(alice_convos[0].peer_email, "bob@example.com");
    assert_eq!(alice_convos[0].messages[0].id, sent.id);

    app.send_message("bob@example.com", "hey bob").unwrap();
    let chat = app.chat_with("bob@example.com").unwrap();
    let texts: Vec<&str> = chat.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["hey alice", "hey bob"]);
}

#[test]
fn conversation_peers_without_records_fall_back_to_email() {
    let app = app();
    app.sign_up(new_user("alice@example.com", "alice")).unwrap();
    app.send_message("stranger@example.com", "hello?").unwrap();

    let convos = app.conversations().unwrap();
    assert_eq!(convos[0].peer_name, "stranger@example.com");
}
