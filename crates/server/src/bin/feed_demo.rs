use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

use client::{HttpStore, PostPage};
use domain::{format_distance_to_now, PostId, Session, UserId};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

fn session_from_env() -> anyhow::Result<Session> {
    let (Ok(user), Ok(token)) = (
        std::env::var("POKESOCIAL_USER"),
        std::env::var("POKESOCIAL_TOKEN"),
    ) else {
        return Ok(Session::Anonymous);
    };
    let user_id = UserId::new(user).map_err(anyhow::Error::msg)?;
    Ok(Session::authenticated(user_id, token))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let base_url =
        std::env::var("POKESOCIAL_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let post_id: i64 = std::env::args()
        .nth(1)
        .context("usage: feed_demo <post-id> [comment]")?
        .parse()
        .context("post id must be a number")?;
    let comment = std::env::args().nth(2);
    let session = session_from_env()?;

    println!("Opening post {} on {}...", post_id, base_url);
    let store = Arc::new(HttpStore::new(base_url));
    let mut page = PostPage::open(store, session.clone(), PostId(post_id)).await?;
    print_page(&page);

    if session.user_id().is_none() {
        println!("\nSet POKESOCIAL_USER and POKESOCIAL_TOKEN to like and comment.");
        return Ok(());
    }

    println!("\nToggling like...");
    let state = page.toggle_like().await?;
    println!("   -> {:?}, {} likes", state.status, state.count);

    if let Some(text) = comment {
        println!("\nPosting comment...");
        page.comment(&text, None).await?;
        print_page(&page);
    }

    Ok(())
}

fn print_page(page: &PostPage) {
    let now = Utc::now().naive_utc();
    let post = page.post();
    let counts = page.counts();
    println!(
        "\n[{}] {} ({})",
        post.id,
        post.content,
        format_distance_to_now(post.created_at, now)
    );
    println!("   {} likes, {} comments", counts.likes, counts.comments);

    let thread = page.thread();
    for node in &thread.roots {
        for (depth, c) in node.walk() {
            println!(
                "   {}- {}: {} ({}{})",
                "  ".repeat(depth),
                c.author_label(),
                c.content,
                format_distance_to_now(c.created_at, now),
                if c.is_edited() { ", edited" } else { "" }
            );
        }
    }
}
