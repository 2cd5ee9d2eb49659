//! Integration tests for the per-entity helpers

mod common;

use pretty_assertions::assert_eq;
use scriptorium::entities::{
    CommentStatus, CreateComment, CreateMedia, CreatePlugin, CreateRole, CreateSite,
    CreateTemplate, CreateUser, PublishStatus, UpdatePost, UpdateUser,
};
use scriptorium::orm::FindOptions;

use common::{new_page, new_post, setup};

fn new_user(username: &str, email: Option<&str>) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        email: email.map(str::to_string),
        password_hash: "argon2-hash".to_string(),
        display_name: None,
        role: None,
    }
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_user_lookup_by_username_and_email() {
    let t = setup().await;
    let users = t.db.models().users;

    let created = users
        .create(new_user("kizz", Some("kizz@x.io")).into())
        .await
        .unwrap();
    assert_eq!(created.role, "subscriber");
    assert!(created.is_active);

    let by_name = users.find_by_username("kizz").await.unwrap();
    assert_eq!(by_name.as_ref().map(|u| u.id.as_str()), Some(created.id.as_str()));
    assert_eq!(users.find_by_username("nope").await.unwrap(), None);

    let by_email = users.find_by_email("KIZZ@X.IO").await.unwrap();
    assert_eq!(by_email, Some(created));
    assert_eq!(users.find_by_email("other@x.io").await.unwrap(), None);
}

#[tokio::test]
async fn test_email_lookup_treats_underscore_literally() {
    let t = setup().await;
    let users = t.db.models().users;
    users
        .create(new_user("under", Some("a_b@x.io")).into())
        .await
        .unwrap();
    users
        .create(new_user("other", Some("aXb@x.io")).into())
        .await
        .unwrap();

    let found = users.find_by_email("a_b@x.io").await.unwrap().unwrap();
    assert_eq!(found.username, "under");
}

#[tokio::test]
async fn test_active_users_and_login() {
    let t = setup().await;
    let users = t.db.models().users;
    let zed = users.create(new_user("zed", None).into()).await.unwrap();
    let amy = users.create(new_user("amy", None).into()).await.unwrap();
    let gone = users.create(new_user("gone", None).into()).await.unwrap();
    users
        .update(
            &gone.id,
            UpdateUser {
                is_active: Some(false),
                ..Default::default()
            }
            .into(),
        )
        .await
        .unwrap();

    let active = users.find_active(FindOptions::default()).await.unwrap();
    let names: Vec<_> = active.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["amy", "zed"]);

    assert_eq!(amy.last_login_at, None);
    let logged_in = users.record_login(&amy.id).await.unwrap();
    assert!(logged_in.last_login_at.is_some());
    assert_eq!(logged_in.username, "amy");
    assert_eq!(zed.role, "subscriber");
}

// ============================================================================
// Roles and sites
// ============================================================================

#[tokio::test]
async fn test_role_capabilities_round_trip_through_storage() {
    let t = setup().await;
    let roles = t.db.models().roles;

    roles
        .create(
            CreateRole {
                slug: "editor".to_string(),
                name: "Editor".to_string(),
                capabilities: vec!["edit_posts".to_string(), "publish_posts".to_string()],
            }
            .into(),
        )
        .await
        .unwrap();

    let editor = roles.find_by_slug("editor").await.unwrap().unwrap();
    assert!(editor.has_capability("publish_posts"));
    assert!(!editor.has_capability("manage_options"));
    assert_eq!(roles.find_by_slug("admin").await.unwrap(), None);
}

#[tokio::test]
async fn test_site_domain_is_case_insensitive() {
    let t = setup().await;
    let sites = t.db.models().sites;

    let site = sites
        .create(
            CreateSite {
                domain: "Blog.Example.COM".to_string(),
                path: None,
                name: "Blog".to_string(),
            }
            .into(),
        )
        .await
        .unwrap();
    assert_eq!(site.domain, "blog.example.com");
    assert_eq!(site.path, "/");

    let found = sites.find_by_domain("BLOG.example.com").await.unwrap();
    assert_eq!(found, Some(site));
}

// ============================================================================
// Posts, pages and comments
// ============================================================================

#[tokio::test]
async fn test_post_publish_stamps_once() {
    let t = setup().await;
    let posts = t.db.models().posts;
    let draft = posts
        .create(new_post("launch", PublishStatus::Draft).into())
        .await
        .unwrap();
    assert!(!draft.is_published());

    let published = posts.publish(&draft.id).await.unwrap();
    assert!(published.is_published());
    assert_eq!(published.status(), Some(PublishStatus::Publish));
    let stamped = published.published_at.clone().unwrap();

    let again = posts.publish(&draft.id).await.unwrap();
    assert_eq!(again.published_at, Some(stamped));

    assert!(posts.publish("missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_concurrent_publishes_stamp_once() {
    let t = setup().await;
    let posts = t.db.models().posts;
    let draft = posts
        .create(new_post("race", PublishStatus::Draft).into())
        .await
        .unwrap();

    let publishes = (0..8).map(|_| {
        let posts = posts.clone();
        let id = draft.id.clone();
        async move { posts.publish(&id).await }
    });
    let results = futures::future::join_all(publishes).await;

    let stamps: Vec<Option<String>> = results
        .into_iter()
        .map(|r| r.unwrap().published_at)
        .collect();
    assert!(stamps[0].is_some());
    assert!(stamps.iter().all(|s| *s == stamps[0]), "{stamps:?}");

    let stored = posts.find_by_id(&draft.id).await.unwrap().unwrap();
    assert_eq!(stored.published_at, stamps[0]);
}

#[tokio::test]
async fn test_published_listing_and_status_counts() {
    let t = setup().await;
    let posts = t.db.models().posts;
    let first = posts
        .create(new_post("first", PublishStatus::Draft).into())
        .await
        .unwrap();
    let second = posts
        .create(new_post("second", PublishStatus::Draft).into())
        .await
        .unwrap();
    posts
        .create(new_post("never", PublishStatus::Draft).into())
        .await
        .unwrap();

    posts.publish(&first.id).await.unwrap();
    posts.publish(&second.id).await.unwrap();

    let published = posts.find_published(FindOptions::default()).await.unwrap();
    let slugs: Vec<_> = published.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["second", "first"]);

    assert_eq!(posts.count_by_status(PublishStatus::Publish).await.unwrap(), 2);
    assert_eq!(posts.count_by_status(PublishStatus::Draft).await.unwrap(), 1);

    posts
        .update(
            &second.id,
            UpdatePost {
                status: Some(PublishStatus::Trash),
                ..Default::default()
            }
            .into(),
        )
        .await
        .unwrap();
    assert_eq!(posts.count_by_status(PublishStatus::Trash).await.unwrap(), 1);
    assert_eq!(
        posts.find_by_slug("second").await.unwrap().unwrap().status(),
        Some(PublishStatus::Trash)
    );
}

#[tokio::test]
async fn test_page_children_in_menu_order() {
    let t = setup().await;
    let pages = t.db.models().pages;

    let about = pages.create(new_page("about", 1).into()).await.unwrap();
    pages.create(new_page("home", 0).into()).await.unwrap();

    let mut team = new_page("team", 2);
    team.parent_id = Some(about.id.clone());
    let mut history = new_page("history", 1);
    history.parent_id = Some(about.id.clone());
    pages.create(team.into()).await.unwrap();
    pages.create(history.into()).await.unwrap();

    let top: Vec<_> = pages
        .find_children(None)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.slug)
        .collect();
    assert_eq!(top, vec!["home", "about"]);

    let children: Vec<_> = pages
        .find_children(Some(about.id.as_str()))
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.slug)
        .collect();
    assert_eq!(children, vec!["history", "team"]);

    assert!(pages.find_children(Some("missing")).await.unwrap().is_empty());

    let published = pages.publish(&about.id).await.unwrap();
    assert_eq!(published.status, "publish");
    assert!(published.published_at.is_some());
    assert_eq!(
        pages.find_by_slug("about").await.unwrap().map(|p| p.status),
        Some("publish".to_string())
    );
}

#[tokio::test]
async fn test_comment_moderation() {
    let t = setup().await;
    let post = t
        .db
        .models()
        .posts
        .create(new_post("discussed", PublishStatus::Publish).into())
        .await
        .unwrap();
    let comments = t.db.models().comments;

    let mut ids = Vec::new();
    for author in ["ann", "bob", "cy"] {
        let comment = comments
            .create(
                CreateComment {
                    post_id: post.id.clone(),
                    author_name: author.to_string(),
                    content: format!("comment by {author}"),
                    ..Default::default()
                }
                .into(),
            )
            .await
            .unwrap();
        assert_eq!(comment.status, CommentStatus::Pending.as_str());
        ids.push(comment.id);
    }
    assert_eq!(comments.count_pending().await.unwrap(), 3);

    comments.approve(&ids[0]).await.unwrap();
    comments.approve(&ids[2]).await.unwrap();
    assert_eq!(comments.count_pending().await.unwrap(), 1);

    let visible = comments
        .find_for_post(&post.id, FindOptions::default())
        .await
        .unwrap();
    let authors: Vec<_> = visible.iter().map(|c| c.author_name.as_str()).collect();
    assert_eq!(authors, vec!["ann", "cy"]);

    assert!(comments
        .find_for_post("other-post", FindOptions::default())
        .await
        .unwrap()
        .is_empty());
}

// ============================================================================
// Media, templates and plugins
// ============================================================================

#[tokio::test]
async fn test_media_by_mime_prefix() {
    let t = setup().await;
    let media = t.db.models().media;
    for (file_name, mime) in [
        ("cat.png", "image/png"),
        ("dog.jpg", "image/jpeg"),
        ("notes.pdf", "application/pdf"),
    ] {
        media
            .create(
                CreateMedia {
                    file_name: file_name.to_string(),
                    mime_type: mime.to_string(),
                    file_size: 1024,
                    url: format!("/uploads/{file_name}"),
                    ..Default::default()
                }
                .into(),
            )
            .await
            .unwrap();
    }

    let images = media
        .find_by_mime_prefix("image/", FindOptions::default())
        .await
        .unwrap();
    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|m| m.mime_type.starts_with("image/")));

    assert!(media
        .find_by_mime_prefix("IMAGE/", FindOptions::default())
        .await
        .unwrap()
        .is_empty());

    let pdf = media.find_by_file_name("notes.pdf").await.unwrap().unwrap();
    assert_eq!(pdf.url, "/uploads/notes.pdf");
}

#[tokio::test]
async fn test_templates_by_kind() {
    let t = setup().await;
    let templates = t.db.models().templates;
    for (name, kind) in [("Single", Some("post")), ("Landing", None), ("About", None)] {
        templates
            .create(
                CreateTemplate {
                    name: name.to_string(),
                    slug: name.to_lowercase(),
                    kind: kind.map(str::to_string),
                    content: "<main></main>".to_string(),
                    theme_id: None,
                }
                .into(),
            )
            .await
            .unwrap();
    }

    let pages: Vec<_> = templates
        .find_by_kind("page")
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(pages, vec!["About", "Landing"]);
    assert_eq!(templates.find_by_kind("post").await.unwrap().len(), 1);
    assert!(templates.find_by_slug("landing").await.unwrap().is_some());
}

#[tokio::test]
async fn test_plugin_activation() {
    let t = setup().await;
    let plugins = t.db.models().plugins;
    let mut ids = Vec::new();
    for slug in ["seo", "akismet", "cache"] {
        let plugin = plugins
            .create(
                CreatePlugin {
                    slug: slug.to_string(),
                    name: slug.to_uppercase(),
                    ..Default::default()
                }
                .into(),
            )
            .await
            .unwrap();
        assert!(!plugin.is_active);
        ids.push(plugin.id);
    }

    plugins.set_active(&ids[0], true).await.unwrap();
    plugins.set_active(&ids[1], true).await.unwrap();
    let active: Vec<_> = plugins
        .find_active()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.slug)
        .collect();
    assert_eq!(active, vec!["akismet", "seo"]);

    let off = plugins.set_active(&ids[0], false).await.unwrap();
    assert!(!off.is_active);
    assert_eq!(plugins.find_active().await.unwrap().len(), 1);
    assert!(plugins.find_by_slug("cache").await.unwrap().is_some());
}

// ============================================================================
// Options
// ============================================================================

#[tokio::test]
async fn test_options_get_set_delete() {
    let t = setup().await;
    let options = t.db.models().options;

    assert_eq!(options.get_option("blogname").await.unwrap(), None);

    let first = options.set_option("blogname", "Scriptorium", None).await.unwrap();
    assert!(first.autoload);
    options.set_option("blogname", "Renamed", None).await.unwrap();
    assert_eq!(
        options.get_option("blogname").await.unwrap(),
        Some("Renamed".to_string())
    );
    assert_eq!(options.count(&[]).await.unwrap(), 1);

    options.set_option("cron", "[]", Some(false)).await.unwrap();
    options.set_option("admin_email", "a@x.io", Some(true)).await.unwrap();
    let autoloaded: Vec<_> = options
        .find_autoload()
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.name)
        .collect();
    assert_eq!(autoloaded, vec!["admin_email", "blogname"]);

    options.delete_option("blogname").await.unwrap();
    options.delete_option("blogname").await.unwrap();
    assert_eq!(options.get_option("blogname").await.unwrap(), None);
}
