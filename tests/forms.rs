mod common;

use axum::http::StatusCode;

use common::{body_string, location, Part, TestApp, SMALL_GIF};
use yatube::services::{CommentService, FollowService, PostService};

#[tokio::test]
async fn valid_form_creates_post_with_image() {
    let t = TestApp::new().await;
    let author = t.user("author").await;
    let group = t.group("cats").await;
    let cookie = t.login(&author);
    let group_id = group.id.to_string();
    let before = t.post_count().await;

    let response = t
        .post_multipart(
            "/create/",
            Some(&cookie),
            &[
                Part::Text("text", "A brand new post"),
                Part::Text("group", &group_id),
                Part::File {
                    name: "image",
                    file_name: "small.gif",
                    content_type: "image/gif",
                    bytes: SMALL_GIF,
                },
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/profile/author/");
    assert_eq!(t.post_count().await, before + 1);

    let newest = &t
        .store
        .list_posts(yatube::models::post::PostFilter::All, 0, 1)
        .await
        .unwrap()[0];
    assert_eq!(newest.post.text, "A brand new post");
    assert_eq!(newest.group.as_ref().map(|g| g.id), Some(group.id));
    assert_eq!(newest.post.image.as_deref(), Some("posts/small.gif"));
    assert_eq!(
        std::fs::read(t.media.path().join("posts/small.gif")).unwrap(),
        SMALL_GIF
    );

    let served = t.get("/media/posts/small.gif", None).await;
    assert_eq!(served.status(), StatusCode::OK);
}

#[tokio::test]
async fn very_long_image_name_is_shortened() {
    let t = TestApp::new().await;
    let author = t.user("author").await;
    let cookie = t.login(&author);
    let file_name = format!("{}.gif", "a".repeat(300));

    let response = t
        .post_multipart(
            "/create/",
            Some(&cookie),
            &[
                Part::Text("text", "Long name"),
                Part::File {
                    name: "image",
                    file_name: &file_name,
                    content_type: "image/gif",
                    bytes: SMALL_GIF,
                },
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let newest = &t
        .store
        .list_posts(yatube::models::post::PostFilter::All, 0, 1)
        .await
        .unwrap()[0];
    let image = newest.post.image.as_deref().unwrap();
    assert!(image.starts_with("posts/aaa") && image.ends_with(".gif"));
    assert!(image.len() <= 255);
    assert!(t.media.path().join(image).exists());
}

#[tokio::test]
async fn blank_text_rerenders_the_form() {
    let t = TestApp::new().await;
    let author = t.user("author").await;
    let cookie = t.login(&author);

    let response = t
        .post_multipart("/create/", Some(&cookie), &[Part::Text("text", "   ")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("This field is required."));
    assert_eq!(t.post_count().await, 0);
}

#[tokio::test]
async fn unknown_group_or_non_image_is_rejected() {
    let t = TestApp::new().await;
    let author = t.user("author").await;
    let cookie = t.login(&author);

    let response = t
        .post_multipart(
            "/create/",
            Some(&cookie),
            &[Part::Text("text", "hi"), Part::Text("group", "4242")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Select a valid choice."));

    let response = t
        .post_multipart(
            "/create/",
            Some(&cookie),
            &[
                Part::Text("text", "hi"),
                Part::File {
                    name: "image",
                    file_name: "notes.txt",
                    content_type: "text/plain",
                    bytes: b"not an image",
                },
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Upload a valid image."));
    assert_eq!(t.post_count().await, 0);
}

#[tokio::test]
async fn author_edit_updates_text_only() {
    let t = TestApp::new().await;
    let author = t.user("author").await;
    let group = t.group("cats").await;
    let post = t.post(&author, "original", Some(&group)).await;
    let cookie = t.login(&author);
    let before = t.post_count().await;

    let response = t
        .post_multipart(
            &format!("/posts/{}/edit/", post.id),
            Some(&cookie),
            &[Part::Text("text", "edited text")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/posts/{}/", post.id));
    assert_eq!(t.post_count().await, before);
    let stored = t.store.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.post.text, "edited text");
    // the form had no group, so the post no longer has one
    assert!(stored.group.is_none());
    assert_eq!(stored.post.created, post.created);
}

#[tokio::test]
async fn non_author_edit_changes_nothing() {
    let t = TestApp::new().await;
    let author = t.user("author").await;
    let post = t.post(&author, "original", None).await;
    let stranger = t.user("stranger").await;
    let cookie = t.login(&stranger);

    let response = t
        .post_multipart(
            &format!("/posts/{}/edit/", post.id),
            Some(&cookie),
            &[Part::Text("text", "vandalised")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/posts/{}/", post.id));
    let stored = t.store.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.post.text, "original");

    let response = t
        .post_form(&format!("/posts/{}/delete/", post.id), Some(&cookie), "")
        .await;
    assert_eq!(location(&response), format!("/posts/{}/", post.id));
    assert!(t.store.get_post(post.id).await.unwrap().is_some());
}

#[tokio::test]
async fn author_can_delete_post() {
    let t = TestApp::new().await;
    let author = t.user("author").await;
    let post = t.post(&author, "short-lived", None).await;
    let cookie = t.login(&author);

    let response = t
        .post_form(&format!("/posts/{}/delete/", post.id), Some(&cookie), "")
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/profile/author/");
    assert_eq!(t.post_count().await, 0);
}

#[tokio::test]
async fn valid_comment_is_stored() {
    let t = TestApp::new().await;
    let author = t.user("author").await;
    let post = t.post(&author, "hello", None).await;
    let commenter = t.user("reader").await;
    let cookie = t.login(&commenter);

    let response = t
        .post_form(
            &format!("/posts/{}/comment/", post.id),
            Some(&cookie),
            "text=Nice+post",
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/posts/{}/", post.id));

    let comments = t.store.list_for_post(post.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment.text, "Nice post");
    assert_eq!(comments[0].author.id, commenter.id);
    assert_eq!(comments[0].comment.post_id, post.id);

    let html = body_string(t.get(&format!("/posts/{}/", post.id), None).await).await;
    assert!(html.contains("Nice post"));
}

#[tokio::test]
async fn blank_comment_is_ignored() {
    let t = TestApp::new().await;
    let author = t.user("author").await;
    let post = t.post(&author, "hello", None).await;
    let cookie = t.login(&author);

    let response = t
        .post_form(&format!("/posts/{}/comment/", post.id), Some(&cookie), "text=")
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(t.store.list_for_post(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn anonymous_comment_is_not_stored() {
    let t = TestApp::new().await;
    let author = t.user("author").await;
    let post = t.post(&author, "hello", None).await;

    let response = t
        .post_form(&format!("/posts/{}/comment/", post.id), None, "text=hi")
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with("/auth/login/?next="));
    assert!(t.store.list_for_post(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn follow_and_unfollow() {
    let t = TestApp::new().await;
    let author = t.user("author").await;
    let reader = t.user("reader").await;
    let cookie = t.login(&reader);

    let response = t.get("/profile/author/follow/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/profile/author/");
    assert!(t.store.is_following(reader.id, author.id).await.unwrap());

    // second follow is a no-op, self-follow is refused
    t.get("/profile/author/follow/", Some(&cookie)).await;
    t.get("/profile/reader/follow/", Some(&cookie)).await;
    assert!(!t.store.is_following(reader.id, reader.id).await.unwrap());

    let html = body_string(t.get("/profile/author/", Some(&cookie)).await).await;
    assert!(html.contains("Unfollow"));

    t.get("/profile/author/unfollow/", Some(&cookie)).await;
    assert!(!t.store.is_following(reader.id, author.id).await.unwrap());
}
