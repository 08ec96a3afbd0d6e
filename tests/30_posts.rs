mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_post, register, register_with_id, send, test_app};

#[tokio::test]
async fn created_posts_carry_the_author_snapshot() {
    let app = test_app();
    let (token, user_id) = register_with_id(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&token),
        Some(json!({ "text": "Hello world" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "Hello world");
    assert_eq!(body["data"]["user"], json!(user_id));
    assert_eq!(body["data"]["name"], "Ada");
    assert!(body["data"]["avatar"]
        .as_str()
        .is_some_and(|a| a.contains("gravatar")));
    assert_eq!(body["data"]["likes"], json!([]));
    assert_eq!(body["data"]["comments"], json!([]));
}

#[tokio::test]
async fn empty_text_is_rejected() {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;

    for body in [json!({}), json!({ "text": "   " })] {
        let (status, response) =
            send(&app, "POST", "/api/posts", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["field_errors"]["text"], "Text is required");
    }
}

#[tokio::test]
async fn list_returns_newest_first() {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;

    for text in ["first", "second", "third"] {
        create_post(&app, &token, text).await;
        // created_at ordering needs distinct timestamps
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (status, body) = send(&app, "GET", "/api/posts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = body["data"]
        .as_array()
        .expect("posts")
        .iter()
        .map(|p| p["text"].as_str().expect("text"))
        .collect();
    assert_eq!(texts, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn get_by_id_handles_malformed_and_unknown_ids() {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;
    let post_id = create_post(&app, &token, "Hello").await;

    let path = format!("/api/posts/{}", post_id);
    let (status, body) = send(&app, "GET", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "Hello");

    let (status, body) = send(&app, "GET", "/api/posts/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Invalid ID.");

    let path = format!("/api/posts/{}", uuid::Uuid::new_v4());
    let (status, body) = send(&app, "GET", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Post not found.");
}

#[tokio::test]
async fn only_the_author_may_delete_a_post() {
    let app = test_app();
    let author = register(&app, "Ada", "ada@example.com").await;
    let other = register(&app, "Grace", "grace@example.com").await;
    let post_id = create_post(&app, &author, "Mine").await;

    let path = format!("/api/posts/{}", post_id);
    let (status, body) = send(&app, "DELETE", &path, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden action.");

    let (status, body) = send(&app, "DELETE", &path, Some(&author), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "Post deleted.");

    let (status, _) = send(&app, "GET", &path, Some(&author), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn liking_twice_conflicts_without_changing_the_set() {
    let app = test_app();
    let (token, user_id) = register_with_id(&app, "Ada", "ada@example.com").await;
    let post_id = create_post(&app, &token, "Like me").await;

    let path = format!("/api/posts/like/{}", post_id);
    let (status, body) = send(&app, "PUT", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{ "user": user_id }]));

    let (status, body) = send(&app, "PUT", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Already liked.");

    let get_path = format!("/api/posts/{}", post_id);
    let (_, body) = send(&app, "GET", &get_path, Some(&token), None).await;
    assert_eq!(body["data"]["likes"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn likes_front_insert_newest_first() {
    let app = test_app();
    let (first, first_id) = register_with_id(&app, "Ada", "ada@example.com").await;
    let (second, second_id) = register_with_id(&app, "Grace", "grace@example.com").await;
    let post_id = create_post(&app, &first, "Popular").await;

    let path = format!("/api/posts/like/{}", post_id);
    send(&app, "PUT", &path, Some(&first), None).await;
    let (_, body) = send(&app, "PUT", &path, Some(&second), None).await;

    assert_eq!(
        body["data"],
        json!([{ "user": second_id }, { "user": first_id }])
    );
}

#[tokio::test]
async fn unliking_an_unliked_post_conflicts() {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;
    let post_id = create_post(&app, &token, "Never liked").await;

    let path = format!("/api/posts/unlike/{}", post_id);
    let (status, body) = send(&app, "PUT", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Post has not yet been liked.");
}

#[tokio::test]
async fn like_then_unlike_clears_the_set() {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;
    let post_id = create_post(&app, &token, "Fickle crowd").await;

    let like_path = format!("/api/posts/like/{}", post_id);
    send(&app, "PUT", &like_path, Some(&token), None).await;

    let unlike_path = format!("/api/posts/unlike/{}", post_id);
    let (status, body) = send(&app, "PUT", &unlike_path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn comments_front_insert_and_snapshot_their_author() {
    let app = test_app();
    let author = register(&app, "Ada", "ada@example.com").await;
    let commenter = register(&app, "Grace", "grace@example.com").await;
    let post_id = create_post(&app, &author, "Discuss").await;

    let path = format!("/api/posts/comment/{}", post_id);
    send(
        &app,
        "POST",
        &path,
        Some(&author),
        Some(json!({ "text": "First comment" })),
    )
    .await;
    let (status, body) = send(
        &app,
        "POST",
        &path,
        Some(&commenter),
        Some(json!({ "text": "Second comment" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let comments = body["data"].as_array().expect("comments");
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["text"], "Second comment");
    assert_eq!(comments[0]["name"], "Grace");
    assert_eq!(comments[1]["text"], "First comment");
    assert_eq!(comments[1]["name"], "Ada");
}

#[tokio::test]
async fn only_the_comment_author_may_delete_it() {
    let app = test_app();
    let post_author = register(&app, "Ada", "ada@example.com").await;
    let commenter = register(&app, "Grace", "grace@example.com").await;
    let post_id = create_post(&app, &post_author, "Discuss").await;

    let comment_path = format!("/api/posts/comment/{}", post_id);
    let (_, body) = send(
        &app,
        "POST",
        &comment_path,
        Some(&commenter),
        Some(json!({ "text": "Hot take" })),
    )
    .await;
    let comment_id = body["data"][0]["id"].as_str().expect("comment id").to_string();

    // Owning the post does not grant authority over someone else's comment.
    let delete_path = format!("/api/posts/comment/{}/{}", post_id, comment_id);
    let (status, body) = send(&app, "DELETE", &delete_path, Some(&post_author), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden action.");

    let (status, body) = send(&app, "DELETE", &delete_path, Some(&commenter), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn deleting_an_unknown_comment_is_not_found() {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;
    let post_id = create_post(&app, &token, "Quiet").await;

    let path = format!("/api/posts/comment/{}/{}", post_id, uuid::Uuid::new_v4());
    let (status, body) = send(&app, "DELETE", &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Comment not found.");
}

#[tokio::test]
async fn post_routes_reject_missing_tokens() {
    let app = test_app();

    let (status, _) = send(&app, "GET", "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/posts",
        None,
        Some(json!({ "text": "anonymous" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
