//! End-to-end HTTP flows against the real services and the in-memory store.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use campussphere::Trace;
use campussphere::domain::{PostId, VoteTarget};
use campussphere::inbound::http::accounts::{login, register};
use campussphere::inbound::http::communities::{
    create_community, get_community, join_community, list_communities,
};
use campussphere::inbound::http::content::{
    create_comment, create_post, list_comments, list_posts,
};
use campussphere::inbound::http::error::{json_error_handler, path_error_handler};
use campussphere::inbound::http::votes::submit_vote;
use campussphere::test_support::{FixedClock, InMemoryStore, in_memory_http_state};
use rstest::rstest;
use serde_json::{Value, json};

macro_rules! campus_app {
    ($store:expr, $clock:expr) => {{
        let state = in_memory_http_state(&$store, $clock).expect("test secret is long enough");
        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(Trace)
                .service(
                    web::scope("/api/v1")
                        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                        .app_data(web::PathConfig::default().error_handler(path_error_handler))
                        .service(register)
                        .service(login)
                        .service(list_communities)
                        .service(create_community)
                        .service(get_community)
                        .service(join_community)
                        .service(list_posts)
                        .service(create_post)
                        .service(list_comments)
                        .service(create_comment)
                        .service(submit_vote),
                ),
        )
        .await
    }};
}

macro_rules! sign_up {
    ($app:expr, $name:expr) => {{
        let email = format!("{}@campus.example", $name.to_lowercase());
        let request = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({"name": $name, "email": email, "password": "correct horse"}))
            .to_request();
        let res = test::call_service(&$app, request).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let request = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": email, "password": "correct horse"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, request).await;
        format!("Bearer {}", body["token"].as_str().expect("token"))
    }};
}

macro_rules! vote {
    ($app:expr, $bearer:expr, $post_id:expr, $vote_type:expr) => {{
        let request = test::TestRequest::post()
            .uri("/api/v1/votes")
            .insert_header((AUTHORIZATION, $bearer.clone()))
            .set_json(json!({
                "targetKind": "post",
                "targetId": $post_id,
                "voteType": $vote_type
            }))
            .to_request();
        let res = test::call_service(&$app, request).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        body["voteScore"].as_i64().expect("score")
    }};
}

#[rstest]
#[actix_web::test]
async fn community_voting_scenario() {
    let store = InMemoryStore::new();
    let clock = Arc::new(FixedClock::term_start());
    let app = campus_app!(store, clock.clone());

    let alice = sign_up!(app, "Alice");
    let bob = sign_up!(app, "Bob");

    let request = test::TestRequest::post()
        .uri("/api/v1/communities")
        .insert_header((AUTHORIZATION, alice.clone()))
        .set_json(json!({"name": "CS101", "description": "Intro to CS"}))
        .to_request();
    let res = test::call_service(&app, request).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let community: Value = test::read_body_json(res).await;
    let community_id = community["id"].as_str().expect("id").to_owned();

    let request = test::TestRequest::post()
        .uri(&format!("/api/v1/communities/{community_id}/join"))
        .insert_header((AUTHORIZATION, bob.clone()))
        .to_request();
    let joined: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(joined["ok"], true);

    let request = test::TestRequest::get()
        .uri(&format!("/api/v1/communities/{community_id}"))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(detail["memberCount"], 2);

    clock.advance_seconds(60);
    let request = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header((AUTHORIZATION, alice.clone()))
        .set_json(json!({
            "communityId": community_id,
            "title": "Midterm study group",
            "content": "Library, Thursday 6pm"
        }))
        .to_request();
    let res = test::call_service(&app, request).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let post: Value = test::read_body_json(res).await;
    let post_id = post["id"].as_str().expect("id").to_owned();
    assert_eq!(post["voteScore"], 0);

    assert_eq!(vote!(app, bob, post_id, "UPVOTE"), 1);
    assert_eq!(vote!(app, alice, post_id, "DOWNVOTE"), 0);
    assert_eq!(vote!(app, bob, post_id, "DOWNVOTE"), -1);

    let post_uuid = PostId::parse(&post_id).expect("uuid");
    let votes = store.votes_on(&VoteTarget::Post(post_uuid));
    assert_eq!(votes.len(), 2);

    let request = test::TestRequest::get()
        .uri(&format!("/api/v1/communities/{community_id}/posts"))
        .to_request();
    let posts: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(posts[0]["voteScore"], -1);
    assert_eq!(posts[0]["authorName"], "Alice");
}

#[rstest]
#[actix_web::test]
async fn threaded_comments_list_oldest_first() {
    let store = InMemoryStore::new();
    let clock = Arc::new(FixedClock::term_start());
    let app = campus_app!(store, clock.clone());
    let alice = sign_up!(app, "Alice");
    let bob = sign_up!(app, "Bob");

    let request = test::TestRequest::post()
        .uri("/api/v1/communities")
        .insert_header((AUTHORIZATION, alice.clone()))
        .set_json(json!({"name": "Robotics"}))
        .to_request();
    let community: Value = test::call_and_read_body_json(&app, request).await;
    let request = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header((AUTHORIZATION, alice.clone()))
        .set_json(json!({
            "communityId": community["id"],
            "title": "Build night",
            "content": "Bring servos"
        }))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, request).await;

    clock.advance_seconds(1);
    let request = test::TestRequest::post()
        .uri("/api/v1/comments")
        .insert_header((AUTHORIZATION, bob.clone()))
        .set_json(json!({"postId": post["id"], "content": "I'm in"}))
        .to_request();
    let root: Value = test::call_and_read_body_json(&app, request).await;

    clock.advance_seconds(1);
    let request = test::TestRequest::post()
        .uri("/api/v1/comments")
        .insert_header((AUTHORIZATION, alice.clone()))
        .set_json(json!({
            "postId": post["id"],
            "content": "Great",
            "parentCommentId": root["id"]
        }))
        .to_request();
    let res = test::call_service(&app, request).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let request = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/posts/{}/comments",
            post["id"].as_str().expect("id")
        ))
        .to_request();
    let comments: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(comments[0]["authorName"], "Bob");
    assert_eq!(comments[0]["parentCommentId"], Value::Null);
    assert_eq!(comments[1]["parentCommentId"], root["id"]);
}

#[rstest]
#[case("/api/v1/communities", json!({"name": "CS101"}))]
#[case("/api/v1/votes", json!({"targetKind": "post", "targetId": PostId::random().to_string(), "voteType": "UPVOTE"}))]
#[actix_web::test]
async fn mutations_require_a_token(#[case] uri: &str, #[case] payload: Value) {
    let store = InMemoryStore::new();
    let app = campus_app!(store, Arc::new(FixedClock::term_start()));

    let request = test::TestRequest::post()
        .uri(uri)
        .set_json(payload)
        .to_request();
    let res = test::call_service(&app, request).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key("trace-id"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn duplicate_registration_is_conflict() {
    let store = InMemoryStore::new();
    let app = campus_app!(store, Arc::new(FixedClock::term_start()));
    let _ = sign_up!(app, "Alice");

    let request = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "name": "Alice Again",
            "email": "Alice@Campus.Example",
            "password": "correct horse"
        }))
        .to_request();
    let res = test::call_service(&app, request).await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "conflict");
}

#[rstest]
#[actix_web::test]
async fn storage_outage_is_redacted() {
    let store = InMemoryStore::new();
    let app = campus_app!(store, Arc::new(FixedClock::term_start()));
    store.set_unavailable(true);

    let request = test::TestRequest::get()
        .uri("/api/v1/communities")
        .to_request();
    let res = test::call_service(&app, request).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "internal");
    assert_eq!(body["message"], "Internal server error");
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_bad_request() {
    let store = InMemoryStore::new();
    let app = campus_app!(store, Arc::new(FixedClock::term_start()));

    let request = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, request).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_argument");
}
