//! End-to-end behaviour of the HTTP surface over the in-memory adapters.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test as actix_test;
use actix_web::{App, web};
use backend::Trace;
use backend::domain::{CharacterService, IdentityService, SheetEntryService, TRACE_ID_HEADER};
use backend::inbound::http::configure_api;
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::memory::{
    InMemoryCharacterRepository, InMemorySheetEntryRepository, InMemoryUserRepository,
};
use backend::outbound::tokens::{JwtAccessTokens, MIN_SECRET_LEN};
use backend::test_support::fixture_clock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use zeroize::Zeroizing;

const ENTRY_KINDS: [(&str, &str); 5] = [
    ("skill", r#"{"name":"Arcana","ability":"int","bonus":5,"proficient":true}"#),
    ("stat", r#"{"name":"Intelligence","score":17}"#),
    ("save", r#"{"name":"Wisdom","bonus":2}"#),
    ("spell", r#"{"name":"Shield","level":1,"school":"abjuration"}"#),
    ("attack", r#"{"name":"Dagger","attackBonus":4,"damage":"1d4+2"}"#),
];

#[fixture]
fn state() -> HttpState {
    let clock = fixture_clock();
    let users = Arc::new(InMemoryUserRepository::new());
    let characters = Arc::new(InMemoryCharacterRepository::new());
    let entries = Arc::new(InMemorySheetEntryRepository::new());
    let tokens = Arc::new(JwtAccessTokens::new(
        &Zeroizing::new(vec![3_u8; MIN_SECRET_LEN]),
        chrono::Duration::minutes(30),
        clock.clone(),
    ));
    let character_service = Arc::new(CharacterService::new(
        characters.clone(),
        entries.clone(),
        clock.clone(),
    ));
    let entry_service = Arc::new(SheetEntryService::new(characters, entries, clock));
    HttpState::new(HttpStatePorts {
        identity: Arc::new(IdentityService::new(users, tokens)),
        characters: character_service.clone(),
        characters_query: character_service,
        entries: entry_service.clone(),
        entries_query: entry_service,
    })
}

async fn app(
    state: HttpState,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(Trace)
            .service(web::scope("/api").configure(configure_api)),
    )
    .await
}

async fn send<S>(app: &S, request: actix_test::TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn signup<S>(app: &S, username: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::post()
        .uri("/api/signup")
        .set_json(json!({
            "username": username,
            "password": "correct horse",
            "email": format!("{username}@example.com"),
        }))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::OK, "signup {username}");
    let bytes = actix_test::read_body(response).await;
    String::from_utf8(bytes.to_vec()).expect("token is text")
}

fn authed(request: actix_test::TestRequest, token: &str) -> actix_test::TestRequest {
    request.insert_header((AUTHORIZATION, format!("Bearer {token}")))
}

async fn create_character<S>(app: &S, token: &str, name: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        authed(actix_test::TestRequest::post().uri("/api/character"), token)
            .set_json(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().expect("character id").to_owned()
}

#[rstest]
#[actix_web::test]
async fn non_owner_cannot_delete_and_owner_delete_cascades(state: HttpState) {
    let app = app(state).await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let character = create_character(&app, &alice, "dustinyschild").await;

    let mut attached = Vec::new();
    for (kind, payload) in ENTRY_KINDS {
        let (status, body) = send(
            &app,
            authed(
                actix_test::TestRequest::post().uri(&format!("/api/{kind}/{character}")),
                &alice,
            )
            .insert_header(actix_web::http::header::ContentType::json())
            .set_payload(payload),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "attach {kind}");
        attached.push((kind, body["id"].as_str().expect("entry id").to_owned()));
    }

    let (status, _) = send(
        &app,
        authed(
            actix_test::TestRequest::delete().uri(&format!("/api/character/{character}")),
            &bob,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        authed(
            actix_test::TestRequest::delete().uri(&format!("/api/character/{character}")),
            &alice,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for (kind, id) in &attached {
        let (status, _) = send(
            &app,
            authed(
                actix_test::TestRequest::get().uri(&format!("/api/{kind}/{id}")),
                &alice,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{kind} should be gone");
    }
    let (status, _) = send(
        &app,
        authed(
            actix_test::TestRequest::get().uri(&format!("/api/character/{character}")),
            &alice,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn populated_character_returns_attached_skill(state: HttpState) {
    let app = app(state).await;
    let alice = signup(&app, "alice").await;
    let character = create_character(&app, &alice, "dustinyschild").await;

    let (status, skill) = send(
        &app,
        authed(
            actix_test::TestRequest::post().uri(&format!("/api/skill/{character}")),
            &alice,
        )
        .set_json(json!({ "name": "Stealth", "bonus": 7, "proficient": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, populated) = send(
        &app,
        authed(
            actix_test::TestRequest::get().uri(&format!("/api/character/{character}")),
            &alice,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(populated["skills"], json!([skill]));
    assert_eq!(populated["skills"][0]["name"], "Stealth");
    assert_eq!(populated["skills"][0]["bonus"], 7);
    assert_eq!(populated["stats"], json!([]));
}

#[rstest]
#[actix_web::test]
async fn listing_is_per_user_in_creation_order(state: HttpState) {
    let app = app(state).await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let first = create_character(&app, &alice, "Ada").await;
    create_character(&app, &bob, "Brin").await;
    let second = create_character(&app, &alice, "Cato").await;

    let (status, body) = send(
        &app,
        authed(actix_test::TestRequest::get().uri("/api/characters"), &alice),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "characterId": first, "name": "Ada" },
            { "characterId": second, "name": "Cato" },
        ])
    );
}

#[rstest]
#[actix_web::test]
async fn non_owner_update_is_unauthorised_and_leaves_records_unchanged(state: HttpState) {
    let app = app(state).await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let character = create_character(&app, &alice, "dustinyschild").await;
    let (_, stat) = send(
        &app,
        authed(
            actix_test::TestRequest::post().uri(&format!("/api/stat/{character}")),
            &alice,
        )
        .set_json(json!({ "name": "Strength", "score": 10 })),
    )
    .await;
    let stat_id = stat["id"].as_str().expect("stat id").to_owned();

    for body in ["", r#"{"name":"Stolen"}"#] {
        let (status, _) = send(
            &app,
            authed(
                actix_test::TestRequest::put().uri(&format!("/api/character/{character}")),
                &bob,
            )
            .set_payload(body),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, _) = send(
        &app,
        authed(
            actix_test::TestRequest::put().uri(&format!("/api/stat/{stat_id}")),
            &bob,
        )
        .set_json(json!({ "score": 20 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, stored) = send(
        &app,
        authed(
            actix_test::TestRequest::get().uri(&format!("/api/stat/{stat_id}")),
            &alice,
        ),
    )
    .await;
    assert_eq!(stored["score"], 10);

    let (_, fetched) = send(
        &app,
        authed(
            actix_test::TestRequest::get().uri(&format!("/api/character/{character}")),
            &bob,
        ),
    )
    .await;
    assert_eq!(fetched["name"], "dustinyschild");
}

#[rstest]
#[actix_web::test]
async fn owner_updates_character_and_entry(state: HttpState) {
    let app = app(state).await;
    let alice = signup(&app, "alice").await;
    let character = create_character(&app, &alice, "dustinyschild").await;

    let (status, _) = send(
        &app,
        authed(
            actix_test::TestRequest::put().uri(&format!("/api/character/{character}")),
            &alice,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(
        &app,
        authed(
            actix_test::TestRequest::put().uri(&format!("/api/character/{character}")),
            &alice,
        )
        .set_json(json!({ "race": "Halfling", "level": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "dustinyschild");
    assert_eq!(updated["race"], "Halfling");
    assert_eq!(updated["level"], 4);

    let (_, spell) = send(
        &app,
        authed(
            actix_test::TestRequest::post().uri(&format!("/api/spell/{character}")),
            &alice,
        )
        .set_json(json!({ "name": "Shield", "level": 1 })),
    )
    .await;
    let spell_id = spell["id"].as_str().expect("spell id").to_owned();
    let (status, patched) = send(
        &app,
        authed(
            actix_test::TestRequest::put().uri(&format!("/api/spell/{spell_id}")),
            &alice,
        )
        .set_json(json!({ "school": "abjuration" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["name"], "Shield");
    assert_eq!(patched["school"], "abjuration");
}

#[rstest]
#[actix_web::test]
async fn creating_a_character_without_a_body_is_rejected(state: HttpState) {
    let app = app(state).await;
    let alice = signup(&app, "alice").await;

    let (status, body) = send(
        &app,
        authed(actix_test::TestRequest::post().uri("/api/character"), &alice),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn signup_and_login_issue_tokens(state: HttpState) {
    let app = app(state).await;
    signup(&app, "alice").await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post().uri("/api/signup").set_json(json!({
            "username": "alice",
            "password": "another horse",
            "email": "alice2@example.com",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (status, _) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "username": "alice", "password": "wrong horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let login = actix_test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "username": "alice", "password": "correct horse" }))
        .to_request();
    let response = actix_test::call_service(&app, login).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(TRACE_ID_HEADER));
    let token = String::from_utf8(actix_test::read_body(response).await.to_vec()).expect("text");

    let (status, body) = send(
        &app,
        authed(actix_test::TestRequest::get().uri("/api/characters"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}
