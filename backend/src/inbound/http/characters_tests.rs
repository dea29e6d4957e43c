//! Tests for character HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::{SheetEntryGroups, SheetEntryRefs, UserId};
use crate::inbound::http::test_utils::{MockPorts, bearer, caller_id, test_app};
use crate::test_support::fixture_timestamp;

fn character(owner: UserId, name: &str) -> Character {
    Character::new(
        CharacterId::random(),
        owner,
        CharacterProfile::try_new(name, Some("Gnome"), Some("Wizard"), Some(3))
            .expect("valid profile"),
        SheetEntryRefs::default(),
        fixture_timestamp(),
    )
}

async fn error_code(response: actix_web::dev::ServiceResponse) -> Option<String> {
    let body: Value = actix_test::read_body_json(response).await;
    body.get("code").and_then(Value::as_str).map(str::to_owned)
}

#[rstest]
#[case(br#"{"name":"Ada"}"#.as_slice(), Some(CharacterPatch { name: Some("Ada".into()), ..Default::default() }))]
#[case(br#"{"race":null,"level":null}"#.as_slice(), Some(CharacterPatch { race: Some(None), level: Some(None), ..Default::default() }))]
#[case(br#"{"className":"Bard","ignored":true}"#.as_slice(), Some(CharacterPatch { class_name: Some(Some("Bard".into())), ..Default::default() }))]
#[case(br#"{"level":300}"#.as_slice(), None)]
#[case(br#"{"name":null}"#.as_slice(), None)]
#[case(br#"[1,2]"#.as_slice(), None)]
#[case(b"".as_slice(), None)]
fn update_bodies_decode_into_patches(#[case] body: &[u8], #[case] expected: Option<CharacterPatch>) {
    assert_eq!(parse_patch(body).ok(), expected);
}

#[rstest]
#[actix_web::test]
async fn create_returns_character_json() {
    let mut ports = MockPorts::new();
    ports
        .characters
        .expect_create()
        .withf(|owner, profile| owner == &caller_id() && profile.name() == "dustinyschild")
        .times(1)
        .returning(|owner, profile| {
            Ok(Character::new(
                CharacterId::random(),
                owner.clone(),
                profile,
                SheetEntryRefs::default(),
                fixture_timestamp(),
            ))
        });
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/character")
        .insert_header(bearer())
        .set_json(json!({ "name": "dustinyschild", "className": "Rogue" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["name"], "dustinyschild");
    assert_eq!(body["className"], "Rogue");
    assert_eq!(body["userId"], caller_id().to_string());
    for key in ["skills", "stats", "saves", "spells", "attacks"] {
        assert_eq!(body[key], json!([]), "{key} should start empty");
    }
}

#[rstest]
#[case(b"".as_slice())]
#[case(b"{}".as_slice())]
#[case(br#"{"name":"   "}"#.as_slice())]
#[actix_web::test]
async fn create_rejects_missing_or_blank_name(#[case] body: &[u8]) {
    let app = actix_test::init_service(test_app(MockPorts::new().into_state())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/character")
        .insert_header(bearer())
        .set_payload(body.to_vec())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await.as_deref(), Some("invalid_request"));
}

#[rstest]
#[case(None)]
#[case(Some("Bearer wrong"))]
#[actix_web::test]
async fn protected_routes_require_a_valid_token(#[case] header: Option<&str>) {
    let app = actix_test::init_service(test_app(MockPorts::new().into_state())).await;

    let mut request = actix_test::TestRequest::get().uri("/api/characters");
    if let Some(value) = header {
        request = request.insert_header((actix_web::http::header::AUTHORIZATION, value));
    }
    let response = actix_test::call_service(&app, request.to_request()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await.as_deref(), Some("unauthorized"));
}

#[rstest]
#[actix_web::test]
async fn list_returns_summaries_for_the_caller() {
    let first = character(caller_id(), "Ada");
    let second = character(caller_id(), "Brin");
    let summaries = vec![
        CharacterSummary::from(&first),
        CharacterSummary::from(&second),
    ];
    let mut ports = MockPorts::new();
    ports
        .characters_query
        .expect_list()
        .withf(|caller| caller == &caller_id())
        .return_once(move |_| Ok(summaries));
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/characters")
        .insert_header(bearer())
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(
        body,
        json!([
            { "characterId": first.id().to_string(), "name": "Ada" },
            { "characterId": second.id().to_string(), "name": "Brin" },
        ])
    );
}

#[rstest]
#[actix_web::test]
async fn get_returns_populated_character() {
    let stored = character(UserId::random(), "dustinyschild");
    let id = stored.id();
    let populated = PopulatedCharacter::new(stored, SheetEntryGroups::default());
    let mut ports = MockPorts::new();
    ports
        .characters_query
        .expect_get()
        .withf(move |_, requested| requested == &id)
        .return_once(move |_, _| Ok(populated));
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/character/{id}"))
        .insert_header(bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], id.to_string());
    assert_eq!(body["skills"], json!([]));
}

#[rstest]
#[actix_web::test]
async fn malformed_character_id_is_bad_request() {
    let app = actix_test::init_service(test_app(MockPorts::new().into_state())).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/character/not-a-uuid")
        .insert_header(bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "id");
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

#[rstest]
#[actix_web::test]
async fn update_by_non_owner_is_unauthorised_even_with_bad_body() {
    let id = CharacterId::random();
    let mut ports = MockPorts::new();
    ports
        .characters
        .expect_update()
        .times(1)
        .returning(|_, _, _| Err(Error::permission_denied("permission denied")));
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/character/{id}"))
        .insert_header(bearer())
        .set_payload("{not json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await.as_deref(), Some("permission_denied"));
}

#[rstest]
#[actix_web::test]
async fn update_by_owner_reports_body_parse_failure() {
    let id = CharacterId::random();
    let mut ports = MockPorts::new();
    ports
        .characters
        .expect_update()
        .withf(|_, _, patch| patch.is_empty())
        .returning(|_, _, _| Err(Error::invalid_request("request body must set a field")));
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/character/{id}"))
        .insert_header(bearer())
        .set_payload(r#"{"level":"high"}"#)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "level");
}

#[rstest]
#[actix_web::test]
async fn update_passes_patch_and_returns_character() {
    let updated = character(caller_id(), "Renamed");
    let id = updated.id();
    let mut ports = MockPorts::new();
    ports
        .characters
        .expect_update()
        .withf(move |_, requested, patch| {
            requested == &id && patch.name.as_deref() == Some("Renamed") && patch.race == Some(None)
        })
        .return_once(move |_, _, _| Ok(updated));
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/character/{id}"))
        .insert_header(bearer())
        .set_json(json!({ "name": "Renamed", "race": null }))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["name"], "Renamed");
}

#[rstest]
#[case(Ok(()), StatusCode::NO_CONTENT)]
#[case(Err(Error::permission_denied("permission denied")), StatusCode::UNAUTHORIZED)]
#[case(Err(Error::not_found("character not found")), StatusCode::NOT_FOUND)]
#[actix_web::test]
async fn delete_maps_service_outcome(
    #[case] outcome: Result<(), Error>,
    #[case] expected: StatusCode,
) {
    let mut ports = MockPorts::new();
    ports
        .characters
        .expect_delete()
        .times(1)
        .return_once(move |_, _| outcome);
    let app = actix_test::init_service(test_app(ports.into_state())).await;

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/character/{}", CharacterId::random()))
        .insert_header(bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), expected);
}
