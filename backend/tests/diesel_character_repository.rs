//! Integration tests for `DieselCharacterRepository` against embedded
//! PostgreSQL.
//!
//! Covers what row-mapping unit tests cannot: `array_append` ordering,
//! listing order under identical timestamps, and the entry foreign key that
//! blocks deleting a character with live entries.

use backend::domain::ports::{CharacterRepository, CharacterRepositoryError, SheetEntryRepository};
use backend::domain::{
    Character, CharacterId, CharacterProfile, SheetEntry, SheetEntryId, SheetEntryKind,
    SheetEntryPayload, SheetEntryRefs, UserId,
};
use backend::outbound::persistence::{
    DbPool, DieselCharacterRepository, DieselSheetEntryRepository, PoolConfig,
};
use backend::test_support::fixture_timestamp;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use serde_json::json;
use tokio::runtime::Runtime;
use uuid::Uuid;

mod support;

use support::{handle_cluster_setup_failure, provision_database, seed_user, shared_cluster};

struct TestContext {
    runtime: Runtime,
    characters: DieselCharacterRepository,
    entries: DieselSheetEntryRepository,
    owner: UserId,
    database_url: String,
    _database: TemporaryDatabase,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_database(cluster)?;
    let database_url = database.url().to_string();
    let owner = seed_user(&database_url, "ada")?;

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        characters: DieselCharacterRepository::new(pool.clone()),
        entries: DieselSheetEntryRepository::new(pool),
        owner,
        database_url,
        _database: database,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn character(id: CharacterId, owner: &UserId, name: &str) -> Character {
    Character::new(
        id,
        owner.clone(),
        CharacterProfile::try_new(name, Some("Halfling"), Some("Rogue"), Some(3))
            .expect("valid profile"),
        SheetEntryRefs::default(),
        fixture_timestamp(),
    )
}

#[rstest]
fn insert_then_find_round_trips_the_record(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let stored = character(CharacterId::random(), &ctx.owner, "dustinyschild");

    let found = ctx.runtime.block_on(async {
        ctx.characters.insert(&stored).await.expect("insert");
        ctx.characters.find_by_id(&stored.id()).await.expect("find")
    });
    assert_eq!(found, Some(stored));

    let missing = ctx
        .runtime
        .block_on(ctx.characters.find_by_id(&CharacterId::random()))
        .expect("find missing");
    assert!(missing.is_none());
}

#[rstest]
fn list_by_owner_follows_insertion_when_timestamps_tie(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let stranger = seed_user(&ctx.database_url, "grace").expect("second user");
    // Ids descend so neither id nor timestamp order matches insertion order.
    let names = ["Character1", "Character2", "Character3", "Character4"];
    let mine: Vec<Character> = names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let id = CharacterId::from_uuid(Uuid::from_u128(100 - index as u128));
            character(id, &ctx.owner, name)
        })
        .collect();
    let theirs = character(CharacterId::random(), &stranger, "Intruder");

    let listed = ctx.runtime.block_on(async {
        for (index, record) in mine.iter().enumerate() {
            ctx.characters.insert(record).await.expect("insert mine");
            if index == 1 {
                ctx.characters.insert(&theirs).await.expect("insert theirs");
            }
        }
        ctx.characters.list_by_owner(&ctx.owner).await.expect("list")
    });

    let listed_names: Vec<&str> = listed.iter().map(|c| c.profile().name()).collect();
    assert_eq!(listed_names, names);
}

#[rstest]
fn append_entry_keeps_order_per_kind(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let record = character(CharacterId::random(), &ctx.owner, "dustinyschild");
    let skills = [SheetEntryId::random(), SheetEntryId::random(), SheetEntryId::random()];
    let spell = SheetEntryId::random();

    let found = ctx.runtime.block_on(async {
        ctx.characters.insert(&record).await.expect("insert");
        for skill in &skills {
            let appended = ctx
                .characters
                .append_entry(&record.id(), SheetEntryKind::Skill, skill)
                .await
                .expect("append skill");
            assert!(appended);
        }
        ctx.characters
            .append_entry(&record.id(), SheetEntryKind::Spell, &spell)
            .await
            .expect("append spell");
        ctx.characters
            .find_by_id(&record.id())
            .await
            .expect("find")
            .expect("character exists")
    });

    let refs = found.entries();
    assert_eq!(refs.skills, skills.to_vec());
    assert_eq!(refs.spells, vec![spell]);
    assert!(refs.stats.is_empty() && refs.saves.is_empty() && refs.attacks.is_empty());
}

#[rstest]
fn append_entry_reports_missing_character(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let appended = ctx
        .runtime
        .block_on(ctx.characters.append_entry(
            &CharacterId::random(),
            SheetEntryKind::Attack,
            &SheetEntryId::random(),
        ))
        .expect("append");
    assert!(!appended);
}

#[rstest]
fn update_profile_clears_optional_columns(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let record = character(CharacterId::random(), &ctx.owner, "dustinyschild");
    let profile =
        CharacterProfile::try_new("XxKillerxX", None, Some("Wizard"), None).expect("profile");

    let (updated, found) = ctx.runtime.block_on(async {
        ctx.characters.insert(&record).await.expect("insert");
        let updated = ctx
            .characters
            .update_profile(&record.id(), &profile)
            .await
            .expect("update");
        let found = ctx
            .characters
            .find_by_id(&record.id())
            .await
            .expect("find")
            .expect("character exists");
        (updated, found)
    });

    assert!(updated);
    assert_eq!(found.profile(), &profile);
    assert_eq!(found.created_at(), record.created_at());
}

#[rstest]
fn delete_is_refused_while_entries_reference_the_character(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let record = character(CharacterId::random(), &ctx.owner, "dustinyschild");
    let entry = SheetEntry::new(
        SheetEntryId::random(),
        record.id(),
        ctx.owner.clone(),
        SheetEntryPayload::from_json(SheetEntryKind::Skill, json!({ "name": "Stealth" }))
            .expect("valid skill"),
        fixture_timestamp(),
    );

    ctx.runtime.block_on(async {
        ctx.characters.insert(&record).await.expect("insert");
        ctx.entries.insert(&entry).await.expect("insert entry");

        let refused = ctx.characters.delete(&record.id()).await;
        assert!(matches!(
            refused,
            Err(CharacterRepositoryError::Referenced { .. })
        ));

        let cleared = ctx
            .entries
            .delete_by_character(SheetEntryKind::Skill, &record.id())
            .await
            .expect("clear entries");
        assert_eq!(cleared, 1);
        assert!(ctx.characters.delete(&record.id()).await.expect("delete"));
        assert!(!ctx.characters.delete(&record.id()).await.expect("repeat delete"));
    });
}
