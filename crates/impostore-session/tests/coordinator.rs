//! Integration tests for the room coordinator over the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use impostore_protocol::{
    FieldPath, ParticipantId, Role, RoleCard, Room, RoomCode, RoomPatch, RoomSettings, RoomStatus,
    fields,
};
use impostore_session::{
    ManualClock, RoomCoordinator, SessionConfig, SessionError, SettingsUpdate,
};
use impostore_store::{MemoryStore, RoomStore, RoomUpdate, StoreError, Subscription};
use impostore_words::{CannedProvider, CatalogSource, WordCatalog, WordList};

// =========================================================================
// Helpers
// =========================================================================

const T0: u64 = 1_700_000_000_000;

fn pid(id: &str) -> ParticipantId {
    ParticipantId::new(id).unwrap()
}

fn words(entries: &[(&str, Option<&str>)]) -> WordList {
    entries
        .iter()
        .map(|(w, h)| (w.to_string(), h.map(str::to_string)))
        .collect()
}

fn settings(num_impostors: u32, hint_enabled: bool, hint_only_first: bool) -> RoomSettings {
    RoomSettings {
        num_impostors,
        hint_enabled,
        hint_only_first,
    }
}

fn coordinator_with_clock(store: MemoryStore, clock: Arc<ManualClock>) -> RoomCoordinator<MemoryStore> {
    let mut catalog = WordCatalog::with_seed(7);
    catalog
        .set_catalog(words(&[("mare", Some("sale")), ("pizza", Some("forno"))]))
        .unwrap();
    RoomCoordinator::new(store)
        .with_seed(42)
        .with_catalog(catalog)
        .with_clock(clock)
}

fn coordinator() -> RoomCoordinator<MemoryStore> {
    coordinator_with_clock(MemoryStore::new(), Arc::new(ManualClock::new(T0)))
}

async fn room(coord: &RoomCoordinator<MemoryStore>, code: &RoomCode) -> Room {
    coord.read(code).await.unwrap().expect("room exists")
}

/// A room with the host plus `others` joined.
async fn room_with_players(
    coord: &RoomCoordinator<MemoryStore>,
    room_settings: RoomSettings,
    others: &[&str],
) -> RoomCode {
    let code = coord.create(room_settings, &pid("host")).await.unwrap();
    for name in others {
        coord.join(&code, &pid(name), Some(name)).await.unwrap();
    }
    code
}

/// Drains everything already delivered and returns the newest snapshot.
fn latest_room(sub: &mut Subscription) -> Option<Room> {
    match sub.latest()? {
        RoomUpdate::Present(room) => Some(room),
        RoomUpdate::Deleted => None,
    }
}

// =========================================================================
// create
// =========================================================================

#[tokio::test]
async fn test_create_host_is_only_player() {
    let coord = coordinator();

    let code = coord.create(settings(2, true, true), &pid("host")).await.unwrap();

    let room = room(&coord, &code).await;
    assert_eq!(room.status, RoomStatus::Waiting);
    assert_eq!(room.host_id, pid("host"));
    assert_eq!(room.num_impostors, 2);
    assert!(room.hint_enabled && room.hint_only_first);
    assert_eq!(room.players.keys().collect::<Vec<_>>(), vec![&pid("host")]);
    assert_eq!(room.created_at, T0);
    assert_eq!(room.last_heartbeat, Some(T0));
}

#[tokio::test]
async fn test_create_zero_impostors_fails() {
    let coord = coordinator();

    let result = coord.create(settings(0, false, false), &pid("host")).await;

    assert!(matches!(result, Err(SessionError::InvalidSettings(_))));
    assert_eq!(coord.store().room_count().await, 0);
}

#[tokio::test]
async fn test_create_code_collision_retries_with_fresh_code() {
    let store = MemoryStore::new();
    // Same seed, same first code.
    let first = RoomCoordinator::new(store.clone()).with_seed(1);
    let second = RoomCoordinator::new(store.clone()).with_seed(1);

    let a = first.create(RoomSettings::default(), &pid("h1")).await.unwrap();
    let b = second.create(RoomSettings::default(), &pid("h2")).await.unwrap();

    assert_ne!(a, b);
    assert_eq!(store.room_count().await, 2);
    assert_eq!(store.read(&a).await.unwrap().unwrap().host_id, pid("h1"));
}

#[tokio::test]
async fn test_create_collision_without_retries_fails() {
    let store = MemoryStore::new();
    let config = SessionConfig {
        create_attempts: 1,
        ..SessionConfig::default()
    };
    let first = RoomCoordinator::new(store.clone()).with_seed(1);
    let second = RoomCoordinator::new(store.clone())
        .with_seed(1)
        .with_config(config);

    let a = first.create(RoomSettings::default(), &pid("h1")).await.unwrap();
    let result = second.create(RoomSettings::default(), &pid("h2")).await;

    assert!(matches!(result, Err(SessionError::AlreadyExists(c)) if c == a));
    assert_eq!(store.room_count().await, 1);
}

// =========================================================================
// join / leave / remove
// =========================================================================

#[tokio::test]
async fn test_join_adds_named_player() {
    let coord = coordinator();
    let code = coord.create(RoomSettings::default(), &pid("host")).await.unwrap();

    coord.join(&code, &pid("p1"), Some("  Anna ")).await.unwrap();

    let room = room(&coord, &code).await;
    let player = &room.players[&pid("p1")];
    assert_eq!(player.name.as_deref(), Some("Anna"));
    assert_eq!(player.role, None);
    assert!(!player.revealed);
    assert_eq!(player.joined_at, T0);
}

#[tokio::test]
async fn test_join_missing_room_fails() {
    let coord = coordinator();
    let code = RoomCode::parse("NOPE00").unwrap();

    let result = coord.join(&code, &pid("p1"), Some("Anna")).await;

    assert!(matches!(result, Err(SessionError::RoomNotFound(c)) if c == code));
}

#[tokio::test]
async fn test_join_duplicate_name_is_advisory() {
    let coord = coordinator();
    let code = room_with_players(&coord, RoomSettings::default(), &["anna"]).await;

    assert!(!coord.is_name_available(&code, "ANNA").await.unwrap());
    assert!(coord.is_name_available(&code, "Bruno").await.unwrap());

    // Last write wins; the join is not refused.
    coord.join(&code, &pid("p2"), Some("Anna")).await.unwrap();
    assert_eq!(room(&coord, &code).await.player_count(), 3);
}

#[tokio::test]
async fn test_is_name_available_missing_room_is_true() {
    let coord = coordinator();
    let code = RoomCode::parse("NOPE00").unwrap();
    assert!(coord.is_name_available(&code, "Anna").await.unwrap());
}

#[tokio::test]
async fn test_join_while_active_has_no_role() {
    let coord = coordinator();
    let code = room_with_players(&coord, RoomSettings::default(), &["a"]).await;
    coord.start(&code).await.unwrap();

    coord.join(&code, &pid("late"), Some("Late")).await.unwrap();

    let room = room(&coord, &code).await;
    assert_eq!(room.status, RoomStatus::Active);
    assert_eq!(room.players[&pid("late")].role, None);
    assert_eq!(room.role_card(&pid("late")), RoleCard::Unassigned);
}

#[tokio::test]
async fn test_leave_and_remove_delete_player_entry() {
    let coord = coordinator();
    let code = room_with_players(&coord, RoomSettings::default(), &["a", "b"]).await;

    coord.leave(&code, &pid("a")).await.unwrap();
    coord.remove(&code, &pid("b")).await.unwrap();

    let room = room(&coord, &code).await;
    assert_eq!(room.players.keys().collect::<Vec<_>>(), vec![&pid("host")]);
}

#[tokio::test]
async fn test_remove_host_is_allowed() {
    let coord = coordinator();
    let code = room_with_players(&coord, RoomSettings::default(), &["a"]).await;

    coord.remove(&code, &pid("host")).await.unwrap();

    let room = room(&coord, &code).await;
    assert!(!room.players.contains_key(&pid("host")));
    assert_eq!(room.host_id, pid("host"));
}

// =========================================================================
// update_settings
// =========================================================================

#[tokio::test]
async fn test_update_settings_while_waiting_applies() {
    let coord = coordinator();
    let code = coord.create(RoomSettings::default(), &pid("host")).await.unwrap();

    coord
        .update_settings(
            &code,
            SettingsUpdate::new()
                .num_impostors(2)
                .hint_enabled(true)
                .hint_only_first(true),
        )
        .await
        .unwrap();

    assert_eq!(room(&coord, &code).await.settings(), settings(2, true, true));
}

#[tokio::test]
async fn test_update_settings_disabling_hints_clears_only_first() {
    let coord = coordinator();
    let code = coord.create(settings(1, true, true), &pid("host")).await.unwrap();

    coord
        .update_settings(&code, SettingsUpdate::new().hint_enabled(false))
        .await
        .unwrap();

    let room = room(&coord, &code).await;
    assert!(!room.hint_enabled);
    assert!(!room.hint_only_first);
}

#[tokio::test]
async fn test_update_settings_zero_impostors_fails() {
    let coord = coordinator();
    let code = coord.create(RoomSettings::default(), &pid("host")).await.unwrap();

    let result = coord
        .update_settings(&code, SettingsUpdate::new().num_impostors(0))
        .await;

    assert!(matches!(result, Err(SessionError::InvalidSettings(_))));
    assert_eq!(room(&coord, &code).await.num_impostors, 1);
}

#[tokio::test]
async fn test_update_settings_while_active_fails_unchanged() {
    // Scenario C.
    let coord = coordinator();
    let code = room_with_players(&coord, settings(1, false, false), &["a", "b"]).await;
    coord.start(&code).await.unwrap();

    let result = coord
        .update_settings(&code, SettingsUpdate::new().num_impostors(2))
        .await;

    assert!(matches!(result, Err(SessionError::GameInProgress(c)) if c == code));
    assert_eq!(room(&coord, &code).await.num_impostors, 1);
}

// =========================================================================
// start
// =========================================================================

#[tokio::test]
async fn test_start_host_only_host_is_impostor_and_first() {
    // Scenario A.
    let coord = coordinator();
    let code = coord.create(settings(1, false, false), &pid("host")).await.unwrap();

    coord.start(&code).await.unwrap();

    let room = room(&coord, &code).await;
    assert_eq!(room.status, RoomStatus::Active);
    let host = &room.players[&pid("host")];
    assert_eq!(host.role, Some(Role::Impostor));
    assert!(host.is_first);
    assert!(!host.revealed);
    assert_eq!(room.first_player_id, Some(pid("host")));
    assert!(["mare", "pizza"].contains(&room.word.as_str()));
    assert_eq!(room.hint, None, "hints disabled");
}

#[tokio::test]
async fn test_start_more_impostors_than_players_all_impostors() {
    // Scenario B.
    let coord = coordinator();
    let code = room_with_players(&coord, settings(5, false, false), &["a", "b"]).await;

    coord.start(&code).await.unwrap();

    let room = room(&coord, &code).await;
    assert_eq!(room.player_count(), 3);
    assert!(room.players.values().all(|p| p.role == Some(Role::Impostor)));
    let firsts = room.players.values().filter(|p| p.is_first).count();
    assert_eq!(firsts, 1);
}

async fn dealt_room(coord: RoomCoordinator<MemoryStore>) -> Room {
    let code = room_with_players(&coord, settings(2, false, false), &["a", "b", "c", "d", "e"]).await;
    coord.start(&code).await.unwrap();
    room(&coord, &code).await
}

fn roles_of(room: &Room) -> Vec<(ParticipantId, Option<Role>)> {
    room.players.iter().map(|(id, p)| (id.clone(), p.role)).collect()
}

#[tokio::test]
async fn test_start_role_seed_independent_of_first_player_seed() {
    let one = dealt_room(coordinator().with_role_seed(10).with_first_player_seed(1)).await;
    let two = dealt_room(coordinator().with_role_seed(10).with_first_player_seed(2)).await;

    assert_eq!(roles_of(&one), roles_of(&two));
}

#[tokio::test]
async fn test_start_first_player_seed_independent_of_role_seed() {
    let one = dealt_room(coordinator().with_role_seed(1).with_first_player_seed(10)).await;
    let two = dealt_room(coordinator().with_role_seed(2).with_first_player_seed(10)).await;

    assert_eq!(one.first_player_id, two.first_player_id);
}

#[tokio::test]
async fn test_start_deals_exact_impostor_count() {
    let coord = coordinator();
    let code = room_with_players(&coord, settings(2, false, false), &["a", "b", "c", "d"]).await;

    coord.start(&code).await.unwrap();

    let room = room(&coord, &code).await;
    let impostors = room
        .players
        .values()
        .filter(|p| p.role == Some(Role::Impostor))
        .count();
    assert_eq!(impostors, 2);
    assert!(room.players.values().all(|p| p.role.is_some()));
    let (first_id, first) = room.first_player().unwrap();
    assert!(first.is_first);
    assert_eq!(Some(first_id), room.first_player_id.as_ref());
}

#[tokio::test]
async fn test_start_with_hints_stores_word_hint() {
    let coord = coordinator();
    let code = room_with_players(&coord, settings(1, true, false), &["a"]).await;

    coord.start(&code).await.unwrap();

    let room = room(&coord, &code).await;
    let expected = if room.word == "mare" { "sale" } else { "forno" };
    assert_eq!(room.hint.as_deref(), Some(expected));
}

#[tokio::test]
async fn test_start_role_cards_follow_hint_visibility() {
    let coord = coordinator();
    let code = room_with_players(&coord, settings(1, true, true), &["a", "b"]).await;
    coord.start(&code).await.unwrap();
    let room = room(&coord, &code).await;

    for (id, player) in &room.players {
        match (player.role, room.role_card(id)) {
            (Some(Role::Civilian), RoleCard::Civilian { word, .. }) => assert_eq!(word, room.word),
            (Some(Role::Impostor), RoleCard::Impostor { hint, is_first }) => {
                // Only the impostor who speaks first sees the hint.
                assert_eq!(hint.is_some(), is_first);
            }
            other => panic!("unexpected card for {id}: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_start_twice_fails_game_in_progress() {
    let coord = coordinator();
    let code = coord.create(RoomSettings::default(), &pid("host")).await.unwrap();
    coord.start(&code).await.unwrap();

    let result = coord.start(&code).await;

    assert!(matches!(result, Err(SessionError::GameInProgress(_))));
}

#[tokio::test]
async fn test_start_readds_missing_host() {
    let coord = coordinator();
    let code = room_with_players(&coord, RoomSettings::default(), &["a"]).await;
    coord.remove(&code, &pid("host")).await.unwrap();

    coord.start(&code).await.unwrap();

    let room = room(&coord, &code).await;
    assert_eq!(room.player_count(), 2);
    assert!(room.players[&pid("host")].role.is_some());
}

#[tokio::test]
async fn test_start_missing_room_fails() {
    let coord = coordinator();
    let result = coord.start(&RoomCode::parse("NOPE00").unwrap()).await;
    assert!(matches!(result, Err(SessionError::RoomNotFound(_))));
}

#[tokio::test]
async fn test_start_is_a_single_notification() {
    let coord = coordinator();
    let code = room_with_players(&coord, settings(1, true, false), &["a", "b"]).await;
    let mut sub = coord.subscribe(&code).await.unwrap();
    sub.latest();

    coord.start(&code).await.unwrap();

    let snapshot = sub.try_recv().unwrap();
    let room = snapshot.room().unwrap();
    assert_eq!(room.status, RoomStatus::Active);
    assert!(room.players.values().all(|p| p.role.is_some()));
    assert!(sub.try_recv().is_none());
}

// =========================================================================
// end / reveal
// =========================================================================

#[tokio::test]
async fn test_start_then_end_restores_waiting_shape() {
    let coord = coordinator();
    let code = room_with_players(&coord, settings(2, true, true), &["a", "b"]).await;
    coord.start(&code).await.unwrap();
    coord.reveal(&code, &pid("a")).await.unwrap();
    let played = room(&coord, &code).await.word;

    coord.end(&code).await.unwrap();

    let room = room(&coord, &code).await;
    assert_eq!(room.status, RoomStatus::Waiting);
    assert_eq!(room.first_player_id, None);
    assert_eq!(room.settings(), settings(2, true, true));
    assert_eq!(room.player_count(), 3);
    for player in room.players.values() {
        assert_eq!(player.role, None);
        assert!(!player.is_first);
        assert!(!player.revealed);
    }
    assert_ne!(room.word, played, "the next word differs from the one just played");
    let expected_hint = if room.word == "mare" { "sale" } else { "forno" };
    assert_eq!(room.hint.as_deref(), Some(expected_hint));
}

#[tokio::test]
async fn test_end_single_word_catalog_repeats_word() {
    let coord = coordinator();
    coord.set_catalog(words(&[("solo", None)])).unwrap();
    let code = coord.create(RoomSettings::default(), &pid("host")).await.unwrap();
    coord.start(&code).await.unwrap();

    coord.end(&code).await.unwrap();

    assert_eq!(room(&coord, &code).await.word, "solo");
}

#[tokio::test]
async fn test_round_trip_twice_allows_second_start() {
    let coord = coordinator();
    let code = room_with_players(&coord, RoomSettings::default(), &["a"]).await;

    for _ in 0..2 {
        coord.start(&code).await.unwrap();
        coord.end(&code).await.unwrap();
    }

    assert_eq!(room(&coord, &code).await.status, RoomStatus::Waiting);
}

#[tokio::test]
async fn test_end_missing_room_fails() {
    let coord = coordinator();
    let result = coord.end(&RoomCode::parse("NOPE00").unwrap()).await;
    assert!(matches!(result, Err(SessionError::RoomNotFound(_))));
}

#[tokio::test]
async fn test_reveal_is_idempotent() {
    let coord = coordinator();
    let code = room_with_players(&coord, RoomSettings::default(), &["a", "b"]).await;
    coord.start(&code).await.unwrap();

    coord.reveal(&code, &pid("a")).await.unwrap();
    let once = room(&coord, &code).await;
    coord.reveal(&code, &pid("a")).await.unwrap();
    let twice = room(&coord, &code).await;

    assert_eq!(once, twice);
    assert_eq!(twice.revealed_count(), 1);
}

#[tokio::test]
async fn test_reveal_unknown_participant_fails() {
    let coord = coordinator();
    let code = coord.create(RoomSettings::default(), &pid("host")).await.unwrap();

    let result = coord.reveal(&code, &pid("ghost")).await;

    assert!(matches!(result, Err(SessionError::NotInRoom(p, _)) if p == pid("ghost")));
    assert_eq!(room(&coord, &code).await.player_count(), 1);
}

#[tokio::test]
async fn test_reveal_after_delete_fails() {
    let coord = coordinator();
    let code = coord.create(RoomSettings::default(), &pid("host")).await.unwrap();
    coord.delete(&code).await.unwrap();

    let result = coord.reveal(&code, &pid("host")).await;

    assert!(matches!(result, Err(SessionError::RoomNotFound(_))));
    assert_eq!(coord.store().room_count().await, 0, "no partial record resurrected");
}

// =========================================================================
// heartbeat / sweep / delete
// =========================================================================

#[tokio::test]
async fn test_heartbeat_stamps_current_time() {
    let clock = Arc::new(ManualClock::new(T0));
    let coord = coordinator_with_clock(MemoryStore::new(), clock.clone());
    let code = coord.create(RoomSettings::default(), &pid("host")).await.unwrap();

    clock.advance(Duration::from_secs(10));
    coord.heartbeat(&code).await.unwrap();

    assert_eq!(room(&coord, &code).await.last_heartbeat, Some(T0 + 10_000));
}

#[tokio::test]
async fn test_heartbeat_missing_room_fails() {
    let coord = coordinator();
    let result = coord.heartbeat(&RoomCode::parse("NOPE00").unwrap()).await;
    assert!(matches!(result, Err(SessionError::RoomNotFound(_))));
}

#[tokio::test]
async fn test_sweep_removes_silent_room() {
    // Scenario D.
    let clock = Arc::new(ManualClock::new(T0));
    let coord = coordinator_with_clock(MemoryStore::new(), clock.clone());
    let code = coord.create(RoomSettings::default(), &pid("host")).await.unwrap();
    let mut sub = coord.subscribe(&code).await.unwrap();

    clock.advance(Duration::from_secs(31));
    let swept = coord.sweep_abandoned(Duration::from_secs(30)).await.unwrap();

    assert_eq!(swept, vec![code.clone()]);
    assert!(coord.read(&code).await.unwrap().is_none());
    assert_eq!(sub.latest(), Some(RoomUpdate::Deleted));
}

#[tokio::test]
async fn test_sweep_keeps_recent_and_heartbeat_less_rooms() {
    let clock = Arc::new(ManualClock::new(T0));
    let coord = coordinator_with_clock(MemoryStore::new(), clock.clone());
    let fresh = coord.create(RoomSettings::default(), &pid("h1")).await.unwrap();
    let never = coord.create(RoomSettings::default(), &pid("h2")).await.unwrap();
    let mut patch = RoomPatch::new();
    patch.remove(FieldPath::field(fields::LAST_HEARTBEAT));
    coord.store().apply_atomic(&never, patch).await.unwrap();

    clock.advance(Duration::from_secs(30));
    // Exactly at the threshold is not yet abandoned.
    assert!(coord.sweep_abandoned(Duration::from_secs(30)).await.unwrap().is_empty());

    clock.advance(Duration::from_secs(60));
    let swept = coord.sweep_abandoned(Duration::from_secs(30)).await.unwrap();

    assert_eq!(swept, vec![fresh]);
    assert!(coord.read(&never).await.unwrap().is_some());
}

#[tokio::test]
async fn test_sweep_skips_failed_deletes() {
    let clock = Arc::new(ManualClock::new(T0));
    let store = FlakyStore::default();
    let coord = RoomCoordinator::new(store.clone())
        .with_seed(3)
        .with_clock(clock.clone());
    let a = coord.create(RoomSettings::default(), &pid("h1")).await.unwrap();
    let b = coord.create(RoomSettings::default(), &pid("h2")).await.unwrap();
    store.fail_deletes_of(&a).await;

    clock.advance(Duration::from_secs(45));
    let swept = coord.sweep_abandoned(Duration::from_secs(30)).await.unwrap();

    assert_eq!(swept, vec![b.clone()]);
    assert!(coord.read(&a).await.unwrap().is_some());
    assert!(coord.read(&b).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_removes_room_and_notifies() {
    let coord = coordinator();
    let code = coord.create(RoomSettings::default(), &pid("host")).await.unwrap();
    let mut sub = coord.subscribe(&code).await.unwrap();
    assert!(latest_room(&mut sub).is_some());

    coord.delete(&code).await.unwrap();
    coord.delete(&code).await.unwrap();

    assert!(coord.read(&code).await.unwrap().is_none());
    assert_eq!(sub.try_recv(), Some(RoomUpdate::Deleted));
}

#[tokio::test]
async fn test_sweep_with_huge_timeout_keeps_rooms() {
    let clock = Arc::new(ManualClock::new(T0));
    let coord = coordinator_with_clock(MemoryStore::new(), clock.clone());
    let code = coord.create(RoomSettings::default(), &pid("host")).await.unwrap();

    clock.advance(Duration::from_secs(45));
    let swept = coord
        .sweep_abandoned(Duration::from_secs(18_446_744_073_709_552))
        .await
        .unwrap();

    assert!(swept.is_empty());
    assert!(coord.read(&code).await.unwrap().is_some());
}

// =========================================================================
// participants leaving mid-transition
// =========================================================================

async fn leaving_room(store: &LeavingStore) -> (RoomCoordinator<LeavingStore>, RoomCode) {
    let coord = RoomCoordinator::new(store.clone())
        .with_seed(5)
        .with_clock(Arc::new(ManualClock::new(T0)));
    let code = coord.create(settings(1, false, false), &pid("host")).await.unwrap();
    for id in ["a", "b"] {
        coord.join(&code, &pid(id), Some(id)).await.unwrap();
    }
    (coord, code)
}

#[tokio::test]
async fn test_start_with_player_leaving_after_read_succeeds() {
    let store = LeavingStore::default();
    let (coord, code) = leaving_room(&store).await;
    store.leave_after_next_read(&code, "a").await;

    coord.start(&code).await.unwrap();

    let room = coord.read(&code).await.unwrap().expect("room exists");
    assert_eq!(room.status, RoomStatus::Active);
    assert!(!room.players.contains_key(&pid("a")));
    assert_eq!(room.player_count(), 2);
    assert!(room.players.values().all(|p| p.role.is_some()));
}

#[tokio::test]
async fn test_end_with_player_leaving_after_read_succeeds() {
    let store = LeavingStore::default();
    let (coord, code) = leaving_room(&store).await;
    coord.start(&code).await.unwrap();
    store.leave_after_next_read(&code, "a").await;

    coord.end(&code).await.unwrap();

    let room = coord.read(&code).await.unwrap().expect("room exists");
    assert_eq!(room.status, RoomStatus::Waiting);
    assert!(!room.players.contains_key(&pid("a")));
    assert!(room.players.values().all(|p| p.role.is_none() && !p.is_first));
}

#[tokio::test]
async fn test_reveal_with_player_leaving_after_read_is_noop() {
    let store = LeavingStore::default();
    let (coord, code) = leaving_room(&store).await;
    store.leave_after_next_read(&code, "a").await;

    coord.reveal(&code, &pid("a")).await.unwrap();

    let room = coord.read(&code).await.unwrap().expect("room exists");
    assert!(!room.players.contains_key(&pid("a")));
}

// =========================================================================
// catalog
// =========================================================================

#[tokio::test]
async fn test_regenerate_catalog_installs_generated_words() {
    let coord = coordinator();
    let provider = CannedProvider::replying(r#"{"Gandalf": "barba"}"#);

    let source = coord.regenerate_catalog(&provider, "Tolkien").await.unwrap();

    assert_eq!(source, CatalogSource::Custom);
    let code = coord.create(settings(1, true, false), &pid("host")).await.unwrap();
    coord.start(&code).await.unwrap();
    let room = room(&coord, &code).await;
    assert_eq!(room.word, "Gandalf");
    assert_eq!(room.hint.as_deref(), Some("barba"));
}

#[tokio::test]
async fn test_regenerate_catalog_provider_failure_keeps_catalog() {
    let coord = coordinator();
    let provider = CannedProvider::failing("quota exceeded");

    let result = coord.regenerate_catalog(&provider, "sport").await;

    assert!(matches!(result, Err(SessionError::WordProviderUnavailable(r)) if r == "quota exceeded"));
    assert!(coord.with_catalog_mut(|c| c.contains("mare")));
}

#[tokio::test]
async fn test_set_catalog_empty_fails_and_reset_restores_default() {
    let coord = coordinator();

    assert!(matches!(
        coord.set_catalog(WordList::new()),
        Err(SessionError::InvalidSettings(_))
    ));
    coord.reset_catalog();

    assert_eq!(coord.with_catalog_mut(|c| c.source()), CatalogSource::Default);
}

// =========================================================================
// A store whose deletes can be made to fail per room
// =========================================================================

#[derive(Clone, Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing: Arc<tokio::sync::Mutex<Vec<RoomCode>>>,
}

impl FlakyStore {
    async fn fail_deletes_of(&self, code: &RoomCode) {
        self.failing.lock().await.push(code.clone());
    }
}

impl RoomStore for FlakyStore {
    async fn create(&self, code: &RoomCode, room: &Room) -> Result<(), StoreError> {
        self.inner.create(code, room).await
    }

    async fn read(&self, code: &RoomCode) -> Result<Option<Room>, StoreError> {
        self.inner.read(code).await
    }

    async fn apply_atomic(&self, code: &RoomCode, patch: RoomPatch) -> Result<(), StoreError> {
        self.inner.apply_atomic(code, patch).await
    }

    async fn delete(&self, code: &RoomCode) -> Result<(), StoreError> {
        if self.failing.lock().await.contains(code) {
            return Err(StoreError::Unavailable("delete rejected".into()));
        }
        self.inner.delete(code).await
    }

    async fn subscribe(&self, code: &RoomCode) -> Result<Subscription, StoreError> {
        self.inner.subscribe(code).await
    }

    async fn scan(&self) -> Result<Vec<(RoomCode, Room)>, StoreError> {
        self.inner.scan().await
    }
}

// =========================================================================
// A store where a participant leaves right after the next read
// =========================================================================

#[derive(Clone, Default)]
struct LeavingStore {
    inner: MemoryStore,
    pending: Arc<tokio::sync::Mutex<Option<(RoomCode, ParticipantId)>>>,
}

impl LeavingStore {
    async fn leave_after_next_read(&self, code: &RoomCode, id: &str) {
        *self.pending.lock().await = Some((code.clone(), pid(id)));
    }
}

impl RoomStore for LeavingStore {
    async fn create(&self, code: &RoomCode, room: &Room) -> Result<(), StoreError> {
        self.inner.create(code, room).await
    }

    async fn read(&self, code: &RoomCode) -> Result<Option<Room>, StoreError> {
        let room = self.inner.read(code).await?;
        let pending = self.pending.lock().await.take();
        if let Some((room_code, id)) = pending {
            let mut patch = RoomPatch::new();
            patch.remove(FieldPath::player(&id));
            self.inner.apply_atomic(&room_code, patch).await?;
        }
        Ok(room)
    }

    async fn apply_atomic(&self, code: &RoomCode, patch: RoomPatch) -> Result<(), StoreError> {
        self.inner.apply_atomic(code, patch).await
    }

    async fn delete(&self, code: &RoomCode) -> Result<(), StoreError> {
        self.inner.delete(code).await
    }

    async fn subscribe(&self, code: &RoomCode) -> Result<Subscription, StoreError> {
        self.inner.subscribe(code).await
    }

    async fn scan(&self) -> Result<Vec<(RoomCode, Room)>, StoreError> {
        self.inner.scan().await
    }
}
