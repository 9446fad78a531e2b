//! The room coordinator: every lifecycle transition of a room.
//!
//! Each operation reads what it needs, validates the transition, then
//! writes its whole effect as ONE [`RoomPatch`] through
//! [`RoomStore::apply_atomic`]. Subscribers therefore never observe a half
//! applied transition (e.g. `status = active` with some roles missing).
//!
//! # Concurrency note
//!
//! The read and the write are separate store calls, so two clients racing
//! (a `join` landing while `start` is dealing roles) can interleave. The
//! late joiner simply has no role until the next round. Per-player
//! fields are written with [`RoomPatch::update`], so a participant who
//! leaves in that window just drops out of the transition. The coordinator
//! holds no lock across an `.await`; the catalog and RNG sit behind short
//! synchronous locks that are released before any store call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::join_all;
use impostore_protocol::{
    FieldPath, ParticipantId, Player, ProtocolError, Room, RoomCode, RoomPatch, RoomSettings,
    RoomStatus, fields,
};
use impostore_store::{RoomStore, StoreError, Subscription};
use impostore_words::{CatalogSource, WordCatalog, WordList, WordListProvider, WordsError};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::{
    Clock, SessionConfig, SessionError, SettingsUpdate, SystemClock, assign_roles,
    select_first_player,
};

/// Drives rooms through `waiting → active → waiting → … → deleted`.
///
/// One coordinator can serve any number of rooms; it keeps no per-room
/// state of its own. The word catalog it owns is shared by every room it
/// starts, which is what a single host device running rounds back to back
/// expects.
pub struct RoomCoordinator<S: RoomStore> {
    store: S,
    catalog: Mutex<WordCatalog>,
    rng: Mutex<RandomStreams>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl<S: RoomStore> RoomCoordinator<S> {
    /// A coordinator with the default catalog, an OS-seeded RNG, the
    /// system clock and default config.
    pub fn new(store: S) -> Self {
        Self {
            store,
            catalog: Mutex::new(WordCatalog::new()),
            rng: Mutex::new(RandomStreams::from_os_rng()),
            clock: Arc::new(SystemClock),
            config: SessionConfig::default(),
        }
    }

    /// Replaces the word catalog.
    pub fn with_catalog(mut self, catalog: WordCatalog) -> Self {
        self.catalog = Mutex::new(catalog);
        self
    }

    /// Seeds every random stream: room codes, the role shuffle and the
    /// first-player pick. Each stream gets its own seed derived from `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(RandomStreams::seeded(seed));
        self
    }

    /// Reseeds only the role shuffle.
    pub fn with_role_seed(self, seed: u64) -> Self {
        self.rng().roles = StdRng::seed_from_u64(seed);
        self
    }

    /// Reseeds only the first-player pick.
    pub fn with_first_player_seed(self, seed: u64) -> Self {
        self.rng().first_player = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config.validated();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current wall-clock time from the injected clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Creates a waiting room with `host` as its only player and returns
    /// the new room code.
    ///
    /// A code that is already live is replaced by a fresh one, up to
    /// `config.create_attempts` codes in total.
    ///
    /// # Errors
    /// - [`SessionError::InvalidSettings`]: fewer than one impostor
    /// - [`SessionError::AlreadyExists`]: every attempted code collided
    pub async fn create(
        &self,
        settings: RoomSettings,
        host: &ParticipantId,
    ) -> Result<RoomCode, SessionError> {
        check_impostors(settings.num_impostors)?;
        let room = Room::new_waiting(host.clone(), settings, self.now_ms());

        let attempts = self.config.create_attempts.max(1);
        let mut attempt = 1;
        loop {
            let code = self.fresh_code();
            match self.store.create(&code, &room).await {
                Ok(()) => {
                    tracing::info!(%code, %host, impostors = room.num_impostors, "room created");
                    return Ok(code);
                }
                Err(StoreError::AlreadyExists(taken)) if attempt < attempts => {
                    tracing::warn!(code = %taken, attempt, "room code collision, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Adds (or re-adds) `participant` to a room.
    ///
    /// Allowed in either status; a participant joining mid-round has no
    /// role until the next `start`. A name already used by someone else
    /// is logged but not refused: use
    /// [`is_name_available`](Self::is_name_available) to check first.
    ///
    /// # Errors
    /// [`SessionError::RoomNotFound`] if the room does not exist.
    pub async fn join(
        &self,
        code: &RoomCode,
        participant: &ParticipantId,
        name: Option<&str>,
    ) -> Result<(), SessionError> {
        let room = self.require_room(code).await?;

        let name = name.map(str::trim).filter(|n| !n.is_empty());
        if let Some(name) = name {
            if room.name_held_by_other(name, Some(participant)) {
                tracing::warn!(%code, %participant, name, "display name already in use");
            }
        }

        let player = Player::new(name.map(str::to_string), self.now_ms());
        let mut patch = RoomPatch::new();
        patch.set(FieldPath::player(participant), to_value(&player)?);
        self.store.apply_atomic(code, patch).await?;

        tracing::info!(%code, %participant, status = %room.status, "player joined");
        Ok(())
    }

    /// Advisory check: does anyone in the room already use `name`?
    /// An absent room has no names, so every name is available.
    pub async fn is_name_available(&self, code: &RoomCode, name: &str) -> Result<bool, SessionError> {
        Ok(self
            .store
            .read(code)
            .await?
            .is_none_or(|room| room.is_name_available(name)))
    }

    /// A participant leaves the room.
    pub async fn leave(&self, code: &RoomCode, participant: &ParticipantId) -> Result<(), SessionError> {
        self.drop_player(code, participant).await?;
        tracing::info!(%code, %participant, "player left");
        Ok(())
    }

    /// The host removes a participant. Removing the host is not prevented.
    pub async fn remove(&self, code: &RoomCode, participant: &ParticipantId) -> Result<(), SessionError> {
        self.drop_player(code, participant).await?;
        tracing::info!(%code, %participant, "player removed by host");
        Ok(())
    }

    /// Changes room settings between rounds.
    ///
    /// # Errors
    /// - [`SessionError::InvalidSettings`]: fewer than one impostor
    /// - [`SessionError::RoomNotFound`]
    /// - [`SessionError::GameInProgress`]: the room is not waiting
    pub async fn update_settings(
        &self,
        code: &RoomCode,
        update: SettingsUpdate,
    ) -> Result<(), SessionError> {
        if let Some(n) = update.num_impostors {
            check_impostors(n)?;
        }
        let room = self.require_room(code).await?;
        if !room.status.is_waiting() {
            return Err(SessionError::GameInProgress(code.clone()));
        }
        if update.is_empty() {
            return Ok(());
        }

        let current = room.settings();
        let next = update.apply_to(current);

        let mut patch = RoomPatch::new();
        if update.num_impostors.is_some() {
            patch.set(FieldPath::field(fields::NUM_IMPOSTORS), next.num_impostors);
        }
        if update.hint_enabled.is_some() {
            patch.set(FieldPath::field(fields::HINT_ENABLED), next.hint_enabled);
        }
        if update.hint_only_first.is_some() || next.hint_only_first != current.hint_only_first {
            patch.set(FieldPath::field(fields::HINT_ONLY_FIRST), next.hint_only_first);
        }
        self.store.apply_atomic(code, patch).await?;

        tracing::info!(
            %code,
            impostors = next.num_impostors,
            hint_enabled = next.hint_enabled,
            hint_only_first = next.hint_only_first,
            "settings updated"
        );
        Ok(())
    }

    /// Starts a round: deals roles, picks the first player and draws a
    /// fresh word, all in one write.
    ///
    /// If the host's own entry is missing it is re-added first.
    ///
    /// # Errors
    /// - [`SessionError::RoomNotFound`]
    /// - [`SessionError::GameInProgress`]: a round is already running
    /// - [`SessionError::NoParticipants`]
    pub async fn start(&self, code: &RoomCode) -> Result<(), SessionError> {
        let mut room = self.require_room(code).await?;
        if !room.status.is_waiting() {
            return Err(SessionError::GameInProgress(code.clone()));
        }

        if !room.players.contains_key(&room.host_id) {
            tracing::warn!(%code, host = %room.host_id, "host missing from players, re-adding");
            let host = Player::new(None, self.now_ms());
            let mut patch = RoomPatch::new();
            patch.set(FieldPath::player(&room.host_id), to_value(&host)?);
            self.store.apply_atomic(code, patch).await?;
            room.players.insert(room.host_id.clone(), host);
        }

        let ids: Vec<ParticipantId> = room.players.keys().cloned().collect();
        let (roles, first) = {
            let mut rng = self.rng();
            let roles = assign_roles(&ids, room.num_impostors, &mut rng.roles);
            (roles, select_first_player(&ids, &mut rng.first_player)?)
        };
        let (word, hint) = {
            let mut catalog = self.catalog();
            let word = catalog.next_word(None);
            let hint = room.hint_enabled.then(|| catalog.hint_for(&word)).flatten();
            (word, hint)
        };

        let mut patch = RoomPatch::new();
        patch
            .set(FieldPath::field(fields::STATUS), RoomStatus::Active.as_str())
            .set(FieldPath::field(fields::FIRST_PLAYER_ID), first.as_str())
            .set(FieldPath::field(fields::WORD), word.as_str())
            .set_opt(FieldPath::field(fields::HINT), hint);
        for (id, role) in &roles {
            patch
                .update(FieldPath::player_field(id, fields::ROLE), role.as_str())
                .update(FieldPath::player_field(id, fields::IS_FIRST), *id == first)
                .update(FieldPath::player_field(id, fields::REVEALED), false);
        }
        self.store.apply_atomic(code, patch).await?;

        tracing::info!(
            %code,
            players = roles.len(),
            impostors = room.num_impostors,
            first = %first,
            "round started"
        );
        Ok(())
    }

    /// Ends the round and returns the room to waiting with a new word
    /// already drawn. Settings and players are kept; roles are cleared.
    ///
    /// # Errors
    /// [`SessionError::RoomNotFound`]
    pub async fn end(&self, code: &RoomCode) -> Result<(), SessionError> {
        let room = self.require_room(code).await?;

        let (word, hint) = {
            let mut catalog = self.catalog();
            let current = Some(room.word.as_str()).filter(|w| !w.is_empty());
            let mut word = catalog.next_word(current);
            let mut retries = 0;
            while current == Some(word.as_str()) && retries < self.config.end_word_retries {
                word = catalog.next_word(current);
                retries += 1;
            }
            let hint = room.hint_enabled.then(|| catalog.hint_for(&word)).flatten();
            (word, hint)
        };

        let mut patch = RoomPatch::new();
        patch
            .set(FieldPath::field(fields::STATUS), RoomStatus::Waiting.as_str())
            .remove(FieldPath::field(fields::FIRST_PLAYER_ID))
            .set(FieldPath::field(fields::WORD), word.as_str())
            .set_opt(FieldPath::field(fields::HINT), hint);
        for id in room.players.keys() {
            patch
                .remove(FieldPath::player_field(id, fields::ROLE))
                .update(FieldPath::player_field(id, fields::IS_FIRST), false)
                .update(FieldPath::player_field(id, fields::REVEALED), false);
        }
        self.store.apply_atomic(code, patch).await?;

        tracing::info!(%code, players = room.player_count(), "round ended");
        Ok(())
    }

    /// Marks that `participant` has opened their role card. Idempotent,
    /// and allowed in either status.
    ///
    /// # Errors
    /// - [`SessionError::RoomNotFound`]
    /// - [`SessionError::NotInRoom`]: the participant has no entry
    pub async fn reveal(&self, code: &RoomCode, participant: &ParticipantId) -> Result<(), SessionError> {
        let room = self.require_room(code).await?;
        if !room.players.contains_key(participant) {
            return Err(SessionError::NotInRoom(participant.clone(), code.clone()));
        }

        let mut patch = RoomPatch::new();
        patch.update(FieldPath::player_field(participant, fields::REVEALED), true);
        self.store.apply_atomic(code, patch).await?;

        tracing::debug!(%code, %participant, "role revealed");
        Ok(())
    }

    /// Stamps the host's liveness signal.
    pub async fn heartbeat(&self, code: &RoomCode) -> Result<(), SessionError> {
        let now = self.now_ms();
        let mut patch = RoomPatch::new();
        patch.set(FieldPath::field(fields::LAST_HEARTBEAT), now);
        self.store.apply_atomic(code, patch).await?;
        tracing::trace!(%code, now, "heartbeat");
        Ok(())
    }

    /// Deletes every room whose last heartbeat is more than `timeout` old
    /// and returns the codes that were removed.
    ///
    /// Rooms that never recorded a heartbeat are left alone. A failed
    /// delete is logged and skipped; the rest of the sweep continues.
    ///
    /// # Errors
    /// Only if the initial scan fails.
    pub async fn sweep_abandoned(&self, timeout: Duration) -> Result<Vec<RoomCode>, SessionError> {
        let now = self.now_ms();
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);

        let stale: Vec<RoomCode> = self
            .store
            .scan()
            .await?
            .into_iter()
            .filter(|(_, room)| {
                room.last_heartbeat
                    .is_some_and(|beat| now.saturating_sub(beat) > timeout_ms)
            })
            .map(|(code, _)| code)
            .collect();
        if stale.is_empty() {
            return Ok(Vec::new());
        }

        let results = join_all(stale.iter().map(|code| self.store.delete(code))).await;

        let mut swept = Vec::with_capacity(stale.len());
        for (code, result) in stale.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    tracing::info!(%code, "abandoned room swept");
                    swept.push(code);
                }
                Err(e) => tracing::warn!(%code, error = %e, "failed to sweep abandoned room"),
            }
        }
        Ok(swept)
    }

    /// Removes a room unconditionally. Deleting an absent room succeeds.
    pub async fn delete(&self, code: &RoomCode) -> Result<(), SessionError> {
        self.store.delete(code).await?;
        tracing::info!(%code, "room deleted");
        Ok(())
    }

    /// Point read of a room.
    pub async fn read(&self, code: &RoomCode) -> Result<Option<Room>, SessionError> {
        Ok(self.store.read(code).await?)
    }

    /// Live updates for one room, starting with its current state.
    pub async fn subscribe(&self, code: &RoomCode) -> Result<Subscription, SessionError> {
        Ok(self.store.subscribe(code).await?)
    }

    // -----------------------------------------------------------------------
    // Word catalog
    // -----------------------------------------------------------------------

    /// Replaces the catalog with a host-supplied list. Affects the next
    /// word drawn, never the round in progress.
    pub fn set_catalog(&self, words: WordList) -> Result<(), SessionError> {
        self.catalog().set_catalog(words).map_err(|e| match e {
            WordsError::EmptyCatalog => SessionError::InvalidSettings("word list is empty".into()),
            WordsError::ProviderUnavailable(reason) => SessionError::WordProviderUnavailable(reason),
        })
    }

    /// Restores the built-in catalog.
    pub fn reset_catalog(&self) {
        self.catalog().reset_to_default();
    }

    /// Asks `provider` for a list about `topic` and installs it; an empty
    /// reply restores the built-in catalog. Returns where the active
    /// catalog now comes from.
    ///
    /// # Errors
    /// [`SessionError::WordProviderUnavailable`]; the catalog is unchanged.
    pub async fn regenerate_catalog<P: WordListProvider>(
        &self,
        provider: &P,
        topic: &str,
    ) -> Result<CatalogSource, SessionError> {
        let outcome = provider.generate(topic).await.map_err(|e| match e {
            WordsError::ProviderUnavailable(reason) => SessionError::WordProviderUnavailable(reason),
            other => SessionError::WordProviderUnavailable(other.to_string()),
        })?;
        let source = self.catalog().apply_outcome(outcome);
        tracing::info!(topic, ?source, "word catalog regenerated");
        Ok(source)
    }

    /// Runs `f` with the catalog locked. Keep it short.
    pub fn with_catalog_mut<T>(&self, f: impl FnOnce(&mut WordCatalog) -> T) -> T {
        f(&mut self.catalog())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn require_room(&self, code: &RoomCode) -> Result<Room, SessionError> {
        self.store
            .read(code)
            .await?
            .ok_or_else(|| SessionError::RoomNotFound(code.clone()))
    }

    async fn drop_player(&self, code: &RoomCode, participant: &ParticipantId) -> Result<(), SessionError> {
        let mut patch = RoomPatch::new();
        patch.remove(FieldPath::player(participant));
        self.store.apply_atomic(code, patch).await?;
        Ok(())
    }

    fn fresh_code(&self) -> RoomCode {
        RoomCode::generate(&mut self.rng().codes)
    }

    // A panic while holding either lock cannot leave the data half
    // updated, so a poisoned lock is still safe to use.
    fn catalog(&self) -> MutexGuard<'_, WordCatalog> {
        self.catalog.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rng(&self) -> MutexGuard<'_, RandomStreams> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Independent random streams, so a seeded role shuffle is not shifted by
/// how many room codes were drawn before it.
struct RandomStreams {
    codes: StdRng,
    roles: StdRng,
    first_player: StdRng,
}

impl RandomStreams {
    fn from_os_rng() -> Self {
        Self {
            codes: StdRng::from_os_rng(),
            roles: StdRng::from_os_rng(),
            first_player: StdRng::from_os_rng(),
        }
    }

    fn seeded(seed: u64) -> Self {
        Self {
            codes: StdRng::seed_from_u64(seed),
            roles: StdRng::seed_from_u64(seed.wrapping_add(1)),
            first_player: StdRng::seed_from_u64(seed.wrapping_add(2)),
        }
    }
}

fn check_impostors(n: u32) -> Result<(), SessionError> {
    if n < 1 {
        return Err(SessionError::InvalidSettings(format!(
            "at least one impostor required, got {n}"
        )));
    }
    Ok(())
}

fn to_value(player: &Player) -> Result<serde_json::Value, SessionError> {
    Ok(serde_json::to_value(player).map_err(ProtocolError::Encode)?)
}
