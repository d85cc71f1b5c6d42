use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use crate::{
    config::GameConfig,
    dictionary::WordLookup,
    error::{ConfigError, EngineError},
    events::{EventBus, GameCommand, GameEvent, RosterEntry},
    game::{
        bag::{fisher_yates, TileBag},
        board::Board,
        bot::{GreedyBot, MoveStrategy},
        placement::PlacementScore,
        player::{Controller, Player},
        table::Table,
        validator::WordValidator,
    },
    models::{
        Direction, EndReason, GameStatus, Letter, PlacedTile, PlayerId, PlayerSnapshot, Position,
        RedrawRequest, ScoreInfo,
    },
};

/// A seat at the table before the game is built
#[derive(Clone)]
pub struct Seat {
    pub name: String,
    pub controller: Controller,
}

impl Seat {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controller: Controller::Human,
        }
    }

    pub fn bot(name: impl Into<String>, strategy: Arc<dyn MoveStrategy>) -> Self {
        Self {
            name: name.into(),
            controller: Controller::Bot(strategy),
        }
    }
}

struct GameState {
    table: Table,
    /// Turn order
    players: Vec<Player>,
    current: usize,
    round: u32,
    status: GameStatus,
    /// Bumped on every reset so a running loop notices it is stale
    generation: u64,
    turn_seq: u64,
}

impl GameState {
    fn is_live(&self, generation: u64) -> bool {
        self.status == GameStatus::InProgress && self.generation == generation
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<(&mut Player, &mut Table), EngineError> {
        let GameState { players, table, .. } = self;
        let player = players
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(EngineError::UnknownPlayer(id))?;
        Ok((player, table))
    }

    fn roster(&self) -> Vec<RosterEntry> {
        self.players
            .iter()
            .map(|p| RosterEntry {
                player_id: p.id(),
                name: p.name().to_string(),
                kind: p.kind(),
            })
            .collect()
    }

    fn scores(&self) -> Vec<ScoreInfo> {
        self.players
            .iter()
            .map(|p| ScoreInfo {
                player_id: p.id(),
                name: p.name().to_string(),
                score: p.score(),
            })
            .collect()
    }

    fn reset(&mut self) {
        for player in &mut self.players {
            player.cancel_turn();
        }
        self.generation += 1;
        self.table.reset();
        for player in &mut self.players {
            player.reset(&mut self.table);
        }
        self.current = 0;
        self.round = 0;
        self.status = GameStatus::NotStarted;
        self.table.emit(GameEvent::GameReset);
        tracing::info!("Game reset");
    }

    fn end(&mut self, reason: EndReason) {
        if self.status == GameStatus::Ended {
            return;
        }
        for player in &mut self.players {
            player.cancel_turn();
        }
        self.status = GameStatus::Ended;
        let final_scores = self.scores();
        tracing::info!("Game ended: {:?}", reason);
        self.table.emit(GameEvent::GameEnded {
            reason,
            final_scores,
        });
    }

    /// Apply consequences an operation left behind
    fn settle(&mut self) {
        if self.table.take_exhausted() {
            self.end(EndReason::BagExhausted);
        }
    }
}

struct Shared {
    state: Mutex<GameState>,
    events: EventBus,
    turn_time_limit: Option<Duration>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the lock, then deliver the events it produced once the
    /// lock is released so handlers may call back into the game.
    fn with_state<T>(&self, f: impl FnOnce(&mut GameState) -> T) -> T {
        let (result, events) = {
            let mut state = self.lock();
            let result = f(&mut state);
            state.settle();
            let events = state.table.take_events();
            (result, events)
        };
        self.events.emit_all(events);
        result
    }
}

/// The game orchestrator. Cloning yields another handle to the same game.
#[derive(Clone)]
pub struct Game {
    shared: Arc<Shared>,
}

impl Game {
    /// Build a game with `player_count` humans and `bot_count` greedy bots
    pub fn new(config: GameConfig, lookup: Arc<dyn WordLookup>) -> Result<Self, ConfigError> {
        let humans = (0..config.player_count).map(|i| {
            let name = config
                .player_names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("Player {}", i + 1));
            Seat::human(name)
        });
        let bots = (0..config.bot_count).map(|i| {
            let strategy: Arc<dyn MoveStrategy> = Arc::new(GreedyBot::new(config.bot_thinking_delay));
            Seat::bot(format!("Bot {}", i + 1), strategy)
        });
        let seats = humans.chain(bots).collect();
        Self::with_seats(config, lookup, seats)
    }

    /// Build a game around an explicit roster. Player counts in `config` are ignored.
    pub fn with_seats(
        config: GameConfig,
        lookup: Arc<dyn WordLookup>,
        seats: Vec<Seat>,
    ) -> Result<Self, ConfigError> {
        let config = GameConfig {
            player_count: seats.len(),
            bot_count: 0,
            ..config
        };
        config.validate()?;

        let board = Board::new(config.board_size, config.multiplier_layout())?;
        let mut bag = TileBag::new(&config.distribution(), config.seed)?;
        bag.shuffle();
        let mut table = Table::new(board, bag, WordValidator::new(lookup));

        let mut players: Vec<Player> = seats
            .into_iter()
            .map(|seat| Player::new(seat.name, seat.controller))
            .collect();
        fisher_yates(&mut players, table.bag.rng());
        for player in &mut players {
            player.deal(&mut table);
        }
        table.take_events();
        table.take_exhausted();

        tracing::info!(
            "Created {}x{} game with {} players",
            config.board_size,
            config.board_size,
            players.len()
        );

        let state = GameState {
            table,
            players,
            current: 0,
            round: 0,
            status: GameStatus::NotStarted,
            generation: 0,
            turn_seq: 0,
        };

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                events: EventBus::new(),
                turn_time_limit: config.turn_time_limit,
            }),
        })
    }

    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    /// Reset and play rounds until the game ends or is reset. Does nothing
    /// if the game is already in progress.
    pub async fn start_game(&self) {
        let generation = self.shared.with_state(|st| {
            if st.status == GameStatus::InProgress {
                return None;
            }
            st.reset();
            st.status = GameStatus::InProgress;
            let players = st.roster();
            tracing::info!("Game started with {} players", players.len());
            st.table.emit(GameEvent::GameStarted { players });
            Some(st.generation)
        });
        let Some(generation) = generation else {
            return;
        };

        while self.play_round(generation).await {}
    }

    /// One pass through the roster. Returns false once the game stops.
    async fn play_round(&self, generation: u64) -> bool {
        let seats = self.shared.with_state(|st| st.players.len());
        for _ in 0..seats {
            if !self.play_turn(generation).await {
                return false;
            }
            tokio::task::yield_now().await;
        }

        self.shared.with_state(|st| {
            if !st.is_live(generation) {
                return false;
            }
            st.round += 1;
            tracing::info!("Round {} completed", st.round);
            st.table.emit(GameEvent::RoundCompleted { round: st.round });
            true
        })
    }

    async fn play_turn(&self, generation: u64) -> bool {
        let seat = self.shared.with_state(|st| {
            if !st.is_live(generation) {
                return None;
            }
            let player = &st.players[st.current];
            Some((player.id(), player.strategy()))
        });
        let Some((player_id, strategy)) = seat else {
            return false;
        };

        let finished = match strategy {
            Some(strategy) => self.bot_turn(generation, player_id, strategy).await,
            None => self.human_turn(generation, player_id).await,
        };
        if !finished {
            return false;
        }

        self.shared.with_state(|st| {
            if !st.is_live(generation) {
                return false;
            }
            st.current = (st.current + 1) % st.players.len();
            true
        })
    }

    async fn human_turn(&self, generation: u64, player_id: PlayerId) -> bool {
        let time_limit = self.shared.turn_time_limit;
        let weak = Arc::downgrade(&self.shared);

        let receiver = self.shared.with_state(|st| {
            if !st.is_live(generation) {
                return None;
            }
            st.turn_seq += 1;
            let seq = st.turn_seq;
            let (player, table) = st.player_mut(player_id).ok()?;
            let receiver = player.begin_turn(seq)?;

            if let Some(limit) = time_limit {
                let timer = tokio::spawn(expire_after(weak, limit, player_id, seq));
                player.set_timer(timer.abort_handle());
            }
            table.emit(GameEvent::TurnStarted {
                player_id,
                time_limit_ms: time_limit.map(|limit| limit.as_millis() as u64),
            });
            Some(receiver)
        });
        let Some(receiver) = receiver else {
            return false;
        };

        let Ok(outcome) = receiver.await else {
            tracing::debug!("Turn for {} was cancelled", player_id);
            return false;
        };
        tracing::debug!("Turn for {} finished: {:?}", player_id, outcome);

        self.shared.with_state(|st| {
            if !st.is_live(generation) {
                return false;
            }
            let score = st.player_mut(player_id).map(|(p, _)| p.score()).unwrap_or(0);
            st.table.emit(GameEvent::TurnEnded { player_id, score });
            true
        })
    }

    async fn bot_turn(
        &self,
        generation: u64,
        player_id: PlayerId,
        strategy: Arc<dyn MoveStrategy>,
    ) -> bool {
        strategy.think().await;

        self.shared.with_state(|st| {
            if !st.is_live(generation) {
                return false;
            }
            st.turn_seq += 1;
            let seq = st.turn_seq;
            let Ok((player, table)) = st.player_mut(player_id) else {
                return false;
            };
            if player.begin_turn(seq).is_none() {
                return false;
            }

            let played = strategy
                .choose_move(table, player.hand())
                .map(|candidate| player.play_candidate(table, &candidate));
            match played {
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("Bot move rejected, passing instead: {}", e);
                    let _ = player.pass_turn(table);
                }
                None => {
                    let _ = player.pass_turn(table);
                }
            }
            true
        })
    }

    fn expire_turn(&self, player_id: PlayerId, seq: u64) {
        self.shared.with_state(|st| {
            let Ok((player, table)) = st.player_mut(player_id) else {
                return;
            };
            if player.turn_seq() == Some(seq) {
                player.expire(table);
            }
        });
    }

    /// Cancel any turn in progress and return to a fresh, unstarted game
    pub fn reset_game(&self) {
        self.shared.with_state(GameState::reset);
    }

    /// Stop the game. Any turn in progress is abandoned.
    pub fn end_game(&self) {
        self.shared.with_state(|st| st.end(EndReason::Stopped));
    }

    /// Draw from the bag. An empty bag ends the game.
    pub fn draw_piece(&self) -> Option<Letter> {
        self.shared.with_state(|st| st.table.draw_piece())
    }

    /// Put a letter on the board outside the turn flow
    pub fn place_tile(&self, letter: Letter, x: usize, y: usize) -> Result<(), EngineError> {
        self.shared.with_state(|st| st.table.place_tile(letter, x, y))
    }

    pub fn remove_tile(&self, letter: Letter, x: usize, y: usize) -> Result<Letter, EngineError> {
        self.shared.with_state(|st| st.table.remove_tile(letter, x, y))
    }

    /// Enter a whole word outside the turn flow. Returns the word's score.
    pub fn add_word(&self, word: &str, origin: Position, direction: Direction) -> Result<u32, EngineError> {
        self.shared.with_state(|st| {
            let plan = st.table.plan_word(word, origin, direction)?;
            let scored = st.table.commit_word(&plan)?;
            Ok(scored.score)
        })
    }

    /// Act on behalf of one player
    pub fn handle(&self, player_id: PlayerId) -> PlayerHandle<'_> {
        PlayerHandle {
            game: self,
            player_id,
        }
    }

    /// Route a command to the player it names
    pub fn dispatch(&self, command: GameCommand) -> Result<(), EngineError> {
        let player = self.handle(command.player_id());
        match command {
            GameCommand::PlaceTile {
                tile, hand_index, ..
            } => player.place_tile(tile, hand_index),
            GameCommand::PickUpTile { tile, .. } => player.pick_up_tile(tile),
            GameCommand::ConfirmPlacement { .. } => player.confirm_placement().map(|_| ()),
            GameCommand::SelectForRedraw { hand_index, .. } => player.select_for_redraw(hand_index),
            GameCommand::DeselectRedraw {
                selection_index, ..
            } => player.deselect_redraw(selection_index),
            GameCommand::Redraw { request, .. } => player.redraw(request).map(|_| ()),
            GameCommand::Pass { .. } => player.pass_turn(),
            GameCommand::SwapTiles { first, second, .. } => player.swap_tiles(first, second),
            GameCommand::PlayWord {
                word,
                origin,
                direction,
                ..
            } => player.play_word(&word, origin, direction).map(|_| ()),
        }
    }

    pub fn board(&self) -> Board {
        self.shared.lock().table.board().clone()
    }

    pub fn current_player(&self) -> Option<PlayerSnapshot> {
        let st = self.shared.lock();
        st.players.get(st.current).map(Player::snapshot)
    }

    pub fn round(&self) -> u32 {
        self.shared.lock().round
    }

    pub fn status(&self) -> GameStatus {
        self.shared.lock().status
    }

    pub fn is_in_progress(&self) -> bool {
        self.status() == GameStatus::InProgress
    }

    /// Every player in turn order
    pub fn players(&self) -> Vec<PlayerSnapshot> {
        self.shared.lock().players.iter().map(Player::snapshot).collect()
    }

    pub fn player(&self, player_id: PlayerId) -> Option<PlayerSnapshot> {
        self.shared
            .lock()
            .players
            .iter()
            .find(|p| p.id() == player_id)
            .map(Player::snapshot)
    }

    pub fn scores(&self) -> Vec<ScoreInfo> {
        self.shared.lock().scores()
    }

    pub fn tiles_remaining(&self) -> usize {
        self.shared.lock().table.bag().len()
    }

    pub fn first_word_placed(&self) -> bool {
        self.shared.lock().table.rules().first_word_placed()
    }

    fn act<T>(
        &self,
        player_id: PlayerId,
        f: impl FnOnce(&mut Player, &mut Table) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        self.shared.with_state(|st| {
            let (player, table) = st.player_mut(player_id)?;
            f(player, table)
        })
    }

    #[cfg(test)]
    pub(crate) fn set_hand(&self, player_id: PlayerId, word: &str) {
        let letters = Letter::parse_word(word).unwrap();
        let mut st = self.shared.lock();
        let (player, _) = st.player_mut(player_id).unwrap();
        player.set_hand(letters);
    }
}

/// Fire the turn timeout unless the game or the turn is gone by then
async fn expire_after(shared: Weak<Shared>, limit: Duration, player_id: PlayerId, seq: u64) {
    tokio::time::sleep(limit).await;
    if let Some(shared) = shared.upgrade() {
        Game { shared }.expire_turn(player_id, seq);
    }
}

/// Player commands bound to one player of a game
pub struct PlayerHandle<'a> {
    game: &'a Game,
    player_id: PlayerId,
}

impl PlayerHandle<'_> {
    pub fn id(&self) -> PlayerId {
        self.player_id
    }

    pub fn place_tile(&self, tile: PlacedTile, hand_index: usize) -> Result<(), EngineError> {
        self.game
            .act(self.player_id, |p, t| p.place_tile(t, tile, hand_index))
    }

    pub fn pick_up_tile(&self, tile: PlacedTile) -> Result<(), EngineError> {
        self.game.act(self.player_id, |p, t| p.pick_up_tile(t, tile))
    }

    pub fn confirm_placement(&self) -> Result<PlacementScore, EngineError> {
        self.game.act(self.player_id, |p, t| p.confirm_placement(t))
    }

    pub fn select_for_redraw(&self, hand_index: usize) -> Result<(), EngineError> {
        self.game
            .act(self.player_id, |p, t| p.select_for_redraw(t, hand_index))
    }

    pub fn deselect_redraw(&self, selection_index: usize) -> Result<(), EngineError> {
        self.game
            .act(self.player_id, |p, t| p.deselect_redraw(t, selection_index))
    }

    pub fn redraw(&self, request: RedrawRequest) -> Result<usize, EngineError> {
        self.game.act(self.player_id, |p, t| p.redraw(t, request))
    }

    pub fn pass_turn(&self) -> Result<(), EngineError> {
        self.game.act(self.player_id, |p, t| p.pass_turn(t))
    }

    pub fn swap_tiles(&self, first: usize, second: usize) -> Result<(), EngineError> {
        self.game
            .act(self.player_id, |p, t| p.swap_tiles(t, first, second))
    }

    pub fn play_word(&self, word: &str, origin: Position, direction: Direction) -> Result<u32, EngineError> {
        self.game
            .act(self.player_id, |p, t| p.play_word(t, word, origin, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dictionary::Dictionary, error::PlacementError, events::EventKind, game::bot::PassingBot,
        game::player::HAND_SIZE,
    };
    use tokio::sync::mpsc::UnboundedReceiver;

    fn dictionary() -> Arc<dyn WordLookup> {
        Arc::new(Dictionary::from_words(["HELLO", "CAT", "CATS", "AT"]))
    }

    fn config() -> GameConfig {
        GameConfig {
            turn_time_limit: Some(Duration::from_secs(30)),
            seed: Some(11),
            ..GameConfig::default()
        }
    }

    fn two_humans() -> Game {
        Game::with_seats(config(), dictionary(), vec![Seat::human("Ada"), Seat::human("Bo")]).unwrap()
    }

    fn letter(c: char) -> Letter {
        Letter::new(c).unwrap()
    }

    /// Run the game loop in the background
    fn run(game: &Game) -> tokio::task::JoinHandle<()> {
        let game = game.clone();
        tokio::spawn(async move { game.start_game().await })
    }

    async fn next_turn(rx: &mut UnboundedReceiver<GameEvent>) -> PlayerId {
        loop {
            match rx.recv().await {
                Some(GameEvent::TurnStarted { player_id, .. }) => return player_id,
                Some(_) => continue,
                None => panic!("Event stream closed before a turn started"),
            }
        }
    }

    fn place_word(game: &Game, player_id: PlayerId, word: &str, x: usize, y: usize) {
        let handle = game.handle(player_id);
        for (i, c) in word.chars().enumerate() {
            let hand = game.player(player_id).unwrap().hand;
            let index = hand.iter().position(|l| l.as_char() == c).unwrap();
            handle
                .place_tile(PlacedTile::new(letter(c), x + i, y), index)
                .unwrap();
        }
    }

    #[test]
    fn test_construction_deals_hands() {
        let game = two_humans();
        assert_eq!(game.status(), GameStatus::NotStarted);
        assert_eq!(game.players().len(), 2);
        assert!(game.players().iter().all(|p| p.hand.len() == HAND_SIZE));
        assert_eq!(game.tiles_remaining(), 98 - 2 * HAND_SIZE);
        assert!(game.board().is_empty());
    }

    #[test]
    fn test_bad_config_fails_fast() {
        let config = GameConfig {
            board_size: 14,
            ..GameConfig::default()
        };
        assert!(matches!(
            Game::new(config, dictionary()),
            Err(ConfigError::EvenDimension(14))
        ));
        assert!(matches!(
            Game::with_seats(GameConfig::default(), dictionary(), vec![]),
            Err(ConfigError::NoPlayers)
        ));
    }

    #[test]
    fn test_new_builds_bots_and_names() {
        let config = GameConfig {
            player_count: 1,
            bot_count: 1,
            player_names: vec!["Ada".to_string()],
            ..GameConfig::default()
        };
        let game = Game::new(config, dictionary()).unwrap();
        let mut names: Vec<_> = game.players().into_iter().map(|p| p.name).collect();
        names.sort();
        assert_eq!(names, vec!["Ada".to_string(), "Bot 1".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hello_through_center_passes_turn_to_second_player() {
        let game = two_humans();
        let (_, mut rx) = game.events().channel();
        let runner = run(&game);

        let first = next_turn(&mut rx).await;
        let second = game.players().into_iter().map(|p| p.id).find(|id| *id != first).unwrap();
        assert_eq!(game.players()[0].id, first, "First seat in turn order starts");

        game.set_hand(first, "HELLOAB");
        place_word(&game, first, "HELLO", 5, 7);
        let placement = game.handle(first).confirm_placement().unwrap();
        assert_eq!(placement.total, 16);
        assert!(game.first_word_placed());
        assert_eq!(game.player(first).unwrap().score, 16);

        assert_eq!(next_turn(&mut rx).await, second);
        assert_eq!(game.current_player().unwrap().id, second);

        game.end_game();
        runner.await.unwrap();
        assert_eq!(game.status(), GameStatus::Ended);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_for_waiting_player_do_nothing() {
        let game = two_humans();
        let (_, mut rx) = game.events().channel();
        let runner = run(&game);

        let first = next_turn(&mut rx).await;
        let second = game.players()[1].id;
        let before = game.player(second).unwrap();

        assert_eq!(
            game.handle(second).place_tile(PlacedTile::new(before.hand[0], 7, 7), 0),
            Err(EngineError::NotTakingTurn)
        );
        assert_eq!(game.handle(second).pass_turn(), Err(EngineError::NotTakingTurn));
        assert!(game.board().is_empty());
        assert_eq!(game.player(second).unwrap(), before);
        assert!(game.player(first).unwrap().taking_turn);

        game.end_game();
        runner.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reverts_and_advances() {
        let game = two_humans();
        let (_, mut rx) = game.events().channel();
        let runner = run(&game);

        let first = next_turn(&mut rx).await;
        game.set_hand(first, "CATXYZE");
        game.handle(first)
            .place_tile(PlacedTile::new(letter('C'), 7, 7), 0)
            .unwrap();

        tokio::time::sleep(Duration::from_secs(31)).await;

        assert!(game.board().is_empty(), "Timed out tiles return to the hand");
        let mut hand = game.player(first).unwrap().hand;
        hand.sort();
        assert_eq!(hand, Letter::parse_word("ACETXYZ").unwrap());
        assert!(!game.player(first).unwrap().taking_turn);
        assert_ne!(next_turn(&mut rx).await, first);

        game.end_game();
        runner.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_mid_turn_clears_timer() {
        let game = two_humans();
        let (_, mut rx) = game.events().channel();
        let runner = run(&game);

        let first = next_turn(&mut rx).await;
        game.set_hand(first, "CATXYZE");
        game.handle(first)
            .place_tile(PlacedTile::new(letter('C'), 7, 7), 0)
            .unwrap();

        game.reset_game();
        runner.await.unwrap();
        assert_eq!(game.status(), GameStatus::NotStarted);
        assert!(game.board().is_empty());
        assert!(game.players().iter().all(|p| !p.taking_turn && p.pending.is_empty()));
        assert!(game.players().iter().all(|p| p.hand.len() == HAND_SIZE));

        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(
            rx.try_recv().is_err(),
            "A stale timer must not touch the reset game"
        );
        assert_eq!(game.status(), GameStatus::NotStarted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_noop_while_in_progress() {
        let game = two_humans();
        let (_, mut rx) = game.events().channel();
        let runner = run(&game);
        let first = next_turn(&mut rx).await;

        // Returns immediately instead of starting a second loop
        game.start_game().await;
        assert!(game.player(first).unwrap().taking_turn);

        game.end_game();
        runner.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_redraw_is_atomic() {
        let game = two_humans();
        let (_, mut rx) = game.events().channel();
        let runner = run(&game);

        let first = next_turn(&mut rx).await;
        game.set_hand(first, "AAAAAAA");
        let remaining = game.tiles_remaining();

        assert_eq!(
            game.handle(first).redraw(RedrawRequest::Tiles(vec![letter('Z')])),
            Err(EngineError::TileNotInHand(letter('Z')))
        );
        assert_eq!(game.player(first).unwrap().hand, Letter::parse_word("AAAAAAA").unwrap());
        assert_eq!(game.tiles_remaining(), remaining);

        assert_eq!(
            game.handle(first).redraw(RedrawRequest::Tiles(vec![letter('A'), letter('A')])),
            Ok(2)
        );
        assert_eq!(game.tiles_remaining(), remaining - 2);
        assert_eq!(game.player(first).unwrap().hand.len(), HAND_SIZE);
        assert_ne!(next_turn(&mut rx).await, first);

        game.end_game();
        runner.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_placement_keeps_turn_open() {
        let game = two_humans();
        let (_, mut rx) = game.events().channel();
        let runner = run(&game);

        let first = next_turn(&mut rx).await;
        game.set_hand(first, "TACXYZE");
        place_word(&game, first, "TAC", 6, 7);

        assert_eq!(
            game.handle(first).confirm_placement(),
            Err(EngineError::Placement(PlacementError::InvalidWord("TAC".to_string())))
        );
        let mut hand = game.player(first).unwrap().hand;
        hand.sort();
        assert_eq!(hand, Letter::parse_word("ACETXYZ").unwrap());
        assert!(game.board().is_empty());
        assert!(game.player(first).unwrap().taking_turn);

        game.end_game();
        runner.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_routes_commands() {
        let game = two_humans();
        let (_, mut rx) = game.events().channel();
        let runner = run(&game);

        let first = next_turn(&mut rx).await;
        game.set_hand(first, "CATXYZE");
        game.dispatch(GameCommand::PlayWord {
            player_id: first,
            word: "cat".to_string(),
            origin: Position::new(6, 7),
            direction: Direction::Across,
        })
        .unwrap();
        assert_eq!(game.player(first).unwrap().score, 10);

        let second = next_turn(&mut rx).await;
        assert_ne!(second, first);
        assert_eq!(
            game.dispatch(GameCommand::Pass { player_id: first }),
            Err(EngineError::NotTakingTurn)
        );
        game.dispatch(GameCommand::Pass { player_id: second }).unwrap();

        // Round wraps back to the first player
        assert_eq!(next_turn(&mut rx).await, first);
        assert_eq!(game.round(), 1);

        game.end_game();
        runner.await.unwrap();
    }

    #[test]
    fn test_unknown_player_rejected() {
        let game = two_humans();
        let stranger = PlayerId::new();
        assert_eq!(
            game.dispatch(GameCommand::Pass { player_id: stranger }),
            Err(EngineError::UnknownPlayer(stranger))
        );
    }

    #[test]
    fn test_bag_exhaustion_ends_game() {
        let config = GameConfig {
            distribution: Some(vec![('A', 16)]),
            ..config()
        };
        let game = Game::with_seats(config, dictionary(), vec![Seat::human("Ada"), Seat::human("Bo")]).unwrap();
        let (_, mut rx) = game.events().channel();

        assert_eq!(game.tiles_remaining(), 2);
        assert_eq!(game.draw_piece(), Some(letter('A')));
        assert_eq!(game.draw_piece(), Some(letter('A')));
        assert_ne!(game.status(), GameStatus::Ended);

        assert_eq!(game.draw_piece(), None);
        assert_eq!(game.status(), GameStatus::Ended);
        match rx.try_recv() {
            Ok(GameEvent::GameEnded { reason, final_scores }) => {
                assert_eq!(reason, EndReason::BagExhausted);
                assert_eq!(final_scores.len(), 2);
            }
            other => panic!("Expected game_ended, got {:?}", other),
        }
    }

    #[test]
    fn test_board_pass_throughs() {
        let game = two_humans();
        let (_, mut rx) = game.events().channel();

        assert_eq!(game.place_tile(letter('Q'), 0, 0), Ok(()));
        assert_eq!(
            game.place_tile(letter('Q'), 0, 0),
            Err(EngineError::CellOccupied { x: 0, y: 0 })
        );
        assert_eq!(game.remove_tile(letter('Q'), 0, 0), Ok(letter('Q')));
        assert_eq!(
            game.remove_tile(letter('Q'), 0, 0),
            Err(EngineError::CellEmpty { x: 0, y: 0 })
        );

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EventKind::TilePlaced, EventKind::TileRemoved]);
    }

    #[test]
    fn test_add_word() {
        let game = two_humans();
        assert_eq!(game.add_word("hello", Position::new(5, 7), Direction::Across), Ok(16));
        assert!(game.first_word_placed());

        // Crossing the existing L, no hand involved
        assert_eq!(
            game.add_word("CAT", Position::new(7, 5), Direction::Down),
            Err(EngineError::LetterMismatch {
                expected: letter('T'),
                found: letter('L'),
            })
        );
        assert_eq!(
            game.add_word("DOG", Position::new(0, 0), Direction::Across),
            Err(EngineError::InvalidWord("DOG".to_string()))
        );
        assert_eq!(
            game.add_word("CATS", Position::new(12, 0), Direction::Across),
            Err(EngineError::WordOutOfBounds)
        );
        assert_eq!(game.board().occupant(0, 0), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bot_turns_are_silent_and_pass() {
        let strategy: Arc<dyn MoveStrategy> = Arc::new(PassingBot::new(Duration::from_secs(2)));
        let game = Game::with_seats(
            config(),
            dictionary(),
            vec![Seat::bot("Robo", strategy), Seat::human("Ada")],
        )
        .unwrap();
        let bot = game
            .players()
            .into_iter()
            .find(|p| p.kind == crate::models::PlayerKind::Bot)
            .unwrap()
            .id;
        let (_, mut rx) = game.events().channel();
        let runner = run(&game);

        let human = next_turn(&mut rx).await;
        assert_ne!(human, bot, "Bots get no turn_started notification");
        game.handle(human).pass_turn().unwrap();
        assert_eq!(next_turn(&mut rx).await, human);

        game.end_game();
        runner.await.unwrap();
        assert_eq!(game.player(bot).unwrap().score, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_greedy_bot_plays_opening() {
        let strategy: Arc<dyn MoveStrategy> = Arc::new(GreedyBot::new(Duration::from_secs(1)));
        let game = Game::with_seats(config(), dictionary(), vec![Seat::bot("Robo", strategy)]).unwrap();
        let bot = game.players()[0].id;
        game.set_hand(bot, "CATSQQQ");

        let (_, mut rx) = game.events().channel();
        let runner = run(&game);

        // start_game deals fresh hands, so rig again before the bot thinks
        loop {
            match rx.recv().await {
                Some(GameEvent::GameStarted { .. }) => break,
                Some(_) => continue,
                None => panic!("Event stream closed"),
            }
        }
        game.set_hand(bot, "CATSQQQ");

        loop {
            match rx.recv().await {
                Some(GameEvent::WordPlayed { player_id, score, words }) => {
                    assert_eq!(player_id, bot);
                    assert_eq!(words[0].word, "CATS");
                    assert_eq!(score, 12);
                    break;
                }
                Some(_) => continue,
                None => panic!("Event stream closed"),
            }
        }

        game.end_game();
        runner.await.unwrap();
        assert_eq!(game.player(bot).unwrap().score, 12);
    }
}
