//! All boards living in one game world, plus the last input of every connected player.
use std::collections::BTreeMap;

use log::{debug, error, info, warn};

use crate::models::snake::{board_host::BoardHost, snake_simulation::BoardSnapshot};

use super::{
    id_allocator::IdAllocator,
    snake_board::{
        AuthoritativeBoard, NetObject, PlayerId, PlayerInput, Position, ServerParams,
        BOARD_ID_BLOCK, GAME_OVER_BROADCAST,
    },
};

type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    OwnerAlreadyHasBoard(PlayerId),
    NoBoardForOwner(PlayerId),
    IdsExhausted,
    ServerStopped,
}

impl std::fmt::Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardError::OwnerAlreadyHasBoard(owner) => {
                write!(f, "player {owner} already has a snake board")
            }
            BoardError::NoBoardForOwner(owner) => write!(f, "player {owner} has no snake board"),
            BoardError::IdsExhausted => write!(f, "no net ids left for another board"),
            BoardError::ServerStopped => write!(f, "the board server is not running"),
        }
    }
}

impl std::error::Error for BoardError {}

/// Text message addressed to one player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Broadcast {
    pub to: PlayerId,
    pub text: String,
}

#[derive(Debug)]
pub struct BoardWorld {
    boards: BTreeMap<PlayerId, AuthoritativeBoard>,
    players: BTreeMap<PlayerId, PlayerInput>,
    ids: IdAllocator,
    params: ServerParams,
    tick: u64,
}

impl BoardWorld {
    #[must_use]
    pub fn new(params: ServerParams) -> Self {
        Self::with_allocator(params, IdAllocator::default())
    }

    #[must_use]
    pub fn with_allocator(params: ServerParams, ids: IdAllocator) -> Self {
        Self {
            boards: BTreeMap::new(),
            players: BTreeMap::new(),
            ids,
            params,
            tick: 0,
        }
    }

    /// Registers a player with neutral input.
    pub fn player_joined(&mut self, player: PlayerId) {
        debug!("Player {player} joined");
        self.players.entry(player).or_default();
    }

    /// Stores the latest input of `player`. Unknown players are registered.
    pub fn player_input(&mut self, player: PlayerId, input: PlayerInput) {
        self.players.insert(player, input);
    }

    /// Forgets the player and tears down their board, if any.
    pub fn owner_disconnected(&mut self, player: PlayerId) {
        debug!("Player {player} left");
        self.players.remove(&player);
        if self.deactivate_board(player).is_ok() {
            info!("Removed board of disconnected player {player}");
        }
    }

    /// Places a new board for `owner` centred at `at`.
    ///
    /// # Errors
    ///
    /// [`BoardError::OwnerAlreadyHasBoard`] if the owner already has one, and
    /// [`BoardError::IdsExhausted`] if no net ids are left for it.
    pub fn activate_board(&mut self, at: Position, owner: PlayerId) -> Result<()> {
        if self.boards.contains_key(&owner) {
            return Err(BoardError::OwnerAlreadyHasBoard(owner));
        }
        let ids = self.ids.reserve(BOARD_ID_BLOCK)?;
        info!(
            "Snake board for player {owner} at ({}, {}) using ids from {}",
            at.x,
            at.y,
            ids.start()
        );
        self.boards
            .insert(owner, AuthoritativeBoard::new(owner, at, ids, self.params));
        Ok(())
    }

    /// Removes the board of `owner` and frees its ids.
    ///
    /// # Errors
    ///
    /// [`BoardError::NoBoardForOwner`] if the owner has no board.
    pub fn deactivate_board(&mut self, owner: PlayerId) -> Result<()> {
        let board = self
            .boards
            .remove(&owner)
            .ok_or(BoardError::NoBoardForOwner(owner))?;
        self.ids.release(board.ids());
        debug!("Board of player {owner} removed");
        Ok(())
    }

    /// Advances every board by one server tick and returns the messages to send.
    pub fn tick(&mut self) -> Vec<Broadcast> {
        self.tick += 1;
        let mut broadcasts = Vec::new();
        let mut orphaned = Vec::new();
        for (owner, board) in &mut self.boards {
            let Some(input) = self.players.get(owner) else {
                orphaned.push(*owner);
                continue;
            };
            if let Some(reason) = board.apply_player_input(input) {
                info!("Board of player {owner}: snake {reason}");
                broadcasts.push(Broadcast {
                    to: *owner,
                    text: GAME_OVER_BROADCAST.to_string(),
                });
            }
        }
        for owner in orphaned {
            warn!("Owner {owner} of a snake board is gone. Removing board");
            if let Err(e) = self.deactivate_board(owner) {
                error!("Could not remove orphaned board: {e}");
            }
        }
        broadcasts
    }

    /// Snapshots of all boards, ordered by owner.
    #[must_use]
    pub fn snapshots(&self) -> Vec<(PlayerId, BoardSnapshot)> {
        self.boards
            .iter()
            .map(|(owner, board)| (*owner, board.snapshot()))
            .collect()
    }

    /// Net objects of all boards, ordered by owner.
    #[must_use]
    pub fn net_objects(&self) -> Vec<NetObject> {
        self.boards.values().flat_map(BoardHost::render).collect()
    }

    #[must_use]
    pub fn board(&self, owner: PlayerId) -> Option<&AuthoritativeBoard> {
        self.boards.get(&owner)
    }

    #[must_use]
    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }
}

impl Default for BoardWorld {
    fn default() -> Self {
        Self::new(ServerParams::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{
        models::snake::snake_simulation::Phase,
        server::{id_allocator::NetId, snake_board::MOVE_INTERVAL_TICKS},
    };

    const HERE: Position = Position::new(0.0, 0.0);

    fn hammer() -> PlayerInput {
        PlayerInput {
            fire: true,
            ..PlayerInput::default()
        }
    }

    #[test]
    fn one_board_per_owner() {
        let mut world = BoardWorld::default();
        world.activate_board(HERE, 1).unwrap();
        assert_eq!(
            world.activate_board(HERE, 1),
            Err(BoardError::OwnerAlreadyHasBoard(1))
        );
        world.activate_board(HERE, 2).unwrap();
        assert_eq!(world.board_count(), 2);
    }

    #[test]
    fn new_boards_start_idle() {
        let mut world = BoardWorld::default();
        world.activate_board(HERE, 1).unwrap();
        let snapshots = world.snapshots();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].0, 1);
        assert_eq!(snapshots[0].1.phase, Phase::Idle);
        assert_eq!(snapshots[0].1.body.len(), 3);
    }

    #[test]
    fn deactivation_frees_ids() {
        let mut world =
            BoardWorld::with_allocator(ServerParams::default(), IdAllocator::new(BOARD_ID_BLOCK));
        world.activate_board(HERE, 1).unwrap();
        assert_eq!(world.activate_board(HERE, 2), Err(BoardError::IdsExhausted));
        world.deactivate_board(1).unwrap();
        assert_eq!(world.deactivate_board(1), Err(BoardError::NoBoardForOwner(1)));
        world.activate_board(HERE, 2).unwrap();
    }

    #[test]
    fn boards_use_disjoint_ids() {
        let mut world = BoardWorld::default();
        world.activate_board(HERE, 1).unwrap();
        world.activate_board(Position::new(2000.0, 0.0), 2).unwrap();
        let objects = world.net_objects();
        assert_eq!(objects.len(), 2 * (4 + 1 + 3));
        let ids: HashSet<NetId> = objects.iter().map(NetObject::id).collect();
        assert_eq!(ids.len(), objects.len());
    }

    #[test]
    fn boards_without_owner_are_removed() {
        let mut world = BoardWorld::default();
        world.activate_board(HERE, 1).unwrap();
        world.tick();
        assert_eq!(world.board_count(), 0);
    }

    #[test]
    fn disconnect_removes_board() {
        let mut world = BoardWorld::default();
        world.player_joined(1);
        world.activate_board(HERE, 1).unwrap();
        world.tick();
        assert_eq!(world.board_count(), 1);
        world.owner_disconnected(1);
        assert_eq!(world.board_count(), 0);
        assert!(world.board(1).is_none());
    }

    #[test]
    fn hitting_the_wall_broadcasts_to_owner() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut world = BoardWorld::default();
        world.player_joined(7);
        world.activate_board(HERE, 7).unwrap();
        world.player_input(7, hammer());
        assert!(world.tick().is_empty());
        world.player_input(7, PlayerInput::default());

        // ten moves to the right reach the wall from x = 10
        let mut broadcasts = Vec::new();
        for _ in 0..MOVE_INTERVAL_TICKS * 12 {
            broadcasts.extend(world.tick());
        }
        assert_eq!(
            broadcasts,
            vec![Broadcast {
                to: 7,
                text: GAME_OVER_BROADCAST.to_string()
            }]
        );
        assert_eq!(world.snapshots()[0].1.phase, Phase::GameOver);
        assert_eq!(world.current_tick(), 1 + MOVE_INTERVAL_TICKS * 12);
    }
}
