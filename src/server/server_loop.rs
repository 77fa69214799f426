//! Fixed-rate tick loop that owns the [`BoardWorld`]. Every mutation goes through its channel so
//! boards are only ever touched by one task.
use std::time::Duration;

use log::{debug, error, info};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::models::snake::snake_simulation::BoardSnapshot;

use super::{
    board_world::{BoardError, BoardWorld, Broadcast},
    snake_board::{NetObject, PlayerId, PlayerInput, Position, ServerParams},
};

type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug)]
pub enum ServerMessage {
    PlayerJoined(PlayerId),
    PlayerInput(PlayerId, PlayerInput),
    PlayerLeft(PlayerId),
    ActivateBoard {
        owner: PlayerId,
        at: Position,
        reply: oneshot::Sender<Result<()>>,
    },
    DeactivateBoard {
        owner: PlayerId,
        reply: oneshot::Sender<Result<()>>,
    },
    GetSnapshots(oneshot::Sender<Vec<(PlayerId, BoardSnapshot)>>),
    GetNetObjects(oneshot::Sender<Vec<NetObject>>),
    Kill,
}

/// Handle to a running tick loop.
#[derive(Debug)]
pub struct BoardServer {
    sender: mpsc::UnboundedSender<ServerMessage>,
    main_handle: JoinHandle<()>,
}

impl BoardServer {
    /// Spawns the tick loop on the current tokio runtime. Game over messages are sent to
    /// `broadcasts`.
    #[must_use]
    pub fn spawn(params: ServerParams, broadcasts: mpsc::UnboundedSender<Broadcast>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let main_handle = tokio::spawn(Self::main_loop(
            BoardWorld::new(params),
            params,
            receiver,
            broadcasts,
        ));
        Self {
            sender,
            main_handle,
        }
    }

    async fn main_loop(
        mut world: BoardWorld,
        params: ServerParams,
        mut receiver: mpsc::UnboundedReceiver<ServerMessage>,
        broadcasts: mpsc::UnboundedSender<Broadcast>,
    ) {
        let period = Duration::from_nanos(1_000_000_000 / params.ticks_per_second.max(1))
            .max(Duration::from_nanos(1));
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Board server ticking every {:?}", period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for broadcast in world.tick() {
                        if let Err(e) = broadcasts.send(broadcast) {
                            error!("Problem sending broadcast: {:#?}", e);
                        }
                    }
                }
                message = receiver.recv() => {
                    match message {
                        Some(ServerMessage::Kill) => {
                            debug!("Killing board server");
                            break;
                        }
                        Some(message) => Self::handle(&mut world, message),
                        None => {
                            debug!("All board server handles dropped. Quitting");
                            break;
                        }
                    }
                }
            }
        }
    }

    fn handle(world: &mut BoardWorld, message: ServerMessage) {
        match message {
            ServerMessage::PlayerJoined(player) => world.player_joined(player),
            ServerMessage::PlayerInput(player, input) => world.player_input(player, input),
            ServerMessage::PlayerLeft(player) => world.owner_disconnected(player),
            ServerMessage::ActivateBoard { owner, at, reply } => {
                if reply.send(world.activate_board(at, owner)).is_err() {
                    error!("Activation reply for player {owner} was dropped");
                }
            }
            ServerMessage::DeactivateBoard { owner, reply } => {
                if reply.send(world.deactivate_board(owner)).is_err() {
                    error!("Deactivation reply for player {owner} was dropped");
                }
            }
            ServerMessage::GetSnapshots(reply) => {
                if reply.send(world.snapshots()).is_err() {
                    error!("Snapshot reply was dropped");
                }
            }
            ServerMessage::GetNetObjects(reply) => {
                if reply.send(world.net_objects()).is_err() {
                    error!("Net object reply was dropped");
                }
            }
            ServerMessage::Kill => {}
        }
    }

    fn send(&self, message: ServerMessage) -> Result<()> {
        self.sender.send(message).map_err(|e| {
            error!("Error sending to board server: {:#?}", e.0);
            BoardError::ServerStopped
        })
    }

    /// # Errors
    ///
    /// [`BoardError::ServerStopped`] if the loop is gone.
    pub fn player_joined(&self, player: PlayerId) -> Result<()> {
        self.send(ServerMessage::PlayerJoined(player))
    }

    /// # Errors
    ///
    /// [`BoardError::ServerStopped`] if the loop is gone.
    pub fn player_input(&self, player: PlayerId, input: PlayerInput) -> Result<()> {
        self.send(ServerMessage::PlayerInput(player, input))
    }

    /// # Errors
    ///
    /// [`BoardError::ServerStopped`] if the loop is gone.
    pub fn player_left(&self, player: PlayerId) -> Result<()> {
        self.send(ServerMessage::PlayerLeft(player))
    }

    /// # Errors
    ///
    /// Whatever [`BoardWorld::activate_board`] returns, or [`BoardError::ServerStopped`].
    pub async fn activate_board(&self, owner: PlayerId, at: Position) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(ServerMessage::ActivateBoard { owner, at, reply })?;
        response.await.map_err(|_| BoardError::ServerStopped)?
    }

    /// # Errors
    ///
    /// Whatever [`BoardWorld::deactivate_board`] returns, or [`BoardError::ServerStopped`].
    pub async fn deactivate_board(&self, owner: PlayerId) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(ServerMessage::DeactivateBoard { owner, reply })?;
        response.await.map_err(|_| BoardError::ServerStopped)?
    }

    /// # Errors
    ///
    /// [`BoardError::ServerStopped`] if the loop is gone.
    pub async fn snapshots(&self) -> Result<Vec<(PlayerId, BoardSnapshot)>> {
        let (reply, response) = oneshot::channel();
        self.send(ServerMessage::GetSnapshots(reply))?;
        response.await.map_err(|_| BoardError::ServerStopped)
    }

    /// # Errors
    ///
    /// [`BoardError::ServerStopped`] if the loop is gone.
    pub async fn net_objects(&self) -> Result<Vec<NetObject>> {
        let (reply, response) = oneshot::channel();
        self.send(ServerMessage::GetNetObjects(reply))?;
        response.await.map_err(|_| BoardError::ServerStopped)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.main_handle.is_finished()
    }

    /// Stops the loop, aborting it if it does not finish within two seconds.
    pub async fn shutdown(mut self) {
        if self.main_handle.is_finished() {
            return;
        }
        if let Err(e) = self.sender.send(ServerMessage::Kill) {
            error!("Error sending kill message to board server: {:#?}", e.0);
        }
        if let Err(e) = time::timeout(Duration::from_secs(2), &mut self.main_handle).await {
            error!("Board server did not stop in time. Forcing abort: {:#?}", e);
            self.main_handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snake::snake_simulation::Phase;

    async fn settle() {
        // several ticks at 50 per second
        time::sleep(Duration::from_millis(100)).await;
    }

    #[tokio::test]
    async fn boards_follow_player_input() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (broadcasts, _inbox) = mpsc::unbounded_channel();
        let server = BoardServer::spawn(ServerParams::default(), broadcasts);

        server.player_joined(1).unwrap();
        server
            .activate_board(1, Position::new(0.0, 0.0))
            .await
            .unwrap();
        assert_eq!(
            server.activate_board(1, Position::new(0.0, 0.0)).await,
            Err(BoardError::OwnerAlreadyHasBoard(1))
        );

        let snapshots = server.snapshots().await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].1.phase, Phase::Idle);
        assert_eq!(server.net_objects().await.unwrap().len(), 4 + 1 + 3);

        server
            .player_input(
                1,
                PlayerInput {
                    fire: true,
                    ..PlayerInput::default()
                },
            )
            .unwrap();
        settle().await;
        assert_eq!(server.snapshots().await.unwrap()[0].1.phase, Phase::Playing);

        server.player_left(1).unwrap();
        settle().await;
        assert!(server.snapshots().await.unwrap().is_empty());
        assert_eq!(
            server.deactivate_board(1).await,
            Err(BoardError::NoBoardForOwner(1))
        );

        server.shutdown().await;
    }

    #[tokio::test]
    async fn game_over_reaches_the_broadcast_channel() {
        let (broadcasts, mut inbox) = mpsc::unbounded_channel();
        let params = ServerParams {
            ticks_per_second: 1000,
            move_interval_ticks: 1,
            ..ServerParams::default()
        };
        let server = BoardServer::spawn(params, broadcasts);
        server.player_joined(2).unwrap();
        server
            .activate_board(2, Position::new(0.0, 0.0))
            .await
            .unwrap();
        server
            .player_input(
                2,
                PlayerInput {
                    fire: true,
                    ..PlayerInput::default()
                },
            )
            .unwrap();

        let broadcast = time::timeout(Duration::from_secs(5), inbox.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(broadcast.to, 2);
        server.shutdown().await;
    }

    #[tokio::test]
    async fn tick_rates_above_one_per_millisecond_keep_running() {
        for ticks_per_second in [2000, u64::MAX] {
            let (broadcasts, _inbox) = mpsc::unbounded_channel();
            let params = ServerParams {
                ticks_per_second,
                ..ServerParams::default()
            };
            let server = BoardServer::spawn(params, broadcasts);
            server.player_joined(3).unwrap();
            server
                .activate_board(3, Position::new(0.0, 0.0))
                .await
                .unwrap();
            time::sleep(Duration::from_millis(20)).await;
            assert!(!server.is_finished());
            assert_eq!(server.snapshots().await.unwrap().len(), 1);
            server.shutdown().await;
        }
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop() {
        let (broadcasts, _inbox) = mpsc::unbounded_channel();
        let server = BoardServer::spawn(ServerParams::default(), broadcasts);
        let sender = server.sender.clone();
        server.shutdown().await;
        assert!(sender.is_closed());
    }
}
