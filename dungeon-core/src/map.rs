//! The face a game shows the dungeon to: rooms in global coordinates,
//! objects that make cells expensive to walk through, and path queries that
//! can run off the caller's thread.

use crate::{
    algos::{DungeonBuilder, DungeonConfig},
    constants::OBJECT_PENALTY,
    dungeon::Dungeon,
    error::{GenerationError, ObjectNotFound},
    nav_grid::{NavGrid, NavSnapshot},
    pieces::PieceId,
    types::{Direction, Position, Rect, Size},
};

use std::{
    fmt::Debug,
    future::Future,
    pin::Pin,
    sync::mpsc::Sender,
    task::{Context, Poll},
    thread::JoinHandle,
};

use tokio::sync::oneshot;
use tracing::{Level, event, span};

pub type RoomId = PieceId;

/// A way out of a room, in global coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Exit {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    /// The room on the other side, found by following any corridors. `None`
    /// when the corridor behind the exit leads nowhere.
    pub target_room: Option<RoomId>,
    /// Unit step from the exit cell into whatever lies behind it.
    pub step_in: (i32, i32),
}

impl Exit {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedObject<H> {
    pub handle: H,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room<H> {
    id: RoomId,
    area: Rect,
    exits: Vec<Exit>,
    contents: Vec<String>,
    objects: Vec<PlacedObject<H>>,
}

impl<H> Room<H> {
    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn contains(&self, position: Position) -> bool {
        self.area.contains(position)
    }

    pub fn exits(&self) -> &[Exit] {
        &self.exits
    }

    pub fn contents(&self) -> &[String] {
        &self.contents
    }

    pub fn objects(&self) -> impl Iterator<Item = &H> {
        self.objects.iter().map(|object| &object.handle)
    }

    pub fn placed_objects(&self) -> &[PlacedObject<H>] {
        &self.objects
    }
}

/// A generated dungeon ready to be played in.
///
/// `H` is whatever the host uses to identify the objects it places.
pub struct Map<H> {
    dungeon: Dungeon,
    nav: NavGrid,
    rooms: Vec<Room<H>>,
    initial_room: usize,
    loose_objects: Vec<PlacedObject<H>>,
    worker: Option<PathWorker>,
    last_ticket: u64,
}

impl<H: PartialEq + Debug> Map<H> {
    pub fn new(config: DungeonConfig) -> Result<Self, GenerationError> {
        let span = span!(Level::DEBUG, "create_map");
        let _guard = span.enter();

        let dungeon = DungeonBuilder::new(config)?.build()?;

        Ok(Map::from_dungeon(dungeon))
    }

    pub fn from_dungeon(dungeon: Dungeon) -> Self {
        let rooms = dungeon
            .rooms()
            .filter_map(|(id, piece)| {
                let area = piece.interior()?;
                let exits = piece
                    .exits()
                    .map(|exit| Exit {
                        x: exit.position.x,
                        y: exit.position.y,
                        direction: exit.direction,
                        target_room: room_behind(&dungeon, id, exit.target),
                        step_in: exit.direction.step_in(),
                    })
                    .collect();

                Some(Room {
                    id,
                    area,
                    exits,
                    contents: piece.contents().to_vec(),
                    objects: Vec::new(),
                })
            })
            .collect::<Vec<_>>();

        let initial_room = rooms
            .iter()
            .position(|room| room.id == dungeon.initial_room())
            .unwrap_or_default();

        Map {
            nav: NavGrid::build(&dungeon),
            dungeon,
            rooms,
            initial_room,
            loose_objects: Vec::new(),
            worker: None,
            last_ticket: 0,
        }
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn nav_grid(&self) -> &NavGrid {
        &self.nav
    }

    pub fn size(&self) -> Size {
        self.dungeon.size()
    }

    pub fn walkable(&self, position: impl Into<Position>) -> bool {
        self.nav.walkable(position.into())
    }

    pub fn rooms(&self) -> &[Room<H>] {
        &self.rooms
    }

    pub fn room(&self, id: RoomId) -> Option<&Room<H>> {
        self.rooms
            .binary_search_by_key(&id, |room| room.id)
            .ok()
            .map(|idx| &self.rooms[idx])
    }

    pub fn initial_room(&self) -> &Room<H> {
        &self.rooms[self.initial_room]
    }

    pub fn initial_position(&self) -> Position {
        self.dungeon.start_pos()
    }

    /// The room whose interior holds `position`. Corridors and walls belong
    /// to no room.
    pub fn room_from_position(&self, position: impl Into<Position>) -> Option<&Room<H>> {
        let position = position.into();

        self.rooms.iter().find(|room| room.contains(position))
    }

    fn room_idx_at(&self, position: Position) -> Option<usize> {
        self.rooms.iter().position(|room| room.contains(position))
    }

    /// Places an object and penalises its cell, returning the room it landed
    /// in. Objects outside every room are still tracked and penalised.
    pub fn add_object(&mut self, handle: H, position: impl Into<Position>) -> Option<RoomId> {
        let position = position.into();
        let object = PlacedObject { handle, position };

        self.nav.add_cost(position, OBJECT_PENALTY);

        match self.room_idx_at(position) {
            Some(idx) => {
                self.rooms[idx].objects.push(object);
                Some(self.rooms[idx].id)
            }
            None => {
                event!(Level::DEBUG, "Object placed outside any room at {}", position);
                self.loose_objects.push(object);
                None
            }
        }
    }

    /// Takes an object back out, lifting the penalty it put on its cell.
    ///
    /// Asking for an object that is not at `position` changes nothing.
    pub fn remove_object(
        &mut self,
        handle: &H,
        position: impl Into<Position>,
    ) -> Result<H, ObjectNotFound> {
        let position = position.into();

        let objects = match self.room_idx_at(position) {
            Some(idx) => &mut self.rooms[idx].objects,
            None => &mut self.loose_objects,
        };

        let Some(object_idx) = objects
            .iter()
            .position(|object| object.position == position && &object.handle == handle)
        else {
            event!(
                Level::WARN,
                "Object {:?} not found at {}",
                handle,
                position
            );
            return Err(ObjectNotFound {
                handle: format!("{:?}", handle),
                position,
            });
        };

        let object = objects.remove(object_idx);
        self.nav.remove_cost(position, OBJECT_PENALTY);

        Ok(object.handle)
    }

    pub fn find_path(&self, from: impl Into<Position>, to: impl Into<Position>) -> Vec<Position> {
        self.nav.find_path(from.into(), to.into())
    }

    /// Queues a path query on the background worker.
    ///
    /// The query sees objects as they are now; later changes do not affect
    /// it. Only the query whose ticket [`Map::is_latest`] confirms should be
    /// acted upon.
    pub fn path(&mut self, from: impl Into<Position>, to: impl Into<Position>) -> PathQuery {
        self.last_ticket += 1;

        let (reply, receiver) = oneshot::channel();
        let request = PathRequest {
            from: from.into(),
            to: to.into(),
            nav: self.nav.snapshot(),
            reply,
        };

        if self.worker.is_none() {
            self.worker = PathWorker::init();
        }

        match &self.worker {
            Some(worker) => worker.request(request),
            None => request.answer(),
        }

        PathQuery {
            ticket: self.last_ticket,
            receiver,
        }
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        ticket == self.last_ticket
    }
}

// Follows corridors from `from` through `target` until a room is reached
fn room_behind(dungeon: &Dungeon, from: PieceId, target: PieceId) -> Option<RoomId> {
    let mut previous = from;
    let mut current = target;

    for _ in 0..dungeon.pieces().len() {
        let piece = dungeon.piece(current)?;
        if piece.is_room() {
            return Some(current);
        }

        let next = piece
            .exits()
            .map(|exit| exit.target)
            .find(|next| *next != previous)?;

        previous = current;
        current = next;
    }

    None
}

/// A path being computed in the background.
///
/// Await it from async code, or [`PathQuery::wait`] for it elsewhere. An
/// empty path means there is no way through.
#[derive(Debug)]
pub struct PathQuery {
    ticket: u64,
    receiver: oneshot::Receiver<Vec<Position>>,
}

impl PathQuery {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Blocks until the path is ready. Must not be called from inside an
    /// async runtime.
    pub fn wait(self) -> Vec<Position> {
        self.receiver.blocking_recv().unwrap_or_default()
    }
}

impl Future for PathQuery {
    type Output = Vec<Position>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or_default())
    }
}

struct PathRequest {
    from: Position,
    to: Position,
    nav: NavSnapshot,
    reply: oneshot::Sender<Vec<Position>>,
}

impl PathRequest {
    fn answer(self) {
        let path = self.nav.find_path(self.from, self.to);

        // The caller may have dropped its query already
        let _ = self.reply.send(path);
    }
}

// Answers queries one at a time, in issue order
struct PathWorker {
    sender: Option<Sender<PathRequest>>,
    handle: Option<JoinHandle<()>>,
}

impl PathWorker {
    fn init() -> Option<Self> {
        let (tx, rx) = std::sync::mpsc::channel::<PathRequest>();

        let spawned = std::thread::Builder::new()
            .name("path-worker".to_string())
            .spawn(move || {
                while let Ok(request) = rx.recv() {
                    request.answer();
                }
            });

        match spawned {
            Ok(handle) => Some(PathWorker {
                sender: Some(tx),
                handle: Some(handle),
            }),
            Err(err) => {
                event!(
                    Level::WARN,
                    "Could not start path worker, answering queries inline: {}",
                    err
                );
                None
            }
        }
    }

    fn request(&self, request: PathRequest) {
        let Some(sender) = &self.sender else {
            request.answer();
            return;
        };

        if let Err(err) = sender.send(request) {
            err.0.answer();
        }
    }
}

impl Drop for PathWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.sender.take();

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
