#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative city builder state for Touchline.
//!
//! The grid is edited only through placement commands; ticks never touch it.
//! Every command that would leave a car or pedestrian off the road network is
//! rejected here, regardless of which system proposed it.

use touchline_core::{
    city::{Command, EntityKind, Event, SidewalkSide, TileKind},
    CellCoord, Color, Direction, EntityId, PlacementError, GRID_SIZE,
};
use tracing::{debug, info};

/// Represents the authoritative city state.
#[derive(Debug)]
pub struct World {
    columns: u32,
    rows: u32,
    tiles: Vec<TileKind>,
    entities: Vec<Entity>,
    next_entity_id: u32,
}

impl World {
    /// Creates an all-grass city of the default size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dimensions(GRID_SIZE, GRID_SIZE)
    }

    /// Creates an all-grass city with explicit dimensions.
    #[must_use]
    pub fn with_dimensions(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            tiles: vec![TileKind::Grass; capacity],
            entities: Vec::new(),
            next_entity_id: 0,
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        cell.index_in(self.columns, self.rows)
    }

    fn is_road(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.tiles.get(index))
            .is_some_and(|kind| kind.is_road())
    }

    fn entity_mut(&mut self, entity: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|candidate| candidate.id == entity)
    }

    fn overwrite_tile(
        &mut self,
        cell: CellCoord,
        kind: TileKind,
        clear_occupants: bool,
        out_events: &mut Vec<Event>,
    ) {
        let Some(index) = self.index(cell) else {
            debug!(?cell, "tile edit outside the grid");
            out_events.push(Event::PlacementRejected {
                cell,
                reason: PlacementError::OutOfBounds,
            });
            return;
        };

        let from = self.tiles[index];
        if from != kind {
            self.tiles[index] = kind;
            out_events.push(Event::TileChanged {
                cell,
                from,
                to: kind,
            });
        }

        if clear_occupants || !kind.is_road() {
            self.remove_occupants(cell, out_events);
        }
    }

    fn remove_occupants(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        self.entities.retain(|entity| {
            if entity.cell != cell {
                return true;
            }
            out_events.push(Event::EntityRemoved {
                entity: entity.id,
                cell,
            });
            false
        });
    }

    fn place_entity(
        &mut self,
        kind: EntityKind,
        cell: CellCoord,
        facing: Direction,
        color: Color,
        out_events: &mut Vec<Event>,
    ) {
        let rejection = if self.index(cell).is_none() {
            Some(PlacementError::OutOfBounds)
        } else if !self.is_road(cell) {
            Some(PlacementError::RequiresRoad)
        } else {
            None
        };

        if let Some(reason) = rejection {
            debug!(?kind, ?cell, %reason, "entity placement rejected");
            out_events.push(Event::PlacementRejected { cell, reason });
            return;
        }

        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id = self.next_entity_id.saturating_add(1);
        self.entities.push(Entity {
            id,
            kind,
            cell,
            facing,
            color,
            sidewalk: SidewalkSide::default(),
        });
        out_events.push(Event::EntityPlaced {
            entity: id,
            kind,
            cell,
        });
    }

    fn move_entity(
        &mut self,
        entity: EntityId,
        to: CellCoord,
        facing: Direction,
        out_events: &mut Vec<Event>,
    ) {
        let destination_is_road = self.is_road(to);
        let Some(moving) = self.entity_mut(entity) else {
            out_events.push(Event::MoveRejected {
                entity,
                reason: PlacementError::UnknownEntity,
            });
            return;
        };

        let from = moving.cell;
        if from.direction_to(to).is_none() {
            debug!(entity = entity.get(), ?from, ?to, "move skips tiles");
            out_events.push(Event::MoveRejected {
                entity,
                reason: PlacementError::OutOfBounds,
            });
            return;
        }
        if !destination_is_road {
            debug!(entity = entity.get(), ?to, "move leaves the road network");
            out_events.push(Event::MoveRejected {
                entity,
                reason: PlacementError::RequiresRoad,
            });
            return;
        }

        moving.cell = to;
        moving.facing = facing;
        out_events.push(Event::EntityMoved { entity, from, to });
    }

    fn restore_layout(&mut self, tiles: Vec<TileKind>, out_events: &mut Vec<Event>) {
        if tiles.len() != self.tiles.len() {
            debug!(
                expected = self.tiles.len(),
                received = tiles.len(),
                "layout does not match the grid"
            );
            out_events.push(Event::PlacementRejected {
                cell: CellCoord::new(0, 0),
                reason: PlacementError::LayoutMismatch,
            });
            return;
        }

        self.tiles = tiles;
        self.entities.clear();
        info!(columns = self.columns, rows = self.rows, "city layout restored");
        out_events.push(Event::LayoutRestored);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::SetTile { cell, kind } => world.overwrite_tile(cell, kind, false, out_events),
        Command::Bulldoze { cell } => {
            world.overwrite_tile(cell, TileKind::Grass, true, out_events);
        }
        Command::PlaceEntity {
            kind,
            cell,
            facing,
            color,
        } => world.place_entity(kind, cell, facing, color, out_events),
        Command::MoveEntity { entity, to, facing } => {
            world.move_entity(entity, to, facing, out_events);
        }
        Command::TurnEntity { entity, facing } => match world.entity_mut(entity) {
            Some(turning) => {
                turning.facing = facing;
                out_events.push(Event::EntityTurned { entity, facing });
            }
            None => out_events.push(Event::MoveRejected {
                entity,
                reason: PlacementError::UnknownEntity,
            }),
        },
        Command::SetSidewalk { entity, side } => match world.entity_mut(entity) {
            Some(walker) => {
                walker.sidewalk = side;
                out_events.push(Event::SidewalkChanged { entity, side });
            }
            None => out_events.push(Event::MoveRejected {
                entity,
                reason: PlacementError::UnknownEntity,
            }),
        },
        Command::RestoreLayout { tiles } => world.restore_layout(tiles, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use touchline_core::{
        city::{EntitySnapshot, EntityView, TileKind, TileView},
        CellCoord,
    };

    use super::World;

    /// Exposes a read-only view of the tile grid.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView<'_> {
        TileView::new(&world.tiles, world.columns, world.rows)
    }

    /// Tile kinds in row-major order, suitable for saving the layout.
    #[must_use]
    pub fn tiles(world: &World) -> &[TileKind] {
        &world.tiles
    }

    /// Kind of the tile at `cell`, or `None` outside the grid.
    #[must_use]
    pub fn tile(world: &World, cell: CellCoord) -> Option<TileKind> {
        tile_view(world).kind(cell)
    }

    /// Captures a read-only view of the entities inhabiting the city.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        EntityView::from_snapshots(
            world
                .entities
                .iter()
                .map(|entity| EntitySnapshot {
                    id: entity.id,
                    kind: entity.kind,
                    cell: entity.cell,
                    facing: entity.facing,
                    color: entity.color,
                    sidewalk: entity.sidewalk,
                })
                .collect(),
        )
    }

    /// Provides the dimensions of the grid.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.columns, world.rows)
    }
}

#[derive(Clone, Debug)]
struct Entity {
    id: EntityId,
    kind: EntityKind,
    cell: CellCoord,
    facing: Direction,
    color: Color,
    sidewalk: SidewalkSide,
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREY: Color = Color::from_rgb(0x80, 0x80, 0x80);

    fn road_world(cells: &[CellCoord]) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        for cell in cells {
            apply(
                &mut world,
                Command::SetTile {
                    cell: *cell,
                    kind: TileKind::Road,
                },
                &mut events,
            );
        }
        world
    }

    fn place(world: &mut World, kind: EntityKind, cell: CellCoord) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::PlaceEntity {
                kind,
                cell,
                facing: Direction::East,
                color: GREY,
            },
            &mut events,
        );
        events
    }

    #[test]
    fn car_on_grass_is_rejected_without_mutation() {
        let mut world = World::new();
        let tiles_before = query::tiles(&world).to_vec();
        let events = place(&mut world, EntityKind::Car, CellCoord::new(3, 3));

        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                cell: CellCoord::new(3, 3),
                reason: PlacementError::RequiresRoad,
            }]
        );
        assert!(query::entity_view(&world).is_empty());
        assert_eq!(query::tiles(&world), tiles_before.as_slice());
    }

    #[test]
    fn bulldozing_a_parked_car_clears_tile_and_car() {
        let cell = CellCoord::new(4, 4);
        let mut world = road_world(&[cell]);
        let _ = place(&mut world, EntityKind::Car, cell);
        assert_eq!(query::entity_view(&world).len(), 1);

        let mut events = Vec::new();
        apply(&mut world, Command::Bulldoze { cell }, &mut events);

        assert_eq!(query::tile(&world, cell), Some(TileKind::Grass));
        assert!(query::entity_view(&world).is_empty());
        assert!(events.contains(&Event::EntityRemoved {
            entity: EntityId::new(0),
            cell,
        }));
    }

    #[test]
    fn building_over_a_road_removes_only_that_cells_occupants() {
        let left = CellCoord::new(1, 1);
        let right = CellCoord::new(2, 1);
        let mut world = road_world(&[left, right]);
        let _ = place(&mut world, EntityKind::Car, left);
        let _ = place(&mut world, EntityKind::Pedestrian, left);
        let _ = place(&mut world, EntityKind::Car, right);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetTile {
                cell: left,
                kind: TileKind::House,
            },
            &mut events,
        );

        let remaining: Vec<_> = query::entity_view(&world)
            .iter()
            .map(|snapshot| snapshot.cell)
            .collect();
        assert_eq!(remaining, vec![right]);
        let removed = events
            .iter()
            .filter(|event| matches!(event, Event::EntityRemoved { .. }))
            .count();
        assert_eq!(removed, 2);
    }

    #[test]
    fn repaving_a_road_keeps_its_occupants() {
        let cell = CellCoord::new(6, 6);
        let mut world = road_world(&[cell]);
        let _ = place(&mut world, EntityKind::Car, cell);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetTile {
                cell,
                kind: TileKind::Road,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::entity_view(&world).len(), 1);
    }

    #[test]
    fn moves_off_road_or_across_tiles_are_rejected() {
        let start = CellCoord::new(5, 5);
        let next = CellCoord::new(6, 5);
        let far = CellCoord::new(8, 5);
        let mut world = road_world(&[start, next, far]);
        let _ = place(&mut world, EntityKind::Car, start);
        let car = EntityId::new(0);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MoveEntity {
                entity: car,
                to: CellCoord::new(5, 6),
                facing: Direction::South,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MoveEntity {
                entity: car,
                to: far,
                facing: Direction::East,
            },
            &mut events,
        );
        assert!(events
            .iter()
            .all(|event| matches!(event, Event::MoveRejected { .. })));
        assert_eq!(query::entity_view(&world).iter().next().map(|s| s.cell), Some(start));

        events.clear();
        apply(
            &mut world,
            Command::MoveEntity {
                entity: car,
                to: next,
                facing: Direction::East,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::EntityMoved {
                entity: car,
                from: start,
                to: next,
            }]
        );
    }

    #[test]
    fn sidewalk_updates_apply_to_known_pedestrians() {
        let cell = CellCoord::new(3, 8);
        let mut world = road_world(&[cell]);
        let _ = place(&mut world, EntityKind::Pedestrian, cell);
        let walker = EntityId::new(0);
        let stranger = EntityId::new(9);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetSidewalk {
                entity: walker,
                side: SidewalkSide::Right,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetSidewalk {
                entity: stranger,
                side: SidewalkSide::Right,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::SidewalkChanged {
                    entity: walker,
                    side: SidewalkSide::Right,
                },
                Event::MoveRejected {
                    entity: stranger,
                    reason: PlacementError::UnknownEntity,
                },
            ]
        );
        assert_eq!(
            query::entity_view(&world).iter().next().map(|s| s.sidewalk),
            Some(SidewalkSide::Right)
        );
    }

    #[test]
    fn out_of_bounds_edits_are_rejected() {
        let mut world = World::new();
        let outside = CellCoord::new(GRID_SIZE, 0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetTile {
                cell: outside,
                kind: TileKind::Road,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                cell: outside,
                reason: PlacementError::OutOfBounds,
            }]
        );
    }

    #[test]
    fn restoring_a_layout_replaces_tiles_and_clears_entities() {
        let cell = CellCoord::new(0, 0);
        let mut world = road_world(&[cell]);
        let _ = place(&mut world, EntityKind::Pedestrian, cell);

        let mut layout = vec![TileKind::Commerce; query::tiles(&world).len()];
        layout[1] = TileKind::Road;
        let mut events = Vec::new();
        apply(&mut world, Command::RestoreLayout { tiles: layout }, &mut events);

        assert_eq!(events, vec![Event::LayoutRestored]);
        assert!(query::entity_view(&world).is_empty());
        assert_eq!(query::tile(&world, CellCoord::new(1, 0)), Some(TileKind::Road));

        events.clear();
        apply(
            &mut world,
            Command::RestoreLayout {
                tiles: vec![TileKind::Road; 3],
            },
            &mut events,
        );
        assert!(matches!(
            events.as_slice(),
            [Event::PlacementRejected {
                reason: PlacementError::LayoutMismatch,
                ..
            }]
        ));
    }
}
