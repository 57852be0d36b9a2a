use std::time::Duration;

use touchline_city_world::{self as world, query, World};
use touchline_core::{
    city::{Command, EntityKind, Event, TileKind},
    tuning::CityTuning,
    CellCoord, Color, Direction, PlacementError,
};
use touchline_store::{KeyValueStore, LayoutSnapshot};
use touchline_system_traffic::{Config, Traffic};
use tracing::{info, warn};

use crate::CITY_LAYOUT_KEY;

const DOMAIN: &str = "city";

/// Drives the city builder: user edits plus the traffic timer.
///
/// Rejected edits are forwarded to the notification closure with a reason
/// whose display text is user-facing. The tile layout is restored from the
/// store when the session starts and written back on [`CitySession::save`]
/// and on teardown.
#[derive(Debug)]
pub struct CitySession<S, N> {
    store: S,
    world: World,
    traffic: Traffic,
    notify: N,
}

impl<S, N> CitySession<S, N>
where
    S: KeyValueStore,
    N: FnMut(PlacementError),
{
    /// Opens the city, restoring a saved layout when one exists.
    pub fn open(store: S, tuning: CityTuning, seed: u64, notify: N) -> Self {
        let mut world = World::new();
        let (columns, rows) = query::dimensions(&world);
        match LayoutSnapshot::<TileKind>::load(&store, CITY_LAYOUT_KEY, DOMAIN) {
            Ok(Some(snapshot)) if snapshot.dimensions() == (columns, rows) => {
                let mut events = Vec::new();
                world::apply(
                    &mut world,
                    Command::RestoreLayout {
                        tiles: snapshot.into_cells(),
                    },
                    &mut events,
                );
            }
            Ok(Some(snapshot)) => {
                warn!(
                    saved = ?snapshot.dimensions(),
                    expected = ?(columns, rows),
                    "saved city layout has the wrong size, starting empty"
                );
            }
            Ok(None) => info!("no saved city layout, starting empty"),
            Err(error) => warn!(%error, "saved city layout unreadable, starting empty"),
        }

        Self {
            store,
            world,
            traffic: Traffic::new(Config::new(tuning, seed)),
            notify,
        }
    }

    /// Read-only access to the city state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Paints `cell` with `kind`.
    pub fn set_tile(&mut self, cell: CellCoord, kind: TileKind) -> Vec<Event> {
        self.edit(Command::SetTile { cell, kind })
    }

    /// Clears `cell` back to grass, removing anything standing on it.
    pub fn bulldoze(&mut self, cell: CellCoord) -> Vec<Event> {
        self.edit(Command::Bulldoze { cell })
    }

    /// Places a car or pedestrian on a road tile.
    pub fn place_entity(
        &mut self,
        kind: EntityKind,
        cell: CellCoord,
        facing: Direction,
        color: Color,
    ) -> Vec<Event> {
        self.edit(Command::PlaceEntity {
            kind,
            cell,
            facing,
            color,
        })
    }

    /// Advances the traffic timer by `dt`.
    pub fn advance(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        let entities = query::entity_view(&self.world);
        self.traffic.handle(
            &events,
            query::tile_view(&self.world),
            &entities,
            &mut commands,
        );
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        events
    }

    /// Writes the current tile layout to the store.
    pub fn save(&mut self) {
        let (columns, rows) = query::dimensions(&self.world);
        let saved = LayoutSnapshot::new(DOMAIN, columns, rows, query::tiles(&self.world).to_vec())
            .and_then(|snapshot| snapshot.save(&mut self.store, CITY_LAYOUT_KEY));
        if let Err(error) = saved {
            warn!(%error, "could not save the city layout");
        }
    }

    /// Saves the layout and returns the store.
    pub fn teardown(mut self) -> S {
        self.save();
        self.store
    }

    fn edit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        for event in &events {
            if let Event::PlacementRejected { reason, .. } = event {
                (self.notify)(*reason);
            }
        }
        events
    }
}
