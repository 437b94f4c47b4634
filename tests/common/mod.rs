//! Shared test fixtures: an in-memory world and a scripted agent body.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use marga_nav::{AgentControl, Capabilities, CellPos, Direction, RailShape, WorldPos, WorldGrid};

/// Hash-map backed voxel world. Everything is loaded and empty unless a
/// builder method says otherwise.
#[derive(Default)]
pub struct GridWorld {
    solids: HashSet<CellPos>,
    liquids: HashSet<CellPos>,
    ladders: HashMap<CellPos, Direction>,
    rails: HashMap<CellPos, RailShape>,
    doors: HashSet<CellPos>,
    path_surfaces: HashSet<CellPos>,
    tags: HashMap<CellPos, String>,
    unloaded: HashSet<CellPos>,
}

impl GridWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solid floor so cells at `y + 1` are standable.
    pub fn floor(&mut self, x0: i32, x1: i32, z0: i32, z1: i32, y: i32) -> &mut Self {
        for x in x0..=x1 {
            for z in z0..=z1 {
                self.solids.insert(CellPos::new(x, y, z));
            }
        }
        self
    }

    pub fn solid(&mut self, x: i32, y: i32, z: i32) -> &mut Self {
        self.solids.insert(CellPos::new(x, y, z));
        self
    }

    /// A wall segment of the given height starting at `y`.
    pub fn wall(&mut self, x: i32, y: i32, z: i32, height: i32) -> &mut Self {
        for dy in 0..height {
            self.solids.insert(CellPos::new(x, y + dy, z));
        }
        self
    }

    pub fn ladder_column(
        &mut self,
        x: i32,
        z: i32,
        y0: i32,
        y1: i32,
        facing: Direction,
    ) -> &mut Self {
        for y in y0..=y1 {
            self.ladders.insert(CellPos::new(x, y, z), facing);
        }
        self
    }

    /// Liquid cells along the x axis at a fixed y and z.
    pub fn liquid_run(&mut self, x0: i32, x1: i32, y: i32, z: i32) -> &mut Self {
        for x in x0..=x1 {
            self.liquids.insert(CellPos::new(x, y, z));
        }
        self
    }

    pub fn rail_run(&mut self, x0: i32, x1: i32, y: i32, z: i32) -> &mut Self {
        for x in x0..=x1 {
            self.rails.insert(CellPos::new(x, y, z), RailShape::Flat);
        }
        self
    }

    pub fn tag(&mut self, cell: CellPos, tag: &str) -> &mut Self {
        self.tags.insert(cell, tag.to_string());
        self
    }

    pub fn unload(&mut self, cell: CellPos) -> &mut Self {
        self.unloaded.insert(cell);
        self
    }
}

impl WorldGrid for GridWorld {
    fn is_loaded(&self, cell: CellPos) -> bool {
        !self.unloaded.contains(&cell)
    }

    fn is_solid(&self, cell: CellPos) -> bool {
        self.solids.contains(&cell)
    }

    fn collision_height(&self, cell: CellPos) -> f64 {
        if self.solids.contains(&cell) {
            1.0
        } else {
            0.0
        }
    }

    fn is_liquid(&self, cell: CellPos) -> bool {
        self.liquids.contains(&cell)
    }

    fn ladder_facing(&self, cell: CellPos) -> Option<Direction> {
        self.ladders.get(&cell).copied()
    }

    fn rail_shape(&self, cell: CellPos) -> Option<RailShape> {
        self.rails.get(&cell).copied()
    }

    fn is_door(&self, cell: CellPos) -> bool {
        self.doors.contains(&cell)
    }

    fn is_path_surface(&self, cell: CellPos) -> bool {
        self.path_surfaces.contains(&cell)
    }

    fn has_tag(&self, cell: CellPos, tag: &str) -> bool {
        self.tags.get(&cell).is_some_and(|t| t == tag)
    }
}

/// Agent body with toy physics: each step it moves straight toward the last
/// wanted position. No gravity, no collision; the world model under test is
/// the navigator, not the body.
pub struct ScriptedAgent {
    pub pos: WorldPos,
    pub caps: Capabilities,
    pub sneaking: bool,
    pub in_liquid: bool,
    pub teleport_count: u32,
    pub damage_taken: f32,
    pub frozen: bool,
    pub riding: bool,
    pub cart_pos: WorldPos,
    pub cart_velocity: WorldPos,
    pub mount_count: u32,
    pub dismount_count: u32,
    pub max_cart_speed: f64,
    wanted: Option<(WorldPos, f64)>,
    rng_state: u64,
}

impl ScriptedAgent {
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            pos: WorldPos::new(x, y, z),
            caps: Capabilities::default(),
            sneaking: false,
            in_liquid: false,
            teleport_count: 0,
            damage_taken: 0.0,
            frozen: false,
            riding: false,
            cart_pos: WorldPos::ZERO,
            cart_velocity: WorldPos::ZERO,
            mount_count: 0,
            dismount_count: 0,
            max_cart_speed: 0.0,
            wanted: None,
            rng_state: 0x9e37_79b9_7f4a_7c15,
        }
    }

    /// Advance the toy body one tick.
    pub fn physics_step(&mut self, world: &GridWorld) {
        if self.riding {
            // Mounted: the cart carries the rider; walk intents are ignored.
            self.cart_pos = self.cart_pos.add(
                self.cart_velocity.x,
                self.cart_velocity.y,
                self.cart_velocity.z,
            );
            self.pos = self.cart_pos;
            self.wanted = None;
        } else if let Some((target, speed)) = self.wanted.take() {
            if !self.frozen {
                let step = (0.25 * speed).max(0.02);
                let dist = self.pos.distance(&target);
                if dist <= step {
                    self.pos = target;
                } else {
                    let f = step / dist;
                    self.pos = WorldPos::new(
                        self.pos.x + (target.x - self.pos.x) * f,
                        self.pos.y + (target.y - self.pos.y) * f,
                        self.pos.z + (target.z - self.pos.z) * f,
                    );
                }
            }
        }
        self.in_liquid = world.is_liquid(self.cell());
    }
}

impl AgentControl for ScriptedAgent {
    fn position(&self) -> WorldPos {
        self.pos
    }

    fn is_in_liquid(&self) -> bool {
        self.in_liquid
    }

    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn set_wanted_position(&mut self, target: WorldPos, speed: f64) {
        self.wanted = Some((target, speed));
    }

    fn set_vertical_intent(&mut self, _dy: f64) {}

    fn add_velocity(&mut self, _dx: f64, _dy: f64, _dz: f64) {}

    fn set_sneaking(&mut self, sneaking: bool) {
        self.sneaking = sneaking;
    }

    fn teleport(&mut self, target: WorldPos) {
        self.pos = target;
        self.teleport_count += 1;
    }

    fn damage(&mut self, amount: f32) {
        self.damage_taken += amount;
    }

    fn next_random(&mut self, bound: i32) -> i32 {
        // xorshift; quality is irrelevant here.
        self.rng_state ^= self.rng_state << 13;
        self.rng_state ^= self.rng_state >> 7;
        self.rng_state ^= self.rng_state << 17;
        (self.rng_state % bound.max(1) as u64) as i32
    }

    fn random_seed(&mut self) -> u64 {
        self.rng_state
    }

    fn is_riding_cart(&self) -> bool {
        self.riding
    }

    fn mount_cart(&mut self, at: WorldPos) {
        self.riding = true;
        self.cart_pos = at;
        self.cart_velocity = WorldPos::ZERO;
        self.pos = at;
        self.mount_count += 1;
    }

    fn dismount_cart(&mut self) {
        if self.riding {
            self.riding = false;
            self.dismount_count += 1;
        }
    }

    fn cart_position(&self) -> WorldPos {
        self.cart_pos
    }

    fn cart_velocity(&self) -> WorldPos {
        self.cart_velocity
    }

    fn set_cart_velocity(&mut self, velocity: WorldPos) {
        self.max_cart_speed = self
            .max_cart_speed
            .max(velocity.x.abs().max(velocity.z.abs()));
        self.cart_velocity = velocity;
    }
}

/// Tick the navigator and body until the navigator goes idle. Returns false
/// when the tick budget runs out first.
pub fn run_until_done(
    nav: &mut marga_nav::Navigator,
    agent: &mut ScriptedAgent,
    world: &GridWorld,
    max_ticks: usize,
) -> bool {
    for _ in 0..max_ticks {
        nav.tick(agent);
        agent.physics_step(world);
        if nav.is_done() {
            return true;
        }
        // Give scheduler workers a chance on slow CI machines.
        std::thread::sleep(std::time::Duration::from_micros(200));
    }
    false
}
