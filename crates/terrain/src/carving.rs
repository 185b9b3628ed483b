//! Worm-based cave and tunnel carving.
//!
//! A worm walks a random path through the world; each visited point carves an
//! ellipsoid of blocks out of the chunks it touches. Stepping behavior is
//! supplied by the caller, the ellipsoid rasterization is shared.

use glam::DVec3;
use rand::rngs::StdRng;

/// Chunk width in blocks.
pub const CHUNK_WIDTH: usize = 16;
/// Buildable world height in blocks.
pub const CHUNK_HEIGHT: usize = 256;

/// Classification of a carved block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarvingType {
    /// Interior of the carved ellipsoid.
    Center,
    /// Shell around the interior.
    Wall,
    /// Shell blocks above the top cut plane.
    Top,
    /// Shell blocks below the bottom cut plane.
    Bottom,
}

/// Per-chunk record of carved blocks.
pub struct CarvingData {
    carved: Vec<Option<CarvingType>>,
}

impl CarvingData {
    pub fn new() -> Self {
        Self {
            carved: vec![None; CHUNK_WIDTH * CHUNK_HEIGHT * CHUNK_WIDTH],
        }
    }

    fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < CHUNK_WIDTH && y < CHUNK_HEIGHT && z < CHUNK_WIDTH);
        (y * CHUNK_WIDTH + z) * CHUNK_WIDTH + x
    }

    /// Mark a chunk-local block as carved.
    pub fn carve(&mut self, x: usize, y: usize, z: usize, kind: CarvingType) {
        self.carved[Self::index(x, y, z)] = Some(kind);
    }

    pub fn is_carved(&self, x: usize, y: usize, z: usize) -> bool {
        self.carved[Self::index(x, y, z)].is_some()
    }

    pub fn kind_at(&self, x: usize, y: usize, z: usize) -> Option<CarvingType> {
        self.carved[Self::index(x, y, z)]
    }

    /// Number of carved blocks, by any type.
    pub fn carved_count(&self) -> usize {
        self.carved.iter().filter(|c| c.is_some()).count()
    }
}

impl Default for CarvingData {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared state of a stepping worm.
pub struct WormState {
    rng: StdRng,
    origin: DVec3,
    running: DVec3,
    length: u32,
    top_cut: i32,
    bottom_cut: i32,
    radius: [i32; 3],
}

impl WormState {
    pub fn new(length: u32, rng: StdRng, origin: DVec3) -> Self {
        Self {
            rng,
            origin,
            running: origin,
            length,
            top_cut: 0,
            bottom_cut: 0,
            radius: [0, 0, 0],
        }
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn running(&self) -> DVec3 {
        self.running
    }

    pub fn running_mut(&mut self) -> &mut DVec3 {
        &mut self.running
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn radius(&self) -> [i32; 3] {
        self.radius
    }

    pub fn set_radius(&mut self, radius: [i32; 3]) {
        self.radius = radius;
    }

    /// Trim this many shell layers off the top of carved ellipsoids.
    pub fn set_top_cut(&mut self, top_cut: i32) {
        self.top_cut = top_cut;
    }

    /// Trim this many shell layers off the bottom of carved ellipsoids.
    pub fn set_bottom_cut(&mut self, bottom_cut: i32) {
        self.bottom_cut = bottom_cut;
    }

    /// Snapshot of the worm's current position for carving.
    pub fn point(&self) -> WormPoint {
        WormPoint {
            origin: self.running,
            radius: self.radius,
            top_cut: self.top_cut,
            bottom_cut: self.bottom_cut,
        }
    }
}

/// A worm with caller-defined stepping behavior.
pub trait Worm {
    fn state(&self) -> &WormState;

    fn state_mut(&mut self) -> &mut WormState;

    /// Advance the worm one step, mutating its running position.
    fn step(&mut self);
}

/// A single worm position plus carving shape.
#[derive(Debug, Clone, Copy)]
pub struct WormPoint {
    origin: DVec3,
    radius: [i32; 3],
    top_cut: i32,
    bottom_cut: i32,
}

fn ellipsoid(x: i32, y: i32, z: i32, xr: f64, yr: f64, zr: f64) -> f64 {
    // Half-block enlarged radii so a radius-0 point still carves its block.
    (x * x) as f64 / (xr + 0.5).powi(2)
        + (y * y) as f64 / (yr + 0.5).powi(2)
        + (z * z) as f64 / (zr + 0.5).powi(2)
}

impl WormPoint {
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn radius(&self, axis: usize) -> i32 {
        self.radius[axis]
    }

    /// Carve this point's ellipsoid into `data` for the chunk at
    /// (chunk_x, chunk_z). Blocks outside that chunk or below y 0 are skipped;
    /// shell blocks never overwrite previously carved blocks.
    pub fn carve(&self, data: &mut CarvingData, chunk_x: i32, chunk_z: i32) {
        let block = self.origin.floor();
        let (block_x, block_z) = (block.x as i32, block.z as i32);
        if (block_x.div_euclid(CHUNK_WIDTH as i32) - chunk_x).abs() > 1
            && (block_z.div_euclid(CHUNK_WIDTH as i32) - chunk_z).abs() > 1
        {
            return;
        }
        let (xr, yr, zr) = (self.radius[0], self.radius[1], self.radius[2]);
        for x in -xr - 1..=xr + 1 {
            for y in -yr - 1..=yr + 1 {
                for z in -zr - 1..=zr + 1 {
                    let position = (self.origin + DVec3::new(x as f64, y as f64, z as f64)).floor();
                    let (px, py, pz) = (position.x as i32, position.y as i32, position.z as i32);
                    if px.div_euclid(CHUNK_WIDTH as i32) != chunk_x
                        || pz.div_euclid(CHUNK_WIDTH as i32) != chunk_z
                        || py < 0
                    {
                        continue;
                    }
                    let local_x = px.rem_euclid(CHUNK_WIDTH as i32) as usize;
                    let local_z = pz.rem_euclid(CHUNK_WIDTH as i32) as usize;
                    if ellipsoid(x, y, z, xr as f64, yr as f64, zr as f64) <= 1.0
                        && y >= -yr - 1 + self.bottom_cut
                        && y <= yr + 1 - self.top_cut
                    {
                        data.carve(local_x, py as usize, local_z, CarvingType::Center);
                    } else if ellipsoid(
                        x,
                        y,
                        z,
                        xr as f64 + 1.5,
                        yr as f64 + 1.5,
                        zr as f64 + 1.5,
                    ) <= 1.0
                    {
                        let kind = if y <= -yr - 1 + self.bottom_cut {
                            CarvingType::Bottom
                        } else if y >= yr + 1 - self.top_cut {
                            CarvingType::Top
                        } else {
                            CarvingType::Wall
                        };
                        if data.is_carved(local_x, py as usize, local_z) {
                            continue;
                        }
                        data.carve(local_x, py as usize, local_z, kind);
                    }
                }
            }
        }
    }
}
