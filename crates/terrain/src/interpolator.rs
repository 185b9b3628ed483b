//! Boundary-aware chunk noise interpolation.
//!
//! Evaluating coherent noise at every block of a chunk is expensive. Instead,
//! generators are sampled on a coarse 4-block lattice (with a one-column halo
//! beyond the chunk footprint), lattice corners are blended according to the
//! biome-boundary policy, and per-block values are recovered by trilinear
//! interpolation. Because the halo gives every edge corner the same
//! neighborhood its twin sees from the adjacent chunk, independently built
//! neighbors agree at shared columns and terrain stays seam-free.

use crate::biome::{BiomeProvider, GenerationPhase, Generator, GeneratorKey};
use crate::noise::NoiseGenerator;
use crate::world::WorldContext;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Spacing between lattice sample points, in blocks.
pub const LATTICE_SPACING: i32 = 4;

/// Horizontal lattice points per axis: chunk footprint plus one halo point per side.
const SAMPLE_POINTS: usize = 7;
/// Lattice columns backing actual interpolation corners (chunk interior plus one
/// halo column); only these need boundary flags.
const FLAG_POINTS: usize = 5;
/// Interpolation cells per horizontal axis.
const CELLS_XZ: usize = 4;
/// Interpolation cells on the vertical axis.
const CELLS_Y: usize = 64;
/// Vertical sample layers allocated per lattice column.
///
/// One more than is ever populated: layer 64 keeps its zero initial value and
/// is read only by the upper corners of the topmost cell row. Do not resize
/// without revisiting the vertical query domain.
const SAMPLE_LAYERS: usize = 65;

fn gen_index(x: usize, z: usize) -> usize {
    debug_assert!(x < SAMPLE_POINTS && z < SAMPLE_POINTS);
    x * SAMPLE_POINTS + z
}

fn flag_index(x: usize, z: usize) -> usize {
    debug_assert!(x < FLAG_POINTS && z < FLAG_POINTS);
    x * FLAG_POINTS + z
}

fn sample_index(x: usize, z: usize, y: usize) -> usize {
    debug_assert!(x < SAMPLE_POINTS && z < SAMPLE_POINTS && y < SAMPLE_LAYERS);
    (x * SAMPLE_POINTS + z) * SAMPLE_LAYERS + y
}

fn cell_index(x: usize, y: usize, z: usize) -> usize {
    debug_assert!(x < CELLS_XZ && y < CELLS_Y && z < CELLS_XZ);
    (x * CELLS_Y + y) * CELLS_XZ + z
}

/// True iff any of the 8 neighbors of lattice column (x, z) maps to a
/// different generator. `keys` is the 7×7 grid; (x, z) must be an interior
/// coordinate (1..=5) so all neighbors exist.
fn differs_from_neighbors(keys: &[GeneratorKey], x: usize, z: usize) -> bool {
    let center = keys[gen_index(x, z)];
    // OR over symmetric comparisons; evaluation order is immaterial.
    center != keys[gen_index(x + 1, z)]
        || center != keys[gen_index(x, z + 1)]
        || center != keys[gen_index(x - 1, z)]
        || center != keys[gen_index(x, z - 1)]
        || center != keys[gen_index(x + 1, z + 1)]
        || center != keys[gen_index(x - 1, z - 1)]
        || center != keys[gen_index(x + 1, z - 1)]
        || center != keys[gen_index(x - 1, z + 1)]
}

/// Boundary flags for the 5×5 corner columns, from the 7×7 key grid.
fn boundary_flags(keys: &[GeneratorKey]) -> Vec<bool> {
    let mut flags = vec![false; FLAG_POINTS * FLAG_POINTS];
    for x in 0..FLAG_POINTS {
        for z in 0..FLAG_POINTS {
            flags[flag_index(x, z)] = differs_from_neighbors(keys, x + 1, z + 1);
        }
    }
    flags
}

/// Construction-scoped coarse lattice: generator handles, boundary flags and
/// raw samples. Consumed while assembling interpolation cells and dropped
/// afterwards, so provider and noise borrows end with the constructor.
struct Lattice {
    generators: Vec<Arc<dyn Generator>>,
    flags: Vec<bool>,
    samples: Vec<f64>,
}

impl Lattice {
    fn build(
        world: &WorldContext,
        x_origin: i32,
        z_origin: i32,
        provider: &dyn BiomeProvider,
        noise: &NoiseGenerator,
    ) -> Self {
        // 7x7 generator handles covering the chunk footprint plus halo.
        let mut generators: Vec<Arc<dyn Generator>> =
            Vec::with_capacity(SAMPLE_POINTS * SAMPLE_POINTS);
        for x in -1..=5i32 {
            for z in -1..=5i32 {
                generators.push(provider.generator_at(
                    x_origin + x * LATTICE_SPACING,
                    z_origin + z * LATTICE_SPACING,
                    GenerationPhase::Base,
                ));
            }
        }
        // Loop order above is x-major to match gen_index.
        let keys: Vec<GeneratorKey> = generators.iter().map(|g| g.key()).collect();
        let flags = boundary_flags(&keys);

        // Raw samples; layer SAMPLE_LAYERS - 1 stays zero.
        let mut samples = vec![0.0f64; SAMPLE_POINTS * SAMPLE_POINTS * SAMPLE_LAYERS];
        for x in 0..SAMPLE_POINTS {
            for z in 0..SAMPLE_POINTS {
                let generator = &generators[gen_index(x, z)];
                let world_x = (x as i32 - 1) * LATTICE_SPACING + x_origin;
                let world_z = (z as i32 - 1) * LATTICE_SPACING + z_origin;
                for y in 0..CELLS_Y {
                    samples[sample_index(x, z, y)] = generator.sample(
                        noise,
                        world,
                        world_x as f64,
                        (y as i32 * LATTICE_SPACING) as f64,
                        world_z as f64,
                    );
                }
            }
        }

        Self {
            generators,
            flags,
            samples,
        }
    }

    /// Effective value of corner (x, z) at layer y.
    ///
    /// Corners on a detected biome boundary average the full 3×3 square of
    /// raw samples; corners of a minimal-interpolation generator pass the raw
    /// sample through; all others average the 5-point orthogonal cross. The
    /// neighbor sets differ deliberately (the square smooths harder across
    /// seams than the cross does inside a region).
    fn blended(&self, x: usize, y: usize, z: usize) -> f64 {
        let s = |sx: usize, sz: usize| self.samples[sample_index(sx, sz, y)];
        if self.flags[flag_index(x, z)] {
            (s(x + 2, z + 1)
                + s(x, z + 1)
                + s(x + 1, z + 2)
                + s(x + 1, z)
                + s(x, z)
                + s(x + 2, z + 2)
                + s(x + 2, z)
                + s(x, z + 2)
                + s(x + 1, z + 1))
                / 9.0
        } else if self.generators[gen_index(x + 1, z + 1)].uses_minimal_interpolation() {
            s(x + 1, z + 1)
        } else {
            (s(x + 2, z + 1) + s(x, z + 1) + s(x + 1, z + 2) + s(x + 1, z) + s(x + 1, z + 1)) / 5.0
        }
    }
}

/// One coarse cell: 8 blended corner values supporting trilinear evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationCell {
    /// Corner c_xyz at index `x | y << 1 | z << 2`.
    corners: [f64; 8],
}

impl InterpolationCell {
    pub fn new(corners: [f64; 8]) -> Self {
        Self { corners }
    }

    /// Trilinear blend at normalized offsets (u, v, w) in [0, 1)³.
    pub fn trilerp(&self, u: f64, v: f64, w: f64) -> f64 {
        let mut value = 0.0;
        for (i, corner) in self.corners.iter().enumerate() {
            let wu = if i & 1 == 0 { 1.0 - u } else { u };
            let wv = if i & 2 == 0 { 1.0 - v } else { v };
            let ww = if i & 4 == 0 { 1.0 - w } else { w };
            value += corner * wu * wv * ww;
        }
        value
    }
}

/// Per-chunk interpolated noise field.
///
/// Built once per chunk-generation pass and read-only afterwards; queries from
/// multiple threads need no locking. All values from the provider, noise
/// source and world handle are copied out during construction, so those
/// borrows end when `new` returns.
pub struct ChunkInterpolator {
    cells: Vec<InterpolationCell>,
    x_origin: i32,
    z_origin: i32,
}

impl ChunkInterpolator {
    /// Build the interpolator for the chunk at (chunk_x, chunk_z).
    ///
    /// Runs the full pipeline: provider lookups for the 7×7 footprint+halo,
    /// lattice sampling (7×7×64 generator invocations), boundary
    /// classification, corner blending and cell assembly. Sequential and
    /// all-or-nothing; a panicking provider or generator leaves no partial
    /// interpolator behind. Non-finite generator output propagates unchanged.
    #[instrument(skip(world, provider, noise))]
    pub fn new(
        world: &WorldContext,
        chunk_x: i32,
        chunk_z: i32,
        provider: &dyn BiomeProvider,
        noise: &NoiseGenerator,
    ) -> Self {
        let x_origin = chunk_x << 4;
        let z_origin = chunk_z << 4;

        let lattice = Lattice::build(world, x_origin, z_origin, provider, noise);

        let mut cells = Vec::with_capacity(CELLS_XZ * CELLS_Y * CELLS_XZ);
        for x in 0..CELLS_XZ {
            for y in 0..CELLS_Y {
                for z in 0..CELLS_XZ {
                    cells.push(InterpolationCell::new([
                        lattice.blended(x, y, z),
                        lattice.blended(x + 1, y, z),
                        lattice.blended(x, y + 1, z),
                        lattice.blended(x + 1, y + 1, z),
                        lattice.blended(x, y, z + 1),
                        lattice.blended(x + 1, y, z + 1),
                        lattice.blended(x, y + 1, z + 1),
                        lattice.blended(x + 1, y + 1, z + 1),
                    ]));
                }
            }
        }
        debug!("chunk interpolation lattice built");

        Self {
            cells,
            x_origin,
            z_origin,
        }
    }

    /// World X coordinate of block (0, _, 0) of this chunk.
    pub fn x_origin(&self) -> i32 {
        self.x_origin
    }

    /// World Z coordinate of block (0, _, 0) of this chunk.
    pub fn z_origin(&self) -> i32 {
        self.z_origin
    }

    /// Interpolated noise at block-local (x, z), at y = 0.
    pub fn sample_2d(&self, x: f64, z: f64) -> f64 {
        self.sample_3d(x, 0.0, z)
    }

    /// Interpolated noise at block-local coordinates.
    ///
    /// Horizontal domain is 0..16, vertical domain 0..256; out-of-domain input
    /// is a precondition violation and faults on the cell index, it is not a
    /// recoverable error. Callers clamp or validate beforehand.
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let spacing = LATTICE_SPACING as f64;
        let cell = &self.cells[cell_index(
            x as usize / LATTICE_SPACING as usize,
            y as usize / LATTICE_SPACING as usize,
            z as usize / LATTICE_SPACING as usize,
        )];
        cell.trilerp((x % spacing) / spacing, (y % spacing) / spacing, (z % spacing) / spacing)
    }
}
