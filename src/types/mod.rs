pub mod mesh;
pub mod stats;
pub mod tile;

pub use mesh::{AbstractMesh, Face, FaceLoop, TextureSize};
pub use stats::{LodSummary, TileOutcome, TileResult, TileStats};
pub use tile::{GridCoords, TileDescriptor};
