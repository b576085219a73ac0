mod chunk;
mod entity;
mod error;
mod farming;
mod index;
mod noise;
mod terrain;

pub use chunk::*;
pub use entity::*;
pub use error::*;
pub use farming::*;
pub use index::*;
pub use self::noise::*;
pub use terrain::*;
