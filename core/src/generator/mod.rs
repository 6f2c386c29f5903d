use crate::*;
pub use fixed::*;
pub use random::*;

mod fixed;
mod random;

/// Source of a fresh grid at every episode reset.
pub trait BoardGenerator {
    fn generate(&mut self, config: GameConfig) -> Grid;
}

impl<G: BoardGenerator + ?Sized> BoardGenerator for Box<G> {
    fn generate(&mut self, config: GameConfig) -> Grid {
        (**self).generate(config)
    }
}
