pub mod random;
pub mod seq;

pub use random::{GrowthPolicy, RandomGenerator};
pub use seq::SeqGenerator;

use shortlink_core::ShortCode;

/// Trait for generating candidate short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// Uniqueness is enforced by the repository; a candidate that turns out to be
/// taken is simply discarded and a new one is requested.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Proposes a fresh candidate code. Generation cannot fail.
    fn generate(&self) -> Self::Output;

    /// Proposes a candidate after `collisions` consecutive uniqueness
    /// conflicts within the same create request.
    ///
    /// Generators that can adapt (e.g. by lengthening codes) override this;
    /// by default it is the same as [`Generator::generate`].
    fn regenerate(&self, collisions: u32) -> Self::Output {
        let _ = collisions;
        self.generate()
    }
}

impl<G: Generator> Generator for std::sync::Arc<G> {
    type Output = G::Output;

    fn generate(&self) -> Self::Output {
        (**self).generate()
    }

    fn regenerate(&self, collisions: u32) -> Self::Output {
        (**self).regenerate(collisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn shared_generator_delegates() {
        let generator = Arc::new(SeqGenerator::new());
        let first: ShortCode = generator.generate().into();
        let second: ShortCode = generator.regenerate(4).into();

        assert_eq!(first.as_str(), "000000");
        assert_eq!(second.as_str(), "000001");
    }
}
