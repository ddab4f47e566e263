use crate::Generator;
use rand::Rng;
use shortlink_core::base62::ALPHABET;
use shortlink_core::shortcode::MAX_LENGTH;
use shortlink_core::ShortCode;
use typed_builder::TypedBuilder;

/// Lengthens random codes once a request keeps colliding.
///
/// The resulting length depends only on `(base length, collisions)`, so the
/// policy is fully deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct GrowthPolicy {
    /// Consecutive collisions tolerated at one length before adding a symbol.
    /// Zero disables growth.
    #[builder(default = 3)]
    pub collisions_per_step: u32,
    /// Upper bound for the grown length.
    #[builder(default = 10)]
    pub max_length: usize,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GrowthPolicy {
    /// Returns the code length to use after `collisions` consecutive
    /// collisions, starting from `base`.
    pub fn length_for(&self, base: usize, collisions: u32) -> usize {
        let steps = collisions
            .checked_div(self.collisions_per_step)
            .unwrap_or(0) as usize;
        let ceiling = self.max_length.max(base);
        base.saturating_add(steps).min(ceiling)
    }
}

/// Draws codes uniformly at random from the base62 alphabet.
///
/// Collisions are possible by design; the repository's unique key and the
/// shortener's retry loop absorb them. At the default length of 6 there are
/// 62^6 (about 5.6e10) codes.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RandomGenerator {
    /// Number of symbols per code, clamped to `1..=32`.
    #[builder(default = 6)]
    length: usize,
    /// Optional policy for lengthening codes under repeated collisions.
    #[builder(default, setter(strip_option))]
    growth: Option<GrowthPolicy>,
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RandomGenerator {
    /// The base code length.
    pub fn length(&self) -> usize {
        self.length
    }

    /// The configured growth policy, if any.
    pub fn growth(&self) -> Option<GrowthPolicy> {
        self.growth
    }

    /// The code length used after `collisions` consecutive collisions.
    pub fn length_after(&self, collisions: u32) -> usize {
        let length = match self.growth {
            Some(policy) => policy.length_for(self.length, collisions),
            None => self.length,
        };
        length.clamp(1, MAX_LENGTH)
    }

    fn draw(&self, length: usize) -> ShortCode {
        let mut rng = rand::rng();
        let code: String = (0..length)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect();
        ShortCode::new_unchecked(code)
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        self.draw(self.length_after(0))
    }

    fn regenerate(&self, collisions: u32) -> ShortCode {
        self.draw(self.length_after(collisions))
    }
}
