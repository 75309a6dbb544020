use std::fmt::Debug;
use std::ops::Range;

use rand::Rng;
use rand::SeedableRng;

use crate::calabash_assert_moderate;

/// Abstraction over the source of randomness used by the search components.
///
/// The solver never consults a global generator; an implementation of this trait is threaded
/// through explicitly. For tests there is [`TestRandom`], which replays a scripted sequence of
/// values so that randomised behaviour can be pinned down deterministically.
pub trait Random: Debug {
    /// Generate a bool which is true with probability `probability`; panics unless
    /// `probability ∈ [0, 1]`.
    fn generate_bool(&mut self, probability: f64) -> bool;

    /// Sample uniformly from `[range.start, range.end)`.
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize;

    /// Sample uniformly from `[lb, ub]`.
    fn generate_i32_in_range(&mut self, lb: i32, ub: i32) -> i32;

    /// Generate a float in the range `[0, 1)`.
    fn generate_f64(&mut self) -> f64;

    /// Shuffle the slice in place.
    fn shuffle_usizes(&mut self, values: &mut [usize]) {
        // Fisher-Yates driven through the trait so scripted generators stay deterministic.
        for i in (1..values.len()).rev() {
            let j = self.generate_usize_in_range(0..i + 1);
            values.swap(i, j);
        }
    }
}

impl<T> Random for T
where
    T: SeedableRng + Rng + Debug,
{
    fn generate_bool(&mut self, probability: f64) -> bool {
        calabash_assert_moderate!(
            (0.0..=1.0).contains(&probability),
            "it should hold that 0.0 <= {probability} <= 1.0"
        );

        self.gen_bool(probability)
    }

    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
        self.gen_range(range)
    }

    fn generate_i32_in_range(&mut self, lb: i32, ub: i32) -> i32 {
        self.gen_range(lb..=ub)
    }

    fn generate_f64(&mut self) -> f64 {
        self.gen_range(0.0..1.0)
    }
}

/// A scripted generator which replays the provided values in order.
///
/// Panics when a test consumes more randomness than was scripted, which tends to be exactly the
/// signal one wants from a test.
#[derive(Debug, Default)]
pub struct TestRandom {
    pub usizes: Vec<usize>,
    pub i32s: Vec<i32>,
    pub bools: Vec<bool>,
    pub f64s: Vec<f64>,
}

impl Random for TestRandom {
    fn generate_bool(&mut self, _probability: f64) -> bool {
        assert!(!self.bools.is_empty(), "TestRandom ran out of bools");
        self.bools.remove(0)
    }

    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
        assert!(!self.usizes.is_empty(), "TestRandom ran out of usizes");
        let value = self.usizes.remove(0);
        assert!(
            range.contains(&value),
            "scripted usize {value} outside of requested range {range:?}"
        );
        value
    }

    fn generate_i32_in_range(&mut self, lb: i32, ub: i32) -> i32 {
        assert!(!self.i32s.is_empty(), "TestRandom ran out of i32s");
        let value = self.i32s.remove(0);
        assert!((lb..=ub).contains(&value));
        value
    }

    fn generate_f64(&mut self) -> f64 {
        assert!(!self.f64s.is_empty(), "TestRandom ran out of f64s");
        self.f64s.remove(0)
    }
}
