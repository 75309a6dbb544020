mod random;
mod solution;
mod stopwatch;
mod trail;

pub use random::Random;
pub use random::TestRandom;
pub use solution::Solution;
pub use stopwatch::Stopwatch;
pub use trail::Trail;
