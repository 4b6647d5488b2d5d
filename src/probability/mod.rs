mod bayes;

pub use bayes::{GaussianEstimator, GaussianState};
