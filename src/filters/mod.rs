mod kalman;

pub use kalman::{KalmanEstimator, KalmanState};
