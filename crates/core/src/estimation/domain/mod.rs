pub mod yaw_estimator;
pub mod yaw_smoother;
