pub mod attitude;
pub mod euler;

pub use attitude::Attitude;
pub use euler::{Euler, DEGREE_PER_DAG};
