//! Probability distributions emitted by the regression engine

mod students_t;

pub use students_t::{StudentsT, StudentsTError};
