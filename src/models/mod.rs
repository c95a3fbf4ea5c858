pub mod employee;
pub mod match_candidate;
pub mod role;
