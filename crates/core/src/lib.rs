pub mod computations;
pub mod model;
pub mod parsers;
pub mod raw_data;
pub mod transform;
