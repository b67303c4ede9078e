pub mod collections;
pub mod multiplicity;
pub mod syn;
