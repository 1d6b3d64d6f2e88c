pub mod assembler;
pub mod comparator;
pub mod literal;
pub mod sandbox;

pub use assembler::{assemble, AssembleError, Assembler};
pub use comparator::compare;
