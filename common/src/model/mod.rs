pub mod aggregate;
pub mod complaint;
pub mod filter;
pub mod sort;
pub mod table;
