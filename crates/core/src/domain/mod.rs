pub mod geometry;
pub mod product;
pub mod quotation;
pub mod requirements;
