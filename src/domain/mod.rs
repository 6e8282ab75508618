pub mod entity;
pub mod maze;
pub mod tile;
