pub mod collision;
pub mod entity;
pub mod grid;
pub mod level;
pub mod rules;
pub mod theme;
