pub mod trusses;
pub mod walls;
