pub mod bid;
pub mod context;
pub mod flex_bool;
pub mod params;
pub mod placements;
