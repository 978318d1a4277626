/// Interactive drill zone placement, editing and persistence.
pub mod drill_zones;
