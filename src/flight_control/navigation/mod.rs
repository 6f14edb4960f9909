mod waypoints;
#[cfg(test)]
mod tests;

pub use waypoints::WaypointSequencer;
