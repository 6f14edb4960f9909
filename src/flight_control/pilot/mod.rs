mod flight_loop;
mod landing;
mod pilot_state;

pub use flight_loop::Pilot;
