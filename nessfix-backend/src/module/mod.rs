pub mod league;
pub mod renderer;
pub mod scheduled;
