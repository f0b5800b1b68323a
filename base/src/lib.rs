pub mod database;
pub mod setting;

pub const CLI_NAME: &str = "tracks";
pub const VERSION: &str = "0.2.0";

// logging constants
pub const TRACKS_LOGLEVEL: &str = "TRACKS_LOGLEVEL";

// environment variables read on top of the config file
pub const PORT: &str = "PORT";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DATABASE_NAME: &str = "DATABASE_NAME";
