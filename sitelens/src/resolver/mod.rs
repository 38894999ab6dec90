pub mod aggregate;
pub mod analysis;
pub mod single;
pub mod util;
