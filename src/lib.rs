pub mod cli;
pub mod export;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
pub mod templates;
pub mod util;
