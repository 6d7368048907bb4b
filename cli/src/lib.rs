pub mod commands;
pub mod logging;
pub mod presenter;
pub mod replay;
