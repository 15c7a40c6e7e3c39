pub mod commands;
pub mod ui;

pub use commands::run::RunOptions;
pub use ui::Output;
