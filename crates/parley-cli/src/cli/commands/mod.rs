mod dispatch;
pub mod run;
pub mod validate;

pub use dispatch::dispatch;
