pub mod check;
pub mod event;
pub mod run;
