pub mod event;
pub mod narrator;
pub mod schedule;
pub mod session;
pub mod timer;
