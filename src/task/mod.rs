pub mod bump_capture;
pub mod collision_react;
pub mod crash_report;
pub mod drive;
