pub mod milestones;
pub mod modules;
pub mod project;
