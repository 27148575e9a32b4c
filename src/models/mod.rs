pub mod calendar;
pub mod comment;
pub mod dashboard;
pub mod evaluation;
pub mod meeting;
pub mod membership;
pub mod task;
pub mod team;
pub mod user;
