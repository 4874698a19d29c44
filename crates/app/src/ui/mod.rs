pub mod controls;
pub mod modal;
pub mod particles;
pub mod stars;
pub mod writing;
