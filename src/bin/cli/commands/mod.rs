pub mod card;
pub mod generate;
pub mod list;
pub mod set;
pub mod show;
pub mod speak;
