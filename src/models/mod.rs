pub mod account;
pub mod application;
pub mod posting;
pub mod skill;
