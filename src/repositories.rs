pub mod assistant;
pub mod users;
pub mod whatsapp;
