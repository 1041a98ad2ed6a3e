pub mod actions;
pub mod app;
pub mod generate_modal;
pub mod pagination_bar;
pub mod table;
pub mod toolbar;
