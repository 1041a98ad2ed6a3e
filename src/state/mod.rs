pub mod column;
pub mod data_model;
pub mod form;
pub mod grid;
pub mod interaction;
pub mod pagination;
pub mod projection;
pub mod selection;
pub mod statement;
pub mod view_state;
