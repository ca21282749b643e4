pub mod campaign;
pub mod campaigns;
pub mod price;
pub mod setup;
pub mod tier;
pub mod ui;
