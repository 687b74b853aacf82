pub mod generate_dto;
pub mod try_on_dto;
