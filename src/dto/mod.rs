pub mod import_dto;
pub mod question_dto;
