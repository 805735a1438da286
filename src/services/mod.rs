pub mod import_service;
pub mod question_service;
pub mod template_service;
pub mod test_service;
