pub mod personality_dimension;
pub mod question;
