pub mod skip;
pub mod track;
pub mod trash;
pub mod uri;
