pub mod llm;
pub mod schema;
pub mod sqlite;
