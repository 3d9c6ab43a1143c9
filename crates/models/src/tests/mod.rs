/// CRUD operations against the `document` table
pub mod document_tests;
