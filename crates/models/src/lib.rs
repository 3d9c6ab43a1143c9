pub mod errors;
pub mod db;
pub mod document;

#[cfg(test)]
mod tests;
