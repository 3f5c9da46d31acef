mod failures;
mod indexing;
