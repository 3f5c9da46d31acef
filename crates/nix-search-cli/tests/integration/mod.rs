mod dump;
mod search;
