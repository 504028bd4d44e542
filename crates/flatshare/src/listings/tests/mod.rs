mod common;
mod saved;
