mod common;

mod store;
