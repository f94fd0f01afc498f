pub mod teams;
