pub mod commerce;
