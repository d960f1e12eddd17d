//! Helpers shared by the tokenizer and the serializer.

pub mod links;
