pub(crate) mod jive_extension;
