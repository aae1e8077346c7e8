//! This module holds typed parameters for endpoint inputs.
//!
//! Every field is optional at this level so that a missing value reaches the
//! domain layer and is reported with the relay's own error body, rather than
//! being rejected by the query extractor.

pub(crate) mod oauth;
