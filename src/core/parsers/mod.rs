//! File parsers for translation sources.
//!
//! This module provides parsers for different file types:
//! - `po`: gettext `.po` catalog parser (produces a `ParsedCatalog`)
//! - `mo`: compiled gettext `.mo` catalogs, decoded into the same shape

pub mod mo;
pub mod po;
